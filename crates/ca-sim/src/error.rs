use ca_comm::CommError;
use ca_core::CaError;
use ca_road::RoadError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(#[from] CaError),

    #[error("communication error: {0}")]
    Comm(#[from] CommError),

    #[error("road state error: {0}")]
    Road(#[from] RoadError),
}

pub type SimResult<T> = Result<T, SimError>;
