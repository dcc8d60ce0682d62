use ca_core::LaneId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoadError {
    #[error("cell ({lane}, {position}) is already occupied")]
    CellCollision { lane: LaneId, position: u32 },

    #[error("cell ({lane}, {position}) is empty")]
    CellEmpty { lane: LaneId, position: u32 },

    #[error("position {position} outside partition range [{start}, {end}]")]
    OutOfRange { position: u32, start: u32, end: u32 },
}

pub type RoadResult<T> = Result<T, RoadError>;
