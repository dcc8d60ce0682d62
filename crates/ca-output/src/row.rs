//! Plain data row types written by output backends.

/// Per-tick protocol counters for one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickRow {
    pub tick: u64,
    pub rank: u32,
    /// Vehicles owned at the end of the tick.
    pub owned: u64,
    /// Vehicles admitted at the inflow this tick.
    pub spawned: u64,
    /// Hand-off vehicles sent downstream this tick.
    pub sent: u64,
    /// Hand-off vehicles received from upstream this tick.
    pub received: u64,
    /// Vehicles that left the road on this worker this tick.
    pub finished: u64,
}

/// One completed journey.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TravelTimeRow {
    pub vehicle_id: u32,
    /// Tick on which the vehicle left the road.
    pub finished_tick: u64,
    /// Journey duration in physical seconds (`time_on_road × step_size`).
    pub travel_time_secs: f64,
}
