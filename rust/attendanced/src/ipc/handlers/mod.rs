pub mod attendance;
pub mod chart;
pub mod core;
pub mod roster;
