mod monotonic;
mod wall;

pub use monotonic::MonotonicClock;
pub use wall::{Datetime, WallClock};
