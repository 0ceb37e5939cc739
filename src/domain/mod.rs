// Domain layer: registration records, periods, filters and the ports the
// pipeline talks through.

pub mod filter;
pub mod model;
pub mod period;
pub mod ports;
