// Adapters layer: reading the registration exports and writing reports.

pub mod export;
pub mod loader;
