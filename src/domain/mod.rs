// Domain layer: signal catalog, models and ports. No runtime dependencies.

pub mod model;
pub mod ports;
pub mod signals;
