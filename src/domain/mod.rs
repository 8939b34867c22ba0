// Domain layer: models, grid geometry and ports. No I/O here.

pub mod layout;
pub mod model;
pub mod ports;
