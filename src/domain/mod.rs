// Domain layer: registry models and the storage/process ports. No I/O here.

pub mod model;
pub mod ports;
