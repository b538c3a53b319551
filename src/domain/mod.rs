// Domain layer: transcript models and the ports the cleaning core depends on.

pub mod model;
pub mod ports;
