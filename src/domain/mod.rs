// Domain layer: entities, commands and ports. Storage engines live in adapters.

pub mod commands;
pub mod connector_id;
pub mod model;
pub mod ports;
