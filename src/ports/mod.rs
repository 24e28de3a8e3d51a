//! Port traits decoupling the screening core from data and config sources.

pub mod universe_port;
pub mod config_port;
