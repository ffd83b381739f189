pub mod config;
pub mod logging;

pub mod collect;
pub mod control;
pub mod fetch;
pub mod fingerprint;
pub mod format;
pub mod store;
