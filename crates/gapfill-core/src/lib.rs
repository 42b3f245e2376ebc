pub mod config;
pub mod logging;

pub mod connector;
pub mod control;
pub mod monitor;
pub mod orchestrator;
pub mod pattern;
pub mod progress;
pub mod reconcile;
pub mod retry;
pub mod scheduler;
pub mod site;
pub mod summary;
