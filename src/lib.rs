pub mod classifier;
pub mod client;
pub mod config;
pub mod download;
pub mod history;
pub mod input;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod progress;
pub mod proxy;
pub mod submission;
pub mod validation;
