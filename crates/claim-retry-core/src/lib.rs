pub mod config;
pub mod logging;

pub mod audit;
pub mod claim;
pub mod predict;
pub mod retry;
pub mod service;
