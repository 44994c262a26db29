//! Core DocQA library (domain types, config, document service, persistence).

pub mod config;
pub mod logging;
pub mod model;
pub mod service;
pub mod snapshot;
