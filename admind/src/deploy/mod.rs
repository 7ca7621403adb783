//! Deployment pipeline: model, orchestrator, log parsing and history

pub mod history;
pub mod logparse;
pub mod model;
pub mod pipeline;
