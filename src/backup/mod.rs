pub mod artifact;
pub mod backup_config;
pub mod listing;
pub mod logging;
pub mod orchestrator;
pub mod pipeline;
pub mod redacted;
pub mod result_error;
pub mod validate;
