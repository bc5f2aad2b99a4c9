pub mod config;
pub mod db;
pub mod memory;
pub mod pipeline;
pub mod publish;
pub mod source;

pub use config::{DatabaseConfig, PublishDestination, RunConfig, redact_url};
pub use db::connect_database;
pub use memory::InMemoryUsageSource;
pub use pipeline::{RunError, RunReport, Trigger, run_forecast};
pub use publish::{ConfiguredTarget, DirectoryTarget, HttpTarget};
pub use source::SqlUsageSource;
