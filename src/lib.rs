pub mod advisor;
pub mod config;
pub mod error;
pub mod http;
pub mod llm;
pub mod logging;
pub mod mock;
pub mod orchestrator;
pub mod prompt;
pub mod sanitize;
pub mod schema;
pub mod server;

pub use config::AppConfig;
pub use error::{Result, SqlGenError};
pub use orchestrator::{GenerationOrchestrator, GenerationOutcome, GenerationRequest, GenerationResult};
