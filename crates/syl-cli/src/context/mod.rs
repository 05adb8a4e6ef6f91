mod app_context;
mod config_warnings;

pub use app_context::{AppContext, GenerationMode};
pub use config_warnings::warn_unconfigured;
