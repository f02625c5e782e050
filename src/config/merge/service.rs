//! MergeService: orchestrates sources, applies merge policy, deserializes to ServerConfig.

use crate::config::sources::{environment, user_file};
use crate::config::ServerConfig;
use config::ConfigError;
use std::path::Path;

use super::policy;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Load config from standard sources.
    ///
    /// Precedence: defaults (lowest) -> user file or explicit file -> environment (highest).
    /// An explicit file replaces the user file and must exist.
    pub fn load(explicit: Option<&Path>) -> Result<ServerConfig, ConfigError> {
        let builder = policy::builder_with_defaults()?;
        let builder = match explicit {
            Some(path) => user_file::add_explicit(builder, path)?,
            None => user_file::add_to_builder(builder)?,
        };
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        config.try_deserialize()
    }
}
