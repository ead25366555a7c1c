//! Error types for the engine binary.

/// Top-level error for the engine binary.
///
/// Each variant wraps a subsystem error so `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: homestead_core::ConfigError,
    },

    /// The farm could not be built from the configuration.
    #[error("farm error: {source}")]
    Farm {
        /// The underlying farm error.
        #[from]
        source: homestead_farm::FarmError,
    },

    /// The frame loop could not run.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: homestead_core::RunnerError,
    },
}
