//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode between reading the inputs and
//! finishing the run, so `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Engine configuration or level layout failed to load.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: pyre_core::config::ConfigError,
    },

    /// The instruction list failed to load.
    #[error("program error: {source}")]
    Program {
        /// The underlying program error.
        #[from]
        source: pyre_core::ProgramError,
    },

    /// The level could not be built from its layout.
    #[error("session error: {source}")]
    Session {
        /// The underlying session error.
        #[from]
        source: pyre_core::SessionError,
    },

    /// The run was refused.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: pyre_core::RunnerError,
    },

    /// The report could not be serialized.
    #[error("report error: {source}")]
    Report {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}
