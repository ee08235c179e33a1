//! Error types for the host engine boundary

/// Error type for host engine operations
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A required entry of the engine function table was null
    #[error("Engine function missing: {0}")]
    MissingFunction(&'static str),

    /// The function table pointer itself was null
    #[error("Engine function table is null")]
    NullTable,

    /// String handed to the engine contained an interior NUL byte
    #[error("Invalid string for engine call: {0}")]
    InvalidString(String),

    /// Main thread was already recorded
    #[error("Main thread already initialized")]
    AlreadyInitialized,
}
