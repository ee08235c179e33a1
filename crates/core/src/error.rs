//! Error types for the scripting core

use qlrust_engine::EngineError;

use crate::config::ConfigError;

/// Event registry and dispatcher errors
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("Event name already taken: {0}")]
    DuplicateEvent(String),

    #[error("Invalid dispatcher for event '{name}': {reason}")]
    InvalidDispatcher { name: String, reason: String },

    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    #[error("Hook {plugin}.{handler} is already registered for '{event}'")]
    DuplicateHook {
        event: String,
        plugin: String,
        handler: String,
    },

    #[error("Hook {plugin}.{handler} is not registered for '{event}' at that priority")]
    HookNotFound {
        event: String,
        plugin: String,
        handler: String,
    },

    #[error("Hook signature for '{event}' does not match: expected {expected}, found {found}")]
    SignatureMismatch {
        event: String,
        expected: String,
        found: String,
    },
}

/// Command registry errors
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Attempted to add an already registered command: {0}")]
    AlreadyRegistered(String),

    #[error("Attempted to remove a command that was never added: {0}")]
    NotRegistered(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

/// Frame scheduler errors
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("Next-frame queue is full")]
    QueueFull,

    #[error("Next-frame queue is disconnected")]
    Disconnected,

    #[error("Failed to spawn background thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Stats feed errors
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("Failed to connect to stats feed: {0}")]
    Connect(String),

    #[error("Failed to receive from stats feed: {0}")]
    Receive(String),

    #[error("Failed to decode stats message: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Any error surfaced by the core
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    Event(#[from] EventError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error(transparent)]
    Stats(#[from] StatsError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type CoreResult<T> = Result<T, CoreError>;
