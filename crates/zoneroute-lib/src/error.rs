use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the zoneroute library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// The query source is not part of the snapshot's zone universe.
    #[error("unknown source zone: {name}{}", format_suggestions(.suggestions))]
    UnknownSource {
        name: String,
        suggestions: Vec<String>,
    },

    /// The query destination is not part of the snapshot's zone universe.
    #[error("unknown destination zone: {name}{}", format_suggestions(.suggestions))]
    UnknownDestination {
        name: String,
        suggestions: Vec<String>,
    },

    /// The destination exists but no accessible path leads to it.
    #[error("zone {destination} is not reachable from {source_zone}")]
    Unreachable {
        source_zone: String,
        destination: String,
    },

    /// A zone with a finite distance has no predecessor before the source.
    #[error("predecessor missing for {at} while reconstructing path to {destination}")]
    BrokenChain { destination: String, at: String },

    /// Walking the predecessor table exceeded the number of known zones.
    #[error("predecessor chain to {destination} exceeds {limit} zones")]
    ReconstructionLoop { destination: String, limit: usize },

    /// The backing store could not be reached.
    #[error("zone store unavailable at {path}: {message}")]
    StoreUnavailable { path: PathBuf, message: String },

    /// The backing store returned data that cannot form a graph.
    #[error("inconsistent zone data: {message}")]
    InconsistentData { message: String },

    /// A mutation referenced a zone that does not exist.
    #[error("unknown zone: {name}")]
    UnknownZone { name: String },

    /// Attempted to create a zone whose name is already taken.
    #[error("zone {name} already exists")]
    DuplicateZone { name: String },

    /// A mutation addressed a connection that does not exist.
    #[error("no connection from {from} to {to}")]
    ConnectionNotFound { from: String, to: String },

    /// Zone attributes failed validation.
    #[error("invalid zone '{name}': {reason}")]
    InvalidZone { name: String, reason: String },

    /// Connection attributes failed validation.
    #[error("invalid connection {from} -> {to}: {reason}")]
    InvalidConnection {
        from: String,
        to: String,
        reason: String,
    },

    /// Time budget must be a positive, finite number of minutes.
    #[error("invalid time budget {budget}; expected a positive number of minutes")]
    InvalidBudget { budget: f64 },

    /// Seed document could not be applied.
    #[error("invalid seed data: {message}")]
    InvalidSeed { message: String },

    /// Wrapper for SQLite errors.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON parsing errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
