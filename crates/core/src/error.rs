//! Error types for the replay pipeline.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReplayError {
    /// No export file matched in the export directory
    #[error("No export documents found in {}", .dir.display())]
    NoDocuments { dir: PathBuf },

    /// No non-empty sender label across all documents
    #[error("No senders found in the export documents")]
    NoSenders,

    /// An export file could not be read or decoded
    #[error("Failed to load document {name}: {message}")]
    Document { name: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Session, entity resolution or send failure on an outbound channel
    #[error("Channel {channel} error: {message}")]
    Channel { channel: String, message: String },

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ReplayError {
    pub fn document(name: impl Into<String>, message: impl ToString) -> Self {
        Self::Document {
            name: name.into(),
            message: message.to_string(),
        }
    }

    pub fn channel(channel: impl Into<String>, message: impl ToString) -> Self {
        Self::Channel {
            channel: channel.into(),
            message: message.to_string(),
        }
    }
}
