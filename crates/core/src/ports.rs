use std::path::Path;

use async_trait::async_trait;

use crate::domain::{ExportDocument, ResolvedMedia};
use crate::error::ReplayError;

pub type Result<T> = std::result::Result<T, ReplayError>;

pub trait DocumentRepository {
    /// Loads every export document, in replay order
    fn load_documents(&self) -> Result<Vec<ExportDocument>>;

    /// Directory that attachment references are relative to
    fn export_dir(&self) -> &Path;
}

/// One live messaging session bound to the target conversation
/// This is a port (interface) that defines how the core reaches the outbound service
#[async_trait]
pub trait OutboundChannel: Send + Sync {
    fn name(&self) -> &str;

    /// Starts the session and resolves the target conversation
    async fn open(&mut self) -> Result<()>;

    async fn send_text(&self, text: &str) -> Result<()>;

    async fn send_media(&self, media: &ResolvedMedia, caption: &str) -> Result<()>;

    async fn close(&mut self) -> Result<()>;
}

/// Delay applied after every successful send
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self);
}
