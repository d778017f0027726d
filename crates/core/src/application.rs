use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::domain::{
    Channel, DispatchOutcome, RawMessageNode, ReplaySummary, ReplayableMessage, SenderOverrides,
};
use crate::error::ReplayError;
use crate::media::classify_media;
use crate::ports::{DocumentRepository, OutboundChannel, Pacer, Result};
use crate::senders::{ChannelAssignment, SenderFrequencyTable};
use crate::timestamp::normalize_timestamp;

/// Application service replaying exported messages through two outbound channels
pub struct ReplayServiceImpl {
    documents: Box<dyn DocumentRepository>,
    primary: Box<dyn OutboundChannel>,
    secondary: Box<dyn OutboundChannel>,
    pacer: Box<dyn Pacer>,
    overrides: SenderOverrides,
}

impl ReplayServiceImpl {
    /// Creates a new ReplayServiceImpl with the given dependencies
    pub fn new(
        documents: Box<dyn DocumentRepository>,
        primary: Box<dyn OutboundChannel>,
        secondary: Box<dyn OutboundChannel>,
        pacer: Box<dyn Pacer>,
        overrides: SenderOverrides,
    ) -> Self {
        Self {
            documents,
            primary,
            secondary,
            pacer,
            overrides,
        }
    }

    /// Executes the replay: loads documents, assigns senders to channels, then
    /// sends every message in document order
    pub async fn execute_replay(&mut self) -> Result<ReplaySummary> {
        let export_dir = self.documents.export_dir().to_path_buf();
        let documents = self.documents.load_documents()?;
        if documents.is_empty() {
            return Err(ReplayError::NoDocuments { dir: export_dir });
        }

        let ranking = SenderFrequencyTable::from_documents(&documents).ranking();
        if ranking.len() < 2 {
            warn!("Only {} sender(s) detected in export documents", ranking.len());
        }
        let assignment = ChannelAssignment::resolve(&ranking, &self.overrides)?;

        info!("Sender 1: {} -> {}", assignment.primary, self.primary.name());
        if let Some(secondary) = &assignment.secondary {
            info!("Sender 2: {} -> {}", secondary, self.secondary.name());
        }
        info!("All other senders will use {}", self.primary.name());

        self.open_channels().await?;

        let mut summary = ReplaySummary::default();
        for document in &documents {
            info!(document = %document.name, messages = document.messages.len(), "Replaying document");
            for node in &document.messages {
                let outcome = self.dispatch(&assignment, &export_dir, node).await;
                if outcome == DispatchOutcome::Sent {
                    self.pacer.pause().await;
                }
                summary.record(outcome);
            }
        }

        info!(
            sent = summary.sent,
            skipped = summary.skipped,
            failed = summary.failed,
            "Completed sending messages and media"
        );
        self.close_channels().await;

        Ok(summary)
    }

    async fn open_channels(&mut self) -> Result<()> {
        self.primary.open().await?;
        if let Err(e) = self.secondary.open().await {
            if let Err(close_err) = self.primary.close().await {
                warn!("Failed to close {}: {}", self.primary.name(), close_err);
            }
            return Err(e);
        }
        Ok(())
    }

    async fn close_channels(&mut self) {
        for channel in [&mut self.primary, &mut self.secondary] {
            if let Err(e) = channel.close().await {
                warn!("Failed to close {}: {}", channel.name(), e);
            }
        }
    }

    fn channel(&self, channel: Channel) -> &dyn OutboundChannel {
        match channel {
            Channel::Primary => self.primary.as_ref(),
            Channel::Secondary => self.secondary.as_ref(),
        }
    }

    /// Sends one message; faults are logged and never propagated
    async fn dispatch(
        &self,
        assignment: &ChannelAssignment,
        export_dir: &Path,
        node: &RawMessageNode,
    ) -> DispatchOutcome {
        let Some(message) = build_message(assignment, export_dir, node) else {
            debug!(sender = %node.sender, "Skipping message with unknown time");
            return DispatchOutcome::Skipped;
        };
        let channel = self.channel(message.channel);

        let result = if let Some(media) = message.media.as_ref().filter(|m| m.path.exists()) {
            let caption = media
                .caption
                .clone()
                .unwrap_or_else(|| message.annotated_text());
            channel.send_media(media, &caption).await.map(|_| {
                info!("Media sent from {}: {}", message.sender, media.path.display());
            })
        } else if !message.text.is_empty() {
            channel.send_text(&message.annotated_text()).await.map(|_| {
                info!("Message sent from {}: {}", message.sender, message.text);
            })
        } else {
            debug!(sender = %message.sender, "Nothing to send");
            return DispatchOutcome::Skipped;
        };

        match result {
            Ok(()) => DispatchOutcome::Sent,
            Err(e) => {
                error!("Error sending message from {}: {}", message.sender, e);
                DispatchOutcome::Failed
            }
        }
    }
}

/// Builds the dispatch unit for a node, or None when its time cannot be read
pub fn build_message(
    assignment: &ChannelAssignment,
    export_dir: &Path,
    node: &RawMessageNode,
) -> Option<ReplayableMessage> {
    let time = normalize_timestamp(node.raw_timestamp.as_deref());
    if !time.is_known() {
        return None;
    }
    let media = classify_media(export_dir, node.attachment.as_ref(), &time);

    Some(ReplayableMessage {
        channel: assignment.channel_for(&node.sender),
        sender: node.sender.clone(),
        time,
        text: node.text.clone(),
        media,
    })
}
