use std::fmt;
use std::path::PathBuf;

use crate::timestamp::CanonicalTime;

/// Kind of media attached to an exported message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Photo,
    Video,
    Audio,
    Document,
}

/// An attachment decoded from the export, with its reference still relative
/// to the export directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub reference: String,
}

impl Attachment {
    pub fn new(kind: AttachmentKind, reference: impl Into<String>) -> Self {
        Self {
            kind,
            reference: reference.into(),
        }
    }

    /// Animated stickers are exported as `.tgs` documents
    pub fn is_animated_sticker(&self) -> bool {
        self.reference.ends_with(".tgs")
    }
}

/// One exported message entry, as found in the document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMessageNode {
    pub sender: String,
    pub raw_timestamp: Option<String>, // Raw `title` attribute value
    pub text: String,
    pub attachment: Option<Attachment>,
}

/// A parsed export file
#[derive(Debug, Clone, Default)]
pub struct ExportDocument {
    pub name: String,
    /// Every sender label in the document, including ones outside message containers
    pub sender_labels: Vec<String>,
    pub messages: Vec<RawMessageNode>,
}

/// Which of the two outbound accounts a message goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Primary,
    Secondary,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Primary => write!(f, "primary"),
            Channel::Secondary => write!(f, "secondary"),
        }
    }
}

/// Optional sender labels supplied from configuration
#[derive(Debug, Clone, Default)]
pub struct SenderOverrides {
    pub primary: Option<String>,
    pub secondary: Option<String>,
}

/// Media file on disk plus the caption it is sent with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMedia {
    pub kind: AttachmentKind,
    pub path: PathBuf,
    pub caption: Option<String>,
}

/// A message ready for dispatch
#[derive(Debug, Clone)]
pub struct ReplayableMessage {
    pub channel: Channel,
    pub sender: String,
    pub time: CanonicalTime,
    pub text: String,
    pub media: Option<ResolvedMedia>,
}

impl ReplayableMessage {
    /// Text body followed by the bracketed timestamp on its own line
    pub fn annotated_text(&self) -> String {
        format!("{}\n[{}]", self.text, self.time)
    }
}

/// Terminal state of one message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent,
    Skipped,
    Failed,
}

/// Counts reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ReplaySummary {
    pub fn record(&mut self, outcome: DispatchOutcome) {
        match outcome {
            DispatchOutcome::Sent => self.sent += 1,
            DispatchOutcome::Skipped => self.skipped += 1,
            DispatchOutcome::Failed => self.failed += 1,
        }
    }
}
