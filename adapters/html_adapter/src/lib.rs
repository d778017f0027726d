use std::fs;
use std::path::{Path, PathBuf};

use replay_core::domain::{Attachment, AttachmentKind, ExportDocument, RawMessageNode};
use replay_core::error::ReplayError;
use replay_core::ports::{DocumentRepository, Result};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

const FILE_PREFIX: &str = "messages";
const FILE_EXTENSION: &str = ".html";

// Checked in order, first match wins
const ATTACHMENT_SHAPES: [(&str, AttachmentKind); 5] = [
    ("a.photo_wrap", AttachmentKind::Photo),
    ("a.media_photo", AttachmentKind::Photo),
    ("video", AttachmentKind::Video),
    ("audio", AttachmentKind::Audio),
    ("a.media_document", AttachmentKind::Document),
];

/// Decodes Telegram HTML exports into message nodes
pub struct ExportParser {
    message: Selector,
    from_name: Selector,
    date: Selector,
    text: Selector,
    attachments: Vec<(Selector, AttachmentKind)>,
}

impl ExportParser {
    pub fn new() -> Result<Self> {
        let attachments = ATTACHMENT_SHAPES
            .iter()
            .map(|(css, kind)| Ok((selector(css)?, *kind)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            message: selector("div.message")?,
            from_name: selector("div.from_name")?,
            date: selector("div.date")?,
            text: selector("div.text")?,
            attachments,
        })
    }

    /// Parses one export file. Missing sub-elements become empty fields.
    pub fn parse(&self, name: &str, html: &str) -> ExportDocument {
        let document = Html::parse_document(html);

        // Indexed separately from messages: every label counts, inside a message or not
        let sender_labels = document
            .select(&self.from_name)
            .map(element_text)
            .collect();

        let messages = document
            .select(&self.message)
            .map(|message| self.parse_message(message))
            .collect();

        ExportDocument {
            name: name.to_string(),
            sender_labels,
            messages,
        }
    }

    fn parse_message(&self, message: ElementRef<'_>) -> RawMessageNode {
        let sender = message
            .select(&self.from_name)
            .next()
            .map(element_text)
            .unwrap_or_default();
        let raw_timestamp = message
            .select(&self.date)
            .next()
            .and_then(|date| date.value().attr("title"))
            .map(str::to_string);
        let text = message
            .select(&self.text)
            .next()
            .map(element_text)
            .unwrap_or_default();

        RawMessageNode {
            sender,
            raw_timestamp,
            text,
            attachment: self.parse_attachment(message),
        }
    }

    /// Picks the first matching attachment shape; a shape without a reference
    /// means no attachment at all
    fn parse_attachment(&self, message: ElementRef<'_>) -> Option<Attachment> {
        let (element, kind) = self
            .attachments
            .iter()
            .find_map(|(selector, kind)| message.select(selector).next().map(|e| (e, *kind)))?;

        let value = element.value();
        let reference = value
            .attr("href")
            .filter(|r| !r.is_empty())
            .or_else(|| value.attr("src").filter(|r| !r.is_empty()))?;

        Some(Attachment::new(kind, reference))
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ReplayError::document(css, format!("invalid selector: {e}")))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Filesystem implementation of the DocumentRepository trait
pub struct HtmlExportRepository {
    export_dir: PathBuf,
    parser: ExportParser,
}

impl HtmlExportRepository {
    /// Creates a new HtmlExportRepository reading from the given export directory
    pub fn new(export_dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            export_dir: export_dir.into(),
            parser: ExportParser::new()?,
        })
    }

    /// Lists `messages*.html` files in lexicographic file-name order
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.export_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if name.starts_with(FILE_PREFIX) && name.ends_with(FILE_EXTENSION) && entry.path().is_file() {
                files.push(entry.path());
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }
}

impl DocumentRepository for HtmlExportRepository {
    fn load_documents(&self) -> Result<Vec<ExportDocument>> {
        self.discover()?
            .iter()
            .map(|path| {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let html = fs::read_to_string(path).map_err(|e| ReplayError::document(&name, e))?;
                let document = self.parser.parse(&name, &html);
                debug!(document = %name, messages = document.messages.len(), "Parsed export document");
                Ok(document)
            })
            .collect()
    }

    fn export_dir(&self) -> &Path {
        &self.export_dir
    }
}
