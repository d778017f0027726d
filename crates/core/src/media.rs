use std::path::Path;

use crate::domain::{Attachment, AttachmentKind, ResolvedMedia};
use crate::timestamp::CanonicalTime;

/// Resolves an attachment to a file under the export directory and picks its caption
pub fn classify_media(
    export_dir: &Path,
    attachment: Option<&Attachment>,
    time: &CanonicalTime,
) -> Option<ResolvedMedia> {
    let attachment = attachment?;
    Some(ResolvedMedia {
        kind: attachment.kind,
        path: export_dir.join(&attachment.reference),
        caption: Some(caption_for(attachment, time)),
    })
}

/// Every kind is currently captioned with the bracketed timestamp only
fn caption_for(attachment: &Attachment, time: &CanonicalTime) -> String {
    match attachment.kind {
        AttachmentKind::Document if attachment.is_animated_sticker() => format!("[{time}]"),
        AttachmentKind::Photo => format!("[{time}]"),
        AttachmentKind::Video | AttachmentKind::Audio | AttachmentKind::Document => {
            format!("[{time}]")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::normalize_timestamp;
    use std::path::PathBuf;

    fn time() -> CanonicalTime {
        normalize_timestamp(Some("05.03.2022 14:30:00 UTC+02:00"))
    }

    #[test]
    fn test_classify_media_none_without_attachment() {
        assert_eq!(classify_media(Path::new("/export"), None, &time()), None);
    }

    #[test]
    fn test_classify_media_joins_export_dir() {
        let attachment = Attachment::new(AttachmentKind::Photo, "photos/photo_1.jpg");
        let media = classify_media(Path::new("/export"), Some(&attachment), &time()).unwrap();

        assert_eq!(media.kind, AttachmentKind::Photo);
        assert_eq!(media.path, PathBuf::from("/export/photos/photo_1.jpg"));
        assert_eq!(media.caption.as_deref(), Some("[05/03/2022 - 14:30:00]"));
    }

    #[test]
    fn test_classify_media_caption_is_uniform_across_kinds() {
        for (kind, reference) in [
            (AttachmentKind::Photo, "photos/a.png"),
            (AttachmentKind::Video, "video_files/b.mp4"),
            (AttachmentKind::Audio, "voice_messages/c.ogg"),
            (AttachmentKind::Document, "files/d.pdf"),
            (AttachmentKind::Document, "stickers/e.tgs"),
        ] {
            let attachment = Attachment::new(kind, reference);
            let media = classify_media(Path::new("."), Some(&attachment), &time()).unwrap();
            assert_eq!(media.caption.as_deref(), Some("[05/03/2022 - 14:30:00]"));
        }
    }

    #[test]
    fn test_animated_sticker_detection() {
        assert!(Attachment::new(AttachmentKind::Document, "stickers/s.tgs").is_animated_sticker());
        assert!(!Attachment::new(AttachmentKind::Document, "files/s.webp").is_animated_sticker());
    }
}
