// Screenshot attachments for failed tests

use crate::client::Attachment;
use base64::Engine;
use std::path::Path;

pub const SCREENSHOT_MIME: &str = "image/png";

/// Build the attachment sent with a failure log.
///
/// The attachment is named after the test title. If `screenshots_dir`
/// holds `<sanitized title>.png`, its bytes become the base64 content;
/// otherwise the attachment is a placeholder with empty content.
pub fn file_object(title: &str, screenshots_dir: Option<&Path>) -> Attachment {
    let file_name = format!("{}.png", sanitize_file_name(title));

    let content = screenshots_dir
        .map(|dir| dir.join(&file_name))
        .and_then(|path| match std::fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::debug!("No screenshot at {}: {}", path.display(), e);
                None
            }
        })
        .map(|bytes| base64::engine::general_purpose::STANDARD.encode(bytes))
        .unwrap_or_default();

    Attachment {
        name: file_name,
        mime_type: SCREENSHOT_MIME.to_string(),
        content,
    }
}

/// Replace characters that are not safe in file names across platforms.
pub fn sanitize_file_name(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        "attachment".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_without_directory() {
        let attachment = file_object("logs in", None);
        assert_eq!(attachment.name, "logs in.png");
        assert_eq!(attachment.mime_type, "image/png");
        assert!(attachment.content.is_empty());
    }

    #[test]
    fn test_reads_screenshot_from_directory() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        std::fs::write(dir.path().join("logs in.png"), b"png").expect("write screenshot");

        let attachment = file_object("logs in", Some(dir.path()));
        assert_eq!(attachment.content, "cG5n");
    }

    #[test]
    fn test_missing_screenshot_is_placeholder() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let attachment = file_object("never captured", Some(dir.path()));
        assert!(attachment.content.is_empty());
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("a/b: c?"), "a_b_ c_");
        assert_eq!(sanitize_file_name("   "), "attachment");
    }
}
