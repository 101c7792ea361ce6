// 📥 Chat Export - plain text, data URL, or a file on disk

use crate::chat::ChatLog;
use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Lines as displayed, newline-joined, in session order
pub fn export_text(log: &ChatLog) -> String {
    log.rendered().join("\n")
}

/// Download link payload for the web page
pub fn data_url(text: &str) -> String {
    format!("data:file/txt;base64,{}", STANDARD.encode(text.as_bytes()))
}

/// File-name friendly version of a name: lowercase ascii, dashes
pub fn slugify(name: &str) -> String {
    let mut slug = String::new();
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "companion".to_string()
    } else {
        slug
    }
}

/// Write `<stem>-<timestamp>.txt` under `dir`, creating the directory if needed
pub fn write_export(log: &ChatLog, dir: &Path, stem: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory: {:?}", dir))?;

    let file_name = format!("{}-{}.txt", slugify(stem), Local::now().format("%Y%m%d-%H%M%S"));
    let path = dir.join(file_name);

    fs::write(&path, export_text(log))
        .with_context(|| format!("Failed to write chat export: {:?}", path))?;

    info!(path = %path.display(), lines = log.len(), "chat log exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{ChatLine, Speaker};

    fn sample_log() -> ChatLog {
        let mut log = ChatLog::new();
        log.push(ChatLine {
            speaker: Speaker::Companion("Koi 🐟".to_string()),
            text: "Welcome.".to_string(),
        });
        log.push(ChatLine {
            speaker: Speaker::You,
            text: "Hello, who are you?".to_string(),
        });
        log.push(ChatLine {
            speaker: Speaker::Companion("Raven 🪶".to_string()),
            text: "A messenger.".to_string(),
        });
        log
    }

    #[test]
    fn test_export_is_lines_in_order() {
        let log = sample_log();
        let text = export_text(&log);

        assert_eq!(text, log.rendered().join("\n"));
        assert_eq!(
            text,
            "Koi 🐟: Welcome.\nYou: Hello, who are you?\nRaven 🪶: A messenger."
        );
        assert_eq!(export_text(&ChatLog::new()), "");
    }

    #[test]
    fn test_data_url_decodes_back() {
        let text = export_text(&sample_log());
        let url = data_url(&text);

        let payload = url.strip_prefix("data:file/txt;base64,").unwrap();
        let decoded = STANDARD.decode(payload).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), text);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Mahan H R Gowda"), "mahan-h-r-gowda");
        assert_eq!(slugify("  Zoë!  "), "zo");
        assert_eq!(slugify("🦊"), "companion");
    }

    #[test]
    fn test_write_export_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("exports");

        let path = write_export(&sample_log(), &target, "Ada Lovelace").unwrap();

        assert!(path.starts_with(&target));
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("ada-lovelace-"));
        assert_eq!(fs::read_to_string(&path).unwrap(), export_text(&sample_log()));
    }
}
