//! Storage keys for generated images: `<prefix>/<timestamp>_<encodedTitle>.png`.
//!
//! The title is stored as URL-safe base64 without padding. The timestamp is
//! RFC 3339 and never contains `_`, so the first `_` after the prefix always
//! ends the timestamp.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::{Error, Result};

pub const IMAGE_EXTENSION: &str = ".png";
pub const IMAGE_CONTENT_TYPE: &str = "image/png";

pub fn encode_title(title: &str) -> String {
    URL_SAFE_NO_PAD.encode(title.as_bytes())
}

pub fn decode_title(encoded: &str) -> Result<String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|e| Error::InvalidKey(format!("title is not base64: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| Error::InvalidKey(format!("title is not UTF-8: {}", e)))
}

/// Build the key of an image generated at `at` for an article titled `title`.
pub fn artifact_key(prefix: &str, at: DateTime<Utc>, title: &str) -> String {
    format!(
        "{}/{}_{}{}",
        prefix.trim_end_matches('/'),
        at.to_rfc3339_opts(SecondsFormat::Millis, true),
        encode_title(title),
        IMAGE_EXTENSION
    )
}

/// Components recovered from an image key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKey {
    pub timestamp: String,
    pub title: String,
}

/// Whether `key` looks like an image under `prefix`.
pub fn is_image_key(prefix: &str, key: &str) -> bool {
    let dir = format!("{}/", prefix.trim_end_matches('/'));
    key.starts_with(&dir) && key.ends_with(IMAGE_EXTENSION)
}

pub fn parse_artifact_key(prefix: &str, key: &str) -> Result<ParsedKey> {
    let (timestamp, encoded) = split_artifact_key(prefix, key)?;
    Ok(ParsedKey {
        timestamp: timestamp.to_string(),
        title: decode_title(encoded)?,
    })
}

/// Split `key` into its timestamp and still-encoded title.
pub fn split_artifact_key<'a>(prefix: &str, key: &'a str) -> Result<(&'a str, &'a str)> {
    let dir = format!("{}/", prefix.trim_end_matches('/'));
    let rest = key
        .strip_prefix(dir.as_str())
        .and_then(|rest| rest.strip_suffix(IMAGE_EXTENSION))
        .ok_or_else(|| Error::InvalidKey(key.to_string()))?;

    rest.split_once('_')
        .ok_or_else(|| Error::InvalidKey(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 5).unwrap()
    }

    #[test]
    fn test_key_layout() {
        let key = artifact_key("images", at(), "Hello");
        assert_eq!(key, "images/2024-05-01T12:30:05.000Z_SGVsbG8.png");
        assert!(is_image_key("images", &key));
    }

    #[test]
    fn test_trailing_slash_in_prefix() {
        let key = artifact_key("images/", at(), "Hello");
        assert!(key.starts_with("images/2024"));
    }

    #[test]
    fn test_titles_survive_round_trip() {
        let titles = [
            "Plain title",
            "Under_scores_everywhere_",
            "Slashes / and .dots. and +plus+ and =equals=",
            "Élections : le résultat à 20h",
            "Emoji 🚀 and CJK 漢字",
            "???>>>~~~",
            "",
        ];
        for title in titles {
            let key = artifact_key("images", at(), title);
            let parsed = parse_artifact_key("images", &key).unwrap();
            assert_eq!(parsed.title, title, "key {}", key);
            assert_eq!(parsed.timestamp, "2024-05-01T12:30:05.000Z");
        }
    }

    #[test]
    fn test_encoded_title_has_no_path_characters() {
        let encoded = encode_title("a/b+c?d=e&f");
        assert!(encoded
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_rejects_foreign_keys() {
        assert!(!is_image_key("images", "generated_articles.json"));
        assert!(!is_image_key("images", "thumbnails/x_y.png"));
        assert!(parse_artifact_key("images", "images/no-separator.png").is_err());
        assert!(parse_artifact_key("images", "images/2024_SGVsbG8.jpg").is_err());
    }

    #[test]
    fn test_garbage_title_is_invalid_key() {
        let err = parse_artifact_key("images", "images/2024-05-01T12:30:05.000Z_!!!.png").unwrap_err();
        assert!(matches!(err, Error::InvalidKey(_)));
    }
}
