use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nv_core::{ArtifactStore, Error, ObjectSummary, Result};
use tracing::debug;
use url::Url;

/// Longest key segment written as a single file name. Most filesystems stop
/// at 255 bytes.
const MAX_SEGMENT_LEN: usize = 200;

/// Suffix of a directory holding the first part of a split segment.
const CONTINUED: &str = ".~";

/// Objects stored as files under a root directory, one file per key.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map `key` onto the filesystem. A segment longer than
    /// `MAX_SEGMENT_LEN` is stored as nested directories, each non-final
    /// chunk carrying the `CONTINUED` suffix.
    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let mut path = self.root.clone();
        for segment in key.split('/') {
            if segment.is_empty()
                || segment == "."
                || segment == ".."
                || segment.ends_with(CONTINUED)
                || segment.contains('\\')
            {
                return Err(Error::InvalidKey(key.to_string()));
            }
            let chunks = chunk_segment(segment);
            let last = chunks.len() - 1;
            for (i, chunk) in chunks.into_iter().enumerate() {
                if i < last {
                    path.push(format!("{}{}", chunk, CONTINUED));
                } else {
                    path.push(chunk);
                }
            }
        }
        Ok(path)
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| store_error("create directory for", key, e))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| store_error("write", key, e))?;
        debug!(path = %path.display(), bytes = bytes.len(), "Wrote object");
        Ok(())
    }

    /// Every file under the root as `(key, last_modified)`, sorted by key.
    async fn walk(&self) -> Result<Vec<ObjectSummary>> {
        let mut objects = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(store_error("list", &dir.display().to_string(), e)),
            };
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| store_error("list", &dir.display().to_string(), e))?
            {
                let path = entry.path();
                let metadata = entry
                    .metadata()
                    .await
                    .map_err(|e| store_error("stat", &path.display().to_string(), e))?;
                if metadata.is_dir() {
                    pending.push(path);
                    continue;
                }
                if let Some(key) = self.key_for(&path) {
                    objects.push(ObjectSummary {
                        key,
                        last_modified: metadata.modified().ok().map(DateTime::<Utc>::from),
                    });
                }
            }
        }

        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }

    fn key_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let mut key = String::new();
        for component in relative.components() {
            let part = match component {
                Component::Normal(part) => part.to_str()?,
                _ => return None,
            };
            match part.strip_suffix(CONTINUED) {
                Some(head) => key.push_str(head),
                None => {
                    key.push_str(part);
                    key.push('/');
                }
            }
        }
        // A file named like a continuation chunk is not one of ours
        key.strip_suffix('/').map(str::to_string)
    }
}

/// Split `segment` into chunks of at most `MAX_SEGMENT_LEN` bytes on char
/// boundaries. The final chunk is never shorter than three bytes, so it
/// cannot read as `.` or `..`.
fn chunk_segment(segment: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = segment;
    while rest.len() > MAX_SEGMENT_LEN {
        let mut cut = MAX_SEGMENT_LEN.min(rest.len() - 3);
        while !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        let (head, tail) = rest.split_at(cut);
        chunks.push(head);
        rest = tail;
    }
    chunks.push(rest);
    chunks
}

fn store_error(action: &str, key: &str, e: std::io::Error) -> Error {
    Error::StoreUnavailable(format!("Failed to {} {}: {}", action, key, e))
}

#[async_trait]
impl ArtifactStore for LocalStore {
    fn name(&self) -> &str {
        "local"
    }

    async fn get_json(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| Error::StoreUnavailable(format!("{} is not JSON: {}", key, e))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(store_error("read", key, e)),
        }
    }

    async fn put_json(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write(key, &bytes).await
    }

    async fn put_blob(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> Result<()> {
        self.write(key, &bytes).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<ObjectSummary>> {
        let mut objects = self.walk().await?;
        objects.retain(|object| object.key.starts_with(prefix));
        Ok(objects)
    }

    /// A `file://` URL; local files do not expire, so `ttl` is ignored.
    async fn signed_read_url(&self, key: &str, _ttl: Duration) -> Result<String> {
        let path = self.path_for(key)?;
        let absolute = tokio::fs::canonicalize(&path)
            .await
            .map_err(|e| store_error("resolve", key, e))?;
        Url::from_file_path(&absolute)
            .map(|url| url.to_string())
            .map_err(|_| Error::StoreUnavailable(format!("No file URL for {}", absolute.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_local_store_round_trip() {
        let temp_dir = tempdir().unwrap();
        let store = LocalStore::new(temp_dir.path());

        assert!(store.get_json("generated_articles.json").await.unwrap().is_none());
        store
            .put_json("generated_articles.json", &json!(["https://a", "https://b"]))
            .await
            .unwrap();
        assert_eq!(
            store.get_json("generated_articles.json").await.unwrap(),
            Some(json!(["https://a", "https://b"]))
        );
    }

    #[tokio::test]
    async fn test_list_nested_keys() {
        let temp_dir = tempdir().unwrap();
        let store = LocalStore::new(temp_dir.path());

        store.put_blob("images/b_Qg.png", vec![1], "image/png").await.unwrap();
        store.put_blob("images/a_QQ.png", vec![2], "image/png").await.unwrap();
        store.put_json("generated_articles.json", &json!([])).await.unwrap();

        let listed = store.list("images/").await.unwrap();
        let keys: Vec<_> = listed.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["images/a_QQ.png", "images/b_Qg.png"]);
        assert!(listed.iter().all(|o| o.last_modified.is_some()));
    }

    #[tokio::test]
    async fn test_missing_root_lists_nothing() {
        let temp_dir = tempdir().unwrap();
        let store = LocalStore::new(&temp_dir.path().join("not-yet-created"));
        assert!(store.list("images/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_escaping_keys() {
        let temp_dir = tempdir().unwrap();
        let store = LocalStore::new(temp_dir.path());

        for key in [
            "../outside.json",
            "/etc/passwd",
            "images/../../x",
            "",
            "images//a.png",
            "images/./a.png",
            "images.~/a.png",
        ] {
            assert!(
                matches!(store.put_blob(key, vec![0], "image/png").await, Err(Error::InvalidKey(_))),
                "key {:?} was accepted",
                key
            );
        }
    }

    #[tokio::test]
    async fn test_signed_url_is_file_url() {
        let temp_dir = tempdir().unwrap();
        let store = LocalStore::new(temp_dir.path());
        store.put_blob("images/a_QQ.png", vec![1], "image/png").await.unwrap();

        let url = store
            .signed_read_url("images/a_QQ.png", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(url.starts_with("file://"));
        assert!(url.ends_with("images/a_QQ.png"));
    }

    #[tokio::test]
    async fn test_signing_missing_file_fails() {
        let temp_dir = tempdir().unwrap();
        let store = LocalStore::new(temp_dir.path());
        assert!(store
            .signed_read_url("images/nope.png", Duration::from_secs(60))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_long_keys_round_trip() {
        let temp_dir = tempdir().unwrap();
        let store = LocalStore::new(temp_dir.path());
        let long_name = format!("2024-05-01T08:00:00.000Z_{}.png", "R3VlcnJl".repeat(60));
        let key = format!("images/{}", long_name);
        assert!(long_name.len() > 255);

        store.put_blob(&key, vec![7], "image/png").await.unwrap();
        store.put_json(&format!("state/{}", long_name), &json!(["u1"])).await.unwrap();

        let listed: Vec<String> = store.list("").await.unwrap().into_iter().map(|o| o.key).collect();
        assert_eq!(listed, vec![key.clone(), format!("state/{}", long_name)]);
        assert_eq!(
            store.get_json(&format!("state/{}", long_name)).await.unwrap(),
            Some(json!(["u1"]))
        );

        let url = store.signed_read_url(&key, Duration::from_secs(60)).await.unwrap();
        assert!(url.starts_with("file://"));

        let mut pending = vec![temp_dir.path().to_path_buf()];
        while let Some(dir) = pending.pop() {
            for entry in std::fs::read_dir(dir).unwrap() {
                let entry = entry.unwrap();
                assert!(entry.file_name().len() <= 255);
                if entry.file_type().unwrap().is_dir() {
                    pending.push(entry.path());
                }
            }
        }
    }

    #[test]
    fn test_chunk_segment() {
        assert_eq!(chunk_segment("short.png"), vec!["short.png"]);

        let segment = format!("{}.", "a".repeat(200));
        let chunks = chunk_segment(&segment);
        assert_eq!(chunks.concat(), segment);
        assert!(chunks.iter().all(|c| c.len() <= MAX_SEGMENT_LEN && c.len() >= 3));

        let accented = "é".repeat(150);
        let chunks = chunk_segment(&accented);
        assert_eq!(chunks.concat(), accented);
        assert!(chunks.len() > 1);
    }
}
