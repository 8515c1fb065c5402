//! Local filesystem storage implementation.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── dataset.jsonl         # Reviews, appended one JSON object per line
//! └── key_value_store/      # Named artifacts, written atomically
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::ReviewOutput;
use crate::storage::{DatasetStorage, JSON_CONTENT_TYPE};

const DATASET_FILE: &str = "dataset.jsonl";
const KV_DIR: &str = "key_value_store";

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// File path for a key-value store entry. JSON values without an
    /// extension get `.json` appended.
    pub fn value_path(&self, key: &str, content_type: &str) -> PathBuf {
        let mut name = key.to_string();
        if content_type == JSON_CONTENT_TYPE && Path::new(key).extension().is_none() {
            name.push_str(".json");
        }
        self.root_dir.join(KV_DIR).join(name)
    }

    fn dataset_path(&self) -> PathBuf {
        self.root_dir.join(DATASET_FILE)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        self.ensure_dir(path).await?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read a key-value store entry.
    pub async fn get_value(&self, key: &str, content_type: &str) -> Result<Option<Vec<u8>>> {
        self.read_bytes(&self.value_path(key, content_type)).await
    }
}

#[async_trait]
impl DatasetStorage for LocalStorage {
    async fn push_reviews(&self, reviews: &[ReviewOutput]) -> Result<()> {
        if reviews.is_empty() {
            return Ok(());
        }

        let mut lines = Vec::new();
        for review in reviews {
            serde_json::to_writer(&mut lines, review)?;
            lines.push(b'\n');
        }

        let path = self.dataset_path();
        self.ensure_dir(&path).await?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(&lines).await?;
        file.flush().await?;

        log::debug!("Appended {} review(s) to {}", reviews.len(), path.display());
        Ok(())
    }

    async fn set_value(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()> {
        let path = self.value_path(key, content_type);
        self.write_bytes(&path, bytes).await?;
        log::debug!("Stored {} ({content_type}, {} bytes)", key, bytes.len());
        Ok(())
    }

    async fn load_reviews(&self) -> Result<Vec<ReviewOutput>> {
        let Some(bytes) = self.read_bytes(&self.dataset_path()).await? else {
            log::warn!("No {DATASET_FILE} found");
            return Ok(Vec::new());
        };

        let text = String::from_utf8_lossy(&bytes);
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(AppError::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::storage::{HTML_CONTENT_TYPE, PNG_CONTENT_TYPE};

    fn output(comment: &str) -> ReviewOutput {
        ReviewOutput {
            username: "Ana".to_string(),
            rating: Some(5),
            comment: comment.to_string(),
            date: "2024-05-01".to_string(),
            item_title: String::new(),
            item_url: String::new(),
            item_image: String::new(),
            scraped_at: "2024-05-02T10:00:00.000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_push_appends() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage.push_reviews(&[output("one")]).await.unwrap();
        storage
            .push_reviews(&[output("two"), output("three")])
            .await
            .unwrap();
        storage.push_reviews(&[]).await.unwrap();

        let loaded = storage.load_reviews().await.unwrap();
        let comments: Vec<_> = loaded.iter().map(|r| r.comment.as_str()).collect();
        assert_eq!(comments, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_load_without_dataset() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        assert!(storage.load_reviews().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_key_value_entries() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage
            .set_json("statistics", &json!({"pagesProcessed": 2}))
            .await
            .unwrap();
        storage
            .set_value("DEBUG_1.html", b"<html></html>", HTML_CONTENT_TYPE)
            .await
            .unwrap();
        storage
            .set_value("DEBUG_1.png", &[0x89, b'P', b'N', b'G'], PNG_CONTENT_TYPE)
            .await
            .unwrap();

        assert!(tmp.path().join("key_value_store/statistics.json").exists());
        assert!(tmp.path().join("key_value_store/DEBUG_1.html").exists());

        let stats = storage
            .get_value("statistics", JSON_CONTENT_TYPE)
            .await
            .unwrap()
            .unwrap();
        let stats: serde_json::Value = serde_json::from_slice(&stats).unwrap();
        assert_eq!(stats["pagesProcessed"], 2);

        let missing = storage.get_value("nope", HTML_CONTENT_TYPE).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_overwrite_leaves_no_temp_file() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage
            .set_json("BLOCKED_1.json", &json!({"reason": "bot"}))
            .await
            .unwrap();
        storage
            .set_json("BLOCKED_1.json", &json!({"reason": "captcha"}))
            .await
            .unwrap();

        let dir: Vec<_> = std::fs::read_dir(tmp.path().join("key_value_store"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(dir, vec!["BLOCKED_1.json".to_string()]);
    }
}
