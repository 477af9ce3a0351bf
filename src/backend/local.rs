use super::types::{CreateThreadParams, StagedFile, UploadedFile};
use super::{Persist, Upload};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

const THREADS_FILE: &str = "threads.jsonl";
const MEDIA_DIR: &str = "media";

/// Stores uploads and threads in a local directory.
pub struct LocalStore {
    dir: PathBuf,
    counter: AtomicU64,
    lock: Mutex<()>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadRecord {
    #[serde(flatten)]
    pub params: CreateThreadParams,
    pub created_at: DateTime<Utc>,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            counter: AtomicU64::new(0),
            lock: Mutex::new(()),
        }
    }
    pub async fn threads(&self) -> Result<Vec<ThreadRecord>> {
        let path = self.dir.join(THREADS_FILE);
        if !fs::try_exists(&path).await? {
            return Ok(Vec::new());
        }
        fs::read_to_string(&path)
            .await?
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).wrap_err("invalid thread record"))
            .collect()
    }
    fn media_name(&self, file: &StagedFile) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        format!(
            "{}-{n}-{}",
            Utc::now().format("%Y%m%d%H%M%S"),
            file.name.replace(['/', '\\'], "_")
        )
    }
}

#[async_trait]
impl Upload for LocalStore {
    async fn upload(&self, files: Vec<StagedFile>) -> Result<Vec<UploadedFile>> {
        let media = self.dir.join(MEDIA_DIR);
        fs::create_dir_all(&media)
            .await
            .wrap_err_with(|| format!("failed to create {}", media.display()))?;
        let mut output = Vec::with_capacity(files.len());
        for file in files {
            let path = media.join(self.media_name(&file));
            fs::write(&path, &file.bytes).await?;
            let path = fs::canonicalize(&path).await?;
            output.push(UploadedFile {
                name: file.name,
                size: file.bytes.len() as u64,
                file_url: Some(format!("file://{}", path.display())),
            });
        }
        Ok(output)
    }
}

#[async_trait]
impl Persist for LocalStore {
    async fn create_thread(&self, params: CreateThreadParams) -> Result<()> {
        let record = ThreadRecord {
            params,
            created_at: Utc::now(),
        };
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');
        let _guard = self.lock.lock().await;
        fs::create_dir_all(&self.dir).await?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join(THREADS_FILE))
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        log::info!("thread saved to {}", self.dir.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn params(text: &str, image: Vec<String>) -> CreateThreadParams {
        CreateThreadParams {
            text: text.to_string(),
            image,
            author: String::from("user_1"),
            community_id: Some(String::from("org_1")),
            path: String::from("/create-thread"),
        }
    }

    #[tokio::test]
    async fn upload_and_create() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let store = LocalStore::new(dir.path());
        let output = store
            .upload(vec![StagedFile {
                name: String::from("cat.png"),
                path: PathBuf::from("/somewhere/cat.png"),
                media_type: String::from("image/png"),
                bytes: vec![1, 2, 3],
            }])
            .await
            .expect("failed to upload");
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].size, 3);
        let url = output[0].file_url.clone().expect("no url");
        let path = PathBuf::from(url.strip_prefix("file://").expect("not a file url"));
        assert!(path.starts_with(fs::canonicalize(dir.path()).await.expect("canonicalize")));
        assert_eq!(fs::read(&path).await.expect("failed to read"), vec![1, 2, 3]);

        store
            .create_thread(params("first", vec![url.clone()]))
            .await
            .expect("failed to create");
        store
            .create_thread(params("second", Vec::new()))
            .await
            .expect("failed to create");
        let threads = store.threads().await.expect("failed to read threads");
        assert_eq!(
            threads.into_iter().map(|r| r.params).collect::<Vec<_>>(),
            vec![params("first", vec![url]), params("second", Vec::new())]
        );
    }

    #[tokio::test]
    async fn no_threads_yet() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let store = LocalStore::new(dir.path().join("nested"));
        assert!(store.threads().await.expect("failed to read").is_empty());
    }
}
