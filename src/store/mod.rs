//! File-backed conversation store
//!
//! One pretty-printed JSON document per conversation, laid out as
//! `<root>/conversations/<userId>/<id>.json`. The per-user directory doubles
//! as the userId index for the list query.
//!
//! The root directory is initialized lazily on first use; concurrent first
//! callers share a single in-flight initialization via `OnceCell`, which is
//! the only cross-request synchronization point in the system.

use crate::error::ApiError;
use crate::models::{Conversation, GeneratedFiles, UploadedFile};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;
use uuid::Uuid;

/// Common file operations result type
type FileResult<T> = Result<T, String>;

/// Ensure a directory exists, creating it if necessary
fn ensure_dir(path: &Path) -> FileResult<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .map_err(|e| format!("Failed to create directory {:?}: {}", path, e))?;
    }
    Ok(())
}

/// Write data to a file atomically (temp file + rename)
fn atomic_write(path: &Path, content: &str) -> FileResult<()> {
    let temp_path = path.with_extension("tmp");

    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    fs::write(&temp_path, content)
        .map_err(|e| format!("Failed to write temp file {:?}: {}", temp_path, e))?;

    fs::rename(&temp_path, path)
        .map_err(|e| format!("Failed to rename {:?} to {:?}: {}", temp_path, path, e))?;

    Ok(())
}

/// Write data as pretty-printed JSON atomically
fn write_json<T: serde::Serialize>(path: &Path, data: &T) -> FileResult<()> {
    let content = serde_json::to_string_pretty(data)
        .map_err(|e| format!("Failed to serialize to JSON: {}", e))?;
    atomic_write(path, &content)
}

/// Read a JSON file and deserialize it
fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> FileResult<T> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read file {:?}: {}", path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse JSON from {:?}: {}", path, e))
}

/// Persistent store for generation conversations
pub struct ConversationStore {
    root: PathBuf,
    conversations_dir: OnceCell<PathBuf>,
}

impl ConversationStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            conversations_dir: OnceCell::new(),
        }
    }

    /// Lazily initialize the store root, once per process
    async fn conversations_dir(&self) -> Result<&PathBuf, ApiError> {
        self.conversations_dir
            .get_or_try_init(|| async {
                let dir = self.root.join("conversations");
                ensure_dir(&dir).map_err(ApiError::Store)?;
                log::info!("Conversation store ready at {:?}", dir);
                Ok(dir)
            })
            .await
    }

    /// User ids become directory names, so path metacharacters are refused
    fn user_dir(&self, base: &Path, user_id: &str) -> Result<PathBuf, ApiError> {
        if user_id.contains('/') || user_id.contains('\\') || user_id.contains("..") {
            return Err(ApiError::Store(format!(
                "Invalid userId for storage: {user_id}"
            )));
        }
        Ok(base.join(user_id))
    }

    /// Insert one conversation record and return its store-assigned id
    pub async fn create(
        &self,
        user_id: &str,
        prompt: Option<&str>,
        uploaded_files: &[UploadedFile],
        generated_files: &GeneratedFiles,
    ) -> Result<String, ApiError> {
        let base = self.conversations_dir().await?;
        let user_dir = self.user_dir(base, user_id)?;

        let conversation = Conversation {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            prompt: prompt.map(|p| p.to_string()),
            uploaded_files: uploaded_files.to_vec(),
            generated_files: generated_files.clone(),
            timestamp: Utc::now(),
        };

        let path = user_dir.join(format!("{}.json", conversation.id));
        write_json(&path, &conversation).map_err(ApiError::Store)?;

        log::info!(
            "Persisted conversation {} for user {} ({} generated files)",
            conversation.id,
            user_id,
            conversation.generated_files.len()
        );
        Ok(conversation.id)
    }

    /// All conversations for a user, newest first. A user with no records
    /// gets an empty list, not an error.
    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<Conversation>, ApiError> {
        let base = self.conversations_dir().await?;
        let user_dir = self.user_dir(base, user_id)?;

        if !user_dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&user_dir)
            .map_err(|e| ApiError::Store(format!("Failed to read {:?}: {}", user_dir, e)))?;

        let mut conversations = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| ApiError::Store(format!("Failed to read entry: {}", e)))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match read_json::<Conversation>(&path) {
                Ok(conversation) => conversations.push(conversation),
                Err(e) => {
                    // One corrupt document should not take the whole history down
                    log::warn!("Skipping unreadable conversation {:?}: {}", path, e);
                }
            }
        }

        conversations.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(conversations)
    }
}
