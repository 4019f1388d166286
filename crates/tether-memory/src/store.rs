//! JSON-file conversation store.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::error::{StateLoadError, StoreError, StoreResult};
use crate::state::{ConversationMessage, ConversationRole, ConversationState};

/// Conversation history persisted as a single JSON document.
///
/// # File Access Patterns
///
/// Every mutation rewrites the whole document through a sibling temporary
/// file followed by a rename, so a reader never observes a partial write.
///
/// # Concurrent File Access
///
/// There is no cross-process locking. Two stores pointing at the same file
/// overwrite each other and the last writer wins.
#[derive(Debug)]
pub struct ConversationStore {
    path: PathBuf,
    state: Option<ConversationState>,
}

impl ConversationStore {
    /// Create a store for `path`. Nothing is read until [`load`](Self::load).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document from disk, replacing any in-memory state.
    ///
    /// A missing, unreadable or unparseable document yields a fresh session;
    /// corrupt documents are copied aside first.
    pub async fn load(&mut self) -> &ConversationState {
        let restored = self.restore().await;
        self.state.insert(restored)
    }

    /// Append a message and persist before returning.
    ///
    /// If the write fails the append is undone and the error returned.
    pub async fn add_message(
        &mut self,
        role: ConversationRole,
        content: impl Into<String>,
    ) -> StoreResult<()> {
        let path = self.path.clone();
        let state = self.loaded_state().await;
        let previous_update = state.updated_at;
        state.push(ConversationMessage::new(role, content));

        if let Err(e) = write_atomically(&path, state).await {
            error!(path = ?path, error = %e, "Failed to persist message, rolling back");
            state.messages.pop();
            state.updated_at = previous_update;
            return Err(e);
        }

        debug!(path = ?path, role = %role, messages = state.messages.len(), "Persisted message");
        Ok(())
    }

    /// Persist `state` and make it current.
    pub async fn save(&mut self, state: ConversationState) -> StoreResult<()> {
        write_atomically(&self.path, &state).await.inspect_err(|e| {
            error!(path = ?self.path, error = %e, "Failed to persist conversation state");
        })?;
        self.state = Some(state);
        Ok(())
    }

    /// Replace the conversation with a fresh session and persist it.
    pub async fn clean(&mut self) -> StoreResult<()> {
        let fresh = ConversationState::fresh();
        let session_id = fresh.session_id.clone();
        self.save(fresh).await?;
        info!(path = ?self.path, session_id = %session_id, "Conversation history cleared");
        Ok(())
    }

    /// Messages currently held in memory. Empty before the first load.
    pub fn messages(&self) -> &[ConversationMessage] {
        self.state
            .as_ref()
            .map(|state| state.messages.as_slice())
            .unwrap_or_default()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.state.as_ref().map(|state| state.session_id.as_str())
    }

    pub fn state(&self) -> Option<&ConversationState> {
        self.state.as_ref()
    }

    async fn loaded_state(&mut self) -> &mut ConversationState {
        if self.state.is_none() {
            let restored = self.restore().await;
            self.state = Some(restored);
        }
        self.state.get_or_insert_with(ConversationState::fresh)
    }

    async fn restore(&self) -> ConversationState {
        match read_state(&self.path).await {
            Ok(Some(state)) => {
                debug!(
                    path = ?self.path,
                    session_id = %state.session_id,
                    messages = state.messages.len(),
                    "Loaded conversation state"
                );
                state
            }
            Ok(None) => {
                debug!(path = ?self.path, "Conversation state not found, starting fresh");
                ConversationState::fresh()
            }
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Failed to load conversation state, starting fresh");
                if matches!(e, StateLoadError::Parse { .. }) {
                    self.backup_corrupted().await;
                }
                ConversationState::fresh()
            }
        }
    }

    async fn backup_corrupted(&self) {
        let backup = sibling(
            &self.path,
            &format!(".corrupted.{}", chrono::Utc::now().timestamp()),
        );
        match fs::copy(&self.path, &backup).await {
            Ok(_) => info!(backup = ?backup, "Backed up corrupted conversation state"),
            Err(e) => warn!(backup = ?backup, error = %e, "Failed to back up corrupted conversation state"),
        }
    }
}

async fn read_state(path: &Path) -> Result<Option<ConversationState>, StateLoadError> {
    let contents = match fs::read(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StateLoadError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_slice(&contents)
        .map(Some)
        .map_err(|source| StateLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

async fn write_atomically(path: &Path, state: &ConversationState) -> StoreResult<()> {
    let json = serde_json::to_string_pretty(state)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| StoreError::io("create directory", parent, e))?;
    }

    let tmp_path = sibling(path, ".tmp");
    fs::write(&tmp_path, json)
        .await
        .map_err(|e| StoreError::io("write", &tmp_path, e))?;

    if let Err(e) = fs::rename(&tmp_path, path).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(StoreError::io("replace", path, e));
    }

    Ok(())
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
