//! File manager state and the four operations that drive it.
//!
//! Every operation follows `Idle -> InFlight -> Idle`, clearing the last
//! error when it starts and restoring its in-flight flag on every exit path.
//! Operations take `&self` and may overlap; state is only touched between
//! awaits, never across one.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use tracing::{debug, error, info, warn};

use console_platform::download::{ObjectUrl, ObjectUrls, SaveTrigger};
use console_platform::filesystem::LocalFile;

use crate::api::{FileApi, UploadForm};
use crate::error::{ConsoleError, Operation};
use crate::messages::Messages;
use crate::records::FileRecord;

/// Snapshot of what the presentation layer renders
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsoleState {
    /// In backend order, replaced wholesale by each list
    pub files: Vec<FileRecord>,
    pub is_loading: bool,
    pub is_uploading: bool,
    pub active_download_id: Option<String>,
    pub deleting_id: Option<String>,
    /// Pending upload, kept after a failed attempt so it can be retried
    pub selected_file: Option<LocalFile>,
    pub description: String,
    /// Most recent failure only
    pub error_message: Option<String>,
}

#[derive(Default)]
struct Inner {
    state: ConsoleState,
    /// Last list generation handed out
    list_issued: u64,
    /// Generation whose result currently sits in `files`
    list_applied: u64,
    lists_in_flight: usize,
    /// Per-row calls are numbered; a row flag belongs to the call that set it
    row_calls: u64,
    download_owner: u64,
    delete_owner: u64,
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runs `reset` when dropped, whichever way the operation ends
struct Settle<'a, F: FnOnce(&mut Inner)> {
    inner: &'a Mutex<Inner>,
    reset: Option<F>,
}

impl<F: FnOnce(&mut Inner)> Drop for Settle<'_, F> {
    fn drop(&mut self) {
        if let Some(reset) = self.reset.take() {
            let mut inner = lock(self.inner);
            reset(&mut *inner);
        }
    }
}

/// Revokes the object URL exactly once when dropped
struct ObjectUrlGuard<'a> {
    urls: &'a dyn ObjectUrls,
    url: ObjectUrl,
}

impl Drop for ObjectUrlGuard<'_> {
    fn drop(&mut self) {
        debug!("revoking {}", self.url);
        self.urls.revoke(&self.url);
    }
}

pub struct FileManagerController {
    api: Arc<dyn FileApi>,
    object_urls: Arc<dyn ObjectUrls>,
    saver: Arc<dyn SaveTrigger>,
    messages: Messages,
    max_upload_mb: u64,
    inner: Mutex<Inner>,
}

impl FileManagerController {
    pub fn new(
        api: Arc<dyn FileApi>,
        object_urls: Arc<dyn ObjectUrls>,
        saver: Arc<dyn SaveTrigger>,
        messages: Messages,
    ) -> Self {
        Self {
            api,
            object_urls,
            saver,
            messages,
            max_upload_mb: 100,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn with_max_upload_mb(mut self, max_upload_mb: u64) -> Self {
        self.max_upload_mb = max_upload_mb;
        self
    }

    pub fn state(&self) -> ConsoleState {
        lock(&self.inner).state.clone()
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    /// Advisory text only, nothing is enforced client-side
    pub fn upload_hint(&self) -> String {
        self.messages.upload_hint_for(self.max_upload_mb)
    }

    pub fn select_file(&self, file: Option<LocalFile>) {
        lock(&self.inner).state.selected_file = file;
    }

    pub fn set_description(&self, description: impl Into<String>) {
        lock(&self.inner).state.description = description.into();
    }

    /// Initial load when the console is opened
    pub async fn mount(&self) -> Result<(), ConsoleError> {
        info!("mounting file console");
        self.list().await
    }

    pub async fn refresh(&self) -> Result<(), ConsoleError> {
        self.list().await
    }

    /// Fetch the collection and replace `files` with it.
    /// A response older than one already applied is dropped.
    pub async fn list(&self) -> Result<(), ConsoleError> {
        let generation = {
            let mut inner = lock(&self.inner);
            inner.state.is_loading = true;
            inner.state.error_message = None;
            inner.lists_in_flight += 1;
            inner.list_issued += 1;
            inner.list_issued
        };
        let _settle = self.settle(|inner| {
            inner.lists_in_flight = inner.lists_in_flight.saturating_sub(1);
            if inner.lists_in_flight == 0 {
                inner.state.is_loading = false;
            }
        });

        match self.api.list().await {
            Ok(payload) => {
                let files = payload.into_files();
                let mut inner = lock(&self.inner);
                if generation < inner.list_applied {
                    debug!(
                        "discarding stale file list (generation {} < {})",
                        generation, inner.list_applied
                    );
                } else {
                    info!("loaded {} files", files.len());
                    inner.list_applied = generation;
                    inner.state.files = files;
                }
                Ok(())
            }
            Err(source) => {
                let err = ConsoleError::api(Operation::List, source);
                {
                    let inner = lock(&self.inner);
                    if generation < inner.list_applied {
                        debug!(
                            "ignoring failure of stale file list (generation {} < {}): {}",
                            generation, inner.list_applied, err
                        );
                        return Err(err);
                    }
                }
                self.fail(err)
            }
        }
    }

    /// Send the selected file. On success the selection is cleared and the
    /// list is re-fetched; the upload response itself is ignored.
    pub async fn upload(&self) -> Result<(), ConsoleError> {
        let pending = {
            let mut inner = lock(&self.inner);
            inner.state.error_message = None;
            inner
                .state
                .selected_file
                .clone()
                .map(|file| (file, inner.state.description.clone()))
        };
        let Some((file, description)) = pending else {
            return self.fail(ConsoleError::NoFileSelected);
        };

        lock(&self.inner).state.is_uploading = true;
        let settle = self.settle(|inner| inner.state.is_uploading = false);

        let name = file.name.clone();
        let size = file.size();
        if let Err(source) = self.api.upload(UploadForm::new(file, description)).await {
            return self.fail(ConsoleError::api(Operation::Upload, source));
        }

        info!("uploaded {} ({} bytes)", name, size);
        {
            let mut inner = lock(&self.inner);
            inner.state.selected_file = None;
            inner.state.description.clear();
        }
        drop(settle);

        if let Err(e) = self.list().await {
            warn!("resync after upload failed: {}", e);
        }
        Ok(())
    }

    /// Fetch a file's bytes and hand them to the save trigger.
    /// Returns where the file was saved.
    pub async fn download(&self, record: &FileRecord) -> Result<PathBuf, ConsoleError> {
        let call = {
            let mut inner = lock(&self.inner);
            inner.row_calls += 1;
            inner.download_owner = inner.row_calls;
            inner.state.active_download_id = Some(record.id.clone());
            inner.state.error_message = None;
            inner.row_calls
        };
        let _settle = self.settle(move |inner| {
            if inner.download_owner == call {
                inner.state.active_download_id = None;
            }
        });

        let data = match self.api.download(&record.id).await {
            Ok(data) => data,
            Err(source) => {
                return self.fail(ConsoleError::Api {
                    op: Operation::Download,
                    file_name: Some(record.file_name.clone()),
                    source,
                })
            }
        };

        let size = data.len();
        match self.save(&record.file_name, data) {
            Ok(path) => {
                info!("downloaded {} ({} bytes) to {}", record.file_name, size, path.display());
                Ok(path)
            }
            Err(e) => self.fail(ConsoleError::Save {
                file_name: record.file_name.clone(),
                reason: format!("{:#}", e),
            }),
        }
    }

    /// Remove a file. Local state only changes once the backend accepts.
    pub async fn delete(&self, id: &str) -> Result<(), ConsoleError> {
        let call = {
            let mut inner = lock(&self.inner);
            inner.row_calls += 1;
            inner.delete_owner = inner.row_calls;
            inner.state.deleting_id = Some(id.to_string());
            inner.state.error_message = None;
            inner.row_calls
        };
        let _settle = self.settle(move |inner| {
            if inner.delete_owner == call {
                inner.state.deleting_id = None;
            }
        });

        match self.api.delete(id).await {
            Ok(()) => {
                lock(&self.inner).state.files.retain(|f| f.id != id);
                info!("deleted {}", id);
                Ok(())
            }
            Err(source) => self.fail(ConsoleError::api(Operation::Delete, source)),
        }
    }

    fn save(&self, file_name: &str, data: Bytes) -> anyhow::Result<PathBuf> {
        let url = self.object_urls.create(file_name, data)?;
        let guard = ObjectUrlGuard {
            urls: self.object_urls.as_ref(),
            url,
        };
        self.saver.save_as(&guard.url, file_name)
    }

    fn settle<F: FnOnce(&mut Inner)>(&self, reset: F) -> Settle<'_, F> {
        Settle {
            inner: &self.inner,
            reset: Some(reset),
        }
    }

    /// Log, record the user-facing message, and hand the error back
    fn fail<T>(&self, err: ConsoleError) -> Result<T, ConsoleError> {
        let message = err.user_message(&self.messages);
        error!("{}", err);
        lock(&self.inner).state.error_message = Some(message);
        Err(err)
    }
}
