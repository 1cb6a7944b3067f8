use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{error, info};

use crate::api::{ApiError, BlogApi};
use crate::cache::{CacheEvent, QueryKey, QueryResult, QueryStore};
use crate::models::{CommentInput, Post, PostInput};

/// Values held by the query store.
#[derive(Debug, Clone)]
pub enum QueryData {
    Posts(Vec<Post>),
    Post(Post),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    CreatePost,
    UpdatePost,
    DeletePost,
    AddComment,
}

impl MutationKind {
    pub fn failure_alert(self) -> &'static str {
        match self {
            MutationKind::CreatePost => "Failed to create blog. Please try again.",
            MutationKind::UpdatePost => "Failed to update blog. Please try again.",
            MutationKind::DeletePost => "Failed to delete blog. Please try again.",
            MutationKind::AddComment => "Failed to add comment. Please try again.",
        }
    }
}

#[derive(Debug, Clone)]
pub enum MutationOutput {
    Created(Post),
    Updated(Post),
    Deleted { id: String },
    /// The parent post as returned by the server, comments included.
    CommentAdded { post_id: String, post: Post },
}

impl MutationOutput {
    pub fn kind(&self) -> MutationKind {
        match self {
            MutationOutput::Created(_) => MutationKind::CreatePost,
            MutationOutput::Updated(_) => MutationKind::UpdatePost,
            MutationOutput::Deleted { .. } => MutationKind::DeletePost,
            MutationOutput::CommentAdded { .. } => MutationKind::AddComment,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationState {
    pub in_flight: usize,
    pub error: Option<String>,
}

impl MutationState {
    pub fn is_pending(&self) -> bool {
        self.in_flight > 0
    }
}

/// Outcomes handed back to the views after `poll`.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    QueryUpdated(QueryKey),
    MutationSucceeded(MutationOutput),
    MutationFailed {
        kind: MutationKind,
        alert: &'static str,
        error: String,
    },
}

enum WorkerMessage {
    Fetched {
        key: QueryKey,
        version: u64,
        result: Result<QueryData, ApiError>,
    },
    Mutated {
        kind: MutationKind,
        result: Result<MutationOutput, ApiError>,
    },
}

pub type Waker = Arc<dyn Fn() + Send + Sync>;

/// Binds reads to cache keys and writes to invalidation of those keys.
///
/// Requests run on worker threads and report back over a channel; the store
/// only changes inside [`BlogSync::poll`], on the caller's thread.
pub struct BlogSync {
    api: Arc<dyn BlogApi>,
    store: QueryStore<QueryData>,
    mutations: HashMap<MutationKind, MutationState>,
    tx: Sender<WorkerMessage>,
    rx: Receiver<WorkerMessage>,
    waker: Option<Waker>,
}

impl BlogSync {
    pub fn new(api: Arc<dyn BlogApi>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            api,
            store: QueryStore::new(),
            mutations: HashMap::new(),
            tx,
            rx,
            waker: None,
        }
    }

    /// Called from the worker thread after each result is queued, e.g. to
    /// request a repaint.
    pub fn set_waker(&mut self, waker: Waker) {
        self.waker = Some(waker);
    }

    pub fn tenant(&self) -> &str {
        self.api.tenant()
    }

    pub fn store(&self) -> &QueryStore<QueryData> {
        &self.store
    }

    pub fn subscribe(&mut self) -> Receiver<CacheEvent> {
        self.store.subscribe()
    }

    pub fn posts(&mut self) -> QueryResult<'_, Vec<Post>> {
        self.ensure_fetch(&QueryKey::Posts);
        let raw = self.store.read(&QueryKey::Posts);
        QueryResult {
            data: match raw.data {
                Some(QueryData::Posts(posts)) => Some(posts),
                _ => None,
            },
            is_loading: raw.is_loading,
            is_fetching: raw.is_fetching,
            is_error: raw.is_error,
            error: raw.error,
        }
    }

    pub fn post(&mut self, id: &str) -> QueryResult<'_, Post> {
        let key = QueryKey::Post(id.to_string());
        self.ensure_fetch(&key);
        let raw = self.store.read(&key);
        QueryResult {
            data: match raw.data {
                Some(QueryData::Post(post)) => Some(post),
                _ => None,
            },
            is_loading: raw.is_loading,
            is_fetching: raw.is_fetching,
            is_error: raw.is_error,
            error: raw.error,
        }
    }

    /// Forces the next read of `key` (and everything it covers) to refetch.
    pub fn invalidate(&mut self, key: &QueryKey) {
        let hit = self.store.invalidate(key);
        info!("invalidated {key:?} ({hit} entries)");
    }

    pub fn mutation(&self, kind: MutationKind) -> MutationState {
        self.mutations.get(&kind).cloned().unwrap_or_default()
    }

    pub fn create_post(&mut self, input: PostInput) {
        self.spawn_mutation(MutationKind::CreatePost, move |api| {
            api.create_post(&input).map(MutationOutput::Created)
        });
    }

    pub fn update_post(&mut self, id: String, input: PostInput) {
        self.spawn_mutation(MutationKind::UpdatePost, move |api| {
            api.update_post(&id, &input).map(MutationOutput::Updated)
        });
    }

    pub fn delete_post(&mut self, id: String) {
        self.spawn_mutation(MutationKind::DeletePost, move |api| {
            api.delete_post(&id).map(|_| MutationOutput::Deleted { id })
        });
    }

    pub fn add_comment(&mut self, post_id: String, input: CommentInput) {
        self.spawn_mutation(MutationKind::AddComment, move |api| {
            api.add_comment(&post_id, &input)
                .map(|post| MutationOutput::CommentAdded { post_id, post })
        });
    }

    /// Applies every finished worker result and reports what changed.
    pub fn poll(&mut self) -> Vec<SyncEvent> {
        let messages: Vec<WorkerMessage> = self.rx.try_iter().collect();
        messages
            .into_iter()
            .map(|message| self.apply(message))
            .collect()
    }

    /// Waits up to `timeout` for at least one worker result, then drains.
    pub fn poll_blocking(&mut self, timeout: Duration) -> Vec<SyncEvent> {
        let deadline = Instant::now() + timeout;
        let first = match self.rx.recv_timeout(timeout) {
            Ok(message) => message,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                return Vec::new()
            }
        };
        let mut events = vec![self.apply(first)];
        if Instant::now() < deadline {
            events.extend(self.poll());
        }
        events
    }

    fn ensure_fetch(&mut self, key: &QueryKey) {
        if !self.store.needs_fetch(key) {
            return;
        }
        let version = self.store.begin_fetch(key);
        info!("fetching {key:?}");
        let key = key.clone();
        let api = Arc::clone(&self.api);
        self.spawn(move || {
            let result = match &key {
                QueryKey::Posts => api.list_posts().map(QueryData::Posts),
                QueryKey::Post(id) => api.get_post(id).map(QueryData::Post),
            };
            WorkerMessage::Fetched {
                key,
                version,
                result,
            }
        });
    }

    fn spawn_mutation<F>(&mut self, kind: MutationKind, job: F)
    where
        F: FnOnce(&dyn BlogApi) -> Result<MutationOutput, ApiError> + Send + 'static,
    {
        let state = self.mutations.entry(kind).or_default();
        state.in_flight += 1;
        state.error = None;
        let api = Arc::clone(&self.api);
        self.spawn(move || WorkerMessage::Mutated {
            kind,
            result: job(api.as_ref()),
        });
    }

    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() -> WorkerMessage + Send + 'static,
    {
        let tx = self.tx.clone();
        let waker = self.waker.clone();
        thread::spawn(move || {
            if tx.send(job()).is_err() {
                error!("failed to deliver worker result; receiver dropped");
                return;
            }
            if let Some(waker) = waker {
                waker();
            }
        });
    }

    fn apply(&mut self, message: WorkerMessage) -> SyncEvent {
        match message {
            WorkerMessage::Fetched {
                key,
                version,
                result,
            } => {
                let result = result.map_err(|err| {
                    error!("failed to fetch {key:?}: {err}");
                    err.to_string()
                });
                self.store.resolve(&key, version, result);
                SyncEvent::QueryUpdated(key)
            }
            WorkerMessage::Mutated { kind, result } => {
                let state = self.mutations.entry(kind).or_default();
                state.in_flight = state.in_flight.saturating_sub(1);
                match result {
                    Ok(output) => {
                        state.error = None;
                        if let MutationOutput::Deleted { id } = &output {
                            self.store.remove(&QueryKey::Post(id.clone()));
                        }
                        self.invalidate(&QueryKey::Posts);
                        SyncEvent::MutationSucceeded(output)
                    }
                    Err(err) => {
                        error!("{kind:?} failed: {err}");
                        state.error = Some(err.to_string());
                        SyncEvent::MutationFailed {
                            kind,
                            alert: kind.failure_alert(),
                            error: err.to_string(),
                        }
                    }
                }
            }
        }
    }
}
