use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};

use log::debug;

/// Logical resource names. Both variants belong to the "posts" family.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Posts,
    Post(String),
}

impl QueryKey {
    /// `Posts` is the family root: invalidating it also covers every
    /// `Post(id)`. A `Post(id)` only covers itself.
    pub fn covers(&self, other: &QueryKey) -> bool {
        match self {
            QueryKey::Posts => true,
            QueryKey::Post(id) => matches!(other, QueryKey::Post(other_id) if other_id == id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub data: Option<V>,
    pub status: QueryStatus,
    pub error: Option<String>,
    /// Bumped on every invalidation. A fetch remembers the version it started
    /// at so a result that raced an invalidation is kept but stays stale.
    pub version: u64,
    pub stale: bool,
}

impl<V> Default for CacheEntry<V> {
    fn default() -> Self {
        Self {
            data: None,
            status: QueryStatus::Idle,
            error: None,
            version: 0,
            stale: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    Updated(QueryKey),
    Invalidated(QueryKey),
}

/// What a view sees when it reads a key.
#[derive(Debug)]
pub struct QueryResult<'a, V> {
    pub data: Option<&'a V>,
    /// No value yet and a fetch is running.
    pub is_loading: bool,
    /// A fetch is running, whether or not an older value is shown.
    pub is_fetching: bool,
    pub is_error: bool,
    pub error: Option<&'a str>,
}

impl<'a, V> QueryResult<'a, V> {
    fn from_entry(entry: Option<&'a CacheEntry<V>>) -> Self {
        match entry {
            Some(entry) => {
                let fetching = entry.status == QueryStatus::Loading;
                Self {
                    data: entry.data.as_ref(),
                    is_loading: fetching && entry.data.is_none(),
                    is_fetching: fetching,
                    is_error: entry.status == QueryStatus::Error,
                    error: entry.error.as_deref(),
                }
            }
            None => Self {
                data: None,
                is_loading: true,
                is_fetching: false,
                is_error: false,
                error: None,
            },
        }
    }
}

/// Explicit in-memory query cache: key → {value, status, version}.
///
/// Owned by the UI thread; workers never touch it directly.
pub struct QueryStore<V> {
    entries: HashMap<QueryKey, CacheEntry<V>>,
    subscribers: Vec<Sender<CacheEvent>>,
}

impl<V> Default for QueryStore<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            subscribers: Vec::new(),
        }
    }
}

impl<V> QueryStore<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self, key: &QueryKey) -> QueryResult<'_, V> {
        QueryResult::from_entry(self.entries.get(key))
    }

    /// Missing or stale, and nothing already in flight.
    pub fn needs_fetch(&self, key: &QueryKey) -> bool {
        match self.entries.get(key) {
            None => true,
            Some(entry) => entry.stale && entry.status != QueryStatus::Loading,
        }
    }

    /// Marks `key` as loading and returns the version token the eventual
    /// result must be resolved with.
    pub fn begin_fetch(&mut self, key: &QueryKey) -> u64 {
        let entry = self.entries.entry(key.clone()).or_default();
        entry.status = QueryStatus::Loading;
        entry.version
    }

    pub fn resolve(&mut self, key: &QueryKey, version: u64, result: Result<V, String>) {
        let entry = self.entries.entry(key.clone()).or_default();
        entry.stale = version != entry.version;
        match result {
            Ok(value) => {
                entry.data = Some(value);
                entry.error = None;
                entry.status = QueryStatus::Success;
            }
            Err(message) => {
                entry.error = Some(message);
                entry.status = QueryStatus::Error;
            }
        }
        if entry.stale {
            debug!("{key:?} resolved with an outdated version; refetch pending");
        }
        self.notify(CacheEvent::Updated(key.clone()));
    }

    /// Marks every entry covered by `key` stale. Returns how many were hit.
    pub fn invalidate(&mut self, key: &QueryKey) -> usize {
        let mut hit = Vec::new();
        for (entry_key, entry) in self.entries.iter_mut() {
            if key.covers(entry_key) {
                entry.version += 1;
                entry.stale = true;
                hit.push(entry_key.clone());
            }
        }
        for entry_key in &hit {
            self.notify(CacheEvent::Invalidated(entry_key.clone()));
        }
        hit.len()
    }

    pub fn remove(&mut self, key: &QueryKey) -> Option<CacheEntry<V>> {
        self.entries.remove(key)
    }

    pub fn subscribe(&mut self) -> Receiver<CacheEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn notify(&mut self, event: CacheEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }
}
