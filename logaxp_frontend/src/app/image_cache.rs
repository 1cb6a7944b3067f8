use std::collections::{HashMap, HashSet, VecDeque};

use super::state::LoadedImage;

// Keeps a long grid of fallback banners from opening dozens of sockets.
pub const MAX_CONCURRENT_DOWNLOADS: usize = 4;
/// Textures kept resident; the least recently drawn go first.
pub const MAX_TEXTURES: usize = 96;

/// Digest of an image URL. Data URLs from the editor can run to megabytes, so
/// bookkeeping never keys on the URL itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageKey(blake3::Hash);

impl ImageKey {
    pub fn of(url: &str) -> Self {
        Self(blake3::hash(url.as_bytes()))
    }

    pub fn texture_name(&self) -> String {
        format!("image-{}", &self.0.to_hex()[..16])
    }
}

struct Resident<T> {
    texture: T,
    last_used: u64,
}

/// Download queue plus decoded textures, keyed by [`ImageKey`].
pub struct ImageCache<T> {
    textures: HashMap<ImageKey, Resident<T>>,
    loading: HashSet<ImageKey>,
    pending: HashMap<ImageKey, LoadedImage>,
    errors: HashMap<ImageKey, String>,
    queue: VecDeque<(ImageKey, String)>,
    active: usize,
}

impl<T> Default for ImageCache<T> {
    fn default() -> Self {
        Self {
            textures: HashMap::new(),
            loading: HashSet::new(),
            pending: HashMap::new(),
            errors: HashMap::new(),
            queue: VecDeque::new(),
            active: 0,
        }
    }
}

impl<T> ImageCache<T> {
    /// Queues `url` unless it is resident, already on its way, or failed.
    pub fn request(&mut self, key: ImageKey, url: &str) {
        if self.textures.contains_key(&key)
            || self.pending.contains_key(&key)
            || self.errors.contains_key(&key)
            || !self.loading.insert(key)
        {
            return;
        }
        self.queue.push_back((key, url.to_string()));
    }

    /// Next download to start, if a slot is free.
    pub fn next_download(&mut self) -> Option<(ImageKey, String)> {
        if self.active >= MAX_CONCURRENT_DOWNLOADS {
            return None;
        }
        let next = self.queue.pop_front()?;
        self.active += 1;
        Some(next)
    }

    pub fn finish(&mut self, key: ImageKey, result: Result<LoadedImage, String>) {
        self.active = self.active.saturating_sub(1);
        self.loading.remove(&key);
        match result {
            Ok(image) => {
                self.pending.insert(key, image);
            }
            Err(err) => {
                self.errors.insert(key, err);
            }
        }
    }

    pub fn take_pending(&mut self, key: &ImageKey) -> Option<LoadedImage> {
        self.pending.remove(key)
    }

    pub fn insert_texture(&mut self, key: ImageKey, texture: T, frame: u64) {
        self.textures.insert(
            key,
            Resident {
                texture,
                last_used: frame,
            },
        );
    }

    /// Marks the texture as drawn in `frame`.
    pub fn texture(&mut self, key: &ImageKey, frame: u64) -> Option<&T> {
        let resident = self.textures.get_mut(key)?;
        resident.last_used = frame;
        Some(&resident.texture)
    }

    pub fn peek_texture(&self, key: &ImageKey) -> Option<&T> {
        self.textures.get(key).map(|resident| &resident.texture)
    }

    pub fn is_loading(&self, key: &ImageKey) -> bool {
        self.loading.contains(key)
    }

    pub fn error(&self, key: &ImageKey) -> Option<&str> {
        self.errors.get(key).map(String::as_str)
    }

    /// Lets failed images be fetched again.
    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Drops least recently drawn textures beyond [`MAX_TEXTURES`]. Anything
    /// drawn in `frame` stays.
    pub fn evict(&mut self, frame: u64) -> usize {
        let excess = self.textures.len().saturating_sub(MAX_TEXTURES);
        if excess == 0 {
            return 0;
        }
        let mut by_age: Vec<(u64, ImageKey)> = self
            .textures
            .iter()
            .filter(|(_, resident)| resident.last_used < frame)
            .map(|(key, resident)| (resident.last_used, *key))
            .collect();
        by_age.sort_unstable_by_key(|(last_used, _)| *last_used);
        by_age
            .into_iter()
            .take(excess)
            .filter(|(_, key)| self.textures.remove(key).is_some())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn pixel() -> LoadedImage {
        LoadedImage {
            size: [1, 1],
            pixels: vec![0, 0, 0, 255],
        }
    }

    #[test]
    fn keys_do_not_hold_the_url() {
        let data_url = format!("data:image/png;base64,{}", "A".repeat(1 << 20));
        let key = ImageKey::of(&data_url);
        assert_eq!(key, ImageKey::of(&data_url));
        assert_ne!(key, ImageKey::of("https://x.io/a.png"));
        assert_eq!(key.texture_name().len(), "image-".len() + 16);
    }

    #[test]
    fn downloads_are_capped_and_deduplicated() {
        let mut cache: ImageCache<()> = ImageCache::default();
        for i in 0..6 {
            let url = format!("https://x.io/{i}.png");
            cache.request(ImageKey::of(&url), &url);
            cache.request(ImageKey::of(&url), &url);
        }
        let started: Vec<_> = std::iter::from_fn(|| cache.next_download()).collect();
        assert_eq!(started.len(), MAX_CONCURRENT_DOWNLOADS);

        cache.finish(started[0].0, Ok(pixel()));
        assert!(cache.next_download().is_some());
        assert!(cache.next_download().is_none());
        assert!(cache.take_pending(&started[0].0).is_some());
    }

    #[test]
    fn failures_are_retried_after_clearing() {
        let mut cache: ImageCache<()> = ImageCache::default();
        let url = "https://x.io/broken.png";
        let key = ImageKey::of(url);
        cache.request(key, url);
        let (started, _) = cache.next_download().unwrap();
        cache.finish(started, Err("404".into()));
        assert_eq!(cache.error(&key), Some("404"));

        cache.request(key, url);
        assert!(cache.next_download().is_none());

        cache.clear_errors();
        assert_eq!(cache.error(&key), None);
        cache.request(key, url);
        assert_eq!(cache.next_download().map(|(k, _)| k), Some(key));
    }

    #[test]
    fn eviction_drops_the_least_recently_drawn() {
        let mut cache: ImageCache<usize> = ImageCache::default();
        for i in 0..MAX_TEXTURES + 3 {
            cache.insert_texture(ImageKey::of(&i.to_string()), i, i as u64);
        }
        let frame = (MAX_TEXTURES + 10) as u64;
        // Drawn now, so it survives even though it is the oldest.
        assert_eq!(cache.texture(&ImageKey::of("0"), frame), Some(&0));

        assert_eq!(cache.evict(frame), 3);
        assert_eq!(cache.len(), MAX_TEXTURES);
        assert!(cache.peek_texture(&ImageKey::of("0")).is_some());
        for gone in 1..4 {
            assert!(cache.peek_texture(&ImageKey::of(&gone.to_string())).is_none());
        }
        assert_eq!(cache.evict(frame), 0);
    }
}
