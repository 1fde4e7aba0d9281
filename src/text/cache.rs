use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use image::RgbaImage;

use crate::foundation::error::ReactionResult;
use crate::text::backend::{FontFace, TextBackend};
use crate::text::fit::{FitOptions, fit_text};

/// Bounded least-recently-used map.
#[derive(Debug)]
pub struct LruCache<K, V> {
    entries: HashMap<K, V>,
    lru: VecDeque<K>,
    capacity: usize,
}

impl<K: Clone + Eq + Hash, V> LruCache<K, V> {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&mut self, key: &K) -> Option<&V> {
        if self.entries.contains_key(key) {
            self.touch(key);
        }
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.entries.insert(key.clone(), value);
        self.touch(&key);
        while self.lru.len() > self.capacity {
            if let Some(old) = self.lru.pop_front() {
                self.entries.remove(&old);
            }
        }
    }

    /// Cached value for `key`, computing and inserting it on a miss.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        key: K,
        make: impl FnOnce() -> Result<V, E>,
    ) -> Result<&V, E> {
        if !self.entries.contains_key(&key) {
            let value = make()?;
            self.insert(key.clone(), value);
        } else {
            self.touch(&key);
        }
        // Present: either just inserted (capacity >= 1) or already cached.
        Ok(&self.entries[&key])
    }

    fn touch(&mut self, key: &K) {
        if let Some(pos) = self.lru.iter().position(|k| k == key) {
            self.lru.remove(pos);
        }
        self.lru.push_back(key.clone());
    }
}

/// Every argument that influences a fitted bitmap.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextFitKey {
    pub text: String,
    pub width: u32,
    pub height: u32,
    pub face: FontFace,
    pub options: FitOptions,
}

/// Memoized [`fit_text`] results.
#[derive(Debug)]
pub struct TextFitCache {
    inner: LruCache<TextFitKey, RgbaImage>,
}

impl TextFitCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: LruCache::new(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn contains(&self, key: &TextFitKey) -> bool {
        self.inner.contains(key)
    }
}

/// [`fit_text`] through `cache`. Target dimensions are floored before keying.
pub fn fit_text_cached<'c>(
    cache: &'c mut TextFitCache,
    backend: &mut dyn TextBackend,
    text: &str,
    dims: (f64, f64),
    face: FontFace,
    options: FitOptions,
) -> ReactionResult<&'c RgbaImage> {
    let key = TextFitKey {
        text: text.to_owned(),
        width: floor_px(dims.0),
        height: floor_px(dims.1),
        face,
        options,
    };
    cache.inner.get_or_try_insert_with(key, || {
        fit_text(backend, text, dims, face, options)
    })
}

pub(crate) fn floor_px(v: f64) -> u32 {
    if v.is_finite() && v > 0.0 {
        v.floor().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/cache.rs"]
mod tests;
