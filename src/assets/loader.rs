use std::collections::{HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::mpsc;

use crate::assets::decode::{Bitmap, decode_source};
use crate::foundation::error::{CollageError, CollageResult};
use crate::scene::placement::{PlacedImage, PlacedImageId};

/// Read access to decoded bitmaps by placed-image id.
///
/// The compositor only needs this view, so callers can hand it the live [`ImageLoader`] or any
/// prepared map.
pub trait BitmapLookup {
    fn bitmap(&self, id: PlacedImageId) -> Option<&Bitmap>;
}

impl BitmapLookup for HashMap<PlacedImageId, Bitmap> {
    fn bitmap(&self, id: PlacedImageId) -> Option<&Bitmap> {
        self.get(&id)
    }
}

/// Per-id decode ticket.
///
/// A handle is minted when a decode is scheduled and is resolved exactly once. Results carrying
/// a ticket that no longer matches the cache entry (the id was evicted and re-requested) are
/// discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BitmapHandle {
    pub id: PlacedImageId,
    ticket: u64,
}

/// Cache entry state.
#[derive(Clone, Debug)]
pub enum LoadState {
    Pending,
    Ready(Bitmap),
    Failed(String),
}

/// Outcome notification produced when a handle resolves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadEvent {
    Ready(PlacedImageId),
    Failed { id: PlacedImageId, reason: String },
}

struct Entry {
    ticket: u64,
    state: LoadState,
}

struct DecodeMsg {
    handle: BitmapHandle,
    result: Result<Bitmap, String>,
}

/// Asynchronous decoder with an id-keyed bitmap cache.
///
/// Decodes run on a dedicated rayon pool; results come back over a channel and only touch the
/// cache when the owner calls [`ImageLoader::poll`] or [`ImageLoader::wait`], so all cache
/// mutation stays on the owner's thread.
pub struct ImageLoader {
    pool: rayon::ThreadPool,
    entries: HashMap<PlacedImageId, Entry>,
    next_ticket: u64,
    tx: mpsc::Sender<DecodeMsg>,
    rx: mpsc::Receiver<DecodeMsg>,
}

impl ImageLoader {
    /// Create a loader; `threads` overrides the decode pool size.
    pub fn new(threads: Option<usize>) -> CollageResult<Self> {
        let (tx, rx) = mpsc::channel();
        Ok(Self {
            pool: build_thread_pool(threads)?,
            entries: HashMap::new(),
            next_ticket: 0,
            tx,
            rx,
        })
    }

    /// Make the cache track exactly `placed`.
    ///
    /// Ids already cached (in any state) are reused without re-decoding; ids no longer placed are
    /// evicted; every new id gets a decode scheduled. Returns the number of decodes scheduled.
    pub fn request(&mut self, placed: &[PlacedImage]) -> usize {
        let keep: HashSet<PlacedImageId> = placed.iter().map(|p| p.id).collect();
        let before = self.entries.len();
        self.entries.retain(|id, _| keep.contains(id));
        let evicted = before - self.entries.len();
        if evicted > 0 {
            tracing::debug!(evicted, "evicted stale bitmaps");
        }

        let mut scheduled = 0;
        for p in placed {
            if self.entries.contains_key(&p.id) {
                continue;
            }
            let handle = BitmapHandle {
                id: p.id,
                ticket: self.next_ticket,
            };
            self.next_ticket += 1;
            self.entries.insert(
                p.id,
                Entry {
                    ticket: handle.ticket,
                    state: LoadState::Pending,
                },
            );

            let source = p.source.clone();
            let tx = self.tx.clone();
            self.pool.spawn(move || {
                let result = std::panic::catch_unwind(AssertUnwindSafe(|| decode_source(&source)))
                    .unwrap_or_else(|_| Err(CollageError::decode("decoder panicked")))
                    .map_err(|e| e.to_string());
                // The receiver only disappears when the loader is dropped.
                let _ = tx.send(DecodeMsg { handle, result });
            });
            scheduled += 1;
        }
        scheduled
    }

    /// Apply every finished decode without blocking.
    pub fn poll(&mut self) -> Vec<LoadEvent> {
        let mut events = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            if let Some(ev) = self.resolve(msg) {
                events.push(ev);
            }
        }
        events
    }

    /// Block until no tracked id is pending.
    pub fn wait(&mut self) -> Vec<LoadEvent> {
        let mut events = self.poll();
        while self.pending_count() > 0 {
            let Ok(msg) = self.rx.recv() else {
                break;
            };
            if let Some(ev) = self.resolve(msg) {
                events.push(ev);
            }
        }
        events
    }

    fn resolve(&mut self, msg: DecodeMsg) -> Option<LoadEvent> {
        let id = msg.handle.id;
        let entry = self.entries.get_mut(&id)?;
        if entry.ticket != msg.handle.ticket || !matches!(entry.state, LoadState::Pending) {
            tracing::trace!(%id, "discarding stale decode result");
            return None;
        }

        match msg.result {
            Ok(bitmap) => {
                tracing::debug!(%id, width = bitmap.width(), height = bitmap.height(), "bitmap ready");
                entry.state = LoadState::Ready(bitmap);
                Some(LoadEvent::Ready(id))
            }
            Err(reason) => {
                tracing::warn!(%id, %reason, "image decode failed; slot stays empty");
                entry.state = LoadState::Failed(reason.clone());
                Some(LoadEvent::Failed { id, reason })
            }
        }
    }

    pub fn state(&self, id: PlacedImageId) -> Option<&LoadState> {
        self.entries.get(&id).map(|e| &e.state)
    }

    pub fn handle(&self, id: PlacedImageId) -> Option<BitmapHandle> {
        self.entries
            .get(&id)
            .map(|e| BitmapHandle { id, ticket: e.ticket })
    }

    /// `true` once `handle` has resolved (ready or failed) and is still the live entry.
    pub fn is_resolved(&self, handle: BitmapHandle) -> bool {
        self.entries.get(&handle.id).is_some_and(|e| {
            e.ticket == handle.ticket && !matches!(e.state, LoadState::Pending)
        })
    }

    pub fn pending_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| matches!(e.state, LoadState::Pending))
            .count()
    }

    pub fn ready_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| matches!(e.state, LoadState::Ready(_)))
            .count()
    }

    /// Drop every cache entry; in-flight results for them will be discarded.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl BitmapLookup for ImageLoader {
    fn bitmap(&self, id: PlacedImageId) -> Option<&Bitmap> {
        match &self.entries.get(&id)?.state {
            LoadState::Ready(b) => Some(b),
            LoadState::Pending | LoadState::Failed(_) => None,
        }
    }
}

fn build_thread_pool(threads: Option<usize>) -> CollageResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(CollageError::validation(
            "decode 'threads' must be >= 1 when set",
        ));
    }
    let mut builder =
        rayon::ThreadPoolBuilder::new().thread_name(|i| format!("collage-decode-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| CollageError::validation(format!("failed to build decode pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
