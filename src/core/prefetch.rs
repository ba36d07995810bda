//! # Description Prefetch
//!
//! While the user browses a deck, a background worker renders every card's
//! description into a shared [`DescriptionCache`] so that moving the focus
//! rarely has to hit the store. The UI thread reads through
//! [`CachedDescriptions`], which falls back to a synchronous lookup on a miss.
//!
//! ```text
//!   Prefetcher (blocking pool)          UI thread
//!   ──────────────────────────          ─────────────────────
//!   for name in deck:                   describe(name):
//!     cancelled? → stop                   cache hit → done
//!     cached?    → skip                   miss → resolve, insert
//!     resolve, insert ──► DescriptionCache ◄──┘
//! ```
//!
//! Both sides may insert the same name; the first published value wins and
//! every reader gets that one.

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, PoisonError, RwLock};

use log::{debug, info, warn};
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::core::repository::{CardRepository, LookupError, RenderedDescription, RepositorySession};
use crate::core::store::StoreError;

// ============================================================================
// Cache
// ============================================================================

/// Shared, write-once map from card name to its rendered description.
#[derive(Debug, Clone, Default)]
pub struct DescriptionCache {
    inner: Arc<RwLock<HashMap<String, Arc<RenderedDescription>>>>,
}

impl DescriptionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Arc<RenderedDescription>> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.get(name).cloned()
    }

    /// Publish a description. If the name is already cached the existing value
    /// is kept and returned.
    pub fn insert(&self, name: &str, description: RenderedDescription) -> Arc<RenderedDescription> {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.entry(name.to_string())
            .or_insert_with(|| Arc::new(description))
            .clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.contains_key(name)
    }

    pub fn len(&self) -> usize {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Worker
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrefetchReport {
    pub fetched: usize,
    /// Names that were already cached when the worker reached them.
    pub skipped: usize,
    /// Names whose lookup failed in the store.
    pub failed: usize,
    pub cancelled: bool,
}

/// Render each name in `names` into `cache`, in order, until done or cancelled.
///
/// Lookup errors are cached as the line the browser would show for them.
/// Store errors are logged and counted; the walk continues with the next name.
pub fn prefetch(
    repository: &CardRepository,
    names: &[String],
    cache: &DescriptionCache,
    token: &CancellationToken,
) -> Result<PrefetchReport, StoreError> {
    let session = repository.open()?;
    let mut report = PrefetchReport::default();

    for name in names {
        if token.is_cancelled() {
            info!("Prefetch cancelled after {} lookups", report.fetched);
            report.cancelled = true;
            break;
        }
        if cache.contains(name) {
            report.skipped += 1;
            continue;
        }
        match session.resolve(name, None) {
            Ok(description) => {
                cache.insert(name, description);
                report.fetched += 1;
            }
            Err(LookupError::Store(e)) => {
                warn!("Prefetch of '{}' failed: {}", name, e);
                report.failed += 1;
            }
            Err(e) => {
                debug!("Prefetch of '{}': {}", name, e);
                cache.insert(name, RenderedDescription::from(&e));
                report.fetched += 1;
            }
        }
    }

    debug!("Prefetch finished: {:?}", report);
    Ok(report)
}

/// Handle to the background prefetch worker. Dropping it cancels the worker
/// without waiting for it.
pub struct Prefetcher {
    handle: JoinHandle<Result<PrefetchReport, StoreError>>,
    token: CancellationToken,
    guard: DropGuard,
}

impl Prefetcher {
    /// Start prefetching `names` on the blocking pool. Must be called from
    /// within a tokio runtime.
    pub fn spawn(
        repository: Arc<CardRepository>,
        names: Vec<String>,
        cache: DescriptionCache,
    ) -> Self {
        let token = CancellationToken::new();
        let worker_token = token.clone();
        info!("Prefetching {} card descriptions", names.len());
        let handle = tokio::task::spawn_blocking(move || {
            prefetch(&repository, &names, &cache, &worker_token)
        });
        Self {
            handle,
            guard: token.clone().drop_guard(),
            token,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Wait for the worker to stop and return what it did.
    pub async fn join(self) -> Result<PrefetchReport, StoreError> {
        let Prefetcher { handle, guard, .. } = self;
        guard.disarm();
        handle
            .await
            .map_err(|e| StoreError::Io(io::Error::other(format!("prefetch worker failed: {e}"))))?
    }
}

// ============================================================================
// UI-side reader
// ============================================================================

/// Where the browser gets card descriptions from.
pub trait DescriptionSource {
    fn describe(&mut self, name: &str) -> Arc<RenderedDescription>;
}

/// Cache first, then a synchronous lookup on the UI's own store session.
pub struct CachedDescriptions<'a> {
    cache: DescriptionCache,
    session: RepositorySession<'a>,
}

impl<'a> CachedDescriptions<'a> {
    pub fn new(cache: DescriptionCache, session: RepositorySession<'a>) -> Self {
        Self { cache, session }
    }
}

impl DescriptionSource for CachedDescriptions<'_> {
    fn describe(&mut self, name: &str) -> Arc<RenderedDescription> {
        if let Some(description) = self.cache.get(name) {
            return description;
        }
        debug!("Cache miss for '{}'", name);
        match self.session.resolve(name, None) {
            Ok(description) => self.cache.insert(name, description),
            // Not cached, so the next focus on this card retries the store.
            Err(e @ LookupError::Store(_)) => {
                warn!("Lookup of '{}' failed: {}", name, e);
                Arc::new(RenderedDescription::from(&e))
            }
            Err(e) => self.cache.insert(name, RenderedDescription::from(&e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{broken_repository, sample_repository};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_first_publish_wins() {
        let cache = DescriptionCache::new();
        let first = cache.insert("Forest", RenderedDescription::new(vec!["one".into()]));
        let second = cache.insert("Forest", RenderedDescription::new(vec!["two".into()]));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.get("Forest").unwrap().lines(), ["one"]);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_prefetch_fills_cache_and_skips_known() {
        let (store, repository) = sample_repository(true);
        let cache = DescriptionCache::new();
        cache.insert("Forest", RenderedDescription::new(vec!["already here".into()]));

        let report = prefetch(
            &repository,
            &names(&["Counterspell", "Forest", "Nope"]),
            &cache,
            &CancellationToken::new(),
        )
        .unwrap();

        assert_eq!(
            report,
            PrefetchReport {
                fetched: 2,
                skipped: 1,
                failed: 0,
                cancelled: false
            }
        );
        assert_eq!(cache.get("Nope").unwrap().lines(), ["Unknown card: Nope"]);
        assert_eq!(cache.get("Forest").unwrap().lines(), ["already here"]);
        assert_eq!(store.open_sessions(), 0);
    }

    #[test]
    fn test_prefetch_observes_cancellation() {
        let (store, repository) = sample_repository(true);
        let cache = DescriptionCache::new();
        let token = CancellationToken::new();
        token.cancel();

        let report =
            prefetch(&repository, &names(&["Counterspell", "Forest"]), &cache, &token).unwrap();
        assert!(report.cancelled);
        assert_eq!(report.fetched, 0);
        assert!(cache.is_empty());
        assert_eq!(store.open_sessions(), 0);
    }

    #[test]
    fn test_store_errors_do_not_stop_the_walk() {
        let repository = broken_repository();
        let cache = DescriptionCache::new();
        let report = prefetch(
            &repository,
            &names(&["Forest", "Island"]),
            &cache,
            &CancellationToken::new(),
        )
        .unwrap();
        assert_eq!(report.failed, 2);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_worker_converges_with_ui_reads() {
        let (store, repository) = sample_repository(true);
        let repository = Arc::new(repository);
        let cache = DescriptionCache::new();
        let deck = names(&["Counterspell", "Fire // Ice", "Forest"]);

        let prefetcher = Prefetcher::spawn(repository.clone(), deck.clone(), cache.clone());
        let mut reader = CachedDescriptions::new(cache.clone(), repository.open().unwrap());
        let seen: Vec<_> = deck.iter().map(|name| reader.describe(name)).collect();

        let report = prefetcher.join().await.unwrap();
        assert!(!report.cancelled);
        assert_eq!(report.fetched + report.skipped, deck.len());

        for (name, description) in deck.iter().zip(&seen) {
            assert!(Arc::ptr_eq(description, &cache.get(name).unwrap()));
        }
        drop(reader);
        assert_eq!(store.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_worker_releases_its_session() {
        let (store, repository) = sample_repository(true);
        let deck = names(&["Counterspell", "Forest", "Fire // Ice"]);
        let prefetcher = Prefetcher::spawn(Arc::new(repository), deck, DescriptionCache::new());
        prefetcher.cancel();
        prefetcher.join().await.unwrap();
        assert_eq!(store.open_sessions(), 0);
    }

    #[test]
    fn test_reader_does_not_cache_store_failures() {
        let repository = broken_repository();
        let cache = DescriptionCache::new();
        let mut reader = CachedDescriptions::new(cache.clone(), repository.open().unwrap());
        let description = reader.describe("Forest");
        assert_eq!(description.lines().len(), 1);
        assert!(description.lines()[0].contains("disk on fire"));
        assert!(!cache.contains("Forest"));
    }
}
