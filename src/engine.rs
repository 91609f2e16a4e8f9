//! The translation-cache orchestration loop.
//!
//! One pass walks the catalog in order, skips entries that are already
//! translated (unless forced), serves the rest from the cache, and calls
//! the backend only on a miss. Results are written back to the cache and
//! the entry, then emitted lazily so the CLI can render progress without
//! a second copy of the catalog.
//!
//! Backend failures end the pass at the current entry. Everything cached
//! up to that point is kept, so a rerun only pays for what is left.

use std::time::Duration;

use anyhow::Result;
use async_stream::try_stream;
use futures_util::Stream;

use crate::cache::{CacheRecord, TranslationCache};
use crate::catalog::Catalog;
use crate::fingerprint::fingerprint;
use crate::translator::Translator;

/// Where a translation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationSource {
    Cache,
    Backend,
}

/// One completed entry, emitted in catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translated {
    pub original: String,
    pub context: Option<String>,
    pub translation: String,
    pub source: TranslationSource,
}

/// Settings for one pass over a catalog.
#[derive(Debug, Clone, Default)]
pub struct TranslationPass {
    pub from: String,
    pub to: String,
    /// Offer entries that already carry a translation for re-translation.
    pub force: bool,
    /// Pause inserted after each backend call, to respect rate limits.
    pub wait: Option<Duration>,
}

/// Translates the untranslated entries of a PO catalog.
pub struct PoTranslator {
    translator: Box<dyn Translator>,
    cache: TranslationCache,
}

impl PoTranslator {
    pub fn new(translator: Box<dyn Translator>, cache: TranslationCache) -> Self {
        Self { translator, cache }
    }

    /// Runs one translation pass, emitting each processed entry in
    /// catalog order.
    ///
    /// Skipped entries are not emitted. The stream is lazy: nothing is
    /// looked up or sent to the backend until the caller polls. An `Err`
    /// item reports a backend failure and ends the stream; the catalog
    /// keeps the translations completed before the failure.
    pub fn translate<'a>(
        &'a self,
        catalog: &'a mut Catalog,
        pass: &'a TranslationPass,
    ) -> impl Stream<Item = Result<Translated>> + 'a {
        try_stream! {
            let namespace = self.translator.cache_namespace();

            for entry in &mut catalog.entries {
                if entry.is_translated() && !pass.force {
                    continue;
                }

                // Context is folded into the key so identical texts under
                // different contexts never collide.
                let key = fingerprint(
                    &entry.original,
                    entry.context.as_deref(),
                    &pass.from,
                    &pass.to,
                );

                let (translation, source) = match self.cache.get(&namespace, &key) {
                    Some(hit) => (hit, TranslationSource::Cache),
                    None => {
                        let fresh = self
                            .translator
                            .translate(&entry.original, &pass.from, &pass.to)
                            .await?;
                        self.cache.put(&CacheRecord {
                            namespace: &namespace,
                            key: &key,
                            source_text: &entry.original,
                            translated_text: &fresh,
                            source_language: &pass.from,
                            target_language: &pass.to,
                        });
                        (fresh, TranslationSource::Backend)
                    }
                };

                entry.translation = Some(translation.clone());

                yield Translated {
                    original: entry.original.clone(),
                    context: entry.context.clone(),
                    translation,
                    source,
                };

                if source == TranslationSource::Backend
                    && let Some(wait) = pass.wait
                {
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::pin;
    use std::sync::{Arc, Mutex};

    use futures_util::FutureExt;
    use futures_util::StreamExt;
    use futures_util::future::BoxFuture;
    use tempfile::TempDir;

    use crate::cache::SqliteCache;
    use crate::catalog::Entry;

    const TTL: Duration = Duration::from_secs(86400);

    /// Backend double that records every call.
    struct MockBackend {
        calls: Arc<Mutex<Vec<String>>>,
        /// Source text that triggers a backend failure.
        fail_on: Option<String>,
        /// Fixed reply; by default the text is echoed with the target
        /// language appended.
        reply: Option<String>,
    }

    impl MockBackend {
        fn new(calls: Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                calls,
                fail_on: None,
                reply: None,
            }
        }
    }

    impl Translator for MockBackend {
        fn name(&self) -> &'static str {
            "Mock"
        }

        fn cache_namespace(&self) -> String {
            "mock".to_string()
        }

        fn translate<'a>(
            &'a self,
            text: &'a str,
            _from: &'a str,
            to: &'a str,
        ) -> BoxFuture<'a, Result<String>> {
            async move {
                self.calls.lock().unwrap().push(text.to_string());
                if self.fail_on.as_deref() == Some(text) {
                    anyhow::bail!("mock backend failure");
                }
                Ok(self
                    .reply
                    .clone()
                    .unwrap_or_else(|| format!("{text} [{to}]")))
            }
            .boxed()
        }
    }

    fn sqlite_cache(temp_dir: &TempDir) -> TranslationCache {
        TranslationCache::Sqlite(
            SqliteCache::open(temp_dir.path().join("cache.db"), TTL).unwrap(),
        )
    }

    fn en_cs() -> TranslationPass {
        TranslationPass {
            from: "en".to_string(),
            to: "cs".to_string(),
            ..TranslationPass::default()
        }
    }

    fn translated(original: &str, translation: &str) -> Entry {
        let mut entry = Entry::new(original);
        entry.translation = Some(translation.to_string());
        entry
    }

    async fn collect(
        engine: &PoTranslator,
        catalog: &mut Catalog,
        pass: &TranslationPass,
    ) -> Result<Vec<Translated>> {
        let mut stream = pin!(engine.translate(catalog, pass));
        let mut events = Vec::new();
        while let Some(event) = stream.next().await {
            events.push(event?);
        }
        Ok(events)
    }

    #[tokio::test]
    async fn test_skips_translated_and_serves_duplicates_from_cache() {
        let temp_dir = TempDir::new().unwrap();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let engine = PoTranslator::new(
            Box::new(MockBackend::new(Arc::clone(&calls))),
            sqlite_cache(&temp_dir),
        );
        let mut catalog = Catalog::from_entries(vec![
            Entry::new("Hello"),
            Entry::new("Hello"),
            translated("Bye", "Sbohem"),
        ]);

        let events = collect(&engine, &mut catalog, &en_cs()).await.unwrap();

        assert_eq!(*calls.lock().unwrap(), vec!["Hello"]);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].translation, "Hello [cs]");
        assert_eq!(events[1].translation, "Hello [cs]");
        assert_eq!(events[0].source, TranslationSource::Backend);
        assert_eq!(events[1].source, TranslationSource::Cache);

        assert_eq!(catalog.entries[0].translation.as_deref(), Some("Hello [cs]"));
        assert_eq!(catalog.entries[1].translation.as_deref(), Some("Hello [cs]"));
        assert_eq!(catalog.entries[2].translation.as_deref(), Some("Sbohem"));
    }

    #[tokio::test]
    async fn test_second_pass_makes_no_backend_calls() {
        let temp_dir = TempDir::new().unwrap();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let engine = PoTranslator::new(
            Box::new(MockBackend::new(Arc::clone(&calls))),
            sqlite_cache(&temp_dir),
        );
        let mut catalog = Catalog::from_entries(vec![Entry::new("Hello"), Entry::new("World")]);

        collect(&engine, &mut catalog, &en_cs()).await.unwrap();
        let second = collect(&engine, &mut catalog, &en_cs()).await.unwrap();

        assert_eq!(calls.lock().unwrap().len(), 2);
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn test_force_bypasses_skip_but_not_cache() {
        let temp_dir = TempDir::new().unwrap();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let engine = PoTranslator::new(
            Box::new(MockBackend::new(Arc::clone(&calls))),
            sqlite_cache(&temp_dir),
        );
        let mut catalog =
            Catalog::from_entries(vec![Entry::new("Hello"), translated("Bye", "Sbohem")]);

        collect(&engine, &mut catalog, &en_cs()).await.unwrap();
        assert_eq!(*calls.lock().unwrap(), vec!["Hello"]);

        let forced = TranslationPass {
            force: true,
            ..en_cs()
        };
        let events = collect(&engine, &mut catalog, &forced).await.unwrap();

        // "Hello" is still fresh in the cache; only "Bye" needs the backend.
        assert_eq!(*calls.lock().unwrap(), vec!["Hello", "Bye"]);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].source, TranslationSource::Cache);
        assert_eq!(events[1].source, TranslationSource::Backend);
        assert_eq!(catalog.entries[1].translation.as_deref(), Some("Bye [cs]"));
    }

    #[tokio::test]
    async fn test_events_preserve_catalog_order() {
        let temp_dir = TempDir::new().unwrap();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let engine = PoTranslator::new(
            Box::new(MockBackend::new(Arc::clone(&calls))),
            sqlite_cache(&temp_dir),
        );
        let mut catalog = Catalog::from_entries(vec![
            Entry::new("A"),
            translated("B", "done"),
            Entry::new("C"),
        ]);

        let events = collect(&engine, &mut catalog, &en_cs()).await.unwrap();

        let originals: Vec<_> = events.iter().map(|e| e.original.as_str()).collect();
        assert_eq!(originals, vec!["A", "C"]);
    }

    #[tokio::test]
    async fn test_backend_error_aborts_pass() {
        let temp_dir = TempDir::new().unwrap();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut backend = MockBackend::new(Arc::clone(&calls));
        backend.fail_on = Some("Boom".to_string());
        let engine = PoTranslator::new(Box::new(backend), sqlite_cache(&temp_dir));
        let mut catalog = Catalog::from_entries(vec![
            Entry::new("First"),
            Entry::new("Boom"),
            Entry::new("Never"),
        ]);

        let pass = en_cs();
        {
            let mut stream = pin!(engine.translate(&mut catalog, &pass));
            let first = stream.next().await.unwrap().unwrap();
            assert_eq!(first.original, "First");

            let failure = stream.next().await.unwrap();
            assert!(failure.is_err());
            assert!(stream.next().await.is_none());
        }

        // The failing entry and everything after it stay untouched.
        assert_eq!(*calls.lock().unwrap(), vec!["First", "Boom"]);
        assert!(catalog.entries[0].is_translated());
        assert!(catalog.entries[1].translation.is_none());
        assert!(catalog.entries[2].translation.is_none());
    }

    #[tokio::test]
    async fn test_completed_entries_survive_an_aborted_pass() {
        let temp_dir = TempDir::new().unwrap();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut backend = MockBackend::new(Arc::clone(&calls));
        backend.fail_on = Some("Boom".to_string());
        let engine = PoTranslator::new(Box::new(backend), sqlite_cache(&temp_dir));

        let mut catalog = Catalog::from_entries(vec![Entry::new("First"), Entry::new("Boom")]);
        let pass = en_cs();
        {
            let mut stream = pin!(engine.translate(&mut catalog, &pass));
            while let Some(event) = stream.next().await {
                if event.is_err() {
                    break;
                }
            }
        }

        // A rerun pays only for the entry that failed.
        let mut catalog = Catalog::from_entries(vec![Entry::new("First"), Entry::new("Boom")]);
        let engine = PoTranslator::new(
            Box::new(MockBackend::new(Arc::clone(&calls))),
            sqlite_cache(&temp_dir),
        );
        collect(&engine, &mut catalog, &en_cs()).await.unwrap();

        assert_eq!(*calls.lock().unwrap(), vec!["First", "Boom", "Boom"]);
    }

    #[tokio::test]
    async fn test_empty_backend_reply_is_cached_and_accepted() {
        let temp_dir = TempDir::new().unwrap();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut backend = MockBackend::new(Arc::clone(&calls));
        backend.reply = Some(String::new());
        let engine = PoTranslator::new(Box::new(backend), sqlite_cache(&temp_dir));
        let mut catalog = Catalog::from_entries(vec![Entry::new("   ")]);

        let events = collect(&engine, &mut catalog, &en_cs()).await.unwrap();
        assert_eq!(events[0].translation, "");
        assert_eq!(catalog.entries[0].translation.as_deref(), Some(""));

        // An empty translation still reads as untranslated, but the next
        // pass converges through the cache instead of the backend.
        let events = collect(&engine, &mut catalog, &en_cs()).await.unwrap();
        assert_eq!(events[0].source, TranslationSource::Cache);
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_context_separates_cache_entries() {
        let temp_dir = TempDir::new().unwrap();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let engine = PoTranslator::new(
            Box::new(MockBackend::new(Arc::clone(&calls))),
            sqlite_cache(&temp_dir),
        );

        let mut with_context = Entry::new("Open");
        with_context.context = Some("menu".to_string());
        let mut catalog = Catalog::from_entries(vec![Entry::new("Open"), with_context]);

        let events = collect(&engine, &mut catalog, &en_cs()).await.unwrap();

        assert_eq!(calls.lock().unwrap().len(), 2);
        assert_eq!(events[1].context.as_deref(), Some("menu"));
        assert_eq!(events[1].source, TranslationSource::Backend);
    }

    #[tokio::test]
    async fn test_disabled_cache_never_converges() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let engine = PoTranslator::new(
            Box::new(MockBackend::new(Arc::clone(&calls))),
            TranslationCache::Disabled,
        );
        let mut catalog = Catalog::from_entries(vec![Entry::new("Hello"), Entry::new("Hello")]);

        let events = collect(&engine, &mut catalog, &en_cs()).await.unwrap();

        assert_eq!(calls.lock().unwrap().len(), 2);
        assert!(events.iter().all(|e| e.source == TranslationSource::Backend));
    }

    #[tokio::test]
    async fn test_wait_pauses_after_backend_calls() {
        let temp_dir = TempDir::new().unwrap();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let engine = PoTranslator::new(
            Box::new(MockBackend::new(Arc::clone(&calls))),
            sqlite_cache(&temp_dir),
        );
        let mut catalog = Catalog::from_entries(vec![Entry::new("A"), Entry::new("B")]);
        let pass = TranslationPass {
            wait: Some(Duration::from_millis(25)),
            ..en_cs()
        };

        let start = std::time::Instant::now();
        collect(&engine, &mut catalog, &pass).await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_wait_not_applied_to_cache_hits() {
        let temp_dir = TempDir::new().unwrap();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let engine = PoTranslator::new(
            Box::new(MockBackend::new(Arc::clone(&calls))),
            sqlite_cache(&temp_dir),
        );
        let mut catalog = Catalog::from_entries(vec![Entry::new("A"), Entry::new("B")]);
        collect(&engine, &mut catalog, &en_cs()).await.unwrap();

        // Every entry is a cache hit under force; a large wait would blow
        // the timeout if it were applied.
        let pass = TranslationPass {
            force: true,
            wait: Some(Duration::from_secs(30)),
            ..en_cs()
        };
        let events = tokio::time::timeout(
            Duration::from_secs(5),
            collect(&engine, &mut catalog, &pass),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.source == TranslationSource::Cache));
    }

    #[tokio::test]
    async fn test_stream_is_lazy() {
        let temp_dir = TempDir::new().unwrap();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let engine = PoTranslator::new(
            Box::new(MockBackend::new(Arc::clone(&calls))),
            sqlite_cache(&temp_dir),
        );
        let mut catalog = Catalog::from_entries(vec![Entry::new("Hello")]);
        let pass = en_cs();

        {
            let stream = engine.translate(&mut catalog, &pass);
            assert!(calls.lock().unwrap().is_empty());
            drop(stream);
        }

        let mut stream = pin!(engine.translate(&mut catalog, &pass));
        stream.next().await.unwrap().unwrap();
        assert_eq!(*calls.lock().unwrap(), vec!["Hello"]);
    }
}
