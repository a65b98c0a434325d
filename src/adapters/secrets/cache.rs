use crate::adapters::secrets::CredentialSource;
use crate::domain::credentials::TwilioCredentials;
use crate::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug)]
struct Cached {
    credentials: TwilioCredentials,
    fetched_at: Instant,
}

/// Reuses loaded credentials until they are older than `ttl`.
///
/// The lock is held across a reload, so concurrent callers wait for the same
/// fetch instead of racing to the source.
#[derive(Debug)]
pub struct CredentialCache {
    source: Arc<dyn CredentialSource>,
    ttl: Duration,
    state: Mutex<Option<Cached>>,
}

impl CredentialCache {
    #[must_use]
    pub fn new(source: Arc<dyn CredentialSource>, ttl: Duration) -> Self {
        Self { source, ttl, state: Mutex::new(None) }
    }

    /// # Errors
    /// Propagates the source's error when a reload is needed and fails. The
    /// previously cached value is left in place.
    pub async fn get(&self) -> Result<TwilioCredentials> {
        let mut state = self.state.lock().await;

        if let Some(cached) = state.as_ref()
            && cached.fetched_at.elapsed() <= self.ttl
        {
            return Ok(cached.credentials.clone());
        }

        tracing::debug!(ttl_secs = self.ttl.as_secs(), "Refreshing credentials");
        let credentials = self.source.load().await?;
        *state = Some(Cached { credentials: credentials.clone(), fetched_at: Instant::now() });
        Ok(credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct CountingSource {
        loads: AtomicUsize,
        fail: AtomicBool,
    }

    #[async_trait]
    impl CredentialSource for CountingSource {
        async fn load(&self) -> Result<TwilioCredentials> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(AppError::Credentials("unavailable".into()));
            }
            let n = self.loads.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(TwilioCredentials {
                account_sid: format!("AC{n:04}"),
                api_key: "SK0001".into(),
                api_secret: "secret".into(),
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_reuses_credentials_within_ttl() {
        let source = Arc::new(CountingSource::default());
        let cache = CredentialCache::new(source.clone(), Duration::from_secs(60));

        let first = cache.get().await.unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;
        let second = cache.get().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reloads_after_ttl() {
        let source = Arc::new(CountingSource::default());
        let cache = CredentialCache::new(source.clone(), Duration::from_secs(60));

        let first = cache.get().await.unwrap();
        tokio::time::advance(Duration::from_secs(61)).await;
        let second = cache.get().await.unwrap();

        assert_eq!(first.account_sid, "AC0001");
        assert_eq!(second.account_sid, "AC0002");
        assert_eq!(source.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_reload_propagates_and_keeps_previous_value() {
        let source = Arc::new(CountingSource::default());
        let cache = CredentialCache::new(source.clone(), Duration::from_secs(60));

        cache.get().await.unwrap();
        tokio::time::advance(Duration::from_secs(61)).await;
        source.fail.store(true, Ordering::SeqCst);
        assert!(matches!(cache.get().await, Err(AppError::Credentials(_))));

        source.fail.store(false, Ordering::SeqCst);
        assert_eq!(cache.get().await.unwrap().account_sid, "AC0002");
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_one_load() {
        let source = Arc::new(CountingSource::default());
        let cache = Arc::new(CredentialCache::new(source.clone(), Duration::from_secs(60)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.get().await.unwrap() })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().account_sid, "AC0001");
        }
        assert_eq!(source.loads.load(Ordering::SeqCst), 1);
    }
}
