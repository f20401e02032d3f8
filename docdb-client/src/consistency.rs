//! Effective consistency resolution.
//!
//! The consistency level an operation runs with comes from the first of three
//! sources that has a value:
//!
//! 1. the request's own override ([`RequestOptions`](crate::RequestOptions)),
//! 2. the client-level configuration ([`ClientOptions`](crate::ClientOptions)),
//! 3. the account default, fetched through an [`AccountConsistencyProvider`].
//!
//! The account lookup is the only suspending step and only runs when neither
//! of the first two sources has a value.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::handler::BoxFuture;
use crate::{CancellationToken, ClientError, RequestMessage};

/// Strength of the read/write guarantee requested for an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsistencyLevel {
    Strong,
    BoundedStaleness,
    Session,
    Eventual,
    ConsistentPrefix,
}

impl ConsistencyLevel {
    /// Get the string representation of this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsistencyLevel::Strong => "Strong",
            ConsistencyLevel::BoundedStaleness => "BoundedStaleness",
            ConsistencyLevel::Session => "Session",
            ConsistencyLevel::Eventual => "Eventual",
            ConsistencyLevel::ConsistentPrefix => "ConsistentPrefix",
        }
    }
}

impl std::fmt::Display for ConsistencyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a resolved consistency level came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsistencySource {
    Request,
    Client,
    Account,
}

/// Looks up the account's default consistency level.
pub trait AccountConsistencyProvider: Send + Sync {
    /// Fetch the account default. `None` means the account reports no level.
    fn account_consistency<'a>(
        &'a self,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Option<ConsistencyLevel>, ClientError>>;
}

impl<P> AccountConsistencyProvider for Arc<P>
where
    P: AccountConsistencyProvider + ?Sized,
{
    fn account_consistency<'a>(
        &'a self,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Option<ConsistencyLevel>, ClientError>> {
        (**self).account_consistency(cancel)
    }
}

/// An account provider with a fixed answer.
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticAccountConsistency(pub Option<ConsistencyLevel>);

impl AccountConsistencyProvider for StaticAccountConsistency {
    fn account_consistency<'a>(
        &'a self,
        _cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Option<ConsistencyLevel>, ClientError>> {
        let level = self.0;
        Box::pin(async move { Ok(level) })
    }
}

/// Remembers the first successful account lookup.
///
/// Failed lookups are not cached; the next call tries again.
pub struct CachedAccountConsistency<P> {
    inner: P,
    cached: OnceCell<Option<ConsistencyLevel>>,
}

impl<P> CachedAccountConsistency<P>
where
    P: AccountConsistencyProvider,
{
    /// Wrap `inner`.
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cached: OnceCell::new(),
        }
    }

    /// The cached account level, if a lookup has succeeded.
    pub fn cached(&self) -> Option<Option<ConsistencyLevel>> {
        self.cached.get().copied()
    }
}

impl<P> AccountConsistencyProvider for CachedAccountConsistency<P>
where
    P: AccountConsistencyProvider,
{
    fn account_consistency<'a>(
        &'a self,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Option<ConsistencyLevel>, ClientError>> {
        Box::pin(async move {
            self.cached
                .get_or_try_init(|| self.inner.account_consistency(cancel))
                .await
                .copied()
        })
    }
}

impl<P> std::fmt::Debug for CachedAccountConsistency<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedAccountConsistency")
            .field("cached", &self.cached.get())
            .finish_non_exhaustive()
    }
}

/// Resolves the effective consistency level of a request.
#[derive(Clone)]
pub struct ConsistencyResolver {
    client_level: Option<ConsistencyLevel>,
    account: Arc<dyn AccountConsistencyProvider>,
}

impl ConsistencyResolver {
    /// Create a resolver from the client-level value and an account provider.
    pub fn new<P>(client_level: Option<ConsistencyLevel>, account: P) -> Self
    where
        P: AccountConsistencyProvider + 'static,
    {
        Self {
            client_level,
            account: Arc::new(account),
        }
    }

    /// The client-level consistency, if configured.
    pub fn client_level(&self) -> Option<ConsistencyLevel> {
        self.client_level
    }

    /// Resolve the effective level for `request`.
    pub async fn resolve(
        &self,
        request: &RequestMessage,
        cancel: &CancellationToken,
    ) -> Result<Option<ConsistencyLevel>, ClientError> {
        Ok(self
            .resolve_with_source(request, cancel)
            .await?
            .map(|(level, _)| level))
    }

    /// Resolve the effective level and report which source supplied it.
    ///
    /// Sources are consulted in order and the first one with a value wins;
    /// later sources are not consulted at all.
    pub async fn resolve_with_source(
        &self,
        request: &RequestMessage,
        cancel: &CancellationToken,
    ) -> Result<Option<(ConsistencyLevel, ConsistencySource)>, ClientError> {
        if let Some(level) = request.options().get_consistency_level() {
            tracing::trace!(%level, "using request-level consistency");
            return Ok(Some((level, ConsistencySource::Request)));
        }

        if let Some(level) = self.client_level {
            tracing::trace!(%level, "using client-level consistency");
            return Ok(Some((level, ConsistencySource::Client)));
        }

        let level = cancel
            .run_until_cancelled(self.account.account_consistency(cancel))
            .await??;
        tracing::trace!(level = ?level, "using account-level consistency");
        Ok(level.map(|level| (level, ConsistencySource::Account)))
    }
}

impl std::fmt::Debug for ConsistencyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsistencyResolver")
            .field("client_level", &self.client_level)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::{OperationType, RequestOptions, ResourceType};

    /// Account provider that counts lookups and returns a fixed answer.
    struct CountingAccount {
        level: Option<ConsistencyLevel>,
        calls: AtomicUsize,
    }

    impl CountingAccount {
        fn new(level: Option<ConsistencyLevel>) -> Arc<Self> {
            Arc::new(Self {
                level,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl AccountConsistencyProvider for CountingAccount {
        fn account_consistency<'a>(
            &'a self,
            _cancel: &'a CancellationToken,
        ) -> BoxFuture<'a, Result<Option<ConsistencyLevel>, ClientError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let level = self.level;
            Box::pin(async move { Ok(level) })
        }
    }

    struct FailingAccount;

    impl AccountConsistencyProvider for FailingAccount {
        fn account_consistency<'a>(
            &'a self,
            _cancel: &'a CancellationToken,
        ) -> BoxFuture<'a, Result<Option<ConsistencyLevel>, ClientError>> {
            Box::pin(async { Err(ClientError::Transport("account unreachable".into())) })
        }
    }

    fn request(override_level: Option<ConsistencyLevel>) -> RequestMessage {
        let mut options = RequestOptions::new();
        if let Some(level) = override_level {
            options = options.consistency_level(level);
        }
        RequestMessage::new(ResourceType::Item, OperationType::Read, "db", "c").with_options(options)
    }

    #[tokio::test]
    async fn test_request_level_wins() {
        let account = CountingAccount::new(Some(ConsistencyLevel::Eventual));
        let resolver = ConsistencyResolver::new(Some(ConsistencyLevel::Session), account.clone());

        let resolved = resolver
            .resolve_with_source(&request(Some(ConsistencyLevel::Strong)), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(resolved, Some((ConsistencyLevel::Strong, ConsistencySource::Request)));
        assert_eq!(account.calls(), 0);
    }

    #[tokio::test]
    async fn test_client_level_when_no_override() {
        let account = CountingAccount::new(Some(ConsistencyLevel::Eventual));
        let resolver = ConsistencyResolver::new(Some(ConsistencyLevel::Session), account.clone());

        let resolved = resolver
            .resolve_with_source(&request(None), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(resolved, Some((ConsistencyLevel::Session, ConsistencySource::Client)));
        assert_eq!(account.calls(), 0);
    }

    #[tokio::test]
    async fn test_account_level_fallback() {
        let account = CountingAccount::new(Some(ConsistencyLevel::Eventual));
        let resolver = ConsistencyResolver::new(None, account.clone());

        let resolved = resolver
            .resolve(&request(None), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(resolved, Some(ConsistencyLevel::Eventual));
        assert_eq!(account.calls(), 1);
    }

    #[tokio::test]
    async fn test_account_level_absent() {
        let resolver = ConsistencyResolver::new(None, StaticAccountConsistency(None));
        let resolved = resolver
            .resolve(&request(None), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(resolved, None);
    }

    #[tokio::test]
    async fn test_account_failure_propagates() {
        let resolver = ConsistencyResolver::new(None, FailingAccount);
        let err = resolver
            .resolve(&request(None), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }

    #[tokio::test]
    async fn test_cancelled_account_lookup() {
        let resolver = ConsistencyResolver::new(None, StaticAccountConsistency(None));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = resolver.resolve(&request(None), &cancel).await.unwrap_err();
        assert!(err.is_canceled());
    }

    #[tokio::test]
    async fn test_cached_account_lookup_runs_once() {
        let account = CountingAccount::new(Some(ConsistencyLevel::ConsistentPrefix));
        let cached = CachedAccountConsistency::new(account.clone());
        let cancel = CancellationToken::new();

        assert_eq!(cached.cached(), None);
        for _ in 0..3 {
            let level = cached.account_consistency(&cancel).await.unwrap();
            assert_eq!(level, Some(ConsistencyLevel::ConsistentPrefix));
        }

        assert_eq!(account.calls(), 1);
        assert_eq!(cached.cached(), Some(Some(ConsistencyLevel::ConsistentPrefix)));
    }

    #[tokio::test]
    async fn test_cached_account_does_not_cache_failures() {
        let cached = CachedAccountConsistency::new(FailingAccount);
        let cancel = CancellationToken::new();
        assert!(cached.account_consistency(&cancel).await.is_err());
        assert_eq!(cached.cached(), None);
    }
}
