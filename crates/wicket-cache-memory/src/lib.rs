//! # wicket-cache-memory
//!
//! In-memory storage backend for the wicket OAuth engine.
//!
//! [`MemoryAuthCache`] keeps codes and tokens in sharded concurrent maps
//! and expires entries lazily: an expired entry is invisible from the
//! moment its deadline passes and is physically removed when next touched
//! or during a [`MemoryAuthCache::cleanup_expired`] sweep. There are no
//! per-entry timers, so idle entries cost nothing but memory.
//!
//! [`MemoryClientStore`] is the matching client registry.
//!
//! Suitable for single-process deployments and tests; state does not
//! survive a restart.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use time::OffsetDateTime;

use wicket_oauth::store::{AuthCache, CacheError, ClientStore, CodeEntry, TokenEntry};
use wicket_oauth::types::Client;

struct Timed<T> {
    value: T,
    /// `None` means the entry never expires.
    expires_at: Option<OffsetDateTime>,
}

impl<T> Timed<T> {
    fn expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Concurrent in-memory code and token cache with TTL semantics.
#[derive(Default)]
pub struct MemoryAuthCache {
    codes: DashMap<String, Timed<CodeEntry>>,
    tokens: DashMap<String, Timed<TokenEntry>>,
}

impl MemoryAuthCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every expired entry.
    ///
    /// Optional: lookups already treat expired entries as absent. Calling
    /// this periodically bounds memory held by entries nobody touches
    /// again.
    pub fn cleanup_expired(&self) {
        let now = OffsetDateTime::now_utc();
        let before = self.codes.len() + self.tokens.len();
        self.codes.retain(|_, entry| !entry.expired(now));
        self.tokens.retain(|_, entry| !entry.expired(now));
        let removed = before.saturating_sub(self.codes.len() + self.tokens.len());
        if removed > 0 {
            tracing::debug!(removed, "Swept expired cache entries");
        }
    }

    /// Number of live code entries, counting not-yet-swept expired ones.
    #[must_use]
    pub fn code_count(&self) -> usize {
        self.codes.len()
    }

    /// Number of live token entries, counting not-yet-swept expired ones.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }
}

#[async_trait]
impl AuthCache for MemoryAuthCache {
    async fn register_code(
        &self,
        code: &str,
        entry: CodeEntry,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        // Codes always expire; a zero TTL yields a code that is already
        // dead, which the exchange path reports as invalid_grant.
        let expires_at = Some(OffsetDateTime::now_utc() + ttl);
        self.codes
            .insert(code.to_string(), Timed { value: entry, expires_at });
        Ok(())
    }

    async fn register_token(
        &self,
        token: &str,
        entry: TokenEntry,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let expires_at = if ttl.is_zero() {
            None
        } else {
            Some(OffsetDateTime::now_utc() + ttl)
        };
        self.tokens
            .insert(token.to_string(), Timed { value: entry, expires_at });
        Ok(())
    }

    async fn take_code(&self, code: &str) -> Result<Option<CodeEntry>, CacheError> {
        // remove() is atomic per key, so concurrent exchanges of the same
        // code cannot both observe the entry.
        let now = OffsetDateTime::now_utc();
        Ok(self
            .codes
            .remove(code)
            .and_then(|(_, entry)| (!entry.expired(now)).then_some(entry.value)))
    }

    async fn lookup_token(&self, token: &str) -> Result<bool, CacheError> {
        let now = OffsetDateTime::now_utc();
        let live = match self.tokens.get(token) {
            Some(entry) => !entry.expired(now),
            None => return Ok(false),
        };
        if !live {
            // Guard dropped above; removing under it would deadlock the
            // shard.
            self.tokens.remove(token);
        }
        Ok(live)
    }
}

/// Concurrent in-memory client registry.
#[derive(Default)]
pub struct MemoryClientStore {
    clients: DashMap<String, Client>,
}

impl MemoryClientStore {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a client, replacing any previous registration with the
    /// same id.
    pub fn add_client(&self, client: Client) {
        self.clients.insert(client.client_id.clone(), client);
    }

    /// Removes a client registration.
    pub fn remove_client(&self, client_id: &str) {
        self.clients.remove(client_id);
    }
}

#[async_trait]
impl ClientStore for MemoryClientStore {
    async fn find_client(&self, client_id: &str) -> Result<Option<Client>, CacheError> {
        Ok(self.clients.get(client_id).map(|c| c.value().clone()))
    }
}
