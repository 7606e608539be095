// SPDX-License-Identifier: MIT

//! OAuth state nonce store.
//!
//! A login attempt gets a single-use random state token; the OAuth
//! callback must present it back within the TTL. Consume is an atomic
//! check-and-delete so a state can never be accepted twice, even under
//! concurrent callbacks.
//!
//! This is a single-process map. Horizontally replicated deployments
//! would need an external expiring KV store instead.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use ring::rand::{SecureRandom, SystemRandom};

/// How long an issued state stays valid.
const STATE_TTL: Duration = Duration::from_secs(10 * 60);
/// How often the background sweeper runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);
/// Random bytes per state token (hex-encoded to 64 chars).
const STATE_BYTES: usize = 32;

/// Process-wide store of outstanding OAuth state nonces.
#[derive(Clone)]
pub struct AuthStateStore {
    states: Arc<DashMap<String, Instant>>,
    rng: SystemRandom,
    ttl: Duration,
}

impl Default for AuthStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthStateStore {
    pub fn new() -> Self {
        Self {
            states: Arc::new(DashMap::new()),
            rng: SystemRandom::new(),
            ttl: STATE_TTL,
        }
    }

    /// Store with a custom TTL (tests).
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            states: Arc::new(DashMap::new()),
            rng: SystemRandom::new(),
            ttl,
        }
    }

    /// Generate and record a fresh state token.
    pub fn issue(&self) -> anyhow::Result<String> {
        let mut bytes = [0u8; STATE_BYTES];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| anyhow::anyhow!("System RNG failure"))?;

        let token = hex::encode(bytes);
        self.states.insert(token.clone(), Instant::now());
        Ok(token)
    }

    /// Accept a state token at most once.
    ///
    /// Returns true iff the token was present and unexpired. The entry is
    /// removed either way, so a replayed token always fails.
    pub fn consume(&self, token: &str) -> bool {
        match self.states.remove(token) {
            Some((_, issued_at)) => issued_at.elapsed() <= self.ttl,
            None => false,
        }
    }

    /// Drop expired entries. Called on a timer; consume does not depend
    /// on it for correctness.
    pub fn sweep(&self) {
        let ttl = self.ttl;
        self.states.retain(|_, issued_at| issued_at.elapsed() <= ttl);
    }

    /// Number of outstanding states (tests / introspection).
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Spawn the periodic sweeper for this store.
    pub fn spawn_sweeper(&self) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            interval.tick().await; // first tick fires immediately
            loop {
                interval.tick().await;
                store.sweep();
                tracing::debug!(outstanding = store.len(), "Swept expired OAuth states");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_returns_unique_hex_tokens() {
        let store = AuthStateStore::new();
        let a = store.issue().unwrap();
        let b = store.issue().unwrap();

        assert_ne!(a, b);
        assert_eq!(a.len(), STATE_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_consume_is_single_use() {
        let store = AuthStateStore::new();
        let token = store.issue().unwrap();

        assert!(store.consume(&token));
        assert!(!store.consume(&token));
    }

    #[test]
    fn test_consume_unknown_token() {
        let store = AuthStateStore::new();
        assert!(!store.consume("deadbeef"));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let store = AuthStateStore::with_ttl(Duration::ZERO);
        let token = store.issue().unwrap();
        std::thread::sleep(Duration::from_millis(5));

        assert!(!store.consume(&token));
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let store = AuthStateStore::with_ttl(Duration::from_millis(10));
        let old = store.issue().unwrap();
        std::thread::sleep(Duration::from_millis(20));
        let fresh = store.issue().unwrap();

        store.sweep();

        assert_eq!(store.len(), 1);
        assert!(!store.consume(&old));
        assert!(store.consume(&fresh));
    }
}
