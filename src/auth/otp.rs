use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::Rng;
use tokio::sync::RwLock;

use crate::error::{invalid_code_error, Error};

pub const CODE_LENGTH: usize = 6;

/// One-time verification codes keyed by phone number.
///
/// At most one code is live per phone. Issuing replaces the previous code,
/// a successful validation consumes it, and a failed validation leaves it in
/// place so the user can retry.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn issue(&self, phone: &str) -> String;
    async fn validate(&self, phone: &str, code: &str) -> Result<(), Error>;
}

/// Six independent uniform decimal digits, leading zeros kept.
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

#[derive(Debug)]
struct Entry {
    code: String,
    issued_at: Instant,
}

impl Entry {
    fn is_expired(&self, ttl: Option<Duration>) -> bool {
        ttl.map_or(false, |ttl| self.issued_at.elapsed() >= ttl)
    }
}

#[derive(Debug)]
pub struct MemoryCredentialStore {
    ttl: Option<Duration>,
    codes: RwLock<HashMap<String, Entry>>,
}

impl MemoryCredentialStore {
    /// `ttl` of `None` keeps codes until they are used or replaced.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            ttl,
            codes: RwLock::new(HashMap::new()),
        }
    }

    /// Drops every expired entry, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut codes = self.codes.write().await;
        let before = codes.len();
        codes.retain(|_, entry| !entry.is_expired(self.ttl));
        before - codes.len()
    }

    pub async fn len(&self) -> usize {
        self.codes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.codes.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    #[tracing::instrument(skip(self))]
    async fn issue(&self, phone: &str) -> String {
        let code = generate_code(&mut rand::thread_rng());

        let previous = self.codes.write().await.insert(
            phone.to_string(),
            Entry {
                code: code.clone(),
                issued_at: Instant::now(),
            },
        );

        if previous.is_some() {
            tracing::debug!("replaced previously issued code");
        }

        code
    }

    #[tracing::instrument(skip(self, code))]
    async fn validate(&self, phone: &str, code: &str) -> Result<(), Error> {
        // check and consume under one write lock
        let mut codes = self.codes.write().await;
        let expired = match codes.get(phone) {
            Some(entry) if entry.code == code => entry.is_expired(self.ttl),
            _ => return Err(invalid_code_error()),
        };

        if expired {
            codes.remove(phone);
            tracing::info!("expired code presented");
            return Err(invalid_code_error());
        }

        codes.remove(phone);
        tracing::info!("code verified");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::sync::Arc;

    const PHONE: &str = "+231770000001";

    #[test]
    fn codes_are_six_zero_padded_digits() {
        let mut rng = StdRng::seed_from_u64(7);
        let codes: Vec<String> = (0..2000).map(|_| generate_code(&mut rng)).collect();

        assert!(codes
            .iter()
            .all(|c| c.len() == CODE_LENGTH && c.chars().all(|ch| ch.is_ascii_digit())));
        assert!(codes.iter().any(|c| c.starts_with('0')));
    }

    #[tokio::test]
    async fn issued_code_validates_exactly_once() {
        let store = MemoryCredentialStore::new(None);
        let code = store.issue(PHONE).await;

        assert!(store.validate(PHONE, &code).await.is_ok());

        let err = store.validate(PHONE, &code).await.unwrap_err();
        assert!(err.is_invalid_code_error());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn reissue_invalidates_previous_code() {
        let store = MemoryCredentialStore::new(None);
        let first = store.issue(PHONE).await;
        let mut second = store.issue(PHONE).await;

        // a 1 in 10^6 collision would make the first code valid again
        while second == first {
            second = store.issue(PHONE).await;
        }

        assert!(store.validate(PHONE, &first).await.is_err());
        assert!(store.validate(PHONE, &second).await.is_ok());
    }

    #[tokio::test]
    async fn wrong_code_leaves_entry_for_retry() {
        let store = MemoryCredentialStore::new(None);
        let code = store.issue(PHONE).await;
        let wrong = if code == "000000" { "000001" } else { "000000" };

        assert!(store.validate(PHONE, wrong).await.is_err());
        assert_eq!(store.len().await, 1);
        assert!(store.validate(PHONE, &code).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_phone_and_wrong_code_are_indistinguishable() {
        let store = MemoryCredentialStore::new(None);
        let code = store.issue(PHONE).await;
        let wrong = if code == "123456" { "654321" } else { "123456" };

        let unknown = store.validate("+231779999999", &code).await.unwrap_err();
        let mismatch = store.validate(PHONE, wrong).await.unwrap_err();

        assert_eq!(unknown, mismatch);
    }

    #[tokio::test]
    async fn codes_are_bound_to_their_phone() {
        let store = MemoryCredentialStore::new(None);
        let a = store.issue("+231770000001").await;
        let b = store.issue("+231770000002").await;

        assert!(store.validate("+231770000002", &b).await.is_ok());
        assert!(store.validate("+231770000001", &a).await.is_ok());
    }

    #[tokio::test]
    async fn expired_code_is_rejected_and_removed() {
        let store = MemoryCredentialStore::new(Some(Duration::from_millis(100)));
        let code = store.issue(PHONE).await;

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(store.validate(PHONE, &code).await.is_err());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn purge_drops_only_expired_entries() {
        let store = MemoryCredentialStore::new(Some(Duration::from_millis(100)));
        store.issue("+231770000001").await;
        tokio::time::sleep(Duration::from_millis(150)).await;
        let fresh = store.issue("+231770000002").await;

        assert_eq!(store.purge_expired().await, 1);
        assert!(store.validate("+231770000002", &fresh).await.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_validations_consume_once() {
        let store = Arc::new(MemoryCredentialStore::new(None));
        let code = store.issue(PHONE).await;

        let attempts: Vec<_> = (0..32)
            .map(|_| {
                let store = store.clone();
                let code = code.clone();
                tokio::spawn(async move { store.validate(PHONE, &code).await.is_ok() })
            })
            .collect();

        let mut successes = 0;
        for attempt in attempts {
            if attempt.await.unwrap() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_wrong_codes_do_not_disturb_the_right_one() {
        let store = Arc::new(MemoryCredentialStore::new(None));
        let code = store.issue(PHONE).await;
        let wrong = if code == "999999" { "111111" } else { "999999" };

        let attempts: Vec<_> = (0..32)
            .map(|i| {
                let store = store.clone();
                let guess = if i % 4 == 0 { code.clone() } else { wrong.to_string() };
                tokio::spawn(async move { store.validate(PHONE, &guess).await.is_ok() })
            })
            .collect();

        let mut successes = 0;
        for attempt in attempts {
            if attempt.await.unwrap() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
        assert!(store.is_empty().await);
    }
}
