use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::warn;

use crate::domain::users::normalize_email;
use crate::domain::verification::{PendingRegistration, VerificationFailure};

/// Generate a six-digit numeric verification code.
pub fn generate_code() -> String {
    let n = 100_000 + rand::random::<u32>() % 900_000;
    n.to_string()
}

struct Entry {
    code: String,
    registration: PendingRegistration,
    expires_at: Instant,
}

/// Pending registrations keyed by email, each with its code and a deadline.
/// Issuing a new code for the same email replaces the previous one.
#[derive(Clone)]
pub struct VerificationCodeStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    ttl: Duration,
}

impl VerificationCodeStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Store a registration under a freshly generated code and return the code.
    pub fn issue(&self, registration: PendingRegistration) -> String {
        let code = generate_code();
        self.insert_at(registration, code.clone(), Instant::now());
        code
    }

    fn insert_at(&self, registration: PendingRegistration, code: String, now: Instant) {
        let key = normalize_email(&registration.email);
        let entry = Entry {
            code,
            registration,
            expires_at: now + self.ttl,
        };
        self.lock().insert(key, entry);
    }

    /// Consume the pending registration if `code` matches and has not expired.
    /// A wrong code leaves the entry in place so the user can retry.
    pub fn verify(
        &self,
        email: &str,
        code: &str,
    ) -> Result<PendingRegistration, VerificationFailure> {
        self.verify_at(email, code, Instant::now())
    }

    fn verify_at(
        &self,
        email: &str,
        code: &str,
        now: Instant,
    ) -> Result<PendingRegistration, VerificationFailure> {
        let key = normalize_email(email);
        let mut entries = self.lock();

        let Some(entry) = entries.get(&key) else {
            return Err(VerificationFailure::Missing);
        };
        if entry.expires_at <= now {
            entries.remove(&key);
            return Err(VerificationFailure::Missing);
        }
        if entry.code != code.trim() {
            return Err(VerificationFailure::Mismatch);
        }

        entries
            .remove(&key)
            .map(|e| e.registration)
            .ok_or(VerificationFailure::Missing)
    }

    /// Drop expired entries; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    fn purge_expired_at(&self, now: Instant) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("verification store mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}
