/******************************************************************************
    Author: Joaquín Béjar García
    Email: jb@taunais.com
    Date: 14/5/25
 ******************************************************************************/
use crate::constants::{ACCESS_TOKEN_SLOT, REFRESH_TOKEN_SLOT, USER_PROFILE_SLOT};
use crate::error::AppError;
use crate::session::profile::UserProfile;
use crate::storage::slots::{MemoryStore, SlotStore};
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, error, warn};

/// Access/refresh token pair issued by the backend.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialPair {
    pub access: String,
    pub refresh: String,
}

impl CredentialPair {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }
}

impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access", &"[REDACTED]")
            .field("refresh", &"[REDACTED]")
            .finish()
    }
}

/// Owns the credential slots. The pair is either fully present or fully
/// absent; every multi-slot change happens under `write_lock`.
pub struct CredentialStore {
    slots: Box<dyn SlotStore>,
    write_lock: Mutex<()>,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}

impl CredentialStore {
    pub fn new(slots: Box<dyn SlotStore>) -> Self {
        Self {
            slots,
            write_lock: Mutex::new(()),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    fn guard(&self) -> Result<MutexGuard<'_, ()>, AppError> {
        self.write_lock
            .lock()
            .map_err(|_| AppError::Storage("credential lock poisoned".to_string()))
    }

    fn clear_locked(&self) -> Result<(), AppError> {
        self.slots.remove(ACCESS_TOKEN_SLOT)?;
        self.slots.remove(REFRESH_TOKEN_SLOT)?;
        self.slots.remove(USER_PROFILE_SLOT)?;
        Ok(())
    }

    /// The stored pair, or `None`. A half-present pair is cleared.
    pub fn credentials(&self) -> Result<Option<CredentialPair>, AppError> {
        let _guard = self.guard()?;
        let access = self.slots.get(ACCESS_TOKEN_SLOT)?;
        let refresh = self.slots.get(REFRESH_TOKEN_SLOT)?;
        match (access, refresh) {
            (Some(access), Some(refresh)) => Ok(Some(CredentialPair { access, refresh })),
            (None, None) => Ok(None),
            _ => {
                warn!("Found a partial credential pair, clearing it");
                self.clear_locked()?;
                Ok(None)
            }
        }
    }

    pub fn access_token(&self) -> Result<Option<String>, AppError> {
        self.slots.get(ACCESS_TOKEN_SLOT)
    }

    pub fn refresh_token(&self) -> Result<Option<String>, AppError> {
        self.slots.get(REFRESH_TOKEN_SLOT)
    }

    /// The profile snapshot. A corrupt snapshot drops the whole session.
    pub fn profile(&self) -> Result<Option<UserProfile>, AppError> {
        let _guard = self.guard()?;
        let Some(raw) = self.slots.get(USER_PROFILE_SLOT)? else {
            return Ok(None);
        };
        match serde_json::from_str::<UserProfile>(&raw) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                error!("Error parsing stored user profile: {e}");
                self.clear_locked()?;
                Ok(None)
            }
        }
    }

    /// Replaces only the profile snapshot, as long as a session exists.
    pub fn update_profile(&self, profile: &UserProfile) -> Result<bool, AppError> {
        let serialized = serde_json::to_string(profile)?;
        let _guard = self.guard()?;
        if self.slots.get(REFRESH_TOKEN_SLOT)?.is_none() {
            return Ok(false);
        }
        self.slots.set(USER_PROFILE_SLOT, &serialized)?;
        Ok(true)
    }

    /// Writes pair and profile together; on a failed write nothing is kept.
    pub fn store_login(&self, pair: &CredentialPair, profile: &UserProfile) -> Result<(), AppError> {
        let serialized = serde_json::to_string(profile)?;
        let _guard = self.guard()?;
        let written = self
            .slots
            .set(ACCESS_TOKEN_SLOT, &pair.access)
            .and_then(|_| self.slots.set(REFRESH_TOKEN_SLOT, &pair.refresh))
            .and_then(|_| self.slots.set(USER_PROFILE_SLOT, &serialized));
        if let Err(e) = written {
            error!("Failed to persist login, rolling back: {e}");
            if let Err(rollback) = self.clear_locked() {
                error!("Rollback after failed login write also failed: {rollback}");
            }
            return Err(e);
        }
        debug!("Stored credentials for {}", profile.username);
        Ok(())
    }

    /// Overwrites the access token. Returns `false` without writing when
    /// the pair was cleared in the meantime.
    pub fn replace_access_token(&self, access: &str) -> Result<bool, AppError> {
        let _guard = self.guard()?;
        if self.slots.get(REFRESH_TOKEN_SLOT)?.is_none() {
            return Ok(false);
        }
        self.slots.set(ACCESS_TOKEN_SLOT, access)?;
        Ok(true)
    }

    /// Overwrites both tokens at once. Same `false` contract as
    /// [`CredentialStore::replace_access_token`].
    pub fn replace_pair(&self, pair: &CredentialPair) -> Result<bool, AppError> {
        let _guard = self.guard()?;
        if self.slots.get(REFRESH_TOKEN_SLOT)?.is_none() {
            return Ok(false);
        }
        self.slots.set(ACCESS_TOKEN_SLOT, &pair.access)?;
        if let Err(e) = self.slots.set(REFRESH_TOKEN_SLOT, &pair.refresh) {
            error!("Failed to store rotated refresh token, clearing session: {e}");
            self.clear_locked()?;
            return Err(e);
        }
        Ok(true)
    }

    /// Removes tokens and profile. Idempotent.
    pub fn clear(&self) -> Result<(), AppError> {
        let _guard = self.guard()?;
        self.clear_locked()
    }
}

#[cfg(test)]
mod tests_credential_store {
    use super::*;
    use crate::storage::slots::FileStore;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::tempdir;

    /// Slot store that refuses to write one particular slot.
    struct FailingSlot {
        inner: MemoryStore,
        failing: &'static str,
    }

    impl SlotStore for FailingSlot {
        fn get(&self, slot: &str) -> Result<Option<String>, AppError> {
            self.inner.get(slot)
        }
        fn set(&self, slot: &str, value: &str) -> Result<(), AppError> {
            if slot == self.failing {
                return Err(AppError::Storage(format!("cannot write {slot}")));
            }
            self.inner.set(slot, value)
        }
        fn remove(&self, slot: &str) -> Result<(), AppError> {
            self.inner.remove(slot)
        }
    }

    #[test]
    fn test_store_login_and_clear() {
        let store = CredentialStore::in_memory();
        let pair = CredentialPair::new("a1", "r1");
        store.store_login(&pair, &UserProfile::new("ada")).unwrap();

        assert_eq!(store.credentials().unwrap(), Some(pair));
        assert_eq!(store.profile().unwrap().unwrap().username, "ada");

        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.credentials().unwrap(), None);
        assert_eq!(store.profile().unwrap(), None);
    }

    #[test]
    fn test_store_login_rolls_back_on_failed_write() {
        let store = CredentialStore::new(Box::new(FailingSlot {
            inner: MemoryStore::new(),
            failing: USER_PROFILE_SLOT,
        }));

        let result = store.store_login(&CredentialPair::new("a1", "r1"), &UserProfile::new("ada"));

        assert!(result.is_err());
        assert_eq!(store.access_token().unwrap(), None);
        assert_eq!(store.refresh_token().unwrap(), None);
    }

    #[test]
    fn test_partial_pair_is_cleared_on_read() {
        let slots = MemoryStore::new();
        slots.set(ACCESS_TOKEN_SLOT, "orphan").unwrap();
        let store = CredentialStore::new(Box::new(slots));

        assert_eq!(store.credentials().unwrap(), None);
        assert_eq!(store.access_token().unwrap(), None);
    }

    #[test]
    fn test_corrupt_profile_drops_session() {
        let slots = MemoryStore::new();
        slots.set(ACCESS_TOKEN_SLOT, "a1").unwrap();
        slots.set(REFRESH_TOKEN_SLOT, "r1").unwrap();
        slots.set(USER_PROFILE_SLOT, "{oops").unwrap();
        let store = CredentialStore::new(Box::new(slots));

        assert_eq!(store.profile().unwrap(), None);
        assert_eq!(store.credentials().unwrap(), None);
    }

    #[test]
    fn test_replace_access_token_requires_pair() {
        let store = CredentialStore::in_memory();
        assert!(!store.replace_access_token("a2").unwrap());
        assert_eq!(store.access_token().unwrap(), None);

        store
            .store_login(&CredentialPair::new("a1", "r1"), &UserProfile::new("ada"))
            .unwrap();
        assert!(store.replace_access_token("a2").unwrap());
        assert_eq!(
            store.credentials().unwrap(),
            Some(CredentialPair::new("a2", "r1"))
        );
    }

    #[test]
    fn test_replace_pair() {
        let store = CredentialStore::in_memory();
        store
            .store_login(&CredentialPair::new("a1", "r1"), &UserProfile::new("ada"))
            .unwrap();

        assert!(store.replace_pair(&CredentialPair::new("a2", "r2")).unwrap());
        assert_eq!(
            store.credentials().unwrap(),
            Some(CredentialPair::new("a2", "r2"))
        );
        assert_eq!(store.profile().unwrap().unwrap().username, "ada");
    }

    #[test]
    fn test_update_profile_only_with_session() {
        let store = CredentialStore::in_memory();
        let mut profile = UserProfile::new("ada");
        assert!(!store.update_profile(&profile).unwrap());

        store
            .store_login(&CredentialPair::new("a1", "r1"), &profile)
            .unwrap();
        profile.subscription_tier = "premium".to_string();
        assert!(store.update_profile(&profile).unwrap());
        assert_eq!(store.profile().unwrap().unwrap().subscription_tier, "premium");
    }

    #[test]
    fn test_concurrent_pair_replacement_never_mixes() {
        let store = Arc::new(CredentialStore::in_memory());
        store
            .store_login(&CredentialPair::new("a0", "r0"), &UserProfile::new("ada"))
            .unwrap();

        let handles: Vec<_> = (1..=8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        store
                            .replace_pair(&CredentialPair::new(format!("a{i}"), format!("r{i}")))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let pair = store.credentials().unwrap().unwrap();
        assert_eq!(pair.access.trim_start_matches('a'), pair.refresh.trim_start_matches('r'));
    }

    #[test]
    fn test_file_backed_session_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        {
            let store = CredentialStore::new(Box::new(FileStore::open(&path).unwrap()));
            store
                .store_login(&CredentialPair::new("a1", "r1"), &UserProfile::new("ada"))
                .unwrap();
        }

        let store = CredentialStore::new(Box::new(FileStore::open(&path).unwrap()));
        assert_eq!(
            store.credentials().unwrap(),
            Some(CredentialPair::new("a1", "r1"))
        );
        assert_eq!(store.profile().unwrap().unwrap().username, "ada");
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let rendered = format!("{:?}", CredentialPair::new("secret-a", "secret-r"));
        assert!(!rendered.contains("secret"));
    }
}
