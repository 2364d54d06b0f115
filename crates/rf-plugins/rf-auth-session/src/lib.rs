//! # rf-auth-session
//!
//! Session-backed implementation of `AuthProvider`: whoever the surrounding
//! shell signed in is the current account until sign-out. Credential
//! verification and registration belong to the external identity service,
//! not to this adapter.

use std::sync::RwLock;

use rf_core::traits::{Account, AuthProvider};
use tracing::debug;

#[derive(Default)]
pub struct SessionAuthProvider {
    current: RwLock<Option<Account>>,
}

impl SessionAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session pre-signed-in; test and demo convenience.
    pub fn signed_in(account: Account) -> Self {
        Self {
            current: RwLock::new(Some(account)),
        }
    }

    pub fn sign_in(&self, account: Account) {
        debug!(account_id = %account.id, "session sign-in");
        *self.current.write().expect("session poisoned") = Some(account);
    }

    pub fn sign_out(&self) {
        debug!("session sign-out");
        *self.current.write().expect("session poisoned") = None;
    }
}

impl AuthProvider for SessionAuthProvider {
    fn current_account(&self) -> Option<Account> {
        self.current.read().expect("session poisoned").clone()
    }
}
