use std::time::Duration;

use chrono::Utc;
use tracing::info;

use chirpy_db::{Store, StoreError};

/// Durable record of refresh tokens that may no longer be rotated.
///
/// Only the refresh path consults the ledger. An access token minted before its
/// refresh token was revoked stays valid until its own expiry.
#[derive(Clone)]
pub struct RevocationLedger {
    store: Store,
    io_timeout: Duration,
}

impl RevocationLedger {
    pub fn new(store: Store, io_timeout: Duration) -> Self {
        Self { store, io_timeout }
    }

    pub async fn revoke(&self, token: &str) -> Result<(), StoreError> {
        let token = token.to_string();
        self.store
            .run(self.io_timeout, move |file| file.revoke_token(&token, Utc::now()))
            .await?;
        info!("Refresh token revoked");
        Ok(())
    }

    pub async fn is_revoked(&self, token: &str) -> Result<bool, StoreError> {
        let token = token.to_string();
        self.store
            .run(self.io_timeout, move |file| file.is_token_revoked(&token))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn revoke_then_check() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(&dir.path().join("db.json")).unwrap();
        let ledger = RevocationLedger::new(store, Duration::from_secs(5));

        assert!(!ledger.is_revoked("tok").await.unwrap());
        ledger.revoke("tok").await.unwrap();
        assert!(ledger.is_revoked("tok").await.unwrap());

        // revoking again is harmless
        ledger.revoke("tok").await.unwrap();
        assert!(ledger.is_revoked("tok").await.unwrap());
    }

    #[tokio::test]
    async fn unreadable_store_is_an_error_not_a_clean_bill() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let store = Store::open(&path).unwrap();
        std::fs::write(&path, b"garbage").unwrap();

        let ledger = RevocationLedger::new(store, Duration::from_secs(5));
        assert!(matches!(
            ledger.is_revoked("tok").await,
            Err(StoreError::Decode { .. })
        ));
    }
}
