use std::time::Duration;

use tracing::{debug, info, warn};

use chirpy_db::{DocumentFile, Store, StoreError};
use chirpy_types::api::{LoginResponse, SortOrder, TokenKind, USER_UPGRADED_EVENT, UserResponse};
use chirpy_types::models::{Chirp, ChirpId, User, UserId};

use crate::config::Config;
use crate::error::{ApiError, AuthFailure};
use crate::filter::validate_chirp;
use crate::password::{PasswordError, hash_password, verify_password};
use crate::revocation::RevocationLedger;
use crate::tokens::{self, TokenError};

/// The auth and content workflows. Each public method touches the store at
/// most once per logical step, through a single critical section.
pub struct ChirpyService {
    store: Store,
    revocations: RevocationLedger,
    jwt_secret: String,
    polka_key: String,
    io_timeout: Duration,
}

impl ChirpyService {
    pub fn new(
        store: Store,
        jwt_secret: impl Into<String>,
        polka_key: impl Into<String>,
        io_timeout: Duration,
    ) -> Self {
        Self {
            revocations: RevocationLedger::new(store.clone(), io_timeout),
            store,
            jwt_secret: jwt_secret.into(),
            polka_key: polka_key.into(),
            io_timeout,
        }
    }

    pub fn from_config(store: Store, config: &Config) -> Self {
        Self::new(
            store,
            config.jwt_secret.clone(),
            config.polka_key.clone(),
            config.io_timeout,
        )
    }

    async fn store_call<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&DocumentFile) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        self.store.run(self.io_timeout, f).await
    }

    // -- Tokens --

    /// Validate an access token and return the user id it was issued for.
    pub fn authenticate(&self, access_token: &str) -> Result<UserId, ApiError> {
        let user_id = tokens::validate(access_token, &self.jwt_secret, TokenKind::Access)
            .and_then(|subject| tokens::parse_user_id(&subject))
            .inspect_err(|e| log_token_failure(TokenKind::Access, e))?;
        Ok(user_id)
    }

    // -- Users --

    pub async fn create_user(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let hashed = hash_blocking(password).await?;
        let email = email.to_string();
        let user = self
            .store_call(move |file| file.create_user(&email, &hashed))
            .await?;
        info!("User {} signed up", user.id);
        Ok(user)
    }

    /// Overwrite email and password. The password is re-hashed even if unchanged.
    pub async fn update_user(
        &self,
        access_token: &str,
        email: &str,
        password: &str,
    ) -> Result<User, ApiError> {
        let user_id = self.authenticate(access_token)?;
        let hashed = hash_blocking(password).await?;
        let email = email.to_string();
        let user = self
            .store_call(move |file| file.update_user(user_id, &email, &hashed))
            .await?;
        info!("User {} updated their profile", user.id);
        Ok(user)
    }

    /// Check the payment provider's key before anything in its request is trusted.
    pub fn verify_api_key(&self, api_key: &str) -> Result<(), ApiError> {
        if api_key != self.polka_key {
            warn!("Webhook rejected: bad API key");
            return Err(AuthFailure::InvalidApiKey.into());
        }
        Ok(())
    }

    /// Handle a payment-provider webhook. Unknown events are acknowledged and ignored.
    pub async fn upgrade_user(
        &self,
        api_key: &str,
        event: &str,
        user_id: UserId,
    ) -> Result<(), ApiError> {
        self.verify_api_key(api_key)?;
        if event != USER_UPGRADED_EVENT {
            debug!("Ignoring webhook event {:?}", event);
            return Ok(());
        }

        self.store_call(move |file| file.upgrade_user(user_id))
            .await?;
        info!("User {} upgraded to Chirpy Red", user_id);
        Ok(())
    }

    // -- Sessions --

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let lookup = email.to_string();
        let user = self
            .store_call(move |file| file.get_user_by_email(&lookup))
            .await?
            .ok_or(AuthFailure::InvalidCredentials)?;

        verify_blocking(password, &user.hashed_password).await?;

        let token = tokens::issue(
            user.id,
            &self.jwt_secret,
            tokens::access_token_ttl(),
            TokenKind::Access,
        )?;
        let refresh_token = tokens::issue(
            user.id,
            &self.jwt_secret,
            tokens::refresh_token_ttl(),
            TokenKind::Refresh,
        )?;

        info!("User {} logged in", user.id);
        Ok(LoginResponse {
            user: UserResponse::from(user),
            token,
            refresh_token,
        })
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// The ledger is consulted before the token is validated, so a revoked token
    /// is refused the same way whether or not its signature still checks out.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, ApiError> {
        if self.revocations.is_revoked(refresh_token).await? {
            debug!("Refresh refused: token is revoked");
            return Err(AuthFailure::Revoked.into());
        }

        let token = tokens::rotate(refresh_token, &self.jwt_secret)
            .inspect_err(|e| log_token_failure(TokenKind::Refresh, e))?;
        Ok(token)
    }

    /// Revoke a refresh token. Whoever holds the token may revoke it.
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), ApiError> {
        self.revocations.revoke(refresh_token).await?;
        Ok(())
    }

    // -- Chirps --

    pub async fn create_chirp(&self, access_token: &str, body: &str) -> Result<Chirp, ApiError> {
        let author_id = self.authenticate(access_token)?;
        let cleaned = validate_chirp(body)?;
        let chirp = self
            .store_call(move |file| file.create_chirp(author_id, &cleaned))
            .await?;
        Ok(chirp)
    }

    pub async fn get_chirp(&self, id: ChirpId) -> Result<Chirp, ApiError> {
        self.store_call(move |file| file.get_chirp(id))
            .await?
            .ok_or_else(|| ApiError::NotFound("Couldn't get chirp".into()))
    }

    pub async fn list_chirps(
        &self,
        author_id: Option<UserId>,
        sort: SortOrder,
    ) -> Result<Vec<Chirp>, ApiError> {
        let mut chirps = self.store_call(|file| file.get_chirps()).await?;
        if let Some(author_id) = author_id {
            chirps.retain(|c| c.author_id == author_id);
        }
        match sort {
            SortOrder::Asc => chirps.sort_by_key(|c| c.id),
            SortOrder::Desc => chirps.sort_by(|a, b| b.id.cmp(&a.id)),
        }
        Ok(chirps)
    }

    /// Delete a chirp written by the caller. Someone else's chirp is `Forbidden`.
    pub async fn delete_chirp(&self, access_token: &str, id: ChirpId) -> Result<(), ApiError> {
        let user_id = self.authenticate(access_token)?;
        self.store_call(move |file| file.delete_chirp_by_author(id, user_id))
            .await?;
        info!("User {} deleted chirp {}", user_id, id);
        Ok(())
    }

    // -- Admin --

    pub async fn reset(&self) -> Result<(), ApiError> {
        self.store_call(|file| file.reset()).await?;
        Ok(())
    }
}

fn log_token_failure(kind: TokenKind, err: &TokenError) {
    match err {
        TokenError::Malformed => debug!("Rejected {} token: malformed", kind),
        TokenError::BadSignature => debug!("Rejected {} token: bad signature", kind),
        TokenError::Expired => debug!("Rejected {} token: expired", kind),
        TokenError::WrongKind { found, .. } => {
            debug!("Rejected {} token: presented a {} token", kind, found)
        }
        TokenError::Signing(e) => warn!("Signing {} token failed: {}", kind, e),
    }
}

async fn hash_blocking(password: &str) -> Result<String, ApiError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("hashing task failed: {e}")))?
        .map_err(|e| ApiError::Internal(e.to_string()))
}

async fn verify_blocking(password: &str, hash: &str) -> Result<(), ApiError> {
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::Internal(format!("verify task failed: {e}")))?
        .map_err(|e| match e {
            PasswordError::Mismatch => AuthFailure::InvalidCredentials.into(),
            PasswordError::Hash(msg) => ApiError::Internal(msg),
        })
}
