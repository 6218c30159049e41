use chrono::{DateTime, Utc};
use tracing::debug;

use chirpy_types::models::{Chirp, ChirpId, RevocationRecord, User, UserId};

use crate::{DocumentFile, Result, StoreError};

impl DocumentFile {
    // -- Users --

    /// Insert a user. The email uniqueness check and the insert share one
    /// critical section, so two concurrent signups cannot both succeed.
    pub fn create_user(&self, email: &str, hashed_password: &str) -> Result<User> {
        self.with_document_mut(|doc| {
            if doc.user_by_email(email).is_some() {
                return Err(StoreError::AlreadyExists { entity: "user" });
            }

            let user = User {
                id: doc.allocate_user_id(),
                email: email.to_string(),
                hashed_password: hashed_password.to_string(),
                is_chirpy_red: false,
            };
            doc.users.insert(user.id, user.clone());
            debug!("Created user {}", user.id);
            Ok(user)
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.with_document(|doc| Ok(doc.user_by_email(email).cloned()))
    }

    pub fn update_user(&self, id: UserId, email: &str, hashed_password: &str) -> Result<User> {
        self.with_document_mut(|doc| {
            if doc.user_by_email(email).is_some_and(|other| other.id != id) {
                return Err(StoreError::AlreadyExists { entity: "user" });
            }

            let user = doc
                .users
                .get_mut(&id)
                .ok_or_else(|| StoreError::not_found("user", id))?;
            user.email = email.to_string();
            user.hashed_password = hashed_password.to_string();
            Ok(user.clone())
        })
    }

    /// Set the Chirpy Red flag. Upgrading an already upgraded user is a no-op.
    pub fn upgrade_user(&self, id: UserId) -> Result<User> {
        self.with_document_mut(|doc| {
            let user = doc
                .users
                .get_mut(&id)
                .ok_or_else(|| StoreError::not_found("user", id))?;
            user.is_chirpy_red = true;
            Ok(user.clone())
        })
    }

    // -- Chirps --

    pub fn create_chirp(&self, author_id: UserId, body: &str) -> Result<Chirp> {
        self.with_document_mut(|doc| {
            if !doc.users.contains_key(&author_id) {
                return Err(StoreError::not_found("user", author_id));
            }

            let chirp = Chirp {
                id: doc.allocate_chirp_id(),
                author_id,
                body: body.to_string(),
            };
            doc.chirps.insert(chirp.id, chirp.clone());
            debug!("Created chirp {} for user {}", chirp.id, author_id);
            Ok(chirp)
        })
    }

    pub fn get_chirp(&self, id: ChirpId) -> Result<Option<Chirp>> {
        self.with_document(|doc| Ok(doc.chirps.get(&id).cloned()))
    }

    /// All chirps, ascending by id.
    pub fn get_chirps(&self) -> Result<Vec<Chirp>> {
        self.with_document(|doc| Ok(doc.chirps.values().cloned().collect()))
    }

    /// Delete a chirp only if `author_id` wrote it. The ownership check and the
    /// removal happen in the same critical section.
    pub fn delete_chirp_by_author(&self, id: ChirpId, author_id: UserId) -> Result<Chirp> {
        self.with_document_mut(|doc| {
            let chirp = doc
                .chirps
                .get(&id)
                .ok_or_else(|| StoreError::not_found("chirp", id))?;
            if chirp.author_id != author_id {
                return Err(StoreError::AuthorMismatch { id });
            }
            doc.chirps
                .remove(&id)
                .ok_or_else(|| StoreError::not_found("chirp", id))
        })
    }

    // -- Revocations --

    /// Record `token` as revoked at `at`. Revoking twice overwrites the timestamp.
    pub fn revoke_token(&self, token: &str, at: DateTime<Utc>) -> Result<()> {
        self.with_document_mut(|doc| {
            doc.revocations
                .insert(token.to_string(), RevocationRecord::new(token, at));
            Ok(())
        })
    }

    pub fn is_token_revoked(&self, token: &str) -> Result<bool> {
        self.with_document(|doc| {
            Ok(doc
                .revocations
                .get(token)
                .is_some_and(RevocationRecord::is_active))
        })
    }
}
