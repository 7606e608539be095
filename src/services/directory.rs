// SPDX-License-Identifier: MIT

//! User directory: resolve identity claims to an application account.

use crate::db::sqlite::NewUser;
use crate::db::Db;
use crate::error::{AppError, Result};
use crate::models::User;
use crate::services::hca::IdentityClaims;

/// Create or update the account for a set of identity claims.
///
/// Resolution order:
/// 1. by external id - refresh mutable profile fields;
/// 2. by email - attach the external id to a pre-provider account
///    (migration path);
/// 3. insert a fresh account with role `user`.
///
/// The unique constraint on external_id makes concurrent first logins
/// safe: the loser of an insert race gets `AppError::Conflict`.
pub async fn upsert_from_identity(db: &Db, claims: &IdentityClaims) -> Result<User> {
    if let Some(existing) = db.get_user_by_external_id(&claims.external_id).await? {
        // Phone is only overwritten when the provider supplies one.
        let phone = claims.phone.as_deref().or(existing.phone.as_deref());
        let user = db
            .update_user_profile(
                existing.id,
                &claims.name,
                &claims.email,
                phone,
                claims.slack_id.as_deref(),
            )
            .await?;
        return Ok(user);
    }

    if let Some(existing) = db.get_user_by_email(&claims.email).await? {
        if existing.external_id.is_some() {
            // Same email, different subject id: refuse rather than steal
            // the account.
            return Err(AppError::Conflict(format!(
                "Email {} already linked to another identity",
                claims.email
            )));
        }
        tracing::info!(user_id = existing.id, "Linking existing account to identity");
        let user = db
            .attach_external_id(existing.id, &claims.external_id)
            .await?;
        return Ok(user);
    }

    let user = db
        .insert_user(&NewUser {
            external_id: Some(claims.external_id.clone()),
            email: claims.email.clone(),
            name: claims.name.clone(),
            phone: claims.phone.clone(),
            slack_id: claims.slack_id.clone(),
        })
        .await?;

    tracing::info!(user_id = user.id, "Registered new user");
    Ok(user)
}
