use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use crate::auth::extract_token;
use crate::auth::identity::IdentityClaims;
use crate::entities::{Role, user};
use crate::error::AppError;
use crate::state::AppState;

/// Caller holding a valid identity token, whether or not a local account exists yet.
///
/// Used by first-login account creation and image uploads.
#[derive(Debug, Clone)]
pub struct IdentityUser(pub IdentityClaims);

impl FromRequestParts<AppState> for IdentityUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("Not authorized.".to_string()))?;

        let claims = state.identity.verify_token(token).await.map_err(|e| {
            tracing::debug!("Identity token rejected: {e:#}");
            AppError::Unauthorized("Not authorized.".to_string())
        })?;

        Ok(Self(claims))
    }
}

/// Authenticated caller with a local user row, looked up by token email.
///
/// ```ignore
/// async fn handler(AuthUser(user): AuthUser) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let IdentityUser(claims) = IdentityUser::from_request_parts(parts, state).await?;

        let user_model = user::Entity::find()
            .filter(user::Column::Email.eq(claims.email.to_lowercase()))
            .one(&state.db)
            .await
            .map_err(|e| AppError::Internal(e.into()))?
            .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

        Ok(Self(user_model))
    }
}

async fn require_roles(
    parts: &mut Parts,
    state: &AppState,
    allowed: &[Role],
    denied: &str,
) -> Result<user::Model, AppError> {
    let AuthUser(user_model) = AuthUser::from_request_parts(parts, state).await?;

    let role = Role::from_str(&user_model.role);
    if role.is_none_or(|r| !allowed.contains(&r)) {
        return Err(AppError::Forbidden(denied.to_string()));
    }

    Ok(user_model)
}

/// Requires the `sysadmin` role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub user::Model);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_roles(
            parts,
            state,
            &[Role::Sysadmin],
            "Access denied. Admin resource.",
        )
        .await
        .map(Self)
    }
}

/// Requires the `referent` role.
#[derive(Debug, Clone)]
pub struct ReferentUser(pub user::Model);

impl FromRequestParts<AppState> for ReferentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_roles(
            parts,
            state,
            &[Role::Referent],
            "Access denied. Referent resource.",
        )
        .await
        .map(Self)
    }
}

/// Requires either `sysadmin` or `referent`.
#[derive(Debug, Clone)]
pub struct AdminOrReferentUser(pub user::Model);

impl FromRequestParts<AppState> for AdminOrReferentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_roles(
            parts,
            state,
            &[Role::Sysadmin, Role::Referent],
            "Access denied. Admin and Referent resource.",
        )
        .await
        .map(Self)
    }
}

/// Requires the `customer` role.
#[derive(Debug, Clone)]
pub struct CustomerUser(pub user::Model);

impl FromRequestParts<AppState> for CustomerUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_roles(
            parts,
            state,
            &[Role::Customer],
            "Access denied. Customer resource.",
        )
        .await
        .map(Self)
    }
}
