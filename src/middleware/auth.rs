//! Bearer token authentication middleware.
//!
//! This middleware intercepts every protected request to:
//! 1. Extract the token from the Authorization header
//! 2. Hash it and look up the owning staff member
//! 3. Inject the caller's identity into the request
//! 4. Reject unknown or revoked tokens with HTTP 401
//!
//! The attendance engine trusts this identity as given; the only further
//! check it makes is on `role`.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{error::AppError, models::staff::Role, state::AppState};

/// Identity of the authenticated caller.
///
/// Inserted into the request's extensions; handlers extract it with
/// `Extension<AuthContext>`. Name, employee ID and franchise are copied onto
/// attendance records at check-in.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub staff_id: Uuid,
    pub name: String,
    pub employee_id: String,
    pub franchise_id: Uuid,
    pub franchise_name: String,
    pub role: Role,
}

#[derive(Debug, sqlx::FromRow)]
struct TokenOwner {
    staff_id: Uuid,
    name: String,
    employee_id: String,
    franchise_id: Uuid,
    franchise_name: String,
    role: String,
}

/// SHA-256 of the raw token, hex encoded. Only hashes are stored.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Authentication middleware function.
///
/// # Flow
///
/// 1. Extract `Authorization: Bearer <token>`
/// 2. Hash `<token>` with SHA-256
/// 3. Join `staff_tokens` to `staff` on the hash where the token is active
/// 4. If found: inject `AuthContext`, call next handler
/// 5. If not found: return 401
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(AppError::InvalidToken)?;

    let owner = sqlx::query_as::<_, TokenOwner>(
        r#"
        SELECT s.id AS staff_id, s.name, s.employee_id, s.franchise_id, s.franchise_name, s.role
        FROM staff_tokens t
        JOIN staff s ON s.id = t.staff_id
        WHERE t.token_hash = $1 AND t.is_active = true
        "#,
    )
    .bind(hash_token(token))
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::InvalidToken)?;

    let role = owner.role.parse::<Role>().map_err(|e| {
        tracing::error!(staff_id = %owner.staff_id, error = %e, "Staff row has unknown role");
        AppError::InvalidToken
    })?;

    request.extensions_mut().insert(AuthContext {
        staff_id: owner.staff_id,
        name: owner.name,
        employee_id: owner.employee_id,
        franchise_id: owner.franchise_id,
        franchise_name: owner.franchise_name,
        role,
    });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_hash_is_hex_sha256() {
        let hash = hash_token("abc");
        assert_eq!(
            hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
