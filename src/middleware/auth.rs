use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{authorize, validate_jwt, Action, Caller, Verdict};
use crate::database::models::Role;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user context, resolved from the token subject and the
/// stored user row.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: String,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    pub fn caller(&self) -> Caller {
        Caller::new(self.user_id.clone(), self.role)
    }

    /// Ask the gate about `action`; a denial becomes the matching API error.
    pub fn authorize(&self, action: &Action<'_>) -> Result<(), ApiError> {
        match authorize(&self.caller(), action) {
            Verdict::Allow => Ok(()),
            Verdict::Deny(reason) => {
                tracing::warn!(
                    "Denied {:?} for user {} ({}): {:?}",
                    action,
                    self.user_id,
                    self.role,
                    reason
                );
                Err(reason.into())
            }
        }
    }
}

/// JWT authentication middleware that validates tokens and extracts user context
///
/// The user is reloaded on every request and the stored role wins over the
/// role in the token, so demotions and deletions apply immediately.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers).map_err(ApiError::unauthorized)?;

    let claims = validate_jwt(&token, &state.config.security)?;

    let user = state
        .users
        .get_by_id(&claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;

    request.extensions_mut().insert(AuthUser {
        user_id: user.id,
        email: user.email,
        role: user.role,
    });

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
