//! Authentication middleware.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use log::{debug, warn};

use super::{AuthError, Identity, TokenVerifier};

/// Extract a Bearer token from an Authorization header value.
pub fn bearer_token_from_header(header_value: &str) -> Result<&str, AuthError> {
    let mut parts = header_value.split_whitespace();
    let scheme = parts.next().ok_or(AuthError::InvalidAuthHeader)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidAuthHeader);
    }

    let token = parts.next().ok_or(AuthError::InvalidAuthHeader)?;
    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }

    if parts.next().is_some() {
        return Err(AuthError::InvalidAuthHeader);
    }

    Ok(token)
}

/// Authentication state shared across handlers.
#[derive(Debug, Clone)]
pub struct AuthState {
    verifier: Arc<TokenVerifier>,
}

impl AuthState {
    pub fn new(verifier: Arc<TokenVerifier>) -> Self {
        Self { verifier }
    }

    /// Verify a bearer token.
    pub fn validate_token(&self, token: &str) -> Result<Identity, AuthError> {
        self.verifier.verify(token).map_err(|e| {
            warn!("JWT validation failed: {}", e);
            AuthError::Token(e)
        })
    }
}

/// Authenticated user extracted from request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub identity: Identity,
}

impl CurrentUser {
    pub fn username(&self) -> &str {
        self.identity.username()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.identity.has_role(role)
    }
}

/// Extract authentication from request.
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthError::MissingAuthHeader)
    }
}

/// Authentication middleware.
///
/// Verifies the `Authorization: Bearer <token>` header and injects
/// `CurrentUser` into request extensions. No other token source is accepted.
pub async fn auth_middleware(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = bearer_token_from_header(header)?;
    let identity = auth.validate_token(token)?;
    debug!("authenticated request for {}", identity.username());

    req.extensions_mut().insert(CurrentUser { identity });

    Ok(next.run(req).await)
}

/// Role a route group requires.
#[derive(Debug, Clone)]
pub struct RequireRole {
    role: Arc<str>,
}

impl RequireRole {
    pub fn new(role: impl Into<Arc<str>>) -> Self {
        Self { role: role.into() }
    }

    pub fn check(&self, identity: &Identity) -> Result<(), AuthError> {
        if identity.has_role(&self.role) {
            Ok(())
        } else {
            Err(AuthError::InsufficientPermissions(format!(
                "{} role required",
                self.role
            )))
        }
    }
}

/// Authorization middleware. Must run after [`auth_middleware`].
pub async fn require_role(
    State(gate): State<RequireRole>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AuthError::MissingAuthHeader)?;

    if let Err(err) = gate.check(&user.identity) {
        warn!("{} denied: {}", user.username(), err);
        return Err(err);
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{SigningAlgorithm, SigningKey, TokenIssuer};
    use axum::{Router, body::Body, http::StatusCode, middleware, routing::get};
    use chrono::TimeDelta;
    use tower::ServiceExt;

    #[test]
    fn test_bearer_token_from_header_valid() {
        assert_eq!(
            bearer_token_from_header("Bearer abc.def.ghi").unwrap(),
            "abc.def.ghi"
        );
        assert_eq!(
            bearer_token_from_header("bearer   token123").unwrap(),
            "token123"
        );
        assert_eq!(
            bearer_token_from_header("   BEARER\tmixed-case ").unwrap(),
            "mixed-case"
        );
    }

    #[test]
    fn test_bearer_token_from_header_invalid() {
        let cases = [
            "",
            "Bearer",
            "Bearer ",
            "Basic YWRtaW46YWRtaW4=",
            "Bearer token extra",
            "bear token",
        ];

        for case in cases {
            assert!(
                bearer_token_from_header(case).is_err(),
                "{case} should fail"
            );
        }
    }

    #[test]
    fn test_require_role_check() {
        let gate = RequireRole::new("ADMIN");
        assert!(gate.check(&Identity::new("admin", ["ADMIN"])).is_ok());

        let err = gate.check(&Identity::new("user", ["USER"])).unwrap_err();
        assert!(matches!(err, AuthError::InsufficientPermissions(_)));
        assert_eq!(err.to_string(), "insufficient permissions: ADMIN role required");
    }

    fn issuer_and_state() -> (TokenIssuer, AuthState) {
        let key = Arc::new(SigningKey::hmac(SigningAlgorithm::Hs256, &[9; 32]).unwrap());
        let issuer = TokenIssuer::new(key.clone(), "tokengate", TimeDelta::minutes(15));
        let state = AuthState::new(Arc::new(TokenVerifier::new(key, "tokengate")));
        (issuer, state)
    }

    async fn whoami(user: CurrentUser) -> String {
        user.username().to_string()
    }

    fn app(state: AuthState) -> Router {
        let admin = Router::new()
            .route("/admin", get(whoami))
            .route_layer(middleware::from_fn_with_state(
                RequireRole::new("ADMIN"),
                require_role,
            ));

        Router::new()
            .route("/whoami", get(whoami))
            .merge(admin)
            .route_layer(middleware::from_fn_with_state(state, auth_middleware))
    }

    async fn call(app: Router, uri: &str, auth: Option<String>) -> StatusCode {
        let mut request = axum::http::Request::builder().uri(uri);
        if let Some(value) = auth {
            request = request.header(AUTHORIZATION, value);
        }
        app.oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_middleware_injects_current_user() {
        let (issuer, state) = issuer_and_state();
        let token = issuer.issue(&Identity::new("user", ["USER"])).unwrap();

        let response = app(state)
            .oneshot(
                axum::http::Request::builder()
                    .uri("/whoami")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"user");
    }

    #[tokio::test]
    async fn test_middleware_rejections() {
        let (issuer, state) = issuer_and_state();
        let user = issuer.issue(&Identity::new("user", ["USER"])).unwrap();
        let admin = issuer.issue(&Identity::new("admin", ["ADMIN"])).unwrap();

        let app = app(state);
        assert_eq!(call(app.clone(), "/whoami", None).await, StatusCode::UNAUTHORIZED);
        assert_eq!(
            call(app.clone(), "/whoami", Some("Bearer not.a.jwt".into())).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            call(app.clone(), "/whoami", Some(format!("Token {user}"))).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            call(app.clone(), "/admin", Some(format!("Bearer {user}"))).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            call(app, "/admin", Some(format!("bearer {admin}"))).await,
            StatusCode::OK
        );
    }
}
