//! Authentication handlers: login, refresh and session introspection.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use jiff::Timestamp;
use mira_auth::credential::CredentialValidator;
use mira_auth::directory::DirectoryUser;
use mira_auth::token::{TokenIssuer, TokenPair};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::Result;
use crate::extract::{AuthHeader, AuthSession, ValidateJson};
use crate::service::{ServiceState, SharedDirectory};

/// Tracing target for authentication operations.
const TRACING_TARGET: &str = "mira_server::handler::authentication";

/// Returns the authentication [`Router`].
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/me", get(me))
}

/// Request payload for login.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate)]
struct LoginRequest {
    /// Login name of the user.
    #[validate(length(min = 1, max = 256))]
    pub username: String,
    /// Password of the user.
    #[validate(length(min = 1))]
    pub password: String,
}

/// Public profile of the authenticated user.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
struct UserProfile {
    /// Subject id.
    pub id: Uuid,
    /// Login name.
    pub username: String,
    /// Administrator flag.
    pub is_admin: bool,
    /// Granted scope strings as stored in the directory.
    pub scopes: Vec<String>,
}

impl From<DirectoryUser> for UserProfile {
    fn from(user: DirectoryUser) -> Self {
        Self {
            id: user.id,
            username: user.username,
            is_admin: user.is_admin,
            scopes: user.scopes,
        }
    }
}

/// Response returned after successful login.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
struct LoginResponse {
    /// The issued token pair.
    #[serde(flatten)]
    pub tokens: TokenPair,
    /// The authenticated user's profile.
    pub user: UserProfile,
}

/// Response returned by session introspection.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
struct SessionResponse {
    /// Subject id from the verified token.
    pub subject_id: Uuid,
    /// Granted scopes embedded in the token at issuance.
    pub scopes: Vec<String>,
    /// Token expiration time.
    pub expires_at: Timestamp,
}

/// `POST /auth/login`: exchanges credentials for a token pair.
async fn login(
    State(directory): State<SharedDirectory>,
    State(credential_validator): State<CredentialValidator>,
    State(token_issuer): State<TokenIssuer>,
    ValidateJson(request): ValidateJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    tracing::trace!(
        target: TRACING_TARGET,
        username = %request.username,
        "login attempt"
    );

    let (user, tokens) = token_issuer
        .login(
            &credential_validator,
            directory.as_ref(),
            &request.username,
            &request.password,
        )
        .await?;

    tracing::info!(
        target: TRACING_TARGET,
        subject_id = %user.id,
        "login succeeded"
    );

    Ok(Json(LoginResponse {
        tokens,
        user: user.into(),
    }))
}

/// `POST /auth/refresh`: exchanges a bearer refresh token for a new pair.
async fn refresh(
    State(directory): State<SharedDirectory>,
    State(token_issuer): State<TokenIssuer>,
    header: AuthHeader,
) -> Result<Json<TokenPair>> {
    let tokens = token_issuer
        .refresh(directory.as_ref(), header.token())
        .await?;

    Ok(Json(tokens))
}

/// `GET /auth/me`: echoes the verified claims of the presented access token.
async fn me(session: AuthSession) -> Json<SessionResponse> {
    let AuthSession(claims) = session;
    Json(SessionResponse {
        subject_id: claims.subject_id,
        scopes: claims.scopes,
        expires_at: claims.expires_at,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::middleware::from_fn_with_state;
    use axum_test::TestServer;
    use mira_auth::directory::UserDirectory;
    use mira_auth::guard::AuthGuard;
    use serde_json::{Value, json};

    use super::*;
    use crate::middleware::{require_admin, require_authentication};
    use crate::service::ServiceConfig;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    /// Item deletion with the explicit per-handler scope check.
    async fn delete_bucket_item(
        State(auth_guard): State<AuthGuard>,
        Path((bucket_id, _item_id)): Path<(i64, String)>,
        header: AuthHeader,
    ) -> Result<StatusCode> {
        const REQUIRED_SCOPES: &[&str] = &["bucket_{resource_id}_item_delete"];

        auth_guard.authorize(header.token(), REQUIRED_SCOPES, Some(bucket_id))?;
        Ok(StatusCode::NO_CONTENT)
    }

    fn seeded_state() -> (ServiceState, Arc<mira_auth::directory::InMemoryDirectory>) {
        let directory = Arc::new(mira_auth::directory::InMemoryDirectory::new());
        let hasher = CredentialValidator::new();

        directory.insert(DirectoryUser {
            id: Uuid::new_v4(),
            username: "casey".into(),
            password_hash: hasher.hash_password("mypassword").expect("hash"),
            is_active: true,
            is_admin: false,
            scopes: vec!["gallery_create".into(), "group_bucket_item_manage".into()],
        });
        directory.insert(DirectoryUser {
            id: Uuid::new_v4(),
            username: "root".into(),
            password_hash: hasher.hash_password("rootpassword").expect("hash"),
            is_active: true,
            is_admin: true,
            scopes: Vec::new(),
        });

        let config = ServiceConfig::new(SECRET);
        let state = ServiceState::from_config(&config, directory.clone()).expect("state");
        (state, directory)
    }

    fn test_server() -> (TestServer, Arc<mira_auth::directory::InMemoryDirectory>) {
        let (state, directory) = seeded_state();

        let admin_routes = Router::new()
            .route("/admin/ping", get(|| async { "pong" }))
            .route_layer(from_fn_with_state(state.clone(), require_admin));
        let private_routes = Router::new()
            .route("/galleries", get(|| async { "[]" }))
            .route_layer(from_fn_with_state(state.clone(), require_authentication));

        let app = crate::handler::routes()
            .route(
                "/buckets/{bucket_id}/items/{item_id}",
                axum::routing::delete(delete_bucket_item),
            )
            .merge(admin_routes)
            .merge(private_routes)
            .with_state(state);

        (TestServer::new(app).expect("test server"), directory)
    }

    async fn login_tokens(server: &TestServer, username: &str, password: &str) -> Value {
        let response = server
            .post("/auth/login")
            .json(&json!({ "username": username, "password": password }))
            .await;
        response.assert_status_ok();
        response.json::<Value>()
    }

    #[tokio::test]
    async fn login_returns_pair_and_profile() {
        let (server, _) = test_server();
        let body = login_tokens(&server, "casey", "mypassword").await;

        assert_eq!(body["token_type"], "bearer");
        assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
        assert!(body["refresh_token"].as_str().is_some_and(|t| !t.is_empty()));
        assert_eq!(body["user"]["username"], "casey");
        assert_eq!(body["user"]["is_admin"], false);
    }

    #[tokio::test]
    async fn bad_credentials_are_unauthorized_and_uniform() {
        let (server, _) = test_server();

        let wrong_password = server
            .post("/auth/login")
            .json(&json!({ "username": "casey", "password": "nope" }))
            .await;
        wrong_password.assert_status(StatusCode::UNAUTHORIZED);

        let unknown_user = server
            .post("/auth/login")
            .json(&json!({ "username": "nobody", "password": "nope" }))
            .await;
        unknown_user.assert_status(StatusCode::UNAUTHORIZED);

        // Indistinguishable bodies.
        assert_eq!(
            wrong_password.json::<Value>()["message"],
            unknown_user.json::<Value>()["message"]
        );
    }

    #[tokio::test]
    async fn inactive_account_is_forbidden() {
        let (server, directory) = test_server();
        let casey = directory
            .find_by_username("casey")
            .await
            .expect("lookup")
            .expect("present");
        directory.set_active(casey.id, false);

        let response = server
            .post("/auth/login")
            .json(&json!({ "username": "casey", "password": "mypassword" }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn malformed_payload_is_bad_request() {
        let (server, _) = test_server();
        let response = server
            .post("/auth/login")
            .json(&json!({ "username": "casey" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .post("/auth/login")
            .json(&json!({ "username": "", "password": "x" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn me_echoes_verified_claims() {
        let (server, _) = test_server();
        let body = login_tokens(&server, "casey", "mypassword").await;
        let access_token = body["access_token"].as_str().expect("token");

        let response = server
            .get("/auth/me")
            .authorization_bearer(access_token)
            .await;
        response.assert_status_ok();

        let session = response.json::<Value>();
        assert_eq!(
            session["scopes"],
            json!(["gallery_create", "group_bucket_item_manage"])
        );

        let missing = server.get("/auth/me").await;
        missing.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(missing.json::<Value>()["name"], "missing_auth_token");
    }

    #[tokio::test]
    async fn refresh_accepts_only_refresh_tokens() {
        let (server, _) = test_server();
        let body = login_tokens(&server, "casey", "mypassword").await;

        let refreshed = server
            .post("/auth/refresh")
            .authorization_bearer(body["refresh_token"].as_str().expect("token"))
            .await;
        refreshed.assert_status_ok();
        let new_pair = refreshed.json::<Value>();
        assert!(new_pair["access_token"].as_str().is_some_and(|t| !t.is_empty()));

        let rejected = server
            .post("/auth/refresh")
            .authorization_bearer(body["access_token"].as_str().expect("token"))
            .await;
        rejected.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn scope_guarded_route_binds_the_path_resource() {
        let (server, _) = test_server();
        let body = login_tokens(&server, "casey", "mypassword").await;
        let access_token = body["access_token"].as_str().expect("token");

        // The manage group covers item deletion for any concrete bucket.
        let allowed = server
            .delete("/buckets/7/items/photo.jpg")
            .authorization_bearer(access_token)
            .await;
        allowed.assert_status(StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn denied_scope_check_names_the_challenge() {
        let (server, directory) = test_server();
        let casey = directory
            .find_by_username("casey")
            .await
            .expect("lookup")
            .expect("present");
        directory.set_scopes(casey.id, vec!["7:view".into()]);

        let body = login_tokens(&server, "casey", "mypassword").await;
        let access_token = body["access_token"].as_str().expect("token");

        let denied = server
            .delete("/buckets/7/items/photo.jpg")
            .authorization_bearer(access_token)
            .await;
        denied.assert_status(StatusCode::UNAUTHORIZED);

        let challenge = denied
            .headers()
            .get("www-authenticate")
            .expect("challenge header")
            .to_str()
            .expect("ascii");
        assert_eq!(challenge, "Bearer scope=\"bucket_7_item_delete\"");
    }

    #[tokio::test]
    async fn admin_routes_bypass_scopes_but_gate_on_the_sentinel() {
        let (server, _) = test_server();

        let admin = login_tokens(&server, "root", "rootpassword").await;
        let allowed = server
            .get("/admin/ping")
            .authorization_bearer(admin["access_token"].as_str().expect("token"))
            .await;
        allowed.assert_status_ok();

        // Admins also pass arbitrary scope checks outright.
        let bypass = server
            .delete("/buckets/42/items/clip.mp4")
            .authorization_bearer(admin["access_token"].as_str().expect("token"))
            .await;
        bypass.assert_status(StatusCode::NO_CONTENT);

        let casey = login_tokens(&server, "casey", "mypassword").await;
        let forbidden = server
            .get("/admin/ping")
            .authorization_bearer(casey["access_token"].as_str().expect("token"))
            .await;
        forbidden.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn blanket_authentication_layer_guards_private_routes() {
        let (server, _) = test_server();

        let anonymous = server.get("/galleries").await;
        anonymous.assert_status(StatusCode::UNAUTHORIZED);

        let body = login_tokens(&server, "casey", "mypassword").await;
        let authed = server
            .get("/galleries")
            .authorization_bearer(body["access_token"].as_str().expect("token"))
            .await;
        authed.assert_status_ok();
    }
}
