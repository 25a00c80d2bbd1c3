//! Transport for the login endpoint. The session store only sees the
//! [`AuthBackend`] trait, so tests and embedders can swap in a fake backend.
//!
//! The HTTP backend walks an ordered list of candidate base URLs. A candidate
//! that cannot be reached is skipped; the first one that answers decides the
//! outcome, whatever the status. This is recovery from a misconfigured
//! deployment, not a retry policy: nothing is retried and there is no backoff.

use crate::config::join_url;
use crate::session::{error::AuthError, types::Admin};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info_span, warn, Instrument};

pub const LOGIN_PATH: &str = "/admin/auth/login";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Email and password typed by the operator.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Raw 2xx body of the login endpoint. Both fields are checked by the store.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub admin: Option<Admin>,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

pub trait AuthBackend: Send + Sync {
    /// Exchanges credentials for an admin identity and bearer token.
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<LoginResponse, AuthError>> + Send;
}

/// Login over HTTP with a fallback chain of base URLs.
#[derive(Clone, Debug)]
pub struct HttpAuthBackend {
    client: Client,
    candidates: Vec<String>,
}

impl HttpAuthBackend {
    /// Builds the backend. Candidates are trimmed, empty entries dropped, and
    /// duplicates removed while keeping the first occurrence's position.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new<I, S>(user_agent: &str, timeout: Duration, candidates: I) -> Result<Self, AuthError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(timeout)
            .build()
            .map_err(|err| AuthError::Client(err.to_string()))?;

        Ok(Self {
            client,
            candidates: dedup_candidates(candidates),
        })
    }

    #[must_use]
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }
}

impl AuthBackend for HttpAuthBackend {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, AuthError> {
        let payload = LoginRequest {
            email: &credentials.email,
            password: credentials.password.expose_secret(),
        };

        let mut last_failure = None;

        for base in &self.candidates {
            let url = join_url(base, LOGIN_PATH);
            let span = info_span!("admin.login", http.method = "POST", url = %url);

            match self
                .client
                .post(&url)
                .json(&payload)
                .send()
                .instrument(span)
                .await
            {
                Ok(response) => {
                    debug!("login candidate {} answered {}", url, response.status());
                    return read_login_response(response).await;
                }
                Err(err) => {
                    warn!("login candidate {} unreachable: {}", url, err);
                    last_failure = Some(err.to_string());
                }
            }
        }

        Err(last_failure.map_or(AuthError::NoCandidates, |last| AuthError::Unreachable {
            last,
        }))
    }
}

async fn read_login_response(response: Response) -> Result<LoginResponse, AuthError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|_| AuthError::InvalidResponse)?;

    if !status.is_success() {
        return Err(AuthError::Rejected {
            status: status.as_u16(),
            message: rejection_message(&body),
        });
    }

    serde_json::from_str(&body).map_err(|err| {
        debug!("undecodable login response: {}", err);
        AuthError::InvalidResponse
    })
}

/// `error` from a JSON body, "Invalid credentials" for JSON without one, and
/// "Login failed" when the body is not JSON at all.
fn rejection_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => value
            .get("error")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .unwrap_or("Invalid credentials")
            .to_string(),
        Err(_) => "Login failed".to_string(),
    }
}

fn dedup_candidates<I, S>(candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut unique: Vec<String> = Vec::new();
    for candidate in candidates {
        let normalized = candidate.as_ref().trim().trim_end_matches('/').to_string();
        if !normalized.is_empty() && !unique.contains(&normalized) {
            unique.push(normalized);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const USER_AGENT: &str = "rupantar-admin-test/0.1";

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    /// A base URL nobody listens on.
    fn dead_base() -> Result<String> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        drop(listener);
        Ok(format!("http://127.0.0.1:{port}/api"))
    }

    fn backend(candidates: &[String]) -> Result<HttpAuthBackend> {
        Ok(HttpAuthBackend::new(
            USER_AGENT,
            Duration::from_secs(5),
            candidates,
        )?)
    }

    #[test]
    fn candidates_are_normalized_and_deduplicated() -> Result<()> {
        let backend = HttpAuthBackend::new(
            USER_AGENT,
            Duration::from_secs(1),
            [
                " http://a/api/ ",
                "",
                "http://a/api",
                "http://b/api",
                "http://a/api",
            ],
        )?;
        assert_eq!(backend.candidates(), ["http://a/api", "http://b/api"]);
        Ok(())
    }

    #[test]
    fn rejection_message_variants() {
        assert_eq!(rejection_message(r#"{"error":"Account disabled"}"#), "Account disabled");
        assert_eq!(rejection_message(r#"{"message":"nope"}"#), "Invalid credentials");
        assert_eq!(rejection_message(r#"{"error":""}"#), "Invalid credentials");
        assert_eq!(rejection_message("<html>bad gateway</html>"), "Login failed");
        assert_eq!(rejection_message(""), "Login failed");
    }

    #[tokio::test]
    async fn login_posts_credentials_and_decodes_response() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/admin/auth/login"))
            .and(body_json(json!({ "email": "owner@x.com", "password": "pw" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "admin": { "id": "1", "email": "owner@x.com", "name": "Owner", "role": "owner" },
                "token": "tok-1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let base = format!("{}/api", server.uri());
        let response = backend(&[base])?
            .login(&Credentials::new("owner@x.com", "pw"))
            .await?;

        assert_eq!(response.token.as_deref(), Some("tok-1"));
        assert_eq!(response.admin.map(|admin| admin.id), Some("1".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn login_accepts_null_optional_admin_fields() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/admin/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "admin": {
                    "id": "1",
                    "email": "a@b.com",
                    "name": null,
                    "role": "owner",
                    "isActive": true,
                    "createdAt": null
                },
                "token": "tok"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let base = format!("{}/api", server.uri());
        let response = backend(&[base])?
            .login(&Credentials::new("a@b.com", "pw"))
            .await?;

        let admin = response.admin.ok_or_else(|| anyhow!("admin missing"))?;
        assert!(admin.is_identified());
        assert!(admin.name.is_empty());
        assert!(!admin.created_at.is_empty());
        assert_eq!(response.token.as_deref(), Some("tok"));
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_candidate_falls_through_to_next() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/admin/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "admin": { "id": "1", "email": "a@b.com" },
                "token": "tok"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let candidates = [dead_base()?, format!("{}/api", server.uri())];
        let response = backend(&candidates)?
            .login(&Credentials::new("a@b.com", "pw"))
            .await?;
        assert_eq!(response.token.as_deref(), Some("tok"));
        Ok(())
    }

    #[tokio::test]
    async fn non_success_answer_is_definitive() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let rejecting = MockServer::start().await;
        let accepting = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/admin/auth/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "error": "Invalid credentials" })),
            )
            .mount(&rejecting)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&accepting)
            .await;

        let candidates = [
            format!("{}/api", rejecting.uri()),
            format!("{}/api", accepting.uri()),
        ];
        let err = backend(&candidates)?
            .login(&Credentials::new("owner@x.com", "wrongpass"))
            .await
            .err()
            .ok_or_else(|| anyhow!("expected error"))?;

        assert!(matches!(err, AuthError::Rejected { status: 401, .. }));
        assert_eq!(err.to_string(), "Invalid credentials");
        Ok(())
    }

    #[tokio::test]
    async fn all_candidates_unreachable_reports_last_failure() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let candidates = [dead_base()?, dead_base()?];
        let err = backend(&candidates)?
            .login(&Credentials::new("a@b.com", "pw"))
            .await
            .err()
            .ok_or_else(|| anyhow!("expected error"))?;

        match err {
            AuthError::Unreachable { last } => assert!(!last.is_empty()),
            other => return Err(anyhow!("unexpected error: {other}")),
        }
        Ok(())
    }

    #[tokio::test]
    async fn no_candidates_is_an_error() -> Result<()> {
        let err = backend(&[])?
            .login(&Credentials::new("a@b.com", "pw"))
            .await
            .err()
            .ok_or_else(|| anyhow!("expected error"))?;
        assert!(matches!(err, AuthError::NoCandidates));
        Ok(())
    }

    #[tokio::test]
    async fn non_json_success_body_is_invalid_response() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let err = backend(&[server.uri()])?
            .login(&Credentials::new("a@b.com", "pw"))
            .await
            .err()
            .ok_or_else(|| anyhow!("expected error"))?;
        assert!(matches!(err, AuthError::InvalidResponse));
        Ok(())
    }
}
