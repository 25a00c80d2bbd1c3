//! Endpoint wrappers for the admin resources. Each wrapper borrows the
//! [`ApiClient`] and returns the backend's JSON untouched; the backend owns
//! the shapes and the rules.

use crate::api::{client::ApiClient, error::ApiError};
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};
use url::form_urlencoded;

/// Query filters as `(key, value)` pairs. Pairs with an empty value are skipped.
pub type Filters<'a> = &'a [(&'a str, &'a str)];

/// Appends `filters` to `path` as a query string.
#[must_use]
pub fn with_query(path: &str, filters: Filters<'_>) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in filters {
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() {
            continue;
        }
        query.append_pair(key, value);
        any = true;
    }
    if any {
        format!("{path}?{}", query.finish())
    } else {
        path.to_string()
    }
}

/// Validates an id used as a path segment.
///
/// # Errors
/// Returns [`ApiError::InvalidInput`] for blank ids or ids containing URL
/// delimiters.
pub fn segment<'a>(name: &str, id: &'a str) -> Result<&'a str, ApiError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ApiError::InvalidInput(format!("{name} must not be empty")));
    }
    if id.contains(['/', '?', '#', '%']) || id.chars().any(char::is_whitespace) {
        return Err(ApiError::InvalidInput(format!("{name} is not a valid id: {id:?}")));
    }
    Ok(id)
}

fn empty() -> Value {
    json!({})
}

impl ApiClient {
    #[must_use]
    pub const fn auth(&self) -> Auth<'_> {
        Auth { api: self }
    }

    #[must_use]
    pub const fn users(&self) -> Users<'_> {
        Users { api: self }
    }

    #[must_use]
    pub const fn templates(&self) -> Templates<'_> {
        Templates { api: self }
    }

    #[must_use]
    pub const fn creators(&self) -> Creators<'_> {
        Creators { api: self }
    }

    #[must_use]
    pub const fn transactions(&self) -> Transactions<'_> {
        Transactions { api: self }
    }

    #[must_use]
    pub const fn analytics(&self) -> Analytics<'_> {
        Analytics { api: self }
    }

    #[must_use]
    pub const fn settings(&self) -> Settings<'_> {
        Settings { api: self }
    }

    #[must_use]
    pub const fn support(&self) -> Support<'_> {
        Support { api: self }
    }

    #[must_use]
    pub const fn ai_config(&self) -> AiConfig<'_> {
        AiConfig { api: self }
    }
}

/// `/admin/auth`; login itself goes through the session store.
#[derive(Clone, Copy, Debug)]
pub struct Auth<'a> {
    api: &'a ApiClient,
}

impl Auth<'_> {
    /// Asks the backend to import every identity-provider account.
    ///
    /// # Errors
    /// See [`ApiClient::request`].
    pub async fn sync_users(&self) -> Result<Value, ApiError> {
        self.api.post("/auth/syncAllFirebaseUsers", &empty()).await
    }
}

/// `/admin/users`
#[derive(Clone, Copy, Debug)]
pub struct Users<'a> {
    api: &'a ApiClient,
}

impl Users<'_> {
    /// # Errors
    /// See [`ApiClient::request`].
    pub async fn list(&self, filters: Filters<'_>) -> Result<Value, ApiError> {
        self.api.get(&with_query("/users", filters)).await
    }

    /// # Errors
    /// Returns an error for an invalid id or a failed request.
    pub async fn get(&self, id: &str) -> Result<Value, ApiError> {
        self.api.get(&format!("/users/{}", segment("user id", id)?)).await
    }

    /// # Errors
    /// See [`ApiClient::request`].
    pub async fn create(&self, data: &Value) -> Result<Value, ApiError> {
        self.api.post("/users", data).await
    }

    /// # Errors
    /// Returns an error for an invalid id or a failed request.
    pub async fn update(&self, id: &str, data: &Value) -> Result<Value, ApiError> {
        self.api
            .put(&format!("/users/{}", segment("user id", id)?), data)
            .await
    }

    /// # Errors
    /// Returns an error for an invalid id or a failed request.
    pub async fn promote(&self, id: &str) -> Result<Value, ApiError> {
        self.action(id, "promote").await
    }

    /// # Errors
    /// Returns an error for an invalid id or a failed request.
    pub async fn ban(&self, id: &str) -> Result<Value, ApiError> {
        self.action(id, "ban").await
    }

    /// # Errors
    /// Returns an error for an invalid id or a failed request.
    pub async fn unban(&self, id: &str) -> Result<Value, ApiError> {
        self.action(id, "unban").await
    }

    /// # Errors
    /// Returns an error for an invalid id or a failed request.
    pub async fn verify(&self, id: &str) -> Result<Value, ApiError> {
        self.action(id, "verify").await
    }

    /// # Errors
    /// Returns an error for an invalid id or a failed request.
    pub async fn add_points(&self, id: &str, points: i64) -> Result<Value, ApiError> {
        self.api
            .post(
                &format!("/users/{}/points", segment("user id", id)?),
                &json!({ "points": points }),
            )
            .await
    }

    /// # Errors
    /// Returns an error for an invalid id or a failed request.
    pub async fn delete(&self, id: &str) -> Result<Value, ApiError> {
        self.api
            .delete(&format!("/users/{}", segment("user id", id)?))
            .await
    }

    async fn action(&self, id: &str, action: &str) -> Result<Value, ApiError> {
        self.api
            .post(&format!("/users/{}/{action}", segment("user id", id)?), &empty())
            .await
    }
}

/// `/admin/templates`
#[derive(Clone, Copy, Debug)]
pub struct Templates<'a> {
    api: &'a ApiClient,
}

impl Templates<'_> {
    /// # Errors
    /// See [`ApiClient::request`].
    pub async fn list(&self, filters: Filters<'_>) -> Result<Value, ApiError> {
        self.api.get(&with_query("/templates", filters)).await
    }

    /// # Errors
    /// Returns an error for an invalid id or a failed request.
    pub async fn get(&self, id: &str) -> Result<Value, ApiError> {
        self.api
            .get(&format!("/templates/{}", segment("template id", id)?))
            .await
    }

    /// # Errors
    /// See [`ApiClient::request`].
    pub async fn create(&self, data: &Value) -> Result<Value, ApiError> {
        self.api.post("/templates", data).await
    }

    /// # Errors
    /// Returns an error for an invalid id or a failed request.
    pub async fn approve(&self, id: &str) -> Result<Value, ApiError> {
        self.api
            .post(
                &format!("/templates/{}/approve", segment("template id", id)?),
                &empty(),
            )
            .await
    }

    /// # Errors
    /// Returns an error for an invalid id or a failed request.
    pub async fn reject(&self, id: &str, reason: Option<&str>) -> Result<Value, ApiError> {
        self.api
            .post(
                &format!("/templates/{}/reject", segment("template id", id)?),
                &json!({ "reason": reason }),
            )
            .await
    }

    /// # Errors
    /// Returns an error for an invalid id or a failed request.
    pub async fn delete(&self, id: &str) -> Result<Value, ApiError> {
        self.api
            .delete(&format!("/templates/{}", segment("template id", id)?))
            .await
    }

    /// # Errors
    /// Returns an error for an invalid id or a failed request.
    pub async fn bulk_approve(&self, ids: &[&str]) -> Result<Value, ApiError> {
        let ids = bulk_ids(ids)?;
        self.api
            .post("/templates/bulk/approve", &json!({ "ids": ids }))
            .await
    }

    /// # Errors
    /// Returns an error for an invalid id or a failed request.
    pub async fn bulk_reject(&self, ids: &[&str], reason: Option<&str>) -> Result<Value, ApiError> {
        let ids = bulk_ids(ids)?;
        self.api
            .post(
                "/templates/bulk/reject",
                &json!({ "ids": ids, "reason": reason }),
            )
            .await
    }

    /// # Errors
    /// Returns an error for an invalid id or a failed request.
    pub async fn bulk_delete(&self, ids: &[&str]) -> Result<Value, ApiError> {
        let ids = bulk_ids(ids)?;
        self.api
            .post("/templates/bulk/delete", &json!({ "ids": ids }))
            .await
    }
}

impl Templates<'_> {
    /// Uploads a demo image as the `image` part of a multipart form.
    ///
    /// # Errors
    /// Returns [`ApiError::InvalidInput`] for an empty image or blank file
    /// name, otherwise see [`ApiClient::request`].
    pub async fn upload_demo_image(&self, image: Vec<u8>, filename: &str) -> Result<Value, ApiError> {
        let filename = filename.trim();
        if image.is_empty() || filename.is_empty() {
            return Err(ApiError::InvalidInput(
                "demo image needs content and a file name".to_string(),
            ));
        }
        let form = Form::new().part("image", Part::bytes(image).file_name(filename.to_string()));
        self.api.upload("/upload/template-demo", form).await
    }
}

fn bulk_ids<'a>(ids: &[&'a str]) -> Result<Vec<&'a str>, ApiError> {
    if ids.is_empty() {
        return Err(ApiError::InvalidInput("no template ids given".to_string()));
    }
    ids.iter().map(|id| segment("template id", id)).collect()
}

/// `/admin/creators`
#[derive(Clone, Copy, Debug)]
pub struct Creators<'a> {
    api: &'a ApiClient,
}

impl Creators<'_> {
    /// # Errors
    /// See [`ApiClient::request`].
    pub async fn list(&self, filters: Filters<'_>) -> Result<Value, ApiError> {
        self.api.get(&with_query("/creators", filters)).await
    }

    /// # Errors
    /// Returns an error for an invalid id or a failed request.
    pub async fn get(&self, id: &str) -> Result<Value, ApiError> {
        self.api
            .get(&format!("/creators/{}", segment("creator id", id)?))
            .await
    }

    /// # Errors
    /// Returns an error for an invalid id or a failed request.
    pub async fn approve(&self, id: &str) -> Result<Value, ApiError> {
        self.action(id, "approve").await
    }

    /// # Errors
    /// Returns an error for an invalid id or a failed request.
    pub async fn reject(&self, id: &str, reason: Option<&str>) -> Result<Value, ApiError> {
        self.api
            .post(
                &format!("/creators/{}/reject", segment("creator id", id)?),
                &json!({ "reason": reason }),
            )
            .await
    }

    /// # Errors
    /// Returns an error for an invalid id or a failed request.
    pub async fn ban(&self, id: &str) -> Result<Value, ApiError> {
        self.action(id, "ban").await
    }

    /// # Errors
    /// Returns an error for an invalid id or a failed request.
    pub async fn unban(&self, id: &str) -> Result<Value, ApiError> {
        self.action(id, "unban").await
    }

    /// # Errors
    /// Returns an error for an invalid id or a failed request.
    pub async fn verify(&self, id: &str) -> Result<Value, ApiError> {
        self.action(id, "verify").await
    }

    /// # Errors
    /// Returns an error for an invalid id or a failed request.
    pub async fn process_withdrawal(&self, id: &str, withdrawal_id: &str) -> Result<Value, ApiError> {
        let path = format!(
            "/creators/{}/withdrawals/{}/process",
            segment("creator id", id)?,
            segment("withdrawal id", withdrawal_id)?
        );
        self.api.post(&path, &empty()).await
    }

    async fn action(&self, id: &str, action: &str) -> Result<Value, ApiError> {
        self.api
            .post(
                &format!("/creators/{}/{action}", segment("creator id", id)?),
                &empty(),
            )
            .await
    }
}

/// `/admin/transactions`
#[derive(Clone, Copy, Debug)]
pub struct Transactions<'a> {
    api: &'a ApiClient,
}

impl Transactions<'_> {
    /// # Errors
    /// See [`ApiClient::request`].
    pub async fn list(&self, filters: Filters<'_>) -> Result<Value, ApiError> {
        self.api.get(&with_query("/transactions", filters)).await
    }

    /// # Errors
    /// Returns an error for an invalid id or a failed request.
    pub async fn get(&self, id: &str) -> Result<Value, ApiError> {
        self.api
            .get(&format!("/transactions/{}", segment("transaction id", id)?))
            .await
    }

    /// # Errors
    /// Returns an error for an invalid id or a failed request.
    pub async fn refund(&self, id: &str) -> Result<Value, ApiError> {
        self.api
            .post(
                &format!("/transactions/{}/refund", segment("transaction id", id)?),
                &empty(),
            )
            .await
    }

    /// # Errors
    /// See [`ApiClient::request`].
    pub async fn export(&self, filters: Filters<'_>) -> Result<Value, ApiError> {
        self.api
            .get(&with_query("/transactions/export", filters))
            .await
    }
}

/// `/admin/analytics`
#[derive(Clone, Copy, Debug)]
pub struct Analytics<'a> {
    api: &'a ApiClient,
}

impl Analytics<'_> {
    /// # Errors
    /// See [`ApiClient::request`].
    pub async fn dashboard(&self) -> Result<Value, ApiError> {
        self.api.get("/analytics/dashboard").await
    }

    /// # Errors
    /// See [`ApiClient::request`].
    pub async fn revenue(&self, period: &str) -> Result<Value, ApiError> {
        self.api
            .get(&with_query("/analytics/revenue", &[("period", period)]))
            .await
    }

    /// # Errors
    /// See [`ApiClient::request`].
    pub async fn user_growth(&self, period: &str) -> Result<Value, ApiError> {
        self.api
            .get(&with_query("/analytics/users", &[("period", period)]))
            .await
    }

    /// # Errors
    /// See [`ApiClient::request`].
    pub async fn templates(&self) -> Result<Value, ApiError> {
        self.api.get("/analytics/templates").await
    }

    /// # Errors
    /// See [`ApiClient::request`].
    pub async fn creators(&self) -> Result<Value, ApiError> {
        self.api.get("/analytics/creators").await
    }
}

/// `/admin/settings`
#[derive(Clone, Copy, Debug)]
pub struct Settings<'a> {
    api: &'a ApiClient,
}

impl Settings<'_> {
    /// # Errors
    /// See [`ApiClient::request`].
    pub async fn get(&self) -> Result<Value, ApiError> {
        self.api.get("/settings").await
    }

    /// # Errors
    /// See [`ApiClient::request`].
    pub async fn update(&self, settings: &Value) -> Result<Value, ApiError> {
        self.api.put("/settings", settings).await
    }
}

/// `/admin/support`
#[derive(Clone, Copy, Debug)]
pub struct Support<'a> {
    api: &'a ApiClient,
}

impl Support<'_> {
    /// # Errors
    /// See [`ApiClient::request`].
    pub async fn list(&self, filters: Filters<'_>) -> Result<Value, ApiError> {
        self.api.get(&with_query("/support", filters)).await
    }

    /// # Errors
    /// Returns an error for an invalid id or a failed request.
    pub async fn get(&self, id: &str) -> Result<Value, ApiError> {
        self.api
            .get(&format!("/support/{}", segment("ticket id", id)?))
            .await
    }

    /// # Errors
    /// Returns an error for an invalid id or a failed request.
    pub async fn assign(&self, id: &str, admin_id: &str) -> Result<Value, ApiError> {
        let admin_id = segment("admin id", admin_id)?;
        self.post(id, "assign", &json!({ "adminId": admin_id })).await
    }

    /// # Errors
    /// Returns an error for an invalid id or a failed request.
    pub async fn update_status(&self, id: &str, status: &str) -> Result<Value, ApiError> {
        self.post(id, "status", &json!({ "status": status })).await
    }

    /// # Errors
    /// Returns an error for an invalid id or a failed request.
    pub async fn add_response(&self, id: &str, message: &str) -> Result<Value, ApiError> {
        self.post(id, "response", &json!({ "message": message })).await
    }

    /// # Errors
    /// Returns an error for an invalid id or a failed request.
    pub async fn close(&self, id: &str) -> Result<Value, ApiError> {
        self.post(id, "close", &empty()).await
    }

    async fn post(&self, id: &str, action: &str, body: &Value) -> Result<Value, ApiError> {
        self.api
            .post(&format!("/support/{}/{action}", segment("ticket id", id)?), body)
            .await
    }
}

/// `/admin/ai-config`
#[derive(Clone, Copy, Debug)]
pub struct AiConfig<'a> {
    api: &'a ApiClient,
}

impl AiConfig<'_> {
    /// # Errors
    /// See [`ApiClient::request`].
    pub async fn list(&self) -> Result<Value, ApiError> {
        self.api.get("/ai-config").await
    }

    /// # Errors
    /// See [`ApiClient::request`].
    pub async fn active(&self) -> Result<Value, ApiError> {
        self.api.get("/ai-config/active").await
    }

    /// # Errors
    /// See [`ApiClient::request`].
    pub async fn create(&self, data: &Value) -> Result<Value, ApiError> {
        self.api.post("/ai-config", data).await
    }

    /// # Errors
    /// Returns an error for an invalid id or a failed request.
    pub async fn activate(&self, id: &str) -> Result<Value, ApiError> {
        self.api
            .post(
                &format!("/ai-config/{}/activate", segment("config id", id)?),
                &empty(),
            )
            .await
    }

    /// # Errors
    /// Returns an error for an invalid id or a failed request.
    pub async fn test(&self, id: &str) -> Result<Value, ApiError> {
        self.api
            .post(
                &format!("/ai-config/{}/test", segment("config id", id)?),
                &empty(),
            )
            .await
    }

    /// # Errors
    /// Returns an error for an invalid id or a failed request.
    pub async fn delete(&self, id: &str) -> Result<Value, ApiError> {
        self.api
            .delete(&format!("/ai-config/{}", segment("config id", id)?))
            .await
    }
}
