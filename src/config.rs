//! Console configuration resolved from CLI arguments and environment
//! variables. Values are public endpoints and paths; do not store secrets here.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:4000/api";
/// Tried in order after the configured base URL when logging in.
pub const DEFAULT_FALLBACK_URLS: [&str; 2] = ["http://localhost:4000/api", "http://127.0.0.1:4000/api"];
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
/// Bounded wait for the hydration signal before the guard's final check.
pub const DEFAULT_HYDRATION_GRACE: Duration = Duration::from_millis(500);
const STATE_DIR_NAME: &str = "rupantar-admin";

#[derive(Clone, Debug)]
pub struct ConsoleConfig {
    pub api_base_url: String,
    pub fallback_urls: Vec<String>,
    pub state_dir: PathBuf,
    pub timeout: Duration,
    pub hydration_grace: Duration,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            fallback_urls: DEFAULT_FALLBACK_URLS.iter().map(ToString::to_string).collect(),
            state_dir: default_state_dir(),
            timeout: DEFAULT_TIMEOUT,
            hydration_grace: DEFAULT_HYDRATION_GRACE,
        }
    }
}

impl ConsoleConfig {
    /// Overrides the API base URL; blank values keep the current one.
    #[must_use]
    pub fn with_api_base_url(mut self, value: &str) -> Self {
        if let Some(url) = normalize_url(value) {
            self.api_base_url = url;
        }
        self
    }

    /// Replaces the fallback chain; blank entries are dropped.
    #[must_use]
    pub fn with_fallback_urls<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.fallback_urls = values
            .into_iter()
            .filter_map(|value| normalize_url(value.as_ref()))
            .collect();
        self
    }

    #[must_use]
    pub fn with_state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = dir.into();
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_hydration_grace(mut self, grace: Duration) -> Self {
        self.hydration_grace = grace;
        self
    }

    /// Login candidates: the configured base URL first, then the fallbacks.
    #[must_use]
    pub fn login_candidates(&self) -> Vec<String> {
        std::iter::once(self.api_base_url.clone())
            .chain(self.fallback_urls.iter().cloned())
            .collect()
    }
}

/// Trims whitespace and trailing slashes; `None` for blank input.
#[must_use]
pub fn normalize_url(value: &str) -> Option<String> {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Joins a base URL and an absolute path with exactly one slash between them.
#[must_use]
pub fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

/// `$XDG_STATE_HOME/rupantar-admin`, else `~/.local/state/rupantar-admin`,
/// else `./.rupantar-admin`.
#[must_use]
pub fn default_state_dir() -> PathBuf {
    if let Some(dir) = env::var_os("XDG_STATE_HOME").filter(|dir| !dir.is_empty()) {
        return PathBuf::from(dir).join(STATE_DIR_NAME);
    }
    if let Some(home) = env::var_os("HOME").filter(|home| !home.is_empty()) {
        return PathBuf::from(home)
            .join(".local")
            .join("state")
            .join(STATE_DIR_NAME);
    }
    PathBuf::from(format!(".{STATE_DIR_NAME}"))
}
