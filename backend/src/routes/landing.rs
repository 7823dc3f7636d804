use serde::{Deserialize, Serialize};

pub const WELCOME: &str = "welcome";

pub const WELCOME_MESSAGE: &str = "Welcome to the Heavy Metal Pollution Index API";
pub const DOCS_URL: &str = "/api/v1";
pub const APP_URL: &str = "/app/";

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WelcomeResponse {
    pub message: String,
    pub docs_url: String,
    /// Front-end location, `None` when no static directory is served.
    pub app_url: Option<String>,
}

impl WelcomeResponse {
    pub fn new(serves_app: bool) -> Self {
        Self {
            message: WELCOME_MESSAGE.to_string(),
            docs_url: DOCS_URL.to_string(),
            app_url: serves_app.then(|| APP_URL.to_string()),
        }
    }
}
