//! Root configuration model (`config.toml`).

use serde::{Deserialize, Serialize};

pub const DEFAULT_SLIDES_API_BASE_URL: &str = "https://slides.googleapis.com";
pub const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const PRESENTATIONS_SCOPE: &str = "https://www.googleapis.com/auth/presentations";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct RootConfig {
    #[serde(default)]
    pub slides: SlidesApiConfig,
    #[serde(default)]
    pub composer: ComposerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where and how to reach the document service.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SlidesApiConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for SlidesApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SLIDES_API_BASE_URL.to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Layout and styling used by the slide composer.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ComposerConfig {
    /// Predefined two-placeholder layout for new slides.
    pub layout: String,
    pub title_font_family: String,
    pub title_font_size_pt: f64,
    pub bullet_preset: String,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            layout: "TITLE_AND_BODY".to_string(),
            title_font_family: "Arial".to_string(),
            title_font_size_pt: 24.0,
            bullet_preset: "BULLET_DISC_CIRCLE_SQUARE".to_string(),
        }
    }
}

/// OAuth installed-app flow settings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AuthConfig {
    pub auth_uri: String,
    pub token_uri: String,
    pub scopes: Vec<String>,
    pub redirect_uri: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            auth_uri: DEFAULT_AUTH_URI.to_string(),
            token_uri: DEFAULT_TOKEN_URI.to_string(),
            scopes: vec![PRESENTATIONS_SCOPE.to_string()],
            redirect_uri: "http://localhost".to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is not set.
    pub level: String,
    pub json: bool,
    /// Also write a daily-rolling log file under the logs directory.
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: false,
        }
    }
}
