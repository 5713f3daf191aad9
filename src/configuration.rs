use crate::domain::BodyFormat;
use crate::ghost_client::{AdminApiKey, GhostClient};
use anyhow::Context;
use chrono::Weekday;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

#[derive(Deserialize, Clone)]
pub struct Configuration {
    pub application: ApplicationSettings,
    pub ghost: GhostSettings,
    pub rotation: RotationSettings,
    pub newsletter: NewsletterSettings,
}

#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub cron_secret: Option<Secret<String>>,
}

impl ApplicationSettings {
    /// The configured cron secret, treating an empty string as "not set".
    pub fn cron_secret(&self) -> Option<&Secret<String>> {
        self.cron_secret
            .as_ref()
            .filter(|secret| !secret.expose_secret().trim().is_empty())
    }
}

#[derive(Deserialize, Clone)]
pub struct GhostSettings {
    pub base_url: String,
    pub admin_api_key: Secret<String>,
    pub api_version: String,
    pub timeout_milliseconds: u64,
}

impl GhostSettings {
    pub fn client(&self) -> Result<GhostClient, anyhow::Error> {
        let base_url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid Ghost base URL: {}", self.base_url))?;
        let admin_key =
            AdminApiKey::parse(self.admin_api_key.expose_secret()).map_err(anyhow::Error::msg)?;

        GhostClient::new(
            base_url,
            admin_key,
            self.api_version.clone(),
            self.timeout(),
        )
        .context("Failed to build Ghost Admin API client")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct RotationSettings {
    /// Slug of the internal tag that pins a post as featured, e.g. `hash-permanent-feature`.
    pub permanent_feature_tag: String,
    #[serde(default = "default_true")]
    pub public_only: bool,
    #[serde(default = "default_featured_count")]
    pub featured_count: usize,
}

#[derive(Deserialize, Clone, Debug)]
pub struct NewsletterSettings {
    pub weekday: Weekday,
    pub title_prefix: String,
    pub tag: String,
    pub image_count: usize,
    pub recent_post_count: u32,
    /// Matched case-insensitively as a substring of the Ghost newsletter name.
    pub newsletter_name: String,
    pub email_segment: String,
    #[serde(default)]
    pub email_only: bool,
    #[serde(default)]
    pub body_format: BodyFormat,
}

fn default_true() -> bool {
    true
}

fn default_featured_count() -> usize {
    1
}

pub fn get_config() -> Result<Configuration, config::ConfigError> {
    // Layering: config.yaml, then APP_* variables, then the conventional
    // variables a serverless host exposes.
    let configs = config::Config::builder()
        .add_source(config::File::new("config.yaml", config::FileFormat::Yaml))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .set_override_option("ghost.base_url", std::env::var("GHOST_ADMIN_URL").ok())?
        .set_override_option("ghost.admin_api_key", std::env::var("GHOST_ADMIN_KEY").ok())?
        .set_override_option("application.cron_secret", std::env::var("CRON_SECRET").ok())?
        .set_override_option("application.port", std::env::var("PORT").ok())?
        .build()?;

    configs.try_deserialize::<Configuration>()
}
