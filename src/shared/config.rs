//! Application configuration. Backend endpoint, session, pacing of the simulated stages.

use crate::usecases::editing::EditingPlan;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_SESSION_ID: &str = "default";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Chat backend root. Read from DRAMA_STUDIO_API_BASE_URL, then API_BASE_URL / VITE_API_BASE_URL.
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Backend session id. Read from DRAMA_STUDIO_SESSION_ID.
    #[serde(default)]
    pub session_id: Option<String>,

    /// Pause in ms before a new artifact is revealed. Read from DRAMA_STUDIO_ARTIFACT_DELAY_MS.
    #[serde(default)]
    pub artifact_delay_ms: Option<u64>,

    /// Per-request timeout in seconds. Read from DRAMA_STUDIO_REQUEST_TIMEOUT_SECS.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    // ─────────────────────────────────────────────────────────────────────────
    // Editing simulation
    // ─────────────────────────────────────────────────────────────────────────
    #[serde(default)]
    pub editing_tick_ms: Option<u64>,
    #[serde(default)]
    pub editing_step_percent: Option<u8>,
    #[serde(default)]
    pub editing_stagger_ms: Option<u64>,
    #[serde(default)]
    pub editing_stage_ms: Option<u64>,

    /// Run against the built-in mock backend. Read from DRAMA_STUDIO_OFFLINE.
    #[serde(default)]
    pub offline: Option<bool>,

    /// Message sent once when the workspace opens. Read from DRAMA_STUDIO_INITIAL_MESSAGE.
    #[serde(default)]
    pub initial_message: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("DRAMA_STUDIO").try_parsing(true));
        if let Ok(path) = std::env::var("DRAMA_STUDIO_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        let mut cfg: Self = c.build()?.try_deserialize()?;
        // API_BASE_URL / VITE_API_BASE_URL are read directly so the web frontend's .env works as-is
        if cfg.api_base_url.is_none() {
            cfg.api_base_url = ["API_BASE_URL", "VITE_API_BASE_URL"]
                .iter()
                .find_map(|key| std::env::var(key).ok())
                .filter(|url| !url.trim().is_empty());
        }
        Ok(cfg)
    }

    /// Returns the backend root URL. Defaults to http://localhost:8000.
    pub fn api_base_url_or_default(&self) -> String {
        self.api_base_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }

    /// Returns the session id. Defaults to "default".
    pub fn session_id_or_default(&self) -> String {
        self.session_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SESSION_ID.to_string())
    }

    /// Returns the artifact reveal delay. Defaults to 1000 ms.
    pub fn artifact_delay(&self) -> Duration {
        Duration::from_millis(self.artifact_delay_ms.unwrap_or(1000))
    }

    /// Returns the request timeout. Defaults to 60 s; 0 is treated as unset.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.filter(|s| *s > 0).unwrap_or(60))
    }

    pub fn is_offline(&self) -> bool {
        self.offline.unwrap_or(false)
    }

    /// Returns the initial message if one is set and not blank.
    pub fn initial_message(&self) -> Option<&str> {
        self.initial_message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }

    /// Timer settings for the editing run; unset or zero values use the defaults.
    pub fn editing_plan(&self) -> EditingPlan {
        let defaults = EditingPlan::default();
        let ms = |v: Option<u64>, fallback: Duration| {
            v.filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(fallback)
        };
        EditingPlan {
            tick: ms(self.editing_tick_ms, defaults.tick),
            step_percent: self
                .editing_step_percent
                .filter(|p| (1..=100).contains(p))
                .unwrap_or(defaults.step_percent),
            stagger: ms(self.editing_stagger_ms, defaults.stagger),
            stage_every: ms(self.editing_stage_ms, defaults.stage_every),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.api_base_url_or_default(), DEFAULT_API_BASE_URL);
        assert_eq!(cfg.session_id_or_default(), DEFAULT_SESSION_ID);
        assert_eq!(cfg.artifact_delay(), Duration::from_millis(1000));
        assert_eq!(cfg.request_timeout(), Duration::from_secs(60));
        assert!(!cfg.is_offline());
        assert_eq!(cfg.initial_message(), None);

        let plan = cfg.editing_plan();
        assert_eq!(plan.tick, Duration::from_millis(200));
        assert_eq!(plan.step_percent, 2);
        assert_eq!(plan.stagger, Duration::from_millis(2000));
        assert_eq!(plan.stage_every, Duration::from_millis(4000));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let cfg = AppConfig {
            api_base_url: Some("  ".to_string()),
            request_timeout_secs: Some(0),
            editing_step_percent: Some(0),
            editing_tick_ms: Some(0),
            initial_message: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(cfg.api_base_url_or_default(), DEFAULT_API_BASE_URL);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(60));
        assert_eq!(cfg.editing_plan().step_percent, 2);
        assert_eq!(cfg.editing_plan().tick, Duration::from_millis(200));
        assert_eq!(cfg.initial_message(), None);
    }

    #[test]
    fn test_overrides() {
        let cfg = AppConfig {
            editing_step_percent: Some(10),
            editing_stage_ms: Some(500),
            artifact_delay_ms: Some(0),
            offline: Some(true),
            initial_message: Some(" 今日排行榜 ".to_string()),
            ..Default::default()
        };
        assert_eq!(cfg.editing_plan().step_percent, 10);
        assert_eq!(cfg.editing_plan().stage_every, Duration::from_millis(500));
        assert!(cfg.artifact_delay().is_zero());
        assert!(cfg.is_offline());
        assert_eq!(cfg.initial_message(), Some("今日排行榜"));
    }
}
