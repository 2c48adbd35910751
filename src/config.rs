use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::types::OnboardingAnswers;
use crate::util::normalize_ja_nej;

const DEFAULT_API_URL: &str = "http://localhost:10000";
const CHAT_PATH: &str = "/api/chat";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const MIN_TIMEOUT_SECS: u64 = 5;
const MAX_TIMEOUT_SECS: u64 = 300;
const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

pub const DEFAULT_USER_NAME: &str = "Användare";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub request_timeout: Duration,
    pub log_path: Option<PathBuf>,
    pub log_level: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        let api_url = env_non_empty("DELEGERING_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let timeout_secs = match env_non_empty("DELEGERING_REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().with_context(|| {
                format!("Invalid DELEGERING_REQUEST_TIMEOUT_SECS '{raw}': expected whole seconds")
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        let log_level = env_non_empty("DELEGERING_LOG_LEVEL")
            .map(|level| level.trim().to_ascii_lowercase())
            .unwrap_or_else(|| "info".to_string());

        Ok(Self {
            api_url: api_url.trim().to_string(),
            request_timeout: Duration::from_secs(
                timeout_secs.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS),
            ),
            log_path: env_non_empty("DELEGERING_LOG_PATH").map(PathBuf::from),
            log_level,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            bail!(
                "Invalid DELEGERING_API_URL '{}': expected http:// or https:// URL",
                self.api_url
            );
        }
        if reqwest::Url::parse(&self.api_url).is_err() {
            bail!("Invalid DELEGERING_API_URL '{}': not a valid URL", self.api_url);
        }
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            bail!(
                "Invalid DELEGERING_LOG_LEVEL '{}': expected one of {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            );
        }
        Ok(())
    }

    /// `{base}/api/chat`; a base that already names the endpoint is kept.
    pub fn chat_endpoint(&self) -> String {
        let base = self.api_url.trim().trim_end_matches('/');
        if base.ends_with(CHAT_PATH) {
            base.to_string()
        } else {
            format!("{base}{CHAT_PATH}")
        }
    }
}

/// Who is chatting and how they answered onboarding. Built once at start-up
/// and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    pub user_name: String,
    pub onboarding_answers: OnboardingAnswers,
    pub has_started: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_name: DEFAULT_USER_NAME.to_string(),
            onboarding_answers: OnboardingAnswers::default(),
            has_started: false,
        }
    }
}

impl SessionConfig {
    /// Profile file from `DELEGERING_PROFILE` (if any), overlaid by the
    /// individual environment variables.
    pub fn load() -> Result<Self> {
        let base = match env_non_empty("DELEGERING_PROFILE") {
            Some(path) => Self::load_from(Path::new(&path))?,
            None => Self::default(),
        };
        base.with_env_overrides()
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read profile '{}'", path.display()))?;
        let profile: Self = serde_json::from_str(&raw)
            .with_context(|| format!("cannot parse profile '{}'", path.display()))?;
        profile.normalized()
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("cannot write profile '{}'", path.display()))
    }

    /// Name and both onboarding answers given, started flag set.
    pub fn started(user_name: &str, underskoterska: &str, delegering: &str) -> Result<Self> {
        Self {
            user_name: user_name.to_string(),
            onboarding_answers: OnboardingAnswers {
                underskoterska: underskoterska.to_string(),
                delegering: delegering.to_string(),
            },
            has_started: true,
        }
        .normalized()
    }

    fn with_env_overrides(mut self) -> Result<Self> {
        let mut overridden = false;
        if let Some(name) = env_non_empty("DELEGERING_USER_NAME") {
            self.user_name = name;
            overridden = true;
        }
        if let Some(answer) = env_non_empty("DELEGERING_UNDERSKOTERSKA") {
            self.onboarding_answers.underskoterska = answer;
            overridden = true;
        }
        if let Some(answer) = env_non_empty("DELEGERING_DELEGERING") {
            self.onboarding_answers.delegering = answer;
            overridden = true;
        }
        if overridden {
            self.has_started = true;
        }
        self.normalized()
    }

    fn normalized(mut self) -> Result<Self> {
        self.user_name = self.user_name.trim().to_string();
        if self.user_name.is_empty() {
            self.user_name = DEFAULT_USER_NAME.to_string();
        }
        self.onboarding_answers.underskoterska =
            normalize_answer("underskoterska", &self.onboarding_answers.underskoterska)?;
        self.onboarding_answers.delegering =
            normalize_answer("delegering", &self.onboarding_answers.delegering)?;
        Ok(self)
    }
}

fn normalize_answer(field: &str, value: &str) -> Result<String> {
    match normalize_ja_nej(value) {
        Some(answer) => Ok(answer.to_string()),
        None => bail!("Invalid onboarding answer for {field}: '{value}' (expected ja or nej)"),
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
