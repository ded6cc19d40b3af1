//! Runtime settings.
//!
//! Settings come from the optional `config/outreach.json` file, overridden by
//! environment variables. Credentials are only read from the environment.
//! Resolution is a pure function of the file contents and an env lookup so it
//! can be tested without touching the process environment.
use crate::error::{OutreachError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_LM_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LM_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_LM_TEMPERATURE: f32 = 0.8;
pub const DEFAULT_SEND_DELAY_MS: u64 = 2000;

/// Pack-owned settings file. Unknown keys are rejected so typos surface early.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    #[serde(default)]
    pub lm_command: Option<String>,
    #[serde(default)]
    pub lm_base_url: Option<String>,
    #[serde(default)]
    pub lm_model: Option<String>,
    #[serde(default)]
    pub lm_temperature: Option<f32>,
    #[serde(default)]
    pub from_email: Option<String>,
    #[serde(default)]
    pub from_name: Option<String>,
    #[serde(default)]
    pub send_delay_ms: Option<u64>,
}

/// Model backend settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LmSettings {
    pub command: Option<String>,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutreachConfig {
    pub lm: LmSettings,
    pub resend_api_key: Option<String>,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
    pub send_delay_ms: u64,
}

/// Read `config/outreach.json` if present.
pub fn load_settings_file(path: &Path) -> Result<Option<SettingsFile>> {
    if !path.is_file() {
        return Ok(None);
    }
    let bytes = fs::read(path).map_err(|err| OutreachError::io(path, err))?;
    let settings = serde_json::from_slice(&bytes).map_err(|err| OutreachError::json(path, err))?;
    Ok(Some(settings))
}

/// Load settings from the file at `path` and the process environment.
pub fn load_config(path: &Path) -> Result<OutreachConfig> {
    let file = load_settings_file(path)?;
    resolve_config(file.unwrap_or_default(), |key| std::env::var(key).ok())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Merge file settings with environment overrides.
pub fn resolve_config<F>(file: SettingsFile, env: F) -> Result<OutreachConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| non_empty(env(key));

    let temperature = match lookup("OUTREACH_LM_TEMPERATURE") {
        Some(raw) => raw.parse::<f32>().map_err(|err| {
            OutreachError::Configuration(format!("OUTREACH_LM_TEMPERATURE {raw:?}: {err}"))
        })?,
        None => file.lm_temperature.unwrap_or(DEFAULT_LM_TEMPERATURE),
    };
    if !(0.0..=2.0).contains(&temperature) {
        return Err(OutreachError::Configuration(format!(
            "lm temperature must be between 0 and 2 (got {temperature})"
        )));
    }

    Ok(OutreachConfig {
        lm: LmSettings {
            command: lookup("OUTREACH_LM_COMMAND").or_else(|| non_empty(file.lm_command)),
            api_key: lookup("OPENAI_API_KEY"),
            base_url: lookup("OUTREACH_LM_BASE_URL")
                .or_else(|| non_empty(file.lm_base_url))
                .unwrap_or_else(|| DEFAULT_LM_BASE_URL.to_string()),
            model: lookup("OUTREACH_LM_MODEL")
                .or_else(|| non_empty(file.lm_model))
                .unwrap_or_else(|| DEFAULT_LM_MODEL.to_string()),
            temperature,
        },
        resend_api_key: lookup("RESEND_API_KEY"),
        from_email: lookup("OUTREACH_FROM_EMAIL").or_else(|| non_empty(file.from_email)),
        from_name: lookup("OUTREACH_FROM_NAME").or_else(|| non_empty(file.from_name)),
        send_delay_ms: file.send_delay_ms.unwrap_or(DEFAULT_SEND_DELAY_MS),
    })
}
