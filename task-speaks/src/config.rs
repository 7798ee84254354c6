//! Component configuration.
//!
//! Values are layered: defaults, then an optional JSON file, then
//! environment overrides, then whatever the caller sets with the builder
//! methods.
//!
//! ## Environment Variable Overrides
//!
//! - `SPEECH_PREEMPTIVE` - `true`/`false` (also `1`/`0`, `yes`/`no`, `on`/`off`)
//! - `SPEECH_TEXT_COMMAND` - shell template with a `%s` placeholder
//! - `SPEECH_TONE_COMMAND` - shell template with `{duration}`, `{frequency}`
//!   and `{amplitude}` placeholders

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::SpeechError;

/// Environment variable for the initial preemptive mode.
pub const ENV_PREEMPTIVE: &str = "SPEECH_PREEMPTIVE";
/// Environment variable for the text command template.
pub const ENV_TEXT_COMMAND: &str = "SPEECH_TEXT_COMMAND";
/// Environment variable for the tone command template.
pub const ENV_TONE_COMMAND: &str = "SPEECH_TONE_COMMAND";

/// Default volume for the platform speech API (0-100).
const DEFAULT_VOLUME: u16 = 100;

/// Configuration for a [`TextToSpeech`](crate::TextToSpeech) component.
///
/// ## Examples
///
/// ```
/// use task_speaks::SpeechConfig;
///
/// let config = SpeechConfig::default()
///     .with_preemptive(true)
///     .with_text_command("espeak \"%s\"");
/// assert!(config.preemptive);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Start in preemptive mode.
    pub preemptive: bool,
    /// Replaces the platform text template when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_command: Option<String>,
    /// Replaces the platform tone template when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone_command: Option<String>,
    /// Volume used by the platform speech API.
    pub volume: u16,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            preemptive: false,
            text_command: None,
            tone_command: None,
            volume: DEFAULT_VOLUME,
        }
    }
}

impl SpeechConfig {
    /// Load a configuration from a JSON file.
    ///
    /// Missing fields keep their defaults.
    ///
    /// ## Errors
    ///
    /// Returns `SpeechError::ConfigRead` if the file cannot be read and
    /// `SpeechError::ConfigParse` if it is not valid JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SpeechError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SpeechError::ConfigRead {
            path: path.display().to_string(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| SpeechError::ConfigParse {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Apply overrides from the process environment.
    ///
    /// ## Errors
    ///
    /// Returns `SpeechError::InvalidEnvValue` if `SPEECH_PREEMPTIVE` is
    /// not a recognizable boolean.
    pub fn with_env_overrides(self) -> Result<Self, SpeechError> {
        self.with_overrides_from(|var| std::env::var(var).ok())
    }

    /// Apply overrides using `lookup` to resolve variable names.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self, SpeechError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_PREEMPTIVE) {
            self.preemptive = parse_bool(&value).ok_or(SpeechError::InvalidEnvValue {
                var: ENV_PREEMPTIVE,
                value,
            })?;
        }
        if let Some(value) = lookup(ENV_TEXT_COMMAND).filter(|v| !v.trim().is_empty()) {
            tracing::debug!(template = %value, "text command overridden from environment");
            self.text_command = Some(value);
        }
        if let Some(value) = lookup(ENV_TONE_COMMAND).filter(|v| !v.trim().is_empty()) {
            tracing::debug!(template = %value, "tone command overridden from environment");
            self.tone_command = Some(value);
        }
        Ok(self)
    }

    /// Set the initial preemptive mode.
    #[must_use]
    pub fn with_preemptive(mut self, preemptive: bool) -> Self {
        self.preemptive = preemptive;
        self
    }

    /// Use a custom text command template.
    #[must_use]
    pub fn with_text_command(mut self, template: impl Into<String>) -> Self {
        self.text_command = Some(template.into());
        self
    }

    /// Use a custom tone command template.
    #[must_use]
    pub fn with_tone_command(mut self, template: impl Into<String>) -> Self {
        self.tone_command = Some(template.into());
        self
    }

    /// Set the speech API volume, clamped to 100.
    #[must_use]
    pub fn with_volume(mut self, volume: u16) -> Self {
        self.volume = volume.min(100);
        self
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn lookup_in(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SpeechConfig::default();
        assert!(!config.preemptive);
        assert_eq!(config.text_command, None);
        assert_eq!(config.tone_command, None);
        assert_eq!(config.volume, 100);
    }

    #[test]
    fn test_from_file_with_partial_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "preemptive": true, "text_command": "flite -t \"%s\"" }}"#).unwrap();

        let config = SpeechConfig::from_file(file.path()).unwrap();
        assert!(config.preemptive);
        assert_eq!(config.text_command.as_deref(), Some("flite -t \"%s\""));
        assert_eq!(config.volume, 100);
    }

    #[test]
    fn test_from_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = SpeechConfig::from_file(dir.path().join("nope.json"));
        assert!(matches!(result, Err(SpeechError::ConfigRead { .. })));
    }

    #[test]
    fn test_from_file_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "preemptive = true").unwrap();
        let result = SpeechConfig::from_file(file.path());
        assert!(matches!(result, Err(SpeechError::ConfigParse { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let config = SpeechConfig::default()
            .with_overrides_from(lookup_in(&[
                (ENV_PREEMPTIVE, "yes"),
                (ENV_TEXT_COMMAND, "say \"%s\""),
                (ENV_TONE_COMMAND, "play -n synth {duration} sine {frequency} vol {amplitude}"),
            ]))
            .unwrap();
        assert!(config.preemptive);
        assert_eq!(config.text_command.as_deref(), Some("say \"%s\""));
        assert!(config.tone_command.is_some());
    }

    #[test]
    fn test_blank_env_command_is_ignored() {
        let config = SpeechConfig::default()
            .with_text_command("espeak \"%s\"")
            .with_overrides_from(lookup_in(&[(ENV_TEXT_COMMAND, "   ")]))
            .unwrap();
        assert_eq!(config.text_command.as_deref(), Some("espeak \"%s\""));
    }

    #[test]
    fn test_invalid_preemptive_env() {
        let result =
            SpeechConfig::default().with_overrides_from(lookup_in(&[(ENV_PREEMPTIVE, "maybe")]));
        assert!(matches!(
            result,
            Err(SpeechError::InvalidEnvValue { var: ENV_PREEMPTIVE, .. })
        ));
    }

    #[test]
    fn test_volume_is_clamped() {
        assert_eq!(SpeechConfig::default().with_volume(250).volume, 100);
        assert_eq!(SpeechConfig::default().with_volume(40).volume, 40);
    }
}
