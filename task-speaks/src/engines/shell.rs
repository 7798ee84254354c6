//! Shell command engine.
//!
//! Renders requests into a shell command line from a fixed template and runs
//! it with `sh -c`, waiting for the command to finish.

use std::process::Stdio;

use tracing::{debug, trace, warn};

use crate::config::SpeechConfig;
use crate::errors::SpeechError;
use crate::traits::SpeechEngine;
use crate::types::ToneRequest;

/// Substitution point for the request text.
const TEXT_PLACEHOLDER: &str = "%s";
const DURATION_PLACEHOLDER: &str = "{duration}";
const FREQUENCY_PLACEHOLDER: &str = "{frequency}";
const AMPLITUDE_PLACEHOLDER: &str = "{amplitude}";

// ============================================================================
// Platform Defaults
// ============================================================================

/// Text template for macOS.
#[cfg(target_os = "macos")]
const DEFAULT_TEXT_TEMPLATE: &str = "say \"%s\"";

/// macOS has no tone command.
#[cfg(target_os = "macos")]
const DEFAULT_TONE_TEMPLATE: Option<&str> = None;

/// Text template for Linux. Most `sh` implementations of `echo` expand
/// backslash escapes such as `\n` in the text before `espeak` sees it.
#[cfg(target_os = "linux")]
const DEFAULT_TEXT_TEMPLATE: &str = "echo \"%s\" | espeak -s120 -k20";

/// Tone template for Linux, sox `play` on the ALSA device.
#[cfg(target_os = "linux")]
const DEFAULT_TONE_TEMPLATE: Option<&str> =
    Some("play -q -n -t alsa synth {duration} sine {frequency} vol {amplitude}");

/// Text template for other platforms.
#[cfg(not(any(target_os = "macos", target_os = "linux")))]
const DEFAULT_TEXT_TEMPLATE: &str = "flite -t \"%s\"";

/// Tone template for other platforms, sox `play` on the default device.
#[cfg(not(any(target_os = "macos", target_os = "linux")))]
const DEFAULT_TONE_TEMPLATE: Option<&str> =
    Some("play -q -n synth {duration} sine {frequency} vol {amplitude}");

// ============================================================================
// Templates
// ============================================================================

/// A shell command line with a single `%s` substitution point for the text.
///
/// The placeholder is expected to sit inside double quotes. The substituted
/// text is escaped for that context so it always stays one argument.
///
/// ## Examples
///
/// ```
/// use task_speaks::engines::EngineCommandTemplate;
///
/// let template = EngineCommandTemplate::new("say \"%s\"").unwrap();
/// assert_eq!(template.render("hello"), "say \"hello\"");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommandTemplate {
    template: String,
}

impl EngineCommandTemplate {
    /// Parse a template.
    ///
    /// ## Errors
    ///
    /// Returns `SpeechError::InvalidTemplate` unless the template contains
    /// exactly one `%s`.
    pub fn new(template: impl Into<String>) -> Result<Self, SpeechError> {
        let template = template.into();
        match template.matches(TEXT_PLACEHOLDER).count() {
            1 => Ok(Self { template }),
            0 => Err(SpeechError::InvalidTemplate {
                template,
                reason: "missing %s placeholder",
            }),
            _ => Err(SpeechError::InvalidTemplate {
                template,
                reason: "more than one %s placeholder",
            }),
        }
    }

    /// The template this platform uses when nothing is configured.
    pub fn host_default() -> Self {
        Self {
            template: DEFAULT_TEXT_TEMPLATE.to_string(),
        }
    }

    /// Substitute `text` into the template.
    pub fn render(&self, text: &str) -> String {
        self.template
            .replacen(TEXT_PLACEHOLDER, &escape_double_quoted(text), 1)
    }

    /// The raw template.
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Executables invoked by the template, one per pipeline stage.
    pub fn programs(&self) -> Vec<&str> {
        programs_in(&self.template)
    }
}

/// A shell command line for tones with `{duration}`, `{frequency}` and
/// `{amplitude}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToneCommandTemplate {
    template: String,
}

impl ToneCommandTemplate {
    /// Parse a template.
    ///
    /// ## Errors
    ///
    /// Returns `SpeechError::InvalidTemplate` if any placeholder is missing.
    pub fn new(template: impl Into<String>) -> Result<Self, SpeechError> {
        let template = template.into();
        let missing = [
            (DURATION_PLACEHOLDER, "missing {duration} placeholder"),
            (FREQUENCY_PLACEHOLDER, "missing {frequency} placeholder"),
            (AMPLITUDE_PLACEHOLDER, "missing {amplitude} placeholder"),
        ]
        .into_iter()
        .find(|(placeholder, _)| !template.contains(placeholder));

        match missing {
            Some((_, reason)) => Err(SpeechError::InvalidTemplate { template, reason }),
            None => Ok(Self { template }),
        }
    }

    /// The tone template this platform uses, if it has one.
    pub fn host_default() -> Option<Self> {
        DEFAULT_TONE_TEMPLATE.map(|template| Self {
            template: template.to_string(),
        })
    }

    /// Substitute the tone values into the template.
    pub fn render(&self, tone: ToneRequest) -> String {
        self.template
            .replace(DURATION_PLACEHOLDER, &tone.duration.to_string())
            .replace(FREQUENCY_PLACEHOLDER, &tone.frequency.to_string())
            .replace(AMPLITUDE_PLACEHOLDER, &tone.amplitude.to_string())
    }

    /// Executables invoked by the template, one per pipeline stage.
    pub fn programs(&self) -> Vec<&str> {
        programs_in(&self.template)
    }
}

/// Escape the characters that keep their meaning inside double quotes.
fn escape_double_quoted(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// First word of each `|`, `;` or `&` separated stage, skipping anything
/// that is a placeholder, quoted, a redirection or a bare number.
///
/// An `&` right after `>` or `<` is part of a redirection such as `>&2`.
fn programs_in(template: &str) -> Vec<&str> {
    let mut stages = Vec::new();
    let mut start = 0;
    let mut previous = None;
    for (i, c) in template.char_indices() {
        let redirection = c == '&' && matches!(previous, Some('>' | '<'));
        if matches!(c, '|' | ';' | '&') && !redirection {
            stages.push(&template[start..i]);
            start = i + c.len_utf8();
        }
        previous = Some(c);
    }
    stages.push(&template[start..]);

    stages
        .into_iter()
        .filter_map(|stage| stage.split_whitespace().next())
        .filter(|word| {
            !word.contains(TEXT_PLACEHOLDER)
                && !word.starts_with(['"', '\'', '{', '>', '<'])
                && !word.bytes().all(|b| b.is_ascii_digit())
        })
        .collect()
}

// ============================================================================
// Engine
// ============================================================================

/// Speech engine backed by command line tools (`say`, `espeak`, `flite`,
/// `play`).
///
/// ## Examples
///
/// ```ignore
/// use task_speaks::engines::ShellEngine;
/// use task_speaks::SpeechEngine;
///
/// let mut engine = ShellEngine::host_default();
/// engine.speak("Hello, world!").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ShellEngine {
    text: EngineCommandTemplate,
    tone: Option<ToneCommandTemplate>,
}

impl ShellEngine {
    /// Engine name used in log records.
    const ENGINE_NAME: &'static str = "shell";

    /// Create an engine from explicit templates.
    pub fn new(text: EngineCommandTemplate, tone: Option<ToneCommandTemplate>) -> Self {
        Self { text, tone }
    }

    /// Create an engine with this platform's default templates.
    pub fn host_default() -> Self {
        Self::new(
            EngineCommandTemplate::host_default(),
            ToneCommandTemplate::host_default(),
        )
    }

    /// Create an engine from a configuration, falling back to the platform
    /// defaults for templates that are not set.
    ///
    /// ## Errors
    ///
    /// Returns `SpeechError::InvalidTemplate` if a configured template is
    /// malformed.
    pub fn from_config(config: &SpeechConfig) -> Result<Self, SpeechError> {
        let text = match &config.text_command {
            Some(template) => EngineCommandTemplate::new(template.clone())?,
            None => EngineCommandTemplate::host_default(),
        };
        let tone = match &config.tone_command {
            Some(template) => Some(ToneCommandTemplate::new(template.clone())?),
            None => ToneCommandTemplate::host_default(),
        };
        Ok(Self::new(text, tone))
    }

    /// The text template in use.
    pub fn text_template(&self) -> &EngineCommandTemplate {
        &self.text
    }

    /// The tone template in use, if any.
    pub fn tone_template(&self) -> Option<&ToneCommandTemplate> {
        self.tone.as_ref()
    }

    async fn run(command: &str) -> Result<(), SpeechError> {
        debug!(engine = Self::ENGINE_NAME, command = command, "Running command");

        let output = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| SpeechError::ProcessSpawnFailed {
                command: command.to_string(),
                source: e,
            })?;

        if output.status.success() {
            trace!(engine = Self::ENGINE_NAME, command = command, "Command finished");
            Ok(())
        } else {
            Err(SpeechError::ProcessFailed {
                command: command.to_string(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl Default for ShellEngine {
    fn default() -> Self {
        Self::host_default()
    }
}

impl SpeechEngine for ShellEngine {
    fn name(&self) -> &str {
        Self::ENGINE_NAME
    }

    /// Probe the template programs. Missing programs are only reported,
    /// the engine still tries to run them.
    fn startup(&mut self) -> Result<(), SpeechError> {
        let tone_programs = self.tone.as_ref().map(|t| t.programs()).unwrap_or_default();
        for program in self.text.programs().into_iter().chain(tone_programs) {
            if which::which(program).is_err() {
                warn!(
                    engine = Self::ENGINE_NAME,
                    program = program,
                    "Program not found on PATH"
                );
            }
        }
        Ok(())
    }

    async fn speak(&mut self, text: &str) -> Result<(), SpeechError> {
        Self::run(&self.text.render(text)).await
    }

    async fn beep(&mut self, tone: ToneRequest) -> Result<(), SpeechError> {
        match &self.tone {
            Some(template) => Self::run(&template.render(tone)).await,
            None => {
                warn!(
                    engine = Self::ENGINE_NAME,
                    duration = tone.duration,
                    frequency = tone.frequency,
                    amplitude = tone.amplitude,
                    "Tone rendering not implemented on this platform"
                );
                Ok(())
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
