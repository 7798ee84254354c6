/// Errors that can occur while registering interfaces, dispatching
/// requests or invoking a speech engine.
///
/// None of these are fatal to the component: callers log them and keep
/// running with the affected feature degraded.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    /// A provided interface with this name is already registered.
    #[error("provided interface \"{interface}\" already exists")]
    InterfaceExists {
        /// Name of the interface.
        interface: String,
    },

    /// A command with this name is already registered on the interface.
    #[error("command \"{command}\" already exists on interface \"{interface}\"")]
    CommandExists {
        /// Name of the interface.
        interface: String,
        /// Name of the command.
        command: String,
    },

    /// No interface with this name is registered.
    #[error("unknown interface \"{interface}\"")]
    UnknownInterface {
        /// Name of the interface.
        interface: String,
    },

    /// The interface exists but does not provide the command.
    #[error("interface \"{interface}\" has no command \"{command}\"")]
    UnknownCommand {
        /// Name of the interface.
        interface: String,
        /// Name of the command.
        command: String,
    },

    /// The required interface has no handler for the event.
    #[error("interface \"{interface}\" has no handler for event \"{event}\"")]
    UnknownEvent {
        /// Name of the interface.
        interface: String,
        /// Name of the event.
        event: String,
    },

    /// A command or event carried a payload of the wrong kind.
    #[error("{handler} expects a {expected} payload, got {found}")]
    PayloadMismatch {
        /// Name of the handler that rejected the payload.
        handler: &'static str,
        /// Payload kind the handler accepts.
        expected: &'static str,
        /// Payload kind that was received.
        found: &'static str,
    },

    /// The speech engine could not be initialized.
    #[error("{engine} initialization failed")]
    EngineInitFailed {
        /// Name of the engine.
        engine: String,
        /// The underlying error from the platform.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The engine failed to start earlier and cannot render speech.
    #[error("{engine} is not available")]
    EngineUnavailable {
        /// Name of the engine.
        engine: String,
    },

    /// The platform speech API rejected a request.
    #[error("{engine} failed to speak")]
    SpeechFailed {
        /// Name of the engine.
        engine: String,
        /// The underlying error from the platform.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A command template is missing its substitution point.
    #[error("invalid command template \"{template}\": {reason}")]
    InvalidTemplate {
        /// The rejected template.
        template: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The shell process could not be started.
    #[error("failed to spawn \"{command}\"")]
    ProcessSpawnFailed {
        /// The rendered command line.
        command: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The shell process ran but did not exit successfully.
    #[error("\"{command}\" exited with {}: {stderr}", describe_status(.status))]
    ProcessFailed {
        /// The rendered command line.
        command: String,
        /// Exit code, `None` when the process was killed by a signal.
        status: Option<i32>,
        /// Captured standard error output.
        stderr: String,
    },

    /// A configuration file could not be read.
    #[error("failed to read configuration {path}")]
    ConfigRead {
        /// Path of the file.
        path: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration file is not valid JSON for [`crate::SpeechConfig`].
    #[error("failed to parse configuration {path}")]
    ConfigParse {
        /// Path of the file.
        path: String,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// An environment override holds a value that cannot be used.
    #[error("invalid value \"{value}\" for {var}")]
    InvalidEnvValue {
        /// Name of the environment variable.
        var: &'static str,
        /// The rejected value.
        value: String,
    },
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}
