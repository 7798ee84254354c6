use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::Parser;
use owo_colors::OwoColorize;
use task_speaks::{ComponentHandle, SpeechConfig, TextToSpeech, ToneRequest, host_engine};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Required interface the keyboard mode observes.
const KEYBOARD_INTERFACE: &str = "Keyboard";
/// Event carrying one typed character.
const KEY_EVENT: &str = "Key";
/// Character that ends keyboard mode.
const QUIT_KEY: char = 'q';
/// Maximum number of bytes read from stdin in text mode.
const STDIN_LIMIT: u64 = 10_000;

/// Speak text, key presses and tones through the host speech engine
///
/// # Examples
///
/// ```no_run
/// // Speak text from command-line arguments
/// // say-what Hello world
///
/// // Speak every key typed, 'q' quits
/// // say-what --keys
///
/// // Play a 440 Hz tone for half a second
/// // say-what --beep 0.5 440 0.8
/// ```
#[derive(Parser, Debug)]
#[command(name = "say-what")]
#[command(about = "Convert text, keys and tones to sound using system TTS", long_about = None)]
#[command(version)]
struct Cli {
    /// Text to speak (reads from stdin if neither text nor --beep is given)
    text: Vec<String>,

    /// Keep only the most recent text and tone of each batch
    #[arg(long)]
    preemptive: bool,

    /// Speak every character typed on stdin, 'q' quits
    #[arg(long, conflicts_with = "text")]
    keys: bool,

    /// Play a tone
    #[arg(
        long,
        num_args = 3,
        value_names = ["DURATION", "FREQUENCY", "AMPLITUDE"],
        allow_negative_numbers = true
    )]
    beep: Option<Vec<f64>>,

    /// Shell template for speech, `%s` is replaced by the text
    #[arg(long, value_name = "TEMPLATE")]
    text_command: Option<String>,

    /// Shell template for tones with {duration}, {frequency} and {amplitude}
    #[arg(long, value_name = "TEMPLATE")]
    tone_command: Option<String>,

    /// JSON configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Joins multiple arguments into a single string with spaces
fn join_args(args: Vec<String>) -> String {
    args.join(" ")
}

fn init_tracing(verbose: u8) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "info,task_speaks=info".to_string(),
            2 => "info,task_speaks=debug".to_string(),
            _ => "debug,task_speaks=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

/// Defaults, then the config file, then the environment, then flags.
fn load_config(cli: &Cli) -> Result<SpeechConfig, task_speaks::SpeechError> {
    let mut config = match &cli.config {
        Some(path) => SpeechConfig::from_file(path)?,
        None => SpeechConfig::default(),
    }
    .with_env_overrides()?;

    if cli.preemptive {
        config = config.with_preemptive(true);
    }
    if let Some(template) = &cli.text_command {
        config = config.with_text_command(template.clone());
    }
    if let Some(template) = &cli.tone_command {
        config = config.with_tone_command(template.clone());
    }
    Ok(config)
}

/// Reads text from stdin with a 10,000 byte limit
async fn read_from_stdin() -> io::Result<String> {
    let mut buffer = Vec::new();
    tokio::io::stdin()
        .take(STDIN_LIMIT)
        .read_to_end(&mut buffer)
        .await?;
    Ok(decode_input(&buffer).trim().to_string())
}

/// Decode stdin bytes, dropping a character cut in half by the read limit.
/// Other invalid UTF-8 is replaced.
fn decode_input(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) if e.error_len().is_none() => {
            String::from_utf8_lossy(&bytes[..e.valid_up_to()]).into_owned()
        }
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Forward every typed character as a "Key" event until 'q' or end of input.
async fn feed_keys(handle: &ComponentHandle) -> io::Result<()> {
    if io::stderr().is_terminal() {
        eprintln!(
            "{}",
            "Hit 'q' then Enter to quit. Any other key triggers text to speech.".dimmed()
        );
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        for key in line.chars() {
            if key == QUIT_KEY {
                return Ok(());
            }
            handle.emit_event(KEYBOARD_INTERFACE, KEY_EVENT, key);
        }
    }
    Ok(())
}

async fn feed(
    handle: ComponentHandle,
    keys: bool,
    text: Vec<String>,
    beep: Option<Vec<f64>>,
) -> io::Result<()> {
    if keys {
        return feed_keys(&handle).await;
    }

    let tone = beep.and_then(|values| match values[..] {
        [duration, frequency, amplitude] => Some(ToneRequest::new(duration, frequency, amplitude)),
        _ => None,
    });

    let message = if !text.is_empty() {
        Some(join_args(text))
    } else if tone.is_none() {
        let message = read_from_stdin().await?;
        if message.is_empty() {
            eprintln!("Error: No input provided");
            eprintln!("Usage: say-what <text> or echo \"text\" | say-what");
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "no input provided"));
        }
        Some(message)
    } else {
        None
    };

    if let Some(tone) = tone {
        handle.beep(tone);
    }
    if let Some(message) = message {
        handle.string_to_speech(message);
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    tracing::debug!(?config, "Configuration loaded");
    let engine = host_engine(&config)?;
    let (component, handle) = TextToSpeech::new(engine, &config);
    let mut component = component.with_name(env!("CARGO_PKG_NAME"));
    if cli.keys {
        component.add_interface_required_for_event_character(KEYBOARD_INTERFACE, KEY_EVENT);
    }

    let (_component, fed) = tokio::join!(
        component.run(),
        feed(handle, cli.keys, cli.text, cli.beep)
    );
    fed?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_args_multi_word() {
        let args = vec!["Hello".to_string(), "world".to_string()];
        assert_eq!(join_args(args), "Hello world");
    }

    #[test]
    fn test_join_args_empty() {
        let args: Vec<String> = vec![];
        assert_eq!(join_args(args), "");
    }

    #[test]
    fn test_decode_input_drops_split_character() {
        let mut bytes = vec![b'a'; 9_999];
        bytes.extend_from_slice(&"é".as_bytes()[..1]);
        assert_eq!(decode_input(&bytes), "a".repeat(9_999));
    }

    #[test]
    fn test_decode_input_keeps_complete_text() {
        assert_eq!(decode_input("café ok".as_bytes()), "café ok");
        assert_eq!(decode_input(b"bad \xFF byte"), "bad \u{FFFD} byte");
    }

    #[test]
    fn test_cli_parses_beep() {
        let cli = Cli::try_parse_from(["say-what", "--beep", "0.5", "440", "0.8"]).unwrap();
        assert_eq!(cli.beep, Some(vec![0.5, 440.0, 0.8]));
        assert!(cli.text.is_empty());
    }

    #[test]
    fn test_cli_rejects_short_beep() {
        assert!(Cli::try_parse_from(["say-what", "--beep", "0.5", "440"]).is_err());
    }

    #[test]
    fn test_cli_keys_conflicts_with_text() {
        assert!(Cli::try_parse_from(["say-what", "--keys", "hello"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "say-what",
            "--preemptive",
            "--text-command",
            "flite -t \"%s\"",
            "hi",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();
        assert!(config.preemptive);
        assert_eq!(config.text_command.as_deref(), Some("flite -t \"%s\""));
    }
}
