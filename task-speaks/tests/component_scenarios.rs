use std::sync::{Arc, Mutex};

use task_speaks::{
    ButtonEvent, ButtonTransition, EngineCommandTemplate, SpeechConfig, SpeechEngine, SpeechError,
    ShellEngine, TextToSpeech, ToneCommandTemplate, ToneRequest,
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Startup,
    Speak(String),
    Beep(ToneRequest),
    Shutdown,
}

/// Records every call; optionally refuses to start like a missing COM server.
#[derive(Debug, Clone, Default)]
struct RecordingEngine {
    calls: Arc<Mutex<Vec<Call>>>,
    fail_startup: bool,
}

impl RecordingEngine {
    fn failing_startup() -> Self {
        Self {
            fail_startup: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn spoken(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Speak(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    fn tones(&self) -> Vec<ToneRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Beep(tone) => Some(tone),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl SpeechEngine for RecordingEngine {
    fn name(&self) -> &str {
        "recording"
    }

    fn startup(&mut self) -> Result<(), SpeechError> {
        self.record(Call::Startup);
        if self.fail_startup {
            return Err(SpeechError::EngineInitFailed {
                engine: "recording".into(),
                source: "failed to retrieve CLSID for COM server".into(),
            });
        }
        Ok(())
    }

    async fn speak(&mut self, text: &str) -> Result<(), SpeechError> {
        self.record(Call::Speak(text.to_string()));
        Ok(())
    }

    async fn beep(&mut self, tone: ToneRequest) -> Result<(), SpeechError> {
        self.record(Call::Beep(tone));
        Ok(())
    }

    fn shutdown(&mut self) {
        self.record(Call::Shutdown);
    }
}

// ============================================================================
// Normal mode
// ============================================================================

#[tokio::test]
async fn test_normal_mode_dispatches_each_request_in_order() {
    let engine = RecordingEngine::default();
    let (mut component, handle) = TextToSpeech::new(engine.clone(), &SpeechConfig::default());

    handle.string_to_speech("hello");
    handle.character_to_speech('k');
    handle.string_to_speech("");
    handle.beep(ToneRequest::new(0.5, 440.0, 0.8));
    handle.string_to_speech("world");
    component.tick().await;

    assert_eq!(
        engine.calls(),
        vec![
            Call::Speak("hello".into()),
            Call::Speak("k".into()),
            Call::Speak(String::new()),
            Call::Beep(ToneRequest::new(0.5, 440.0, 0.8)),
            Call::Speak("world".into()),
        ]
    );
}

#[tokio::test]
async fn test_character_and_string_produce_the_same_request() {
    for c in ['a', '7', '?', 'ß', '🙂'] {
        let by_char = RecordingEngine::default();
        let (mut component, handle) = TextToSpeech::new(by_char.clone(), &SpeechConfig::default());
        handle.character_to_speech(c);
        component.tick().await;

        let by_string = RecordingEngine::default();
        let (mut component, handle) =
            TextToSpeech::new(by_string.clone(), &SpeechConfig::default());
        handle.string_to_speech(c.to_string());
        component.tick().await;

        assert_eq!(by_char.calls(), by_string.calls());
    }
}

// ============================================================================
// Preemptive mode
// ============================================================================

#[tokio::test]
async fn test_preemptive_keeps_only_the_last_text() {
    let engine = RecordingEngine::default();
    let config = SpeechConfig::default().with_preemptive(true);
    let (mut component, handle) = TextToSpeech::new(engine.clone(), &config);

    handle.string_to_speech("a");
    handle.string_to_speech("b");
    component.tick().await;

    assert_eq!(engine.spoken(), vec!["b".to_string()]);
}

#[tokio::test]
async fn test_preemptive_with_many_requests_dispatches_once() {
    let engine = RecordingEngine::default();
    let config = SpeechConfig::default().with_preemptive(true);
    let (mut component, handle) = TextToSpeech::new(engine.clone(), &config);

    for i in 0..25 {
        handle.string_to_speech(format!("message {i}"));
        handle.beep(ToneRequest::new(0.1, 100.0 * f64::from(i), 0.5));
    }
    component.tick().await;

    assert_eq!(
        engine.calls(),
        vec![
            Call::Speak("message 24".into()),
            Call::Beep(ToneRequest::new(0.1, 2400.0, 0.5)),
        ]
    );
}

#[tokio::test]
async fn test_preemptive_switched_on_by_command() {
    let engine = RecordingEngine::default();
    let (mut component, handle) = TextToSpeech::new(engine.clone(), &SpeechConfig::default());

    handle.string_to_speech("before");
    handle.set_preemptive(true);
    handle.string_to_speech("first");
    handle.string_to_speech("second");
    component.tick().await;

    assert_eq!(engine.spoken(), vec!["before".to_string(), "second".to_string()]);
}

#[tokio::test]
async fn test_pending_values_do_not_survive_the_tick() {
    let engine = RecordingEngine::default();
    let (mut component, handle) = TextToSpeech::new(engine.clone(), &SpeechConfig::default());

    handle.set_preemptive(true);
    handle.string_to_speech("stale");
    handle.beep(ToneRequest::new(1.0, 200.0, 1.0));
    handle.set_preemptive(false);
    component.tick().await;
    assert!(engine.calls().is_empty());

    handle.set_preemptive(true);
    component.tick().await;
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn test_preemptive_zero_tone_is_still_played() {
    let engine = RecordingEngine::default();
    let config = SpeechConfig::default().with_preemptive(true);
    let (mut component, handle) = TextToSpeech::new(engine.clone(), &config);

    handle.beep(ToneRequest::new(0.0, 0.0, 0.0));
    component.tick().await;

    assert_eq!(engine.tones(), vec![ToneRequest::default()]);
}

#[tokio::test]
async fn test_preemptive_empty_text_is_not_spoken() {
    let engine = RecordingEngine::default();
    let config = SpeechConfig::default().with_preemptive(true);
    let (mut component, handle) = TextToSpeech::new(engine.clone(), &config);

    handle.string_to_speech("dropped");
    handle.string_to_speech("");
    component.tick().await;

    assert!(engine.spoken().is_empty());
}

// ============================================================================
// Events
// ============================================================================

#[tokio::test]
async fn test_button_events_from_command_registered_interface() {
    let engine = RecordingEngine::default();
    let (mut component, handle) = TextToSpeech::new(engine.clone(), &SpeechConfig::default());

    handle.add_interface_required_for_event_button("Footpedal");
    for transition in [
        ButtonTransition::Pressed,
        ButtonTransition::Released,
        ButtonTransition::Clicked,
        ButtonTransition::DoubleClicked,
        ButtonTransition::Undefined,
    ] {
        handle.emit_event("Footpedal", "Button", ButtonEvent::new(transition));
    }
    component.tick().await;

    assert_eq!(
        engine.spoken(),
        vec!["pressed", "released", "undefined", "undefined", "undefined"]
    );
}

#[tokio::test]
async fn test_string_and_character_events_share_an_interface() {
    let engine = RecordingEngine::default();
    let (mut component, handle) = TextToSpeech::new(engine.clone(), &SpeechConfig::default());

    component.add_interface_required_for_event_character("Keyboard", "Key");
    component.add_interface_required_for_event_string("Keyboard", "Line");
    component.add_interface_required_for_event_button("Keyboard");

    let keyboard = component.interfaces().required("Keyboard").unwrap();
    assert_eq!(
        keyboard.event_names().collect::<Vec<_>>(),
        vec!["Button", "Key", "Line"]
    );

    handle.emit_event("Keyboard", "Key", 'h');
    handle.emit_event("Keyboard", "Line", "hello there");
    handle.emit_event("Keyboard", "Key", "wrong payload");
    component.tick().await;

    assert_eq!(engine.spoken(), vec!["h", "hello there"]);
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_run_processes_until_handles_are_dropped() {
    let engine = RecordingEngine::default();
    let (component, handle) = TextToSpeech::new(engine.clone(), &SpeechConfig::default());

    let feeder = async move {
        handle.string_to_speech("one");
        tokio::task::yield_now().await;
        handle.beep(ToneRequest::new(0.2, 660.0, 0.3));
        handle.string_to_speech("two");
    };
    let (component, ()) = tokio::join!(component.run(), feeder);

    assert!(component.is_engine_ready());
    assert_eq!(
        engine.calls(),
        vec![
            Call::Startup,
            Call::Speak("one".into()),
            Call::Beep(ToneRequest::new(0.2, 660.0, 0.3)),
            Call::Speak("two".into()),
            Call::Shutdown,
        ]
    );
}

#[tokio::test]
async fn test_engine_startup_failure_leaves_component_running() {
    let engine = RecordingEngine::failing_startup();
    let (mut component, handle) = TextToSpeech::new(engine.clone(), &SpeechConfig::default());

    component.startup();
    assert!(!component.is_engine_ready());

    handle.string_to_speech("nobody hears this");
    handle.character_to_speech('x');
    component.tick().await;
    component.cleanup();

    assert!(engine.spoken().is_empty());
    assert_eq!(engine.calls(), vec![Call::Startup, Call::Shutdown]);
}

// ============================================================================
// Shell engine end to end
// ============================================================================

#[cfg(unix)]
#[tokio::test]
async fn test_shell_engine_invocations() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("invocations.log");
    let text = EngineCommandTemplate::new(format!("echo \"say %s\" >> '{}'", log.display())).unwrap();
    let tone = ToneCommandTemplate::new(format!(
        "echo \"play synth {{duration}} sine {{frequency}} vol {{amplitude}}\" >> '{}'",
        log.display()
    ))
    .unwrap();

    let (mut component, handle) =
        TextToSpeech::new(ShellEngine::new(text, Some(tone)), &SpeechConfig::default());
    component.startup();

    handle.string_to_speech("hello");
    handle.beep(ToneRequest::new(0.5, 440.0, 0.8));
    handle.set_preemptive(true);
    handle.string_to_speech("a");
    handle.string_to_speech("b");
    component.tick().await;
    component.cleanup();

    let written = std::fs::read_to_string(&log).unwrap();
    assert_eq!(
        written.lines().collect::<Vec<_>>(),
        vec!["say hello", "play synth 0.5 sine 440 vol 0.8", "say b"]
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_shell_engine_failure_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("after.log");
    let config = SpeechConfig::default().with_text_command(format!(
        "[ \"%s\" != fail ] && echo ok >> '{}'",
        log.display()
    ));
    let engine = ShellEngine::from_config(&config).unwrap();
    let (mut component, handle) = TextToSpeech::new(engine, &config);

    handle.string_to_speech("fail");
    handle.string_to_speech("pass");
    component.tick().await;

    let written = std::fs::read_to_string(&log).unwrap();
    assert_eq!(written.lines().collect::<Vec<_>>(), vec!["ok"]);
}
