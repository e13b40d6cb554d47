// Integration tests for SFX Panel
// These exercise the public API end to end without an audio device.

use std::fs;
use std::path::PathBuf;

use crossbeam_channel::unbounded;

use sfx_panel::app::{DemoApp, FrameOutcome};
use sfx_panel::audio_system::{
    sfxr, Position, SfxrParams, SfxrPreset, SpeechSource, SpeechWaveform,
};
use sfx_panel::config::Config;
use sfx_panel::input::console::parse_console_line;
use sfx_panel::input::{ControllerButton, ControllerSnapshot, MappedButton, RawEvent};
use sfx_panel::messaging::{Command, Event};
use sfx_panel::stream_file::{ByteSource, StreamedFile};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("sfx_panel_it_{}_{}", std::process::id(), name))
}

/// Helper to write a short mono WAV file
fn write_wav(name: &str, samples: usize) -> PathBuf {
    let path = temp_path(name);
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 22_050,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for i in 0..samples {
        writer.write_sample(((i % 64) as i16 - 32) * 256).unwrap();
    }
    writer.finalize().unwrap();
    path
}

#[test]
fn test_streamed_file_reads_whole_wav() {
    let path = write_wav("stream.wav", 1000);
    let expected = fs::read(&path).unwrap();

    let mut reader = StreamedFile::new();
    reader.open(&path);
    assert_eq!(reader.length(), expected.len() as u64);

    let mut collected = Vec::new();
    let mut chunk = [0u8; 300];
    loop {
        let n = reader.read_bytes(&mut chunk);
        collected.extend_from_slice(&chunk[..n]);
        if n < chunk.len() {
            break;
        }
    }
    assert!(reader.eof());
    assert_eq!(collected, expected);

    reader.seek_to(0);
    assert!(!reader.eof());
    assert_eq!(reader.read_to_end_vec(), expected);

    reader.close();
    fs::remove_file(path).unwrap();
}

#[test]
fn test_console_presses_fire_highest_priority_slot() {
    let mut snapshot = ControllerSnapshot::new();
    for line in ["press right", "press a", "press right", "press start"] {
        if let Ok(Some(RawEvent::ControllerButtonUp(button))) = parse_console_line(line) {
            snapshot.update_button(button);
        }
    }

    assert!(snapshot.is_released(MappedButton::Right));
    assert_eq!(snapshot.triggered(), Some(MappedButton::A));
}

#[test]
fn test_panel_session_without_audio() {
    let (tx, rx) = unbounded();
    let mut app = DemoApp::new(&Config::default(), None, rx);
    let (events, _id) = app.event_bus().subscribe();

    let sfx = write_wav("session.wav", 500);
    let lines = [
        format!("sfx open {}", sfx.display()),
        "sfxr preset 2 laser".to_string(),
        "sfxr seed 2 1234".to_string(),
        "pos 0.5 0 0".to_string(),
        "controller on".to_string(),
    ];
    for line in &lines {
        let event = parse_console_line(line).unwrap().unwrap();
        tx.send(event).unwrap();
    }
    tx.send(RawEvent::ControllerButtonUp(ControllerButton::B)).unwrap();

    assert_eq!(app.frame(None), FrameOutcome::Continue);

    let state = app.state();
    assert_eq!(state.sfx_path.as_deref(), Some(sfx.as_path()));
    assert_eq!(state.sfxr_slots[1].preset, SfxrPreset::Laser);
    assert_eq!(state.position, Position::new(0.5, 0.0, 0.0));

    let received: Vec<Event> = events.try_iter().collect();
    let sfx_size = fs::metadata(&sfx).unwrap().len() as usize;
    assert!(matches!(&received[0], Event::SfxLoaded { bytes, .. } if *bytes == sfx_size));
    assert_eq!(
        received.last(),
        Some(&Event::SfxrPlayed {
            slot: 1,
            preset: SfxrPreset::Laser,
            seed: 1234,
            position: Position::new(0.5, 0.0, 0.0),
        })
    );

    tx.send(RawEvent::Console(Command::Quit)).unwrap();
    assert_eq!(app.frame(None), FrameOutcome::Quit);
    app.shutdown();

    fs::remove_file(sfx).unwrap();
}

#[test]
fn test_export_matches_render() {
    let path = temp_path("export.wav");
    let (tx, rx) = unbounded();
    let mut app = DemoApp::new(&Config::default(), None, rx);

    tx.send(RawEvent::Console(Command::SetSfxrSeed { slot: 0, seed: 5 }))
        .unwrap();
    tx.send(RawEvent::Console(Command::ExportSfxr {
        slot: 0,
        path: path.clone(),
    }))
    .unwrap();
    app.frame(None);

    let slot = &app.state().sfxr_slots[0];
    let mut params = SfxrParams::from_preset(slot.preset, slot.seed);
    params.master_vol = Config::default().sfxr_master_volume;
    let rendered = sfxr::render(params, slot.seed);

    let reader = hound::WavReader::open(&path).unwrap();
    assert_eq!(reader.spec().sample_rate, sfxr::SAMPLE_RATE);
    assert_eq!(reader.len() as usize, rendered.len());

    fs::remove_file(path).unwrap();
}

#[test]
fn test_config_file_drives_slots() {
    let path = temp_path("config.json");
    fs::write(
        &path,
        r#"{ "use_controller": true, "sfxr_slots": [{ "preset": "Blip", "seed": 3, "lofi": true }] }"#,
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    let (_tx, rx) = unbounded();
    let app = DemoApp::new(&config, None, rx);

    assert!(app.state().use_controller);
    assert_eq!(app.state().sfxr_slots[0].preset, SfxrPreset::Blip);
    assert!(app.state().sfxr_slots[0].lofi);
    assert_eq!(app.state().sfxr_slots.len(), 8);

    fs::remove_file(path).unwrap();
}

#[test]
fn test_speech_panel_session() {
    let (tx, rx) = unbounded();
    let mut app = DemoApp::new(&Config::default(), None, rx);
    let (events, _id) = app.event_bus().subscribe();

    for line in [
        "speech text Hello there, general",
        "speech wave square",
        "speech freq 2200",
        "speech pan 0.5",
        "speech play",
        "wave",
    ] {
        tx.send(parse_console_line(line).unwrap().unwrap()).unwrap();
    }
    assert_eq!(app.frame(None), FrameOutcome::Continue);

    let state = app.state();
    assert_eq!(state.speech_text, "Hello there, general");
    assert_eq!(state.speech.waveform, SpeechWaveform::Square);
    assert_eq!(state.speech.base_freq, 2200);
    assert_eq!(state.speech_pan, 0.5);

    let received: Vec<Event> = events.try_iter().collect();
    assert_eq!(
        received.last(),
        Some(&Event::SpeechPlayed {
            text: "Hello there, general".to_string()
        })
    );

    let rendered: Vec<f32> = SpeechSource::new(&state.speech_text, state.speech).collect();
    assert!(rendered.iter().any(|s| s.abs() > 0.001));
}
