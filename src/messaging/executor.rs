/// Command executor
///
/// Applies commands to the panel state and, when an output device is
/// available, to the audio system, then emits events on completion.
/// Without an audio system the state is still kept up to date so the
/// panel works silently.
use std::path::{Path, PathBuf};

use anyhow::Context;

use super::bus::EventBus;
use super::commands::Command;
use super::events::Event;
use crate::audio_system::speech::{is_speakable, DECLINATION_RANGE, MAX_BASE_FREQ, SPEED_RANGE};
use crate::audio_system::{sfxr, AudioSystem, SfxrParams, SoundKind};
use crate::config::Config;
use crate::dialog;
use crate::error::{AppResult, AudioError};
use crate::state::PanelState;
use crate::stream_file::{ByteSource, StreamedFile};

const LEVEL_BAR_WIDTH: usize = 32;

pub struct CommandExecutor {
    event_bus: EventBus,
    audio: Option<AudioSystem>,
    extensions: Vec<String>,
    sfxr_master_volume: f32,
}

impl CommandExecutor {
    pub fn new(event_bus: EventBus, audio: Option<AudioSystem>, config: &Config) -> Self {
        Self {
            event_bus,
            audio,
            extensions: config.audio_extensions.clone(),
            sfxr_master_volume: config.sfxr_master_volume,
        }
    }

    /// Execute a command against the panel state
    pub fn execute(&mut self, state: &mut PanelState, command: Command) -> AppResult<()> {
        tracing::debug!("Executing command: {}", command.description());

        match command {
            Command::OpenBgm { path } => {
                let Some(path) = self.resolve_path(path, "Open BGM") else {
                    return Ok(());
                };
                match self.audio.as_mut() {
                    Some(audio) => audio.load_bgm(&path)?,
                    None => {
                        probe_length(&path)?;
                    }
                }
                state.bgm_path = Some(path.clone());
                state.bgm_playing = false;
                tracing::info!("BGM opened: {}", path.display());
                self.event_bus.publish(Event::BgmLoaded { path });
            }
            Command::PlayBgm => {
                if state.bgm_path.is_none() {
                    return Err(AudioError::NotLoaded(SoundKind::Bgm.to_string()).into());
                }
                if let Some(audio) = self.audio.as_mut() {
                    audio.play_bgm().context("Failed to start BGM")?;
                }
                state.bgm_playing = true;
                self.event_bus.publish(Event::BgmStarted);
            }
            Command::StopBgm => {
                if let Some(audio) = self.audio.as_mut() {
                    audio.stop_bgm();
                }
                state.bgm_playing = false;
                self.event_bus.publish(Event::BgmStopped);
            }
            Command::SetBgmVolume { volume } => {
                let volume = volume.clamp(0.0, 1.0);
                if let Some(audio) = self.audio.as_mut() {
                    audio.set_bgm_volume(volume);
                }
                state.bgm_volume = volume;
            }
            Command::OpenSfx { path } => {
                let Some(path) = self.resolve_path(path, "Open SFX") else {
                    return Ok(());
                };
                let bytes = match self.audio.as_mut() {
                    Some(audio) => audio.load_sfx(&path)?,
                    None => probe_length(&path)?,
                };
                state.sfx_path = Some(path.clone());
                tracing::info!("SFX loaded: {} ({} bytes)", path.display(), bytes);
                self.event_bus.publish(Event::SfxLoaded { path, bytes });
            }
            Command::PlaySfx => {
                if state.sfx_path.is_none() {
                    return Err(AudioError::NotLoaded(SoundKind::Sfx.to_string()).into());
                }
                if let Some(audio) = self.audio.as_ref() {
                    audio.play_sfx(state.position)?;
                }
                self.event_bus.publish(Event::SfxPlayed {
                    position: state.position,
                });
            }
            Command::SetSpeechText { text } => {
                state.speech_text = text;
                self.event_bus.publish(Event::SpeechChanged);
            }
            Command::PlaySpeech => {
                if !is_speakable(&state.speech_text) {
                    return Err(AudioError::NotLoaded(SoundKind::Speech.to_string()).into());
                }
                if let Some(audio) = self.audio.as_mut() {
                    audio
                        .play_speech(&state.speech_text, state.speech, state.speech_pan)
                        .context("Failed to start speech")?;
                }
                self.event_bus.publish(Event::SpeechPlayed {
                    text: state.speech_text.clone(),
                });
            }
            Command::SetSpeechVolume { volume } => {
                let volume = volume.clamp(0.0, 1.0);
                if let Some(audio) = self.audio.as_mut() {
                    audio.set_speech_volume(volume);
                }
                state.speech_volume = volume;
                self.event_bus.publish(Event::SpeechChanged);
            }
            // pan and voice apply from the next utterance
            Command::SetSpeechPan { pan } => {
                state.speech_pan = pan.clamp(-1.0, 1.0);
                self.event_bus.publish(Event::SpeechChanged);
            }
            Command::SetSpeechFreq { base_freq } => {
                state.speech.base_freq = base_freq.min(MAX_BASE_FREQ);
                self.event_bus.publish(Event::SpeechChanged);
            }
            Command::SetSpeechSpeed { speed } => {
                state.speech.speed = speed.clamp(*SPEED_RANGE.start(), *SPEED_RANGE.end());
                self.event_bus.publish(Event::SpeechChanged);
            }
            Command::SetSpeechDeclination { declination } => {
                state.speech.declination =
                    declination.clamp(*DECLINATION_RANGE.start(), *DECLINATION_RANGE.end());
                self.event_bus.publish(Event::SpeechChanged);
            }
            Command::SetSpeechWaveform { waveform } => {
                state.speech.waveform = waveform;
                self.event_bus.publish(Event::SpeechChanged);
            }
            Command::PlaySfxr { slot } => {
                let sfxr_slot = state.slot(slot)?;
                if let Some(audio) = self.audio.as_ref() {
                    audio.play_sfxr(sfxr_slot, state.position);
                }
                self.event_bus.publish(Event::SfxrPlayed {
                    slot,
                    preset: sfxr_slot.preset,
                    seed: sfxr_slot.seed,
                    position: state.position,
                });
            }
            Command::SetSfxrPreset { slot, preset } => {
                state.slot_mut(slot)?.preset = preset;
                self.event_bus.publish(Event::SlotChanged { slot });
            }
            Command::SetSfxrSeed { slot, seed } => {
                state.slot_mut(slot)?.seed = seed;
                self.event_bus.publish(Event::SlotChanged { slot });
            }
            Command::RandomizeSfxrSeed { slot } => {
                let sfxr_slot = state.slot_mut(slot)?;
                sfxr_slot.randomize_seed();
                tracing::info!("Sfxr #{} seed is now {}", slot + 1, sfxr_slot.seed);
                self.event_bus.publish(Event::SlotChanged { slot });
            }
            Command::SetSfxrLofi { slot, enabled } => {
                state.slot_mut(slot)?.lofi = enabled;
                self.event_bus.publish(Event::SlotChanged { slot });
            }
            Command::ExportSfxr { slot, path } => {
                let sfxr_slot = state.slot(slot)?;
                let mut params = SfxrParams::from_preset(sfxr_slot.preset, sfxr_slot.seed);
                params.master_vol = self.sfxr_master_volume;

                sfxr::render_wav(params, sfxr_slot.seed, &path)?;
                self.event_bus.publish(Event::SfxrExported { slot, path });
            }
            Command::SetBusVolume { volume } => {
                let volume = volume.clamp(0.0, 1.0);
                if let Some(audio) = self.audio.as_ref() {
                    audio.set_bus_volume(volume);
                }
                state.bus_volume = volume;
                self.event_bus.publish(Event::BusChanged);
            }
            Command::SetEcho { enabled } => {
                if let Some(audio) = self.audio.as_ref() {
                    audio.set_echo(enabled);
                }
                state.echo_enabled = enabled;
                self.event_bus.publish(Event::BusChanged);
            }
            Command::SetReverb { enabled } => {
                if let Some(audio) = self.audio.as_ref() {
                    audio.set_reverb(enabled);
                }
                state.reverb_enabled = enabled;
                self.event_bus.publish(Event::BusChanged);
            }
            Command::SetPosition { position } => {
                let position = position.clamped();
                if position != state.position {
                    state.position = position;
                    self.event_bus.publish(Event::PositionChanged { position });
                }
            }
            Command::UseController { enabled } => {
                state.use_controller = enabled;
                tracing::info!(
                    "Controller triggering {}",
                    if enabled { "enabled" } else { "disabled" }
                );
            }
            Command::ShowLevel => {
                println!("{}", self.level_line());
            }
            Command::Status => {
                println!("{}", state.summary());
            }
            Command::Quit => {
                self.event_bus.publish(Event::Shutdown);
            }
        }

        Ok(())
    }

    /// Stop all playback and release both file readers
    pub fn shutdown(&mut self) {
        if let Some(audio) = self.audio.as_mut() {
            audio.shutdown();
        }
    }

    /// Console stand-in for a waveform plot of the bus output
    pub fn level_line(&self) -> String {
        match self.audio.as_ref() {
            Some(audio) => {
                let level = audio.bus_level();
                format!(
                    "Bus output {} peak {:.2} rms {:.2}",
                    level.bar(LEVEL_BAR_WIDTH),
                    level.peak,
                    level.rms
                )
            }
            None => "Bus output: no audio device".to_string(),
        }
    }

    fn resolve_path(&self, path: Option<PathBuf>, title: &str) -> Option<PathBuf> {
        path.or_else(|| dialog::pick_audio_file(title, &self.extensions))
    }
}

/// Open a file the way the players do, for runs without an output device.
fn probe_length(path: &Path) -> Result<usize, AudioError> {
    let mut reader = StreamedFile::new();
    reader.open(path);
    if !reader.is_open() {
        return Err(AudioError::Unreadable(path.display().to_string()));
    }
    let length = reader.length() as usize;
    reader.close();
    Ok(length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_system::{Position, SfxrPreset, SpeechWaveform};

    fn silent_executor() -> (CommandExecutor, crossbeam_channel::Receiver<Event>) {
        let bus = EventBus::new();
        let (rx, _id) = bus.subscribe();
        (CommandExecutor::new(bus, None, &Config::default()), rx)
    }

    #[test]
    fn test_quit_command_emits_shutdown_event() {
        let (mut executor, rx) = silent_executor();
        let mut state = PanelState::default();

        executor.execute(&mut state, Command::Quit).unwrap();
        assert_eq!(rx.try_recv().unwrap(), Event::Shutdown);
    }

    #[test]
    fn test_play_sfxr_reports_slot_and_position() {
        let (mut executor, rx) = silent_executor();
        let mut state = PanelState::default();
        state.sfxr_slots[4].preset = SfxrPreset::Jump;
        state.sfxr_slots[4].seed = 77;
        state.position = Position::new(0.25, 0.0, -0.5);

        executor
            .execute(&mut state, Command::PlaySfxr { slot: 4 })
            .unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            Event::SfxrPlayed {
                slot: 4,
                preset: SfxrPreset::Jump,
                seed: 77,
                position: Position::new(0.25, 0.0, -0.5),
            }
        );
    }

    #[test]
    fn test_invalid_slot_is_an_error() {
        let (mut executor, rx) = silent_executor();
        let mut state = PanelState::default();

        let err = executor
            .execute(&mut state, Command::SetSfxrSeed { slot: 12, seed: 1 })
            .unwrap_err();
        assert!(err.to_string().contains("Invalid sfxr slot"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_play_without_load_fails() {
        let (mut executor, _rx) = silent_executor();
        let mut state = PanelState::default();

        assert!(executor.execute(&mut state, Command::PlayBgm).is_err());
        assert!(executor.execute(&mut state, Command::PlaySfx).is_err());
        assert!(!state.bgm_playing);
    }

    #[test]
    fn test_bus_toggles_update_state() {
        let (mut executor, rx) = silent_executor();
        let mut state = PanelState::default();

        executor
            .execute(&mut state, Command::SetEcho { enabled: true })
            .unwrap();
        executor
            .execute(&mut state, Command::SetBusVolume { volume: 0.4 })
            .unwrap();

        assert!(state.echo_enabled);
        assert!(!state.reverb_enabled);
        assert_eq!(state.bus_volume, 0.4);
        assert_eq!(rx.try_iter().count(), 2);
    }

    #[test]
    fn test_unchanged_position_is_not_republished() {
        let (mut executor, rx) = silent_executor();
        let mut state = PanelState::default();
        let position = Position::new(0.5, 0.5, 0.0);

        executor
            .execute(&mut state, Command::SetPosition { position })
            .unwrap();
        executor
            .execute(&mut state, Command::SetPosition { position })
            .unwrap();

        assert_eq!(rx.try_iter().count(), 1);
        assert_eq!(state.position, position);
    }

    #[test]
    fn test_open_missing_bgm_keeps_state() {
        let (mut executor, _rx) = silent_executor();
        let mut state = PanelState::default();

        let path = std::env::temp_dir().join("sfx_panel_no_such_music.ogg");
        let result = executor.execute(&mut state, Command::OpenBgm { path: Some(path) });

        assert!(result.is_err());
        assert!(state.bgm_path.is_none());
    }

    #[test]
    fn test_volumes_are_clamped_before_storing() {
        let (mut executor, _rx) = silent_executor();
        let mut state = PanelState::default();

        executor
            .execute(&mut state, Command::SetBgmVolume { volume: 1.5 })
            .unwrap();
        executor
            .execute(&mut state, Command::SetBusVolume { volume: -0.2 })
            .unwrap();
        executor
            .execute(&mut state, Command::SetSpeechVolume { volume: 7.0 })
            .unwrap();

        assert_eq!(state.bgm_volume, 1.0);
        assert_eq!(state.bus_volume, 0.0);
        assert_eq!(state.speech_volume, 1.0);
    }

    #[test]
    fn test_speech_settings_update_state() {
        let (mut executor, rx) = silent_executor();
        let mut state = PanelState::default();

        for command in [
            Command::SetSpeechText {
                text: "hello there".to_string(),
            },
            Command::SetSpeechPan { pan: -3.0 },
            Command::SetSpeechFreq { base_freq: 9000 },
            Command::SetSpeechSpeed { speed: 0.0 },
            Command::SetSpeechDeclination { declination: 2.5 },
            Command::SetSpeechWaveform {
                waveform: SpeechWaveform::Warble,
            },
        ] {
            executor.execute(&mut state, command).unwrap();
        }

        assert_eq!(state.speech_text, "hello there");
        assert_eq!(state.speech_pan, -1.0);
        assert_eq!(state.speech.base_freq, MAX_BASE_FREQ);
        assert_eq!(state.speech.speed, 0.1);
        assert_eq!(state.speech.declination, 2.5);
        assert_eq!(state.speech.waveform, SpeechWaveform::Warble);
        assert!(rx.try_iter().all(|event| event == Event::SpeechChanged));
    }

    #[test]
    fn test_play_speech_needs_something_to_say() {
        let (mut executor, rx) = silent_executor();
        let mut state = PanelState::default();

        assert!(executor.execute(&mut state, Command::PlaySpeech).is_err());
        // digits are skipped and punctuation is only a pause
        state.speech_text = "42 !".to_string();
        assert!(executor.execute(&mut state, Command::PlaySpeech).is_err());
        assert!(rx.try_recv().is_err());

        state.speech_text = "hi".to_string();
        executor.execute(&mut state, Command::PlaySpeech).unwrap();
        assert_eq!(
            rx.try_recv().unwrap(),
            Event::SpeechPlayed {
                text: "hi".to_string()
            }
        );
    }

    #[test]
    fn test_level_line_without_audio() {
        let (executor, _rx) = silent_executor();
        assert_eq!(executor.level_line(), "Bus output: no audio device");
    }
}
