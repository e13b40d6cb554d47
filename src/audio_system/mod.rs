/// Audio system module
///
/// Wraps the rodio output stream and everything the panel can play:
/// - Streamed background music (BGM)
/// - Preloaded one-shot effects (SFX), positioned in 3D
/// - Procedural retro effects (sfxr) mixed on a filtered bus
/// - Formant speech synthesis, panned on its own sink
///
/// ## Architecture
///
/// ```text
/// AudioSystem
///   ├── BgmPlayer ── StreamedFile (pulled lazily by the decoder)
///   ├── SfxClip   ── StreamedFile (preloaded) ── Spatial ── output
///   ├── SpeechPlayer ── SpeechSource ── ChannelVolume ── Sink
///   └── SfxrBus
///       ├── voice: SfxrSource ─ [LofiFilter] ─ Spatial ─┐
///       ├── voice: ...                                  ├─ mixer
///       └── EchoFilter ── ReverbFilter ── LevelMeter ── Sink (bus volume)
/// ```
///
/// ## Usage
///
/// ```rust,ignore
/// let mut audio = AudioSystem::new(&config)?;
///
/// audio.load_bgm(Path::new("music.ogg"))?;
/// audio.play_bgm()?;
///
/// audio.set_echo(true);
/// audio.play_sfxr(&state.sfxr_slots[0], Position::new(0.5, 0.0, 0.0));
/// ```
pub mod bus;
pub mod effects;
pub mod player;
pub mod sfxr;
pub mod source;
pub mod speech;

use std::path::Path;

use rodio::{OutputStream, OutputStreamHandle, Source};

use crate::config::Config;
use crate::error::AudioError;
use crate::state::SfxrSlot;

// Re-export commonly used types
pub use bus::SfxrBus;
pub use effects::{EchoParams, LevelReading, LofiFilter, LofiParams, ReverbParams};
pub use player::{BgmPlayer, SfxClip, SpeechPlayer};
pub use sfxr::{SfxrParams, SfxrPreset, SfxrSource};
pub use source::{Listener, Position, SoundKind};
pub use speech::{SpeechParams, SpeechSource, SpeechWaveform};

/// Owns the output stream and every player on it
pub struct AudioSystem {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    bgm: BgmPlayer,
    sfx: SfxClip,
    speech: SpeechPlayer,
    bus: SfxrBus,
    listener: Listener,
    lofi: LofiParams,
    sfxr_master_volume: f32,
}

impl AudioSystem {
    /// Open the default output device and start the sfxr bus.
    pub fn new(config: &Config) -> Result<Self, AudioError> {
        let (stream, stream_handle) =
            OutputStream::try_default().map_err(|e| AudioError::StreamInitFailed(Box::new(e)))?;

        let bus = SfxrBus::new(&stream_handle, config.echo, config.reverb, config.bus_volume)?;
        let bgm = BgmPlayer::new(stream_handle.clone(), config.bgm_volume);
        let speech = SpeechPlayer::new(stream_handle.clone(), config.speech_volume);

        tracing::info!("Audio output initialized");
        Ok(Self {
            _stream: stream,
            stream_handle,
            bgm,
            sfx: SfxClip::new(),
            speech,
            bus,
            listener: Listener::with_ear_spacing(config.ear_spacing),
            lofi: config.lofi,
            sfxr_master_volume: config.sfxr_master_volume,
        })
    }

    pub fn load_bgm(&mut self, path: &Path) -> Result<(), AudioError> {
        self.bgm.load(path)
    }

    pub fn play_bgm(&mut self) -> Result<(), AudioError> {
        self.bgm.play()
    }

    pub fn stop_bgm(&mut self) {
        self.bgm.stop();
    }

    pub fn set_bgm_volume(&mut self, volume: f32) {
        self.bgm.set_volume(volume);
    }

    pub fn is_bgm_playing(&self) -> bool {
        self.bgm.is_playing()
    }

    /// Load a one-shot effect, returning its size in bytes.
    pub fn load_sfx(&mut self, path: &Path) -> Result<usize, AudioError> {
        self.sfx.load(path)
    }

    pub fn play_sfx(&self, position: Position) -> Result<(), AudioError> {
        self.sfx.play_3d(&self.stream_handle, position, self.listener)
    }

    /// Synthesize the slot's sound and mix it into the bus.
    pub fn play_sfxr(&self, slot: &SfxrSlot, position: Position) {
        let mut params = SfxrParams::from_preset(slot.preset, slot.seed);
        params.master_vol = self.sfxr_master_volume;

        let voice = SfxrSource::new(params, slot.seed);
        let voice: Box<dyn Source<Item = f32> + Send> = if slot.lofi {
            Box::new(LofiFilter::new(voice, self.lofi))
        } else {
            Box::new(voice)
        };

        self.bus.play_3d(voice, position, self.listener);
        tracing::debug!(
            "Playing {} {} (seed {}) at {}",
            SoundKind::Sfxr,
            slot.preset,
            slot.seed,
            position
        );
    }

    /// Start an utterance, replacing any still playing.
    pub fn play_speech(
        &mut self,
        text: &str,
        params: SpeechParams,
        pan: f32,
    ) -> Result<(), AudioError> {
        self.speech.play(text, params, pan)
    }

    pub fn set_speech_volume(&mut self, volume: f32) {
        self.speech.set_volume(volume);
    }

    /// Level of the bus output over its last metered block
    pub fn bus_level(&self) -> LevelReading {
        self.bus.level()
    }

    pub fn set_bus_volume(&self, volume: f32) {
        self.bus.set_volume(volume);
    }

    pub fn set_echo(&self, enabled: bool) {
        self.bus.set_echo(enabled);
    }

    pub fn set_reverb(&self, enabled: bool) {
        self.bus.set_reverb(enabled);
    }

    /// Stop everything and release both file readers.
    pub fn shutdown(&mut self) {
        self.bgm.close();
        self.sfx.close();
        self.speech.stop();
        self.bus.stop();
        tracing::info!("Audio system shut down");
    }
}
