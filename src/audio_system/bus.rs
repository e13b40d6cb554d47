/// Sfxr mixing bus
///
/// Voices are mixed into one stream that runs through the echo and reverb
/// filters before reaching its own sink, so bus volume and filter toggles
/// apply to everything playing on it. A level meter sits at the end of the
/// chain.
use std::sync::Arc;

use rodio::dynamic_mixer::{self, DynamicMixerController};
use rodio::source::{Spatial, Zero};
use rodio::{OutputStreamHandle, Sink, Source};

use super::effects::{
    EchoFilter, EchoParams, FilterToggle, LevelMeter, LevelReading, LevelTap, ReverbFilter,
    ReverbParams,
};
use super::sfxr::SAMPLE_RATE;
use super::source::{Listener, Position};
use crate::error::AudioError;

const BUS_CHANNELS: u16 = 2;

pub struct SfxrBus {
    controller: Arc<DynamicMixerController<f32>>,
    sink: Sink,
    echo: FilterToggle,
    reverb: FilterToggle,
    level: LevelTap,
}

impl SfxrBus {
    /// Start the bus on the output stream with both filters bypassed.
    pub fn new(
        stream_handle: &OutputStreamHandle,
        echo_params: EchoParams,
        reverb_params: ReverbParams,
        volume: f32,
    ) -> Result<Self, AudioError> {
        let (controller, mixer) = dynamic_mixer::mixer::<f32>(BUS_CHANNELS, SAMPLE_RATE);
        // keeps the mixer from ending while no voices play
        controller.add(Zero::<f32>::new(BUS_CHANNELS, SAMPLE_RATE));

        let echo = FilterToggle::new(false);
        let reverb = FilterToggle::new(false);
        let level = LevelTap::new();
        let filtered = LevelMeter::new(
            ReverbFilter::new(
                EchoFilter::new(mixer, echo_params, echo.clone()),
                reverb_params,
                reverb.clone(),
            ),
            level.clone(),
        );

        let sink =
            Sink::try_new(stream_handle).map_err(|e| AudioError::StreamInitFailed(Box::new(e)))?;
        sink.set_volume(volume.clamp(0.0, 1.0));
        sink.append(filtered);
        sink.play();

        tracing::debug!("Sfxr bus started");
        Ok(Self {
            controller,
            sink,
            echo,
            reverb,
            level,
        })
    }

    /// Mix a voice into the bus at `position`.
    pub fn play_3d<S>(&self, voice: S, position: Position, listener: Listener)
    where
        S: Source<Item = f32> + Send + 'static,
    {
        self.controller.add(Spatial::new(
            voice,
            position.to_array(),
            listener.left_ear,
            listener.right_ear,
        ));
    }

    pub fn set_volume(&self, volume: f32) {
        self.sink.set_volume(volume.clamp(0.0, 1.0));
    }

    pub fn set_echo(&self, enabled: bool) {
        self.echo.set(enabled);
    }

    pub fn set_reverb(&self, enabled: bool) {
        self.reverb.set(enabled);
    }

    /// Peak and RMS of the last metered block, before bus volume
    pub fn level(&self) -> LevelReading {
        self.level.reading()
    }

    pub fn stop(&self) {
        self.sink.stop();
    }
}
