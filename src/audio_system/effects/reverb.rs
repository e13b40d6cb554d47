/// Reverb filter
///
/// Freeverb-style network: eight parallel damped comb filters feeding four
/// series allpass filters per channel. Operates on stereo frames; other
/// channel layouts pass through unchanged.
use std::time::Duration;

use rodio::Source;
use serde::{Deserialize, Serialize};

use super::FilterToggle;

// Tuning constants (scaled for 44100 Hz sample rate)
const COMB_TUNING: [usize; 8] = [1116, 1188, 1277, 1356, 1422, 1491, 1557, 1617];
const ALLPASS_TUNING: [usize; 4] = [556, 441, 341, 225];
const STEREO_SPREAD: usize = 23;

const FIXED_GAIN: f32 = 0.015;
const SCALE_ROOM: f32 = 0.28;
const OFFSET_ROOM: f32 = 0.7;
const SCALE_DAMP: f32 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReverbParams {
    /// Hold the current tail indefinitely
    pub freeze: bool,

    /// Room size (0.0-1.0), longer decay when larger
    pub room_size: f32,

    /// High-frequency damping (0.0-1.0)
    pub damp: f32,

    /// Stereo width (0.0-1.0)
    pub width: f32,

    /// Dry/wet mix (0.0 = dry, 1.0 = wet)
    pub mix: f32,
}

impl Default for ReverbParams {
    fn default() -> Self {
        Self {
            freeze: false,
            room_size: 0.5,
            damp: 0.5,
            width: 1.0,
            mix: 0.35,
        }
    }
}

#[derive(Debug, Clone)]
struct Comb {
    buffer: Vec<f32>,
    index: usize,
    feedback: f32,
    damp: f32,
    store: f32,
}

impl Comb {
    fn new(size: usize, feedback: f32, damp: f32) -> Self {
        Self {
            buffer: vec![0.0; size.max(1)],
            index: 0,
            feedback,
            damp,
            store: 0.0,
        }
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let output = self.buffer[self.index];
        self.store = output * (1.0 - self.damp) + self.store * self.damp;
        self.buffer[self.index] = input + self.store * self.feedback;
        self.index = (self.index + 1) % self.buffer.len();
        output
    }
}

#[derive(Debug, Clone)]
struct Allpass {
    buffer: Vec<f32>,
    index: usize,
}

impl Allpass {
    fn new(size: usize) -> Self {
        Self {
            buffer: vec![0.0; size.max(1)],
            index: 0,
        }
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let buffered = self.buffer[self.index];
        self.buffer[self.index] = input + buffered * 0.5;
        self.index = (self.index + 1) % self.buffer.len();
        buffered - input
    }
}

#[derive(Debug, Clone)]
struct Freeverb {
    combs: [Vec<Comb>; 2],
    allpasses: [Vec<Allpass>; 2],
    params: ReverbParams,
    input_gain: f32,
}

impl Freeverb {
    fn new(sample_rate: u32, params: ReverbParams) -> Self {
        let scale = sample_rate as f32 / 44_100.0;
        let size = |tuning: usize, spread: usize| ((tuning + spread) as f32 * scale) as usize;

        let (feedback, damp, input_gain) = if params.freeze {
            (1.0, 0.0, 0.0)
        } else {
            (
                params.room_size.clamp(0.0, 1.0) * SCALE_ROOM + OFFSET_ROOM,
                params.damp.clamp(0.0, 1.0) * SCALE_DAMP,
                FIXED_GAIN,
            )
        };

        let combs = [0, STEREO_SPREAD].map(|spread| {
            COMB_TUNING
                .iter()
                .map(|&t| Comb::new(size(t, spread), feedback, damp))
                .collect()
        });
        let allpasses = [0, STEREO_SPREAD].map(|spread| {
            ALLPASS_TUNING
                .iter()
                .map(|&t| Allpass::new(size(t, spread)))
                .collect()
        });

        Self {
            combs,
            allpasses,
            params,
            input_gain,
        }
    }

    fn process(&mut self, left: f32, right: f32) -> (f32, f32) {
        let input = (left + right) * self.input_gain;
        let mut out = [0.0f32; 2];

        for (channel, sum) in out.iter_mut().enumerate() {
            for comb in &mut self.combs[channel] {
                *sum += comb.process(input);
            }
            for allpass in &mut self.allpasses[channel] {
                *sum = allpass.process(*sum);
            }
        }

        let width = self.params.width.clamp(0.0, 1.0);
        let wet1 = width / 2.0 + 0.5;
        let wet2 = (1.0 - width) / 2.0;
        let wet_l = out[0] * wet1 + out[1] * wet2;
        let wet_r = out[1] * wet1 + out[0] * wet2;

        let mix = self.params.mix.clamp(0.0, 1.0);
        (
            left * (1.0 - mix) + wet_l * mix,
            right * (1.0 - mix) + wet_r * mix,
        )
    }
}

pub struct ReverbFilter<I> {
    input: I,
    reverb: Freeverb,
    enabled: FilterToggle,
    channel: usize,
    pending_right: Option<f32>,
}

impl<I> ReverbFilter<I>
where
    I: Source<Item = f32>,
{
    pub fn new(input: I, params: ReverbParams, enabled: FilterToggle) -> Self {
        let reverb = Freeverb::new(input.sample_rate(), params);
        Self {
            input,
            reverb,
            enabled,
            channel: 0,
            pending_right: None,
        }
    }
}

impl<I> Iterator for ReverbFilter<I>
where
    I: Source<Item = f32>,
{
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if let Some(right) = self.pending_right.take() {
            return Some(right);
        }

        let left = self.input.next()?;
        let channels = self.input.channels().max(1) as usize;
        let frame_start = self.channel == 0;
        self.channel = (self.channel + 1) % channels;

        if channels != 2 || !frame_start || !self.enabled.is_enabled() {
            return Some(left);
        }

        let right = self.input.next().unwrap_or(0.0);
        self.channel = 0;
        let (wet_l, wet_r) = self.reverb.process(left, right);
        self.pending_right = Some(wet_r);
        Some(wet_l)
    }
}

impl<I> Source for ReverbFilter<I>
where
    I: Source<Item = f32>,
{
    fn current_frame_len(&self) -> Option<usize> {
        self.input.current_frame_len()
    }

    fn channels(&self) -> u16 {
        self.input.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.input.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.input.total_duration()
    }
}
