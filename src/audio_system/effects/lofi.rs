/// Lo-fi filter
///
/// Sample-and-hold down to a lower sample rate, then quantise to a
/// reduced bit depth.
use std::time::Duration;

use rodio::Source;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LofiParams {
    /// Target sample rate in Hz
    pub sample_rate: f32,

    /// Bits kept per sample
    pub bit_depth: u8,
}

impl Default for LofiParams {
    fn default() -> Self {
        Self {
            sample_rate: 8000.0,
            bit_depth: 4,
        }
    }
}

pub struct LofiFilter<I> {
    input: I,
    params: LofiParams,
    channel: usize,
    phase: Vec<f32>,
    held: Vec<f32>,
}

impl<I> LofiFilter<I>
where
    I: Source<Item = f32>,
{
    pub fn new(input: I, params: LofiParams) -> Self {
        let channels = input.channels().max(1) as usize;
        Self {
            input,
            params,
            channel: 0,
            // start at 1.0 so the first sample is captured
            phase: vec![1.0; channels],
            held: vec![0.0; channels],
        }
    }

    fn quantize(&self, sample: f32) -> f32 {
        let levels = (1u32 << self.params.bit_depth.clamp(1, 24).saturating_sub(1)) as f32;
        (sample * levels).round() / levels
    }
}

impl<I> Iterator for LofiFilter<I>
where
    I: Source<Item = f32>,
{
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let sample = self.input.next()?;
        let channel = self.channel;
        self.channel = (self.channel + 1) % self.held.len();

        if self.phase[channel] >= 1.0 {
            self.phase[channel] -= 1.0;
            self.held[channel] = self.quantize(sample);
        }
        self.phase[channel] += self.params.sample_rate / self.input.sample_rate().max(1) as f32;

        Some(self.held[channel])
    }
}

impl<I> Source for LofiFilter<I>
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
