/// Echo filter
///
/// Feedback delay line with a one-pole low-pass on the feedback path.
/// Each interleaved channel gets its own delay taps.
use std::time::Duration;

use rodio::Source;
use serde::{Deserialize, Serialize};

use super::FilterToggle;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EchoParams {
    /// Delay in seconds
    pub delay: f32,

    /// Feedback gain (0.0-1.0)
    pub decay: f32,

    /// Feedback low-pass amount (0.0 = none, 1.0 = fully damped)
    pub filter: f32,
}

impl Default for EchoParams {
    fn default() -> Self {
        Self {
            delay: 0.3,
            decay: 0.7,
            filter: 0.0,
        }
    }
}

pub struct EchoFilter<I> {
    input: I,
    params: EchoParams,
    enabled: FilterToggle,
    buffer: Vec<f32>,
    position: usize,
    channel: usize,
    previous: Vec<f32>,
}

impl<I> EchoFilter<I>
where
    I: Source<Item = f32>,
{
    pub fn new(input: I, params: EchoParams, enabled: FilterToggle) -> Self {
        let channels = input.channels().max(1) as usize;
        let frames = (params.delay.max(0.0) * input.sample_rate() as f32).ceil() as usize;
        Self {
            input,
            params,
            enabled,
            buffer: vec![0.0; frames.max(1) * channels],
            position: 0,
            channel: 0,
            previous: vec![0.0; channels],
        }
    }
}

impl<I> Iterator for EchoFilter<I>
where
    I: Source<Item = f32>,
{
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let sample = self.input.next()?;
        let channel = self.channel;
        self.channel = (self.channel + 1) % self.previous.len();

        // delay line keeps running while bypassed
        let delayed = self.buffer[self.position];
        let filter = self.params.filter.clamp(0.0, 1.0);
        self.previous[channel] = (1.0 - filter) * delayed + filter * self.previous[channel];

        let output = if self.enabled.is_enabled() {
            sample + self.previous[channel] * self.params.decay
        } else {
            sample
        };

        self.buffer[self.position] = output;
        self.position = (self.position + 1) % self.buffer.len();

        Some(output)
    }
}

impl<I> Source for EchoFilter<I>
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
