/// Output level meter
///
/// Passes samples through untouched and publishes the peak and RMS of
/// every finished block, so the console can show what the bus is doing.
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rodio::Source;

/// Samples per published reading
pub const METER_BLOCK: usize = 256;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LevelReading {
    pub peak: f32,
    pub rms: f32,
}

impl LevelReading {
    /// Peak as a fixed-width bar of `#`
    pub fn bar(&self, width: usize) -> String {
        let filled = ((self.peak.clamp(0.0, 1.0) * width as f32).round() as usize).min(width);
        format!("[{}{}]", "#".repeat(filled), " ".repeat(width - filled))
    }
}

/// Latest reading, shared between the meter and the panel
#[derive(Debug, Clone, Default)]
pub struct LevelTap(Arc<Mutex<LevelReading>>);

impl LevelTap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reading(&self) -> LevelReading {
        *self.0.lock()
    }

    fn publish(&self, reading: LevelReading) {
        *self.0.lock() = reading;
    }
}

pub struct LevelMeter<I> {
    input: I,
    tap: LevelTap,
    peak: f32,
    sum_squares: f32,
    count: usize,
}

impl<I> LevelMeter<I>
where
    I: Source<Item = f32>,
{
    pub fn new(input: I, tap: LevelTap) -> Self {
        Self {
            input,
            tap,
            peak: 0.0,
            sum_squares: 0.0,
            count: 0,
        }
    }
}

impl<I> Iterator for LevelMeter<I>
where
    I: Source<Item = f32>,
{
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let sample = self.input.next()?;

        self.peak = self.peak.max(sample.abs());
        self.sum_squares += sample * sample;
        self.count += 1;

        if self.count == METER_BLOCK {
            self.tap.publish(LevelReading {
                peak: self.peak,
                rms: (self.sum_squares / METER_BLOCK as f32).sqrt(),
            });
            self.peak = 0.0;
            self.sum_squares = 0.0;
            self.count = 0;
        }

        Some(sample)
    }
}

impl<I> Source for LevelMeter<I>
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_system::effects::test_support::Samples;

    #[test]
    fn test_meter_passes_samples_through() {
        let input: Vec<f32> = (0..600).map(|i| ((i % 7) as f32 - 3.0) / 4.0).collect();
        let tap = LevelTap::new();
        let output: Vec<f32> = LevelMeter::new(Samples::new(input.clone(), 2, 44_100), tap).collect();
        assert_eq!(output, input);
    }

    #[test]
    fn test_meter_publishes_finished_blocks() {
        let mut input = vec![0.5f32; METER_BLOCK];
        input[10] = -0.9;
        // partial block is not published
        input.extend(vec![1.0; METER_BLOCK / 2]);

        let tap = LevelTap::new();
        let meter = LevelMeter::new(Samples::new(input, 1, 44_100), tap.clone());
        assert_eq!(tap.reading(), LevelReading::default());
        meter.for_each(drop);

        let reading = tap.reading();
        assert_eq!(reading.peak, 0.9);
        assert!(reading.rms > 0.5 && reading.rms < 0.52);
    }

    #[test]
    fn test_level_bar() {
        let reading = LevelReading { peak: 0.5, rms: 0.2 };
        assert_eq!(reading.bar(10), "[#####     ]");
        assert_eq!(LevelReading::default().bar(4), "[    ]");
        assert_eq!(LevelReading { peak: 3.0, rms: 1.0 }.bar(4), "[####]");
    }
}
