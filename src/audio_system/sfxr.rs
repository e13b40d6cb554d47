/// Procedural retro sound effects
///
/// Seeded presets produce a parameter set; `SfxrSource` renders it as a
/// finite mono rodio source.
use std::f32::consts::PI;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rodio::Source;

use crate::error::{AudioError, CommandError};

pub const SAMPLE_RATE: u32 = 44_100;

const SUPERSAMPLES: usize = 8;
const PHASER_LEN: usize = 1024;
const NOISE_LEN: usize = 32;

/// Sound generator presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SfxrPreset {
    Coin,
    Laser,
    Explosion,
    PowerUp,
    Hurt,
    Jump,
    Blip,
}

impl SfxrPreset {
    pub const ALL: [SfxrPreset; 7] = [
        SfxrPreset::Coin,
        SfxrPreset::Laser,
        SfxrPreset::Explosion,
        SfxrPreset::PowerUp,
        SfxrPreset::Hurt,
        SfxrPreset::Jump,
        SfxrPreset::Blip,
    ];
}

impl fmt::Display for SfxrPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SfxrPreset::Coin => write!(f, "Coin"),
            SfxrPreset::Laser => write!(f, "Laser"),
            SfxrPreset::Explosion => write!(f, "Explosion"),
            SfxrPreset::PowerUp => write!(f, "Power Up"),
            SfxrPreset::Hurt => write!(f, "Hurt"),
            SfxrPreset::Jump => write!(f, "Jump"),
            SfxrPreset::Blip => write!(f, "Blip"),
        }
    }
}

impl FromStr for SfxrPreset {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "coin" => Ok(SfxrPreset::Coin),
            "laser" => Ok(SfxrPreset::Laser),
            "explosion" => Ok(SfxrPreset::Explosion),
            "powerup" | "power-up" => Ok(SfxrPreset::PowerUp),
            "hurt" => Ok(SfxrPreset::Hurt),
            "jump" => Ok(SfxrPreset::Jump),
            "blip" => Ok(SfxrPreset::Blip),
            _ => Err(CommandError::InvalidValue {
                argument: "preset",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveType {
    Square,
    Sawtooth,
    Sine,
    Noise,
}

impl WaveType {
    fn from_index(index: u32) -> Self {
        match index {
            0 => WaveType::Square,
            1 => WaveType::Sawtooth,
            2 => WaveType::Sine,
            _ => WaveType::Noise,
        }
    }
}

/// Synthesis parameters, each mostly in 0.0..=1.0 (ramps in -1.0..=1.0)
#[derive(Debug, Clone, PartialEq)]
pub struct SfxrParams {
    pub wave_type: WaveType,

    pub base_freq: f32,
    pub freq_limit: f32,
    pub freq_ramp: f32,
    pub freq_dramp: f32,
    pub duty: f32,
    pub duty_ramp: f32,

    pub vib_strength: f32,
    pub vib_speed: f32,

    pub env_attack: f32,
    pub env_sustain: f32,
    pub env_decay: f32,
    pub env_punch: f32,

    pub lpf_resonance: f32,
    pub lpf_freq: f32,
    pub lpf_ramp: f32,
    pub hpf_freq: f32,
    pub hpf_ramp: f32,

    pub pha_offset: f32,
    pub pha_ramp: f32,

    pub repeat_speed: f32,

    pub arp_speed: f32,
    pub arp_mod: f32,

    pub master_vol: f32,
    pub sound_vol: f32,
}

impl Default for SfxrParams {
    fn default() -> Self {
        Self {
            wave_type: WaveType::Square,
            base_freq: 0.3,
            freq_limit: 0.0,
            freq_ramp: 0.0,
            freq_dramp: 0.0,
            duty: 0.0,
            duty_ramp: 0.0,
            vib_strength: 0.0,
            vib_speed: 0.0,
            env_attack: 0.0,
            env_sustain: 0.3,
            env_decay: 0.4,
            env_punch: 0.0,
            lpf_resonance: 0.0,
            lpf_freq: 1.0,
            lpf_ramp: 0.0,
            hpf_freq: 0.0,
            hpf_ramp: 0.0,
            pha_offset: 0.0,
            pha_ramp: 0.0,
            repeat_speed: 0.0,
            arp_speed: 0.0,
            arp_mod: 0.0,
            master_vol: 0.25,
            sound_vol: 0.5,
        }
    }
}

/// Seeded helper mirroring the classic generator's `frnd`/`rnd` calls
struct PresetRng(StdRng);

impl PresetRng {
    fn new(seed: i32) -> Self {
        Self(StdRng::seed_from_u64(seed as u32 as u64))
    }

    fn frnd(&mut self, range: f32) -> f32 {
        self.0.gen::<f32>() * range
    }

    fn rnd(&mut self, max: u32) -> u32 {
        self.0.gen_range(0..=max)
    }

    fn chance(&mut self) -> bool {
        self.rnd(1) == 1
    }
}

impl SfxrParams {
    /// Deterministic parameters for `preset`; equal seeds give equal sounds.
    pub fn from_preset(preset: SfxrPreset, seed: i32) -> Self {
        let mut rng = PresetRng::new(seed);
        let mut p = SfxrParams::default();

        match preset {
            SfxrPreset::Coin => {
                p.base_freq = 0.4 + rng.frnd(0.5);
                p.env_attack = 0.0;
                p.env_sustain = rng.frnd(0.1);
                p.env_decay = 0.1 + rng.frnd(0.4);
                p.env_punch = 0.3 + rng.frnd(0.3);
                if rng.chance() {
                    p.arp_speed = 0.5 + rng.frnd(0.2);
                    p.arp_mod = 0.2 + rng.frnd(0.4);
                }
            }
            SfxrPreset::Laser => {
                let mut wave = rng.rnd(2);
                if wave == 2 && rng.chance() {
                    wave = rng.rnd(1);
                }
                p.wave_type = WaveType::from_index(wave);
                p.base_freq = 0.5 + rng.frnd(0.5);
                p.freq_limit = (p.base_freq - 0.2 - rng.frnd(0.6)).max(0.2);
                p.freq_ramp = -0.15 - rng.frnd(0.2);
                if rng.rnd(2) == 0 {
                    p.base_freq = 0.3 + rng.frnd(0.6);
                    p.freq_limit = rng.frnd(0.1);
                    p.freq_ramp = -0.35 - rng.frnd(0.3);
                }
                if rng.chance() {
                    p.duty = rng.frnd(0.5);
                    p.duty_ramp = rng.frnd(0.2);
                } else {
                    p.duty = 0.4 + rng.frnd(0.5);
                    p.duty_ramp = -rng.frnd(0.7);
                }
                p.env_attack = 0.0;
                p.env_sustain = 0.1 + rng.frnd(0.2);
                p.env_decay = rng.frnd(0.4);
                if rng.chance() {
                    p.env_punch = rng.frnd(0.3);
                }
                if rng.rnd(2) == 0 {
                    p.pha_offset = rng.frnd(0.2);
                    p.pha_ramp = -rng.frnd(0.2);
                }
                if rng.chance() {
                    p.hpf_freq = rng.frnd(0.3);
                }
            }
            SfxrPreset::Explosion => {
                p.wave_type = WaveType::Noise;
                if rng.chance() {
                    p.base_freq = 0.1 + rng.frnd(0.4);
                    p.freq_ramp = -0.1 + rng.frnd(0.4);
                } else {
                    p.base_freq = 0.2 + rng.frnd(0.7);
                    p.freq_ramp = -0.2 - rng.frnd(0.2);
                }
                p.base_freq *= p.base_freq;
                if rng.rnd(4) == 0 {
                    p.freq_ramp = 0.0;
                }
                if rng.rnd(2) == 0 {
                    p.repeat_speed = 0.3 + rng.frnd(0.5);
                }
                p.env_attack = 0.0;
                p.env_sustain = 0.1 + rng.frnd(0.3);
                p.env_decay = rng.frnd(0.5);
                if !rng.chance() {
                    p.pha_offset = -0.3 + rng.frnd(0.9);
                    p.pha_ramp = -rng.frnd(0.3);
                }
                p.env_punch = 0.2 + rng.frnd(0.6);
                if rng.chance() {
                    p.vib_strength = rng.frnd(0.7);
                    p.vib_speed = rng.frnd(0.6);
                }
                if rng.rnd(2) == 0 {
                    p.arp_speed = 0.6 + rng.frnd(0.3);
                    p.arp_mod = 0.8 - rng.frnd(1.6);
                }
            }
            SfxrPreset::PowerUp => {
                if rng.chance() {
                    p.wave_type = WaveType::Sawtooth;
                } else {
                    p.duty = rng.frnd(0.6);
                }
                p.base_freq = 0.2 + rng.frnd(0.3);
                if rng.chance() {
                    p.freq_ramp = 0.1 + rng.frnd(0.4);
                    p.repeat_speed = 0.4 + rng.frnd(0.4);
                } else {
                    p.freq_ramp = 0.05 + rng.frnd(0.2);
                    if rng.chance() {
                        p.vib_strength = rng.frnd(0.7);
                        p.vib_speed = rng.frnd(0.6);
                    }
                }
                p.env_attack = 0.0;
                p.env_sustain = rng.frnd(0.4);
                p.env_decay = 0.1 + rng.frnd(0.4);
            }
            SfxrPreset::Hurt => {
                let wave = match rng.rnd(2) {
                    2 => 3,
                    other => other,
                };
                p.wave_type = WaveType::from_index(wave);
                if p.wave_type == WaveType::Square {
                    p.duty = rng.frnd(0.6);
                }
                p.base_freq = 0.2 + rng.frnd(0.6);
                p.freq_ramp = -0.3 - rng.frnd(0.4);
                p.env_attack = 0.0;
                p.env_sustain = rng.frnd(0.1);
                p.env_decay = 0.1 + rng.frnd(0.2);
                if rng.chance() {
                    p.hpf_freq = rng.frnd(0.3);
                }
            }
            SfxrPreset::Jump => {
                p.wave_type = WaveType::Square;
                p.duty = rng.frnd(0.6);
                p.base_freq = 0.3 + rng.frnd(0.3);
                p.freq_ramp = 0.1 + rng.frnd(0.2);
                p.env_attack = 0.0;
                p.env_sustain = 0.1 + rng.frnd(0.3);
                p.env_decay = 0.1 + rng.frnd(0.2);
                if rng.chance() {
                    p.hpf_freq = rng.frnd(0.3);
                }
                if rng.chance() {
                    p.lpf_freq = 1.0 - rng.frnd(0.6);
                }
            }
            SfxrPreset::Blip => {
                p.wave_type = WaveType::from_index(rng.rnd(1));
                if p.wave_type == WaveType::Square {
                    p.duty = rng.frnd(0.6);
                }
                p.base_freq = 0.2 + rng.frnd(0.4);
                p.env_attack = 0.0;
                p.env_sustain = 0.1 + rng.frnd(0.1);
                p.env_decay = rng.frnd(0.2);
                p.hpf_freq = 0.1;
            }
        }

        p
    }
}

/// Renders `SfxrParams` one sample at a time
pub struct SfxrSource {
    params: SfxrParams,
    rng: StdRng,
    playing: bool,

    phase: usize,
    fperiod: f64,
    fmaxperiod: f64,
    fslide: f64,
    fdslide: f64,
    period: usize,
    square_duty: f32,
    square_slide: f32,

    env_stage: usize,
    env_time: u32,
    env_length: [u32; 3],
    env_vol: f32,

    fphase: f32,
    fdphase: f32,
    iphase: usize,
    phaser_buffer: [f32; PHASER_LEN],
    ipp: usize,
    noise_buffer: [f32; NOISE_LEN],

    fltp: f32,
    fltdp: f32,
    fltw: f32,
    fltw_d: f32,
    fltdmp: f32,
    fltphp: f32,
    flthp: f32,
    flthp_d: f32,

    vib_phase: f32,
    vib_speed: f32,
    vib_amp: f32,

    rep_time: u32,
    rep_limit: u32,
    arp_time: u32,
    arp_limit: u32,
    arp_mod: f64,
}

impl SfxrSource {
    pub fn new(params: SfxrParams, seed: i32) -> Self {
        let mut source = Self {
            params,
            rng: StdRng::seed_from_u64(seed as u32 as u64),
            playing: true,
            phase: 0,
            fperiod: 0.0,
            fmaxperiod: 0.0,
            fslide: 0.0,
            fdslide: 0.0,
            period: 0,
            square_duty: 0.0,
            square_slide: 0.0,
            env_stage: 0,
            env_time: 0,
            env_length: [0; 3],
            env_vol: 0.0,
            fphase: 0.0,
            fdphase: 0.0,
            iphase: 0,
            phaser_buffer: [0.0; PHASER_LEN],
            ipp: 0,
            noise_buffer: [0.0; NOISE_LEN],
            fltp: 0.0,
            fltdp: 0.0,
            fltw: 0.0,
            fltw_d: 0.0,
            fltdmp: 0.0,
            fltphp: 0.0,
            flthp: 0.0,
            flthp_d: 0.0,
            vib_phase: 0.0,
            vib_speed: 0.0,
            vib_amp: 0.0,
            rep_time: 0,
            rep_limit: 0,
            arp_time: 0,
            arp_limit: 0,
            arp_mod: 0.0,
        };
        source.reset(false);
        source
    }

    /// Build the source for a preset and seed in one go.
    pub fn from_preset(preset: SfxrPreset, seed: i32) -> Self {
        Self::new(SfxrParams::from_preset(preset, seed), seed)
    }

    fn reset(&mut self, restart: bool) {
        let p = &self.params;

        if !restart {
            self.phase = 0;
        }
        let base = p.base_freq as f64;
        let limit = p.freq_limit as f64;
        self.fperiod = 100.0 / (base * base + 0.001);
        self.period = self.fperiod as usize;
        self.fmaxperiod = 100.0 / (limit * limit + 0.001);
        self.fslide = 1.0 - (p.freq_ramp as f64).powi(3) * 0.01;
        self.fdslide = -(p.freq_dramp as f64).powi(3) * 0.000_001;
        self.square_duty = 0.5 - p.duty * 0.5;
        self.square_slide = -p.duty_ramp * 0.000_05;
        self.arp_mod = if p.arp_mod >= 0.0 {
            1.0 - (p.arp_mod as f64).powi(2) * 0.9
        } else {
            1.0 + (p.arp_mod as f64).powi(2) * 10.0
        };
        self.arp_time = 0;
        self.arp_limit = ((1.0 - p.arp_speed).powi(2) * 20_000.0 + 32.0) as u32;
        if p.arp_speed == 1.0 {
            self.arp_limit = 0;
        }

        if restart {
            return;
        }

        self.fltp = 0.0;
        self.fltdp = 0.0;
        self.fltw = p.lpf_freq.powi(3) * 0.1;
        self.fltw_d = 1.0 + p.lpf_ramp * 0.0001;
        self.fltdmp = (5.0 / (1.0 + p.lpf_resonance.powi(2) * 20.0) * (0.01 + self.fltw)).min(0.8);
        self.fltphp = 0.0;
        self.flthp = p.hpf_freq.powi(2) * 0.1;
        self.flthp_d = 1.0 + p.hpf_ramp * 0.0003;

        self.vib_phase = 0.0;
        self.vib_speed = p.vib_speed.powi(2) * 0.01;
        self.vib_amp = p.vib_strength * 0.5;

        self.env_vol = 0.0;
        self.env_stage = 0;
        self.env_time = 0;
        self.env_length = [
            (p.env_attack * p.env_attack * 100_000.0) as u32,
            (p.env_sustain * p.env_sustain * 100_000.0) as u32,
            (p.env_decay * p.env_decay * 100_000.0) as u32,
        ];

        self.fphase = p.pha_offset.powi(2) * 1020.0;
        if p.pha_offset < 0.0 {
            self.fphase = -self.fphase;
        }
        self.fdphase = p.pha_ramp.powi(2);
        if p.pha_ramp < 0.0 {
            self.fdphase = -self.fdphase;
        }
        self.iphase = self.fphase.abs() as usize;
        self.ipp = 0;
        self.phaser_buffer = [0.0; PHASER_LEN];

        self.rep_time = 0;
        self.rep_limit = ((1.0 - p.repeat_speed).powi(2) * 20_000.0 + 32.0) as u32;
        if p.repeat_speed == 0.0 {
            self.rep_limit = 0;
        }

        self.refill_noise();
    }

    fn refill_noise(&mut self) {
        for sample in self.noise_buffer.iter_mut() {
            *sample = self.rng.gen_range(-1.0..1.0);
        }
    }

    fn envelope_ratio(&self) -> f32 {
        let length = self.env_length[self.env_stage];
        if length == 0 {
            1.0
        } else {
            self.env_time as f32 / length as f32
        }
    }

    fn synth_sample(&mut self) -> Option<f32> {
        if !self.playing {
            return None;
        }

        self.rep_time += 1;
        if self.rep_limit != 0 && self.rep_time >= self.rep_limit {
            self.rep_time = 0;
            self.reset(true);
        }

        self.arp_time += 1;
        if self.arp_limit != 0 && self.arp_time >= self.arp_limit {
            self.arp_limit = 0;
            self.fperiod *= self.arp_mod;
        }

        self.fslide += self.fdslide;
        self.fperiod *= self.fslide;
        if self.fperiod > self.fmaxperiod {
            self.fperiod = self.fmaxperiod;
            if self.params.freq_limit > 0.0 {
                self.playing = false;
            }
        }

        let mut rfperiod = self.fperiod as f32;
        if self.vib_amp > 0.0 {
            self.vib_phase += self.vib_speed;
            rfperiod = self.fperiod as f32 * (1.0 + self.vib_phase.sin() * self.vib_amp);
        }
        self.period = (rfperiod as usize).max(8);

        self.square_duty = (self.square_duty + self.square_slide).clamp(0.0, 0.5);

        self.env_time += 1;
        if self.env_time > self.env_length[self.env_stage] {
            self.env_time = 0;
            self.env_stage += 1;
            if self.env_stage == 3 {
                self.playing = false;
                return None;
            }
        }
        self.env_vol = match self.env_stage {
            0 => self.envelope_ratio(),
            1 => 1.0 + (1.0 - self.envelope_ratio()) * 2.0 * self.params.env_punch,
            _ => 1.0 - self.envelope_ratio(),
        };

        self.fphase += self.fdphase;
        self.iphase = (self.fphase as i32).unsigned_abs().min(PHASER_LEN as u32 - 1) as usize;

        if self.flthp_d != 0.0 {
            self.flthp = (self.flthp * self.flthp_d).clamp(0.000_01, 0.1);
        }

        let mut ssample = 0.0f32;
        for _ in 0..SUPERSAMPLES {
            self.phase += 1;
            if self.phase >= self.period {
                self.phase %= self.period;
                if self.params.wave_type == WaveType::Noise {
                    self.refill_noise();
                }
            }

            let fp = self.phase as f32 / self.period as f32;
            let mut sample = match self.params.wave_type {
                WaveType::Square => {
                    if fp < self.square_duty {
                        0.5
                    } else {
                        -0.5
                    }
                }
                WaveType::Sawtooth => 1.0 - fp * 2.0,
                WaveType::Sine => (fp * 2.0 * PI).sin(),
                WaveType::Noise => self.noise_buffer[self.phase * NOISE_LEN / self.period],
            };

            // low-pass
            let pp = self.fltp;
            self.fltw = (self.fltw * self.fltw_d).clamp(0.0, 0.1);
            if self.params.lpf_freq != 1.0 {
                self.fltdp += (sample - self.fltp) * self.fltw;
                self.fltdp -= self.fltdp * self.fltdmp;
            } else {
                self.fltp = sample;
                self.fltdp = 0.0;
            }
            self.fltp += self.fltdp;

            // high-pass
            self.fltphp += self.fltp - pp;
            self.fltphp -= self.fltphp * self.flthp;
            sample = self.fltphp;

            // phaser
            self.phaser_buffer[self.ipp & (PHASER_LEN - 1)] = sample;
            sample += self.phaser_buffer[(self.ipp + PHASER_LEN - self.iphase) & (PHASER_LEN - 1)];
            self.ipp = (self.ipp + 1) & (PHASER_LEN - 1);

            ssample += sample * self.env_vol;
        }

        ssample = ssample / SUPERSAMPLES as f32 * self.params.master_vol;
        ssample *= 2.0 * self.params.sound_vol;
        Some(ssample.clamp(-1.0, 1.0))
    }
}

impl Iterator for SfxrSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        self.synth_sample()
    }
}

impl Source for SfxrSource {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

/// Render a whole sound into memory.
pub fn render(params: SfxrParams, seed: i32) -> Vec<f32> {
    SfxrSource::new(params, seed).collect()
}

/// Render a sound to a 16-bit mono WAV file, returning the sample count.
pub fn render_wav(params: SfxrParams, seed: i32, path: &Path) -> Result<usize, AudioError> {
    let export_err = |source| AudioError::ExportFailed {
        path: path.display().to_string(),
        source,
    };

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).map_err(export_err)?;

    let mut count = 0;
    for sample in SfxrSource::new(params, seed) {
        let value = (sample * i16::MAX as f32) as i16;
        writer.write_sample(value).map_err(export_err)?;
        count += 1;
    }
    writer.finalize().map_err(export_err)?;

    tracing::info!("Exported {} samples to {}", count, path.display());
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_params() {
        for preset in SfxrPreset::ALL {
            assert_eq!(
                SfxrParams::from_preset(preset, 1234),
                SfxrParams::from_preset(preset, 1234)
            );
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = SfxrParams::from_preset(SfxrPreset::Coin, 1);
        let b = SfxrParams::from_preset(SfxrPreset::Coin, 2);
        assert_ne!(a.base_freq, b.base_freq);
    }

    #[test]
    fn test_explosion_uses_noise() {
        let params = SfxrParams::from_preset(SfxrPreset::Explosion, -77);
        assert_eq!(params.wave_type, WaveType::Noise);
    }

    #[test]
    fn test_every_preset_renders_finite_audio() {
        for preset in SfxrPreset::ALL {
            let samples = render(SfxrParams::from_preset(preset, 42), 42);
            assert!(!samples.is_empty(), "{} rendered nothing", preset);
            // attack + sustain + decay each cap at 100000 samples
            assert!(samples.len() <= 300_003, "{} did not terminate", preset);
            assert!(samples.iter().all(|s| s.is_finite() && s.abs() <= 1.0));
            assert!(samples.iter().any(|s| *s != 0.0), "{} is silent", preset);
        }
    }

    #[test]
    fn test_render_is_deterministic() {
        let first = render(SfxrParams::from_preset(SfxrPreset::Laser, 9), 9);
        let second = render(SfxrParams::from_preset(SfxrPreset::Laser, 9), 9);
        assert_eq!(first, second);
    }

    #[test]
    fn test_source_format() {
        let source = SfxrSource::from_preset(SfxrPreset::Blip, 3);
        assert_eq!(source.channels(), 1);
        assert_eq!(source.sample_rate(), SAMPLE_RATE);
    }

    #[test]
    fn test_preset_parsing() {
        assert_eq!("Laser".parse::<SfxrPreset>(), Ok(SfxrPreset::Laser));
        assert_eq!("powerup".parse::<SfxrPreset>(), Ok(SfxrPreset::PowerUp));
        assert!("boing".parse::<SfxrPreset>().is_err());
        assert_eq!(SfxrPreset::PowerUp.to_string(), "Power Up");
    }

    #[test]
    fn test_render_wav() {
        let path = std::env::temp_dir().join(format!("sfx_panel_export_{}.wav", std::process::id()));
        let params = SfxrParams::from_preset(SfxrPreset::Jump, 5);
        let expected = render(params.clone(), 5).len();

        let written = render_wav(params, 5, &path).unwrap();
        assert_eq!(written, expected);

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.spec().sample_rate, SAMPLE_RATE);
        assert_eq!(reader.len() as usize, expected);

        std::fs::remove_file(path).unwrap();
    }
}
