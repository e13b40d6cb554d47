/// Formant speech synthesis
///
/// Text is turned letter by letter into phones. Each phone is three
/// formant frequencies plus voicing and frication levels. A glottal source
/// shaped by the chosen waveform runs through a cascade of resonators that
/// glide from one phone to the next, and frication noise is added on top.
use std::f32::consts::PI;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rodio::Source;
use serde::{Deserialize, Serialize};

use crate::error::CommandError;

pub const SPEECH_SAMPLE_RATE: u32 = 11_025;

pub const MAX_BASE_FREQ: u32 = 3000;
pub const SPEED_RANGE: RangeInclusive<f32> = 0.1..=30.0;
pub const DECLINATION_RANGE: RangeInclusive<f32> = -3.0..=3.0;

const BANDWIDTHS: [f32; 3] = [60.0, 90.0, 150.0];
const FRICATION_BANDWIDTH: f32 = 400.0;
const VOICE_GAIN: f32 = 0.15;
const FRICATION_GAIN: f32 = 0.3;
const MIN_PITCH_HZ: f32 = 20.0;
const TRANSITION_SECS: f32 = 0.015;
const WARBLE_HZ: f32 = 6.0;
const WARBLE_DEPTH: f32 = 0.08;
const NOISE_SEED: u64 = 0x5EED;

/// Glottal source shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeechWaveform {
    Sin,
    Triangle,
    Saw,
    Square,
    Pulse,
    Warble,
    Noise,
}

impl SpeechWaveform {
    pub const ALL: [SpeechWaveform; 7] = [
        SpeechWaveform::Sin,
        SpeechWaveform::Triangle,
        SpeechWaveform::Saw,
        SpeechWaveform::Square,
        SpeechWaveform::Pulse,
        SpeechWaveform::Warble,
        SpeechWaveform::Noise,
    ];

    /// One period sampled at `phase` in 0.0..1.0
    fn sample(self, phase: f32, noise: &mut StdRng) -> f32 {
        match self {
            SpeechWaveform::Sin => (2.0 * PI * phase).sin(),
            SpeechWaveform::Triangle => 4.0 * (phase - 0.5).abs() - 1.0,
            SpeechWaveform::Saw | SpeechWaveform::Warble => 2.0 * phase - 1.0,
            SpeechWaveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            // 10% duty, zero mean
            SpeechWaveform::Pulse => {
                if phase < 0.1 {
                    1.0
                } else {
                    -1.0 / 9.0
                }
            }
            SpeechWaveform::Noise => noise.gen_range(-1.0..1.0),
        }
    }
}

impl fmt::Display for SpeechWaveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeechWaveform::Sin => write!(f, "Sin"),
            SpeechWaveform::Triangle => write!(f, "Triangle"),
            SpeechWaveform::Saw => write!(f, "Saw"),
            SpeechWaveform::Square => write!(f, "Square"),
            SpeechWaveform::Pulse => write!(f, "Pulse"),
            SpeechWaveform::Warble => write!(f, "Warble"),
            SpeechWaveform::Noise => write!(f, "Noise"),
        }
    }
}

impl FromStr for SpeechWaveform {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sin" | "sine" => Ok(SpeechWaveform::Sin),
            "triangle" => Ok(SpeechWaveform::Triangle),
            "saw" => Ok(SpeechWaveform::Saw),
            "square" => Ok(SpeechWaveform::Square),
            "pulse" => Ok(SpeechWaveform::Pulse),
            "warble" => Ok(SpeechWaveform::Warble),
            "noise" => Ok(SpeechWaveform::Noise),
            _ => Err(CommandError::InvalidValue {
                argument: "waveform",
                value: s.to_string(),
            }),
        }
    }
}

/// Voice settings applied when an utterance starts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechParams {
    /// Base pitch in tenths of a hertz (0-3000)
    pub base_freq: u32,

    /// Milliseconds per timing unit (0.1-30); larger is slower
    pub speed: f32,

    /// How far the pitch falls over the utterance (-3..3); negative rises
    pub declination: f32,

    pub waveform: SpeechWaveform,
}

impl Default for SpeechParams {
    fn default() -> Self {
        Self {
            base_freq: 1330,
            speed: 10.0,
            declination: 0.5,
            waveform: SpeechWaveform::Saw,
        }
    }
}

impl SpeechParams {
    /// Pitch in Hz at `progress` through the utterance (0.0-1.0)
    pub fn pitch_at(&self, progress: f32) -> f32 {
        let base = self.base_freq as f32 / 10.0;
        let fall = self.declination * 0.1 * progress.clamp(0.0, 1.0);
        (base * (1.0 - fall)).max(MIN_PITCH_HZ)
    }

    fn samples_per_unit(&self) -> f32 {
        let speed = self
            .speed
            .clamp(*SPEED_RANGE.start(), *SPEED_RANGE.end());
        speed / 1000.0 * SPEECH_SAMPLE_RATE as f32
    }
}

/// Left/right gains for a pan in -1.0..=1.0, constant power
pub fn pan_gains(pan: f32) -> [f32; 2] {
    let angle = (pan.clamp(-1.0, 1.0) + 1.0) * PI / 4.0;
    [angle.cos(), angle.sin()]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Phone {
    formants: [f32; 3],
    voicing: f32,
    frication: f32,
    /// Length in timing units
    units: f32,
}

const fn phone(f1: f32, f2: f32, f3: f32, voicing: f32, frication: f32, units: f32) -> Phone {
    Phone {
        formants: [f1, f2, f3],
        voicing,
        frication,
        units,
    }
}

const fn pause(units: f32) -> Phone {
    phone(500.0, 1500.0, 2500.0, 0.0, 0.0, units)
}

// vowels
const AE: Phone = phone(660.0, 1720.0, 2410.0, 1.0, 0.0, 10.0);
const EH: Phone = phone(530.0, 1840.0, 2480.0, 1.0, 0.0, 9.0);
const IH: Phone = phone(390.0, 1990.0, 2550.0, 1.0, 0.0, 8.0);
const AO: Phone = phone(570.0, 840.0, 2410.0, 1.0, 0.0, 10.0);
const UH: Phone = phone(440.0, 1020.0, 2240.0, 1.0, 0.0, 8.0);
const IY: Phone = phone(270.0, 2290.0, 3010.0, 1.0, 0.0, 10.0);
const UW: Phone = phone(300.0, 870.0, 2240.0, 1.0, 0.0, 10.0);
const EY: Phone = phone(480.0, 1720.0, 2520.0, 1.0, 0.0, 12.0);
const AW: Phone = phone(640.0, 1190.0, 2390.0, 1.0, 0.0, 12.0);

// sonorants
const M: Phone = phone(480.0, 1270.0, 2130.0, 0.6, 0.0, 7.0);
const N: Phone = phone(480.0, 1340.0, 2470.0, 0.6, 0.0, 7.0);
const NG: Phone = phone(480.0, 2000.0, 2900.0, 0.6, 0.0, 7.0);
const L: Phone = phone(360.0, 1300.0, 2700.0, 0.8, 0.0, 6.0);
const R: Phone = phone(460.0, 1260.0, 1560.0, 0.8, 0.0, 6.0);
const W: Phone = phone(290.0, 610.0, 2150.0, 0.8, 0.0, 5.0);
const Y: Phone = phone(260.0, 2070.0, 3020.0, 0.8, 0.0, 5.0);

// fricatives
const S: Phone = phone(320.0, 1390.0, 2530.0, 0.0, 1.0, 8.0);
const SH: Phone = phone(300.0, 1840.0, 2750.0, 0.0, 1.0, 8.0);
const F: Phone = phone(340.0, 1100.0, 2080.0, 0.0, 0.5, 7.0);
const TH: Phone = phone(320.0, 1290.0, 2540.0, 0.0, 0.4, 7.0);
const H: Phone = phone(500.0, 1500.0, 2500.0, 0.0, 0.4, 5.0);
const Z: Phone = phone(240.0, 1390.0, 2530.0, 0.5, 0.7, 7.0);
const ZH: Phone = phone(300.0, 1840.0, 2750.0, 0.5, 0.6, 6.0);
const V: Phone = phone(220.0, 1100.0, 2080.0, 0.5, 0.4, 6.0);

// stop bursts, each preceded by a closure
const CLOSURE: Phone = pause(3.0);
const P: Phone = phone(400.0, 1100.0, 2150.0, 0.0, 0.5, 2.0);
const T: Phone = phone(400.0, 1600.0, 2600.0, 0.0, 0.7, 2.0);
const K: Phone = phone(300.0, 1990.0, 2850.0, 0.0, 0.6, 3.0);
const B: Phone = phone(200.0, 1100.0, 2150.0, 0.5, 0.2, 2.0);
const D: Phone = phone(200.0, 1600.0, 2600.0, 0.5, 0.2, 2.0);
const G: Phone = phone(200.0, 1990.0, 2850.0, 0.5, 0.2, 2.0);

const WORD_GAP: Phone = pause(4.0);
const CLAUSE_GAP: Phone = pause(10.0);
const SENTENCE_GAP: Phone = pause(16.0);

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

/// Letter-to-sound rules. Characters with no sound are skipped.
pub fn phonemize(text: &str) -> Vec<Phone> {
    let chars: Vec<char> = text.to_lowercase().chars().collect();
    let mut phones = Vec::with_capacity(chars.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        let word_start = i == 0 || !chars[i - 1].is_alphabetic();

        let digraph: Option<&[Phone]> = match (c, next) {
            ('t', Some('h')) => Some(&[TH]),
            ('s', Some('h')) => Some(&[SH]),
            ('c', Some('h')) => Some(&[CLOSURE, T, SH]),
            ('c', Some('k')) => Some(&[CLOSURE, K]),
            ('p', Some('h')) => Some(&[F]),
            ('n', Some('g')) => Some(&[NG]),
            ('q', Some('u')) => Some(&[CLOSURE, K, W]),
            ('e', Some('e')) => Some(&[IY]),
            ('o', Some('o')) => Some(&[UW]),
            ('o', Some('u')) => Some(&[AW]),
            ('a', Some('i')) | ('a', Some('y')) => Some(&[EY]),
            _ => None,
        };
        if let Some(sounds) = digraph {
            phones.extend_from_slice(sounds);
            i += 2;
            continue;
        }

        let sounds: &[Phone] = match c {
            'a' => &[AE],
            'e' => &[EH],
            'i' => &[IH],
            'o' => &[AO],
            'u' => &[UH],
            'y' if word_start && next.map_or(false, is_vowel) => &[Y],
            'y' => &[IY],
            'b' => &[CLOSURE, B],
            'c' if matches!(next, Some('e' | 'i' | 'y')) => &[S],
            'c' | 'k' | 'q' => &[CLOSURE, K],
            'd' => &[CLOSURE, D],
            'f' => &[F],
            'g' => &[CLOSURE, G],
            'h' => &[H],
            'j' => &[CLOSURE, D, ZH],
            'l' => &[L],
            'm' => &[M],
            'n' => &[N],
            'p' => &[CLOSURE, P],
            'r' => &[R],
            's' => &[S],
            't' => &[CLOSURE, T],
            'v' => &[V],
            'w' => &[W],
            'x' => &[CLOSURE, K, S],
            'z' => &[Z],
            ',' | ';' | ':' => &[CLAUSE_GAP],
            '.' | '!' | '?' => &[SENTENCE_GAP],
            c if c.is_whitespace() => &[WORD_GAP],
            _ => &[],
        };
        phones.extend_from_slice(sounds);
        i += 1;
    }

    phones
}

/// Whether `text` produces any sound beyond pauses
pub fn is_speakable(text: &str) -> bool {
    phonemize(text)
        .iter()
        .any(|phone| phone.voicing > 0.0 || phone.frication > 0.0)
}

/// Two-pole resonator, unity gain at DC
#[derive(Debug, Clone, Copy, Default)]
struct Resonator {
    y1: f32,
    y2: f32,
}

impl Resonator {
    fn process(&mut self, freq: f32, bandwidth: f32, input: f32) -> f32 {
        let t = 1.0 / SPEECH_SAMPLE_RATE as f32;
        let c = -(-2.0 * PI * bandwidth * t).exp();
        let b = 2.0 * (-PI * bandwidth * t).exp() * (2.0 * PI * freq * t).cos();
        let a = 1.0 - b - c;

        let output = a * input + b * self.y1 + c * self.y2;
        self.y2 = self.y1;
        self.y1 = output;
        output
    }
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Renders one utterance as a finite mono source
pub struct SpeechSource {
    params: SpeechParams,
    phones: Vec<Phone>,
    /// End sample of each phone
    ends: Vec<usize>,
    total: usize,

    index: usize,
    position: usize,
    phase: f32,
    warble_phase: f32,
    cascade: [Resonator; 3],
    frication: Resonator,
    noise: StdRng,
}

impl SpeechSource {
    pub fn new(text: &str, params: SpeechParams) -> Self {
        let phones = phonemize(text);
        let samples_per_unit = params.samples_per_unit();

        let mut ends = Vec::with_capacity(phones.len());
        let mut total = 0;
        for phone in &phones {
            total += ((phone.units * samples_per_unit) as usize).max(1);
            ends.push(total);
        }

        Self {
            params,
            phones,
            ends,
            total,
            index: 0,
            position: 0,
            phase: 0.0,
            warble_phase: 0.0,
            cascade: [Resonator::default(); 3],
            frication: Resonator::default(),
            noise: StdRng::seed_from_u64(NOISE_SEED),
        }
    }

    /// Total length in samples
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    fn synth_sample(&mut self) -> Option<f32> {
        if self.position >= self.total {
            return None;
        }
        while self.position >= self.ends[self.index] {
            self.index += 1;
        }

        let current = self.phones[self.index];
        let previous = match self.index {
            0 => current,
            n => self.phones[n - 1],
        };
        let start = match self.index {
            0 => 0,
            n => self.ends[n - 1],
        };
        let length = self.ends[self.index] - start;
        let transition = (TRANSITION_SECS * SPEECH_SAMPLE_RATE as f32)
            .min(length as f32 / 2.0)
            .max(1.0);
        let t = ((self.position - start) as f32 / transition).min(1.0);

        let voicing = lerp(previous.voicing, current.voicing, t);
        let frication = lerp(previous.frication, current.frication, t);

        let progress = self.position as f32 / self.total as f32;
        let mut pitch = self.params.pitch_at(progress);
        if self.params.waveform == SpeechWaveform::Warble {
            pitch *= 1.0 + WARBLE_DEPTH * (2.0 * PI * self.warble_phase).sin();
            self.warble_phase = (self.warble_phase + WARBLE_HZ / SPEECH_SAMPLE_RATE as f32).fract();
        }
        self.phase = (self.phase + pitch / SPEECH_SAMPLE_RATE as f32).fract();

        let mut voiced = self.params.waveform.sample(self.phase, &mut self.noise) * voicing;
        for (k, resonator) in self.cascade.iter_mut().enumerate() {
            let formant = lerp(previous.formants[k], current.formants[k], t);
            voiced = resonator.process(formant, BANDWIDTHS[k], voiced);
        }

        let hiss = self.noise.gen_range(-1.0f32..1.0);
        let f3 = lerp(previous.formants[2], current.formants[2], t);
        let fricated = self.frication.process(f3, FRICATION_BANDWIDTH, hiss) * frication;

        self.position += 1;
        Some((voiced * VOICE_GAIN + fricated * FRICATION_GAIN).clamp(-1.0, 1.0))
    }
}

impl Iterator for SpeechSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        self.synth_sample()
    }
}

impl Source for SpeechSource {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SPEECH_SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_secs_f64(
            self.total as f64 / SPEECH_SAMPLE_RATE as f64,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(text: &str, params: SpeechParams) -> Vec<f32> {
        SpeechSource::new(text, params).collect()
    }

    #[test]
    fn test_every_waveform_renders_bounded_audio() {
        for waveform in SpeechWaveform::ALL {
            let params = SpeechParams {
                waveform,
                ..SpeechParams::default()
            };
            let samples = render("hello world", params);
            assert!(!samples.is_empty());
            assert!(samples.iter().all(|s| s.is_finite() && s.abs() <= 1.0));
            assert!(samples.iter().any(|s| s.abs() > 0.001), "{} is silent", waveform);
        }
    }

    #[test]
    fn test_length_matches_declared_total() {
        let source = SpeechSource::new("testing, one two.", SpeechParams::default());
        let expected = source.len();
        assert_eq!(source.count(), expected);
    }

    #[test]
    fn test_speed_scales_length() {
        let slow = SpeechSource::new("speech", SpeechParams { speed: 20.0, ..Default::default() });
        let fast = SpeechSource::new("speech", SpeechParams { speed: 5.0, ..Default::default() });
        assert!(slow.len() > fast.len() * 3);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let params = SpeechParams {
            waveform: SpeechWaveform::Noise,
            ..SpeechParams::default()
        };
        assert_eq!(render("shush", params), render("shush", params));
    }

    #[test]
    fn test_empty_text_renders_nothing() {
        let source = SpeechSource::new("", SpeechParams::default());
        assert!(source.is_empty());
        assert_eq!(render("1234", SpeechParams::default()).len(), 0);

        assert!(!is_speakable("  ... 99 ?"));
        assert!(is_speakable("ok"));
    }

    #[test]
    fn test_declination_lowers_pitch() {
        let params = SpeechParams::default();
        assert!((params.pitch_at(0.0) - 133.0).abs() < 1e-3);
        assert!(params.pitch_at(1.0) < params.pitch_at(0.0));

        let rising = SpeechParams {
            declination: -2.0,
            ..params
        };
        assert!(rising.pitch_at(1.0) > rising.pitch_at(0.0));

        let silent = SpeechParams {
            base_freq: 0,
            ..params
        };
        assert_eq!(silent.pitch_at(0.5), MIN_PITCH_HZ);
    }

    #[test]
    fn test_phonemize_rules() {
        assert_eq!(phonemize("the"), vec![TH, EH]);
        assert_eq!(phonemize("cat"), vec![CLOSURE, K, AE, CLOSURE, T]);
        assert_eq!(phonemize("city"), vec![S, IH, CLOSURE, T, IY]);
        assert_eq!(phonemize("yes"), vec![Y, EH, S]);
        assert_eq!(phonemize("hi, you."), vec![H, IH, CLAUSE_GAP, WORD_GAP, Y, AW, SENTENCE_GAP]);
    }

    #[test]
    fn test_pan_gains_are_constant_power() {
        let [left, right] = pan_gains(-1.0);
        assert!((left - 1.0).abs() < 1e-6 && right.abs() < 1e-6);

        let [left, right] = pan_gains(0.0);
        assert!((left - right).abs() < 1e-6);
        assert!((left * left + right * right - 1.0).abs() < 1e-5);

        assert_eq!(pan_gains(4.0), pan_gains(1.0));
    }

    #[test]
    fn test_waveform_parsing() {
        assert_eq!("sine".parse::<SpeechWaveform>(), Ok(SpeechWaveform::Sin));
        assert_eq!("Warble".parse::<SpeechWaveform>(), Ok(SpeechWaveform::Warble));
        assert!("chirp".parse::<SpeechWaveform>().is_err());
    }

    #[test]
    fn test_source_format() {
        let source = SpeechSource::new("a", SpeechParams::default());
        assert_eq!(source.channels(), 1);
        assert_eq!(source.sample_rate(), SPEECH_SAMPLE_RATE);
        assert!(source.total_duration().is_some());
    }
}
