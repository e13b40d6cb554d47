/// Command types for the application
///
/// Commands represent requests to perform actions (imperative).
/// They come from the console panel and from the frame logic, and are
/// applied by the command executor.
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;

use crate::audio_system::speech::{DECLINATION_RANGE, MAX_BASE_FREQ, SPEED_RANGE};
use crate::audio_system::{Position, SfxrPreset, SpeechWaveform};
use crate::config::SFXR_SLOT_COUNT;
use crate::error::CommandError;

/// Application commands
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Open a music file for streaming; no path asks through a dialog
    OpenBgm { path: Option<PathBuf> },

    /// Restart the music from the beginning
    PlayBgm,

    StopBgm,

    SetBgmVolume { volume: f32 },

    /// Load a one-shot effect; no path asks through a dialog
    OpenSfx { path: Option<PathBuf> },

    /// Play the one-shot effect at the current position
    PlaySfx,

    SetSpeechText { text: String },

    /// Say the current text with the current voice
    PlaySpeech,

    SetSpeechVolume { volume: f32 },

    /// -1.0 is hard left, 1.0 hard right
    SetSpeechPan { pan: f32 },

    /// Base pitch in tenths of a hertz
    SetSpeechFreq { base_freq: u32 },

    SetSpeechSpeed { speed: f32 },

    SetSpeechDeclination { declination: f32 },

    SetSpeechWaveform { waveform: SpeechWaveform },

    /// Fire an sfxr slot on the bus at the current position
    PlaySfxr { slot: usize },

    SetSfxrPreset { slot: usize, preset: SfxrPreset },

    SetSfxrSeed { slot: usize, seed: i32 },

    RandomizeSfxrSeed { slot: usize },

    SetSfxrLofi { slot: usize, enabled: bool },

    /// Render a slot to a WAV file
    ExportSfxr { slot: usize, path: PathBuf },

    SetBusVolume { volume: f32 },

    SetEcho { enabled: bool },

    SetReverb { enabled: bool },

    SetPosition { position: Position },

    UseController { enabled: bool },

    /// Print the bus output level
    ShowLevel,

    /// Print the panel state
    Status,

    /// Quit the application
    Quit,
}

impl Command {
    /// Get a human-readable description of the command
    pub fn description(&self) -> String {
        match self {
            Command::OpenBgm { path } => match path {
                Some(path) => format!("Open BGM {}", path.display()),
                None => "Open BGM".to_string(),
            },
            Command::PlayBgm => "Play BGM".to_string(),
            Command::StopBgm => "Stop BGM".to_string(),
            Command::SetBgmVolume { volume } => format!("Set BGM volume to {:.2}", volume),
            Command::OpenSfx { path } => match path {
                Some(path) => format!("Open SFX {}", path.display()),
                None => "Open SFX".to_string(),
            },
            Command::PlaySfx => "Play SFX".to_string(),
            Command::SetSpeechText { text } => format!("Set speech text to {:?}", text),
            Command::PlaySpeech => "Play speech".to_string(),
            Command::SetSpeechVolume { volume } => format!("Set speech volume to {:.2}", volume),
            Command::SetSpeechPan { pan } => format!("Set speech pan to {:.2}", pan),
            Command::SetSpeechFreq { base_freq } => format!("Set speech base freq to {}", base_freq),
            Command::SetSpeechSpeed { speed } => format!("Set speech speed to {:.1}", speed),
            Command::SetSpeechDeclination { declination } => {
                format!("Set speech declination to {:.2}", declination)
            }
            Command::SetSpeechWaveform { waveform } => format!("Set speech waveform to {}", waveform),
            Command::PlaySfxr { slot } => format!("Play sfxr #{}", slot + 1),
            Command::SetSfxrPreset { slot, preset } => {
                format!("Set sfxr #{} preset to {}", slot + 1, preset)
            }
            Command::SetSfxrSeed { slot, seed } => format!("Set sfxr #{} seed to {}", slot + 1, seed),
            Command::RandomizeSfxrSeed { slot } => format!("Randomize sfxr #{} seed", slot + 1),
            Command::SetSfxrLofi { slot, enabled } => {
                format!("Turn sfxr #{} lo-fi {}", slot + 1, on_off(*enabled))
            }
            Command::ExportSfxr { slot, path } => {
                format!("Export sfxr #{} to {}", slot + 1, path.display())
            }
            Command::SetBusVolume { volume } => format!("Set bus volume to {:.2}", volume),
            Command::SetEcho { enabled } => format!("Turn echo {}", on_off(*enabled)),
            Command::SetReverb { enabled } => format!("Turn reverb {}", on_off(*enabled)),
            Command::SetPosition { position } => format!("Move to {}", position),
            Command::UseController { enabled } => format!("Turn controller {}", on_off(*enabled)),
            Command::ShowLevel => "Show bus level".to_string(),
            Command::Status => "Show status".to_string(),
            Command::Quit => "Quit".to_string(),
        }
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

/// Console help text
pub const USAGE: &str = "\
bgm open [path] | bgm play | bgm stop | bgm volume <0-1>
sfx open [path] | sfx play
speech text <text> | speech play | speech volume <0-1> | speech pan <-1-1>
speech freq <0-3000> | speech speed <0.1-30> | speech declination <-3-3>
speech wave <sin|triangle|saw|square|pulse|warble|noise>
sfxr play <1-8> | sfxr preset <1-8> <coin|laser|explosion|powerup|hurt|jump|blip>
sfxr seed <1-8> <n> | sfxr random <1-8> | sfxr lofi <1-8> <on|off> | sfxr export <1-8> <path>
bus volume <0-1> | bus echo <on|off> | bus reverb <on|off>
pos <x> <y> <z> | controller <on|off> | press <button> | wave | status | quit";

struct Args<'a> {
    command: &'static str,
    words: std::str::SplitWhitespace<'a>,
}

impl<'a> Args<'a> {
    fn next(&mut self, argument: &'static str) -> Result<&'a str, CommandError> {
        self.words.next().ok_or(CommandError::MissingArgument {
            command: self.command,
            argument,
        })
    }

    fn parse<T: FromStr>(&mut self, argument: &'static str) -> Result<T, CommandError> {
        let value = self.next(argument)?;
        value.parse().map_err(|_| CommandError::InvalidValue {
            argument,
            value: value.to_string(),
        })
    }

    fn ranged(
        &mut self,
        argument: &'static str,
        range: RangeInclusive<f32>,
    ) -> Result<f32, CommandError> {
        let value: f32 = self.parse(argument)?;
        if range.contains(&value) {
            Ok(value)
        } else {
            Err(CommandError::InvalidValue {
                argument,
                value: value.to_string(),
            })
        }
    }

    fn volume(&mut self) -> Result<f32, CommandError> {
        self.ranged("volume", 0.0..=1.0)
    }

    fn toggle(&mut self) -> Result<bool, CommandError> {
        match self.next("on|off")? {
            "on" => Ok(true),
            "off" => Ok(false),
            other => Err(CommandError::InvalidValue {
                argument: "on|off",
                value: other.to_string(),
            }),
        }
    }

    /// 1-based slot number on the console, 0-based index internally
    fn slot(&mut self) -> Result<usize, CommandError> {
        let value = self.next("slot")?;
        match value.parse::<usize>() {
            Ok(n) if (1..=SFXR_SLOT_COUNT).contains(&n) => Ok(n - 1),
            _ => Err(CommandError::InvalidValue {
                argument: "slot",
                value: value.to_string(),
            }),
        }
    }

    /// Rest of the line, which may contain spaces
    fn rest_text(self) -> Option<String> {
        let rest = self.words.collect::<Vec<_>>().join(" ");
        if rest.is_empty() {
            None
        } else {
            Some(rest)
        }
    }

    fn rest(self) -> Option<PathBuf> {
        self.rest_text().map(PathBuf::from)
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let head = words.next().unwrap_or("");
        let sub = match head {
            "bgm" | "sfx" | "speech" | "sfxr" | "bus" => words.next().unwrap_or(""),
            _ => "",
        };

        let mut args = Args {
            command: "command",
            words,
        };

        let command = match (head, sub) {
            ("bgm", "open") => Command::OpenBgm { path: args.rest() },
            ("bgm", "play") => Command::PlayBgm,
            ("bgm", "stop") => Command::StopBgm,
            ("bgm", "volume") => Command::SetBgmVolume {
                volume: args.volume()?,
            },
            ("sfx", "open") => Command::OpenSfx { path: args.rest() },
            ("sfx", "play") => Command::PlaySfx,
            ("speech", "text") => Command::SetSpeechText {
                text: args.rest_text().ok_or(CommandError::MissingArgument {
                    command: "speech text",
                    argument: "text",
                })?,
            },
            ("speech", "play") => Command::PlaySpeech,
            ("speech", "volume") => Command::SetSpeechVolume {
                volume: args.volume()?,
            },
            ("speech", "pan") => Command::SetSpeechPan {
                pan: args.ranged("pan", -1.0..=1.0)?,
            },
            ("speech", "freq") => {
                let base_freq: u32 = args.parse("freq")?;
                if base_freq > MAX_BASE_FREQ {
                    return Err(CommandError::InvalidValue {
                        argument: "freq",
                        value: base_freq.to_string(),
                    });
                }
                Command::SetSpeechFreq { base_freq }
            }
            ("speech", "speed") => Command::SetSpeechSpeed {
                speed: args.ranged("speed", SPEED_RANGE)?,
            },
            ("speech", "declination") => Command::SetSpeechDeclination {
                declination: args.ranged("declination", DECLINATION_RANGE)?,
            },
            ("speech", "wave") => Command::SetSpeechWaveform {
                waveform: args.next("waveform")?.parse()?,
            },
            ("sfxr", "play") => Command::PlaySfxr { slot: args.slot()? },
            ("sfxr", "preset") => Command::SetSfxrPreset {
                slot: args.slot()?,
                preset: args.next("preset")?.parse()?,
            },
            ("sfxr", "seed") => Command::SetSfxrSeed {
                slot: args.slot()?,
                seed: args.parse("seed")?,
            },
            ("sfxr", "random") => Command::RandomizeSfxrSeed { slot: args.slot()? },
            ("sfxr", "lofi") => Command::SetSfxrLofi {
                slot: args.slot()?,
                enabled: args.toggle()?,
            },
            ("sfxr", "export") => {
                args.command = "sfxr export";
                let slot = args.slot()?;
                let path = args.rest().ok_or(CommandError::MissingArgument {
                    command: "sfxr export",
                    argument: "path",
                })?;
                Command::ExportSfxr { slot, path }
            }
            ("bus", "volume") => Command::SetBusVolume {
                volume: args.volume()?,
            },
            ("bus", "echo") => Command::SetEcho {
                enabled: args.toggle()?,
            },
            ("bus", "reverb") => Command::SetReverb {
                enabled: args.toggle()?,
            },
            ("pos", _) => {
                args.command = "pos";
                let position = Position::new(args.parse("x")?, args.parse("y")?, args.parse("z")?);
                Command::SetPosition {
                    position: position.clamped(),
                }
            }
            ("controller", _) => {
                args.command = "controller";
                Command::UseController {
                    enabled: args.toggle()?,
                }
            }
            ("wave", _) => Command::ShowLevel,
            ("status", _) => Command::Status,
            ("quit", _) | ("exit", _) => Command::Quit,
            _ => return Err(CommandError::Unknown(line.trim().to_string())),
        };

        Ok(command)
    }
}
