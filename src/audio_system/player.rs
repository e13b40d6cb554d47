/// Music and effect players
///
/// `BgmPlayer` streams from a `StreamedFile` it keeps for its whole
/// lifetime; `SfxClip` preloads its file into memory and plays a fresh
/// decoder per trigger; `SpeechPlayer` voices text on its own sink.
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rodio::source::{ChannelVolume, Spatial};
use rodio::{Decoder, OutputStreamHandle, Sink, Source};

use super::source::{Listener, Position, SoundKind};
use super::speech::{is_speakable, pan_gains, SpeechParams, SpeechSource};
use crate::error::AudioError;
use crate::stream_file::{ByteSource, StreamedFile};

/// Streamed file plus the generation of the decoder allowed to use it
struct Tracked {
    file: StreamedFile,
    generation: u64,
}

/// Reader owned by the BGM player. Every reopen or restart starts a new
/// generation; handles from earlier generations read nothing.
#[derive(Clone)]
pub struct SharedReader(Arc<Mutex<Tracked>>);

impl SharedReader {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(Tracked {
            file: StreamedFile::new(),
            generation: 0,
        })))
    }

    /// Detach every handed-out stream and point the reader at `path`.
    pub fn open(&self, path: &Path) -> bool {
        let mut tracked = self.0.lock();
        tracked.generation += 1;
        tracked.file.open(path);
        tracked.file.is_open()
    }

    /// Rewind to the start and hand out the only live stream.
    pub fn restart(&self) -> Option<SharedStream> {
        let mut tracked = self.0.lock();
        if !tracked.file.is_open() {
            return None;
        }
        tracked.generation += 1;
        tracked.file.seek_to(0);
        Some(SharedStream {
            tracked: Arc::clone(&self.0),
            generation: tracked.generation,
        })
    }

    pub fn close(&self) {
        let mut tracked = self.0.lock();
        tracked.generation += 1;
        tracked.file.close();
    }

    pub fn is_open(&self) -> bool {
        self.0.lock().file.is_open()
    }

    pub fn length(&self) -> u64 {
        self.0.lock().file.length()
    }

    pub fn path(&self) -> PathBuf {
        self.0.lock().file.path().to_path_buf()
    }
}

impl Default for SharedReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Decoder-side handle to a `SharedReader`
///
/// A stopped sink keeps pulling for a moment on the audio thread; once the
/// player has moved on, those reads see end of stream instead of moving
/// the cursor under the new decoder.
pub struct SharedStream {
    tracked: Arc<Mutex<Tracked>>,
    generation: u64,
}

impl SharedStream {
    pub fn is_stale(&self) -> bool {
        self.tracked.lock().generation != self.generation
    }
}

impl Read for SharedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut tracked = self.tracked.lock();
        if tracked.generation != self.generation {
            return Ok(0);
        }
        tracked.file.read(buf)
    }
}

impl Seek for SharedStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let mut tracked = self.tracked.lock();
        if tracked.generation != self.generation {
            return Ok(0);
        }
        tracked.file.seek(pos)
    }
}

/// Streamed background music
pub struct BgmPlayer {
    stream_handle: OutputStreamHandle,
    reader: SharedReader,
    sink: Option<Sink>,
    volume: f32,
}

impl BgmPlayer {
    pub fn new(stream_handle: OutputStreamHandle, volume: f32) -> Self {
        Self {
            stream_handle,
            reader: SharedReader::new(),
            sink: None,
            volume: volume.clamp(0.0, 1.0),
        }
    }

    /// Stop playback and point the reader at a new file.
    pub fn load(&mut self, path: &Path) -> Result<(), AudioError> {
        self.stop();

        if !self.reader.open(path) {
            return Err(AudioError::Unreadable(path.display().to_string()));
        }

        tracing::info!(
            "Loaded {} stream: {} ({} bytes)",
            SoundKind::Bgm,
            path.display(),
            self.reader.length()
        );
        Ok(())
    }

    /// Restart playback from the beginning of the loaded file.
    pub fn play(&mut self) -> Result<(), AudioError> {
        self.stop();

        let stream = self
            .reader
            .restart()
            .ok_or_else(|| AudioError::NotLoaded(SoundKind::Bgm.to_string()))?;
        let path = self.reader.path().display().to_string();

        let decoder = Decoder::new(stream).map_err(|e| {
            AudioError::DecodeFailed {
                path: path.clone(),
                source: Box::new(e),
            }
        })?;

        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| AudioError::PlaybackFailed(Box::new(e)))?;
        sink.set_volume(self.volume);
        sink.append(decoder);
        sink.play();
        self.sink = Some(sink);

        tracing::info!("Playing {}: {}", SoundKind::Bgm, path);
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
            tracing::debug!("Stopped {}", SoundKind::Bgm);
        }
    }

    /// Set volume (0.0-1.0), applied to the running instance too
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(sink) = &self.sink {
            sink.set_volume(self.volume);
        }
    }

    pub fn is_playing(&self) -> bool {
        self.sink.as_ref().map(|s| !s.empty()).unwrap_or(false)
    }

    pub fn close(&mut self) {
        self.stop();
        self.reader.close();
    }
}

/// One-shot effect loaded fully into memory
pub struct SfxClip {
    reader: StreamedFile,
    audio_data: Option<Arc<Vec<u8>>>,
}

impl SfxClip {
    pub fn new() -> Self {
        Self {
            reader: StreamedFile::new(),
            audio_data: None,
        }
    }

    /// Read the whole file and check that it decodes; returns its size.
    pub fn load(&mut self, path: &Path) -> Result<usize, AudioError> {
        self.reader.open(path);
        if !self.reader.is_open() {
            return Err(AudioError::Unreadable(path.display().to_string()));
        }

        let audio_data = self.reader.read_to_end_vec();

        // Verify the audio can be decoded
        Decoder::new(Cursor::new(audio_data.clone())).map_err(|e| AudioError::DecodeFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;

        let size = audio_data.len();
        self.audio_data = Some(Arc::new(audio_data));
        tracing::info!("Loaded {}: {} ({} bytes)", SoundKind::Sfx, path.display(), size);
        Ok(size)
    }

    /// Fire-and-forget playback positioned relative to the listener.
    pub fn play_3d(
        &self,
        stream_handle: &OutputStreamHandle,
        position: Position,
        listener: Listener,
    ) -> Result<(), AudioError> {
        let audio_data = self
            .audio_data
            .as_ref()
            .ok_or_else(|| AudioError::NotLoaded(SoundKind::Sfx.to_string()))?;

        let cursor = Cursor::new((**audio_data).clone());
        let decoder = Decoder::new(cursor).map_err(|e| AudioError::DecodeFailed {
            path: self.reader.path().display().to_string(),
            source: Box::new(e),
        })?;

        let spatial = Spatial::new(
            decoder.convert_samples::<f32>(),
            position.to_array(),
            listener.left_ear,
            listener.right_ear,
        );
        stream_handle
            .play_raw(spatial)
            .map_err(|e| AudioError::PlaybackFailed(Box::new(e)))?;

        tracing::debug!("Playing {} at {}", SoundKind::Sfx, position);
        Ok(())
    }

    pub fn close(&mut self) {
        self.reader.close();
    }
}

impl Default for SfxClip {
    fn default() -> Self {
        Self::new()
    }
}

/// Speech voice; a new utterance replaces the one still talking
pub struct SpeechPlayer {
    stream_handle: OutputStreamHandle,
    sink: Option<Sink>,
    volume: f32,
}

impl SpeechPlayer {
    pub fn new(stream_handle: OutputStreamHandle, volume: f32) -> Self {
        Self {
            stream_handle,
            sink: None,
            volume: volume.clamp(0.0, 1.0),
        }
    }

    /// Say `text` panned between the speakers (-1.0 left, 1.0 right).
    pub fn play(&mut self, text: &str, params: SpeechParams, pan: f32) -> Result<(), AudioError> {
        self.stop();

        if !is_speakable(text) {
            return Err(AudioError::NotLoaded(SoundKind::Speech.to_string()));
        }
        let voice = SpeechSource::new(text, params);
        let [left, right] = pan_gains(pan);

        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| AudioError::PlaybackFailed(Box::new(e)))?;
        sink.set_volume(self.volume);
        sink.append(ChannelVolume::new(voice, vec![left, right]));
        sink.play();
        self.sink = Some(sink);

        tracing::debug!("Playing {} ({}, pan {:.2})", SoundKind::Speech, params.waveform, pan);
        Ok(())
    }

    /// Set volume (0.0-1.0), applied to the running utterance too
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(sink) = &self.sink {
            sink.set_volume(self.volume);
        }
    }

    pub fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Playback needs an output device; these cover the loading side only.

    fn wav_fixture(name: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("sfx_panel_{}_{}.wav", name, std::process::id()));
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for i in 0..800 {
            writer.write_sample(((i % 40) * 400) as i16).unwrap();
        }
        writer.finalize().unwrap();
        path
    }

    #[test]
    fn test_sfx_clip_loads_wav() {
        let path = wav_fixture("clip");
        let mut clip = SfxClip::new();

        let size = clip.load(&path).unwrap();
        assert_eq!(size as u64, std::fs::metadata(&path).unwrap().len());

        clip.close();
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_sfx_clip_rejects_missing_file() {
        let mut clip = SfxClip::new();
        let result = clip.load(Path::new("/definitely/not/here.wav"));
        assert!(matches!(result, Err(AudioError::Unreadable(_))));
    }

    #[test]
    fn test_sfx_clip_rejects_garbage() {
        let path = std::env::temp_dir().join(format!("sfx_panel_garbage_{}.ogg", std::process::id()));
        std::fs::write(&path, b"definitely not audio").unwrap();

        let mut clip = SfxClip::new();
        let result = clip.load(&path);
        assert!(matches!(result, Err(AudioError::DecodeFailed { .. })));

        std::fs::remove_file(path).unwrap();
    }

    fn counting_file(name: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("sfx_panel_{}_{}.bin", name, std::process::id()));
        let bytes: Vec<u8> = (0..=255u8).cycle().take(1024).collect();
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_shared_stream_reads_through_lock() {
        let path = counting_file("shared");
        let reader = SharedReader::new();
        assert!(reader.open(&path));

        let mut stream = reader.restart().unwrap();
        let mut buf = [0u8; 6];
        stream.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [0, 1, 2, 3, 4, 5]);

        assert_eq!(stream.seek(SeekFrom::Start(100)).unwrap(), 100);
        stream.read_exact(&mut buf[..1]).unwrap();
        assert_eq!(buf[0], 100);

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_restart_detaches_previous_stream() {
        let path = counting_file("restart");
        let reader = SharedReader::new();
        reader.open(&path);

        let mut old = reader.restart().unwrap();
        let mut buf = [0u8; 64];
        assert_eq!(old.read(&mut buf).unwrap(), 64);

        let mut new = reader.restart().unwrap();
        assert!(old.is_stale());
        assert_eq!(old.read(&mut buf).unwrap(), 0);
        assert_eq!(old.seek(SeekFrom::Start(500)).unwrap(), 0);

        let mut head = [0u8; 4];
        new.read_exact(&mut head).unwrap();
        assert_eq!(head, [0, 1, 2, 3]);
        assert!(!new.is_stale());

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_reopen_detaches_stream_from_old_file() {
        let first = counting_file("first");
        let second = std::env::temp_dir().join(format!("sfx_panel_second_{}.bin", std::process::id()));
        std::fs::write(&second, b"other file").unwrap();

        let reader = SharedReader::new();
        reader.open(&first);
        let mut old = reader.restart().unwrap();

        assert!(reader.open(&second));
        let mut buf = [0u8; 8];
        assert_eq!(old.read(&mut buf).unwrap(), 0);
        assert_eq!(reader.path(), second);

        reader.close();
        assert!(reader.restart().is_none());

        std::fs::remove_file(first).unwrap();
        std::fs::remove_file(second).unwrap();
    }
}
