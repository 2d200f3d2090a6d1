//! Audio chimes for session completions.

use rodio::source::{SineWave, Source, Zero};
use rodio::{OutputStream, OutputStreamHandle, Sink};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to initialize audio output: {0}")]
    Stream(#[from] rodio::StreamError),
    #[error("Failed to play audio: {0}")]
    Play(#[from] rodio::PlayError),
}

pub struct AudioPlayer {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl AudioPlayer {
    /// Creates a new audio player on the default output device.
    pub fn new() -> Result<Self, AudioError> {
        let (stream, handle) = OutputStream::try_default()?;
        Ok(Self {
            _stream: stream,
            handle,
        })
    }

    /// Rising two-tone chime marking the end of a work session.
    pub fn play_work_chime(&self) {
        if let Err(e) = self.play_tones(&[(660.0, 180), (990.0, 260)]) {
            eprintln!("Failed to play chime: {}", e);
        }
    }

    /// Falling two-tone chime marking the end of a break.
    pub fn play_break_chime(&self) {
        if let Err(e) = self.play_tones(&[(990.0, 180), (660.0, 260)]) {
            eprintln!("Failed to play chime: {}", e);
        }
    }

    /// Plays a sequence of (frequency, millis) tones with short gaps.
    fn play_tones(&self, tones: &[(f32, u64)]) -> Result<(), AudioError> {
        let sink = Sink::try_new(&self.handle)?;
        for &(freq, millis) in tones {
            let tone = SineWave::new(freq)
                .take_duration(Duration::from_millis(millis))
                .amplify(0.25);
            sink.append(tone);
            let gap = Zero::<f32>::new(1, 44100).take_duration(Duration::from_millis(40));
            sink.append(gap);
        }
        sink.detach();
        Ok(())
    }
}
