//! Audio playback for phase completion sounds.

use crate::focus::CompletionEvent;
use rodio::source::{SineWave, Source, Zero};
use rodio::{OutputStream, OutputStreamHandle, Sink};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

const A5: f32 = 880.0;
const C6: f32 = 1046.5;

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
    /// Creates a new audio player.
    pub fn new() -> Result<Self, AudioError> {
        let (stream, handle) = OutputStream::try_default()?;
        Ok(Self {
            _stream: stream,
            handle,
        })
    }

    /// Plays the chime for a completed phase: rising after focus, falling after a break.
    pub fn play_completion(&self, event: CompletionEvent) {
        let tones = match event {
            CompletionEvent::FocusComplete { .. } => [A5, C6],
            CompletionEvent::BreakComplete => [C6, A5],
        };

        if let Err(e) = self.play_two_tone(tones) {
            warn!("Failed to play chime: {}", e);
        }
    }

    /// Plays two short sine tones separated by a brief pause.
    fn play_two_tone(&self, [first, second]: [f32; 2]) -> Result<(), AudioError> {
        let sink = Sink::try_new(&self.handle)?;

        let tone1 = SineWave::new(first)
            .take_duration(Duration::from_millis(150))
            .amplify(0.3);
        let silence = Zero::<f32>::new(1, 44100).take_duration(Duration::from_millis(50));
        let tone2 = SineWave::new(second)
            .take_duration(Duration::from_millis(200))
            .amplify(0.3);

        sink.append(tone1);
        sink.append(silence);
        sink.append(tone2);
        sink.detach(); // Play in background

        Ok(())
    }
}
