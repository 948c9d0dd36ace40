//! Audio formats and the rate-controlled audio feeder.
//!
//! The feeder splits a byte source into bounded chunks and forwards each
//! one through the session's gated binary send. File-backed sources are
//! paced with a per-chunk delay so the sent rate approximates real time
//! and the server's ingestion buffer is not overrun.

use std::fmt;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::sleep;
use tracing::info;

use crate::core::protocol::session::SessionCore;
use crate::error::Result;

/// Default chunk size for continuous capture streams, in bytes.
/// At 16kHz mono 16-bit PCM this is 250 ms of audio per frame.
pub const DEFAULT_CHUNK_SIZE: usize = 8000;

/// Default sample rate accepted by the service.
pub const DEFAULT_SAMPLE_RATE: u32 = 16000;

/// Input audio encodings accepted for recognition/transcription/dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    /// Raw 16-bit little-endian PCM.
    #[default]
    Pcm,
    /// Opus frames.
    Opus,
    /// The service's packaged Opus variant.
    Opu,
    /// Speex frames.
    Speex,
}

impl InputFormat {
    /// Wire name of the format.
    pub fn as_str(self) -> &'static str {
        match self {
            InputFormat::Pcm => "pcm",
            InputFormat::Opus => "opus",
            InputFormat::Opu => "opu",
            InputFormat::Speex => "speex",
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output audio encodings for synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Raw 16-bit little-endian PCM.
    #[default]
    Pcm,
    /// WAV container.
    Wav,
    /// MP3.
    Mp3,
}

impl OutputFormat {
    /// Wire name of the format.
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Pcm => "pcm",
            OutputFormat::Wav => "wav",
            OutputFormat::Mp3 => "mp3",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chunked, optionally paced forwarding of an audio source.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AudioFeeder {
    chunk_size: usize,
    pace: Option<Duration>,
}

impl AudioFeeder {
    /// Feeder for continuous capture: default chunks, no artificial delay
    /// (the source itself runs at real time).
    pub(crate) fn realtime() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            pace: None,
        }
    }

    /// Feeder for file-backed sources: caller-chosen chunk size plus a
    /// sleep after every chunk. For 16k PCM, 6400 bytes every 200 ms
    /// approximates real time; compressed formats scale by their ratio.
    pub(crate) fn paced(chunk_size: usize, interval: Duration) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            pace: Some(interval),
        }
    }

    /// Drain `reader` into the session until exhaustion.
    ///
    /// Ends early without error when the task completed server-side under
    /// the drop policy; any other state violation or I/O failure surfaces
    /// to the caller. No retry.
    pub(crate) async fn feed<R>(&self, session: &SessionCore, mut reader: R) -> Result<()>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut buffer = vec![0u8; self.chunk_size];
        loop {
            if session.completed_with_drop_policy() {
                info!("task completed during audio feed, remaining audio discarded");
                return Ok(());
            }
            let n = reader.read(&mut buffer).await?;
            if n == 0 {
                return Ok(());
            }
            session
                .send_audio(bytes::Bytes::copy_from_slice(&buffer[..n]))
                .await?;
            if let Some(interval) = self.pace {
                sleep(interval).await;
            }
        }
    }
}
