/// One decoded RGBA8 video frame.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8 pixels; may be empty for backends that never touch pixels.
    pub data: Vec<u8>,
}

/// Decoded interleaved floating-point PCM.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioPcm {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Interleaved `f32` PCM samples.
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    pub fn silent(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
            interleaved_f32: Vec::new(),
        }
    }

    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.interleaved_f32.len() / usize::from(self.channels)
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    /// Sample-frame count covering `secs` (rounded up, never negative).
    pub fn frames_for_secs(&self, secs: f64) -> usize {
        if !secs.is_finite() || secs <= 0.0 {
            return 0;
        }
        (secs * f64::from(self.sample_rate)).ceil() as usize
    }
}

/// Payload carried by a [`MediaSample`].
#[derive(Clone, Debug, PartialEq)]
pub enum SamplePayload {
    Video(VideoFrame),
    Audio(AudioPcm),
}

/// One decoded video frame or audio chunk travelling through a job pipeline.
///
/// A sample is owned by exactly one pipeline step at a time. Handing it to an encoder moves it;
/// dropping it early goes through [`MediaSample::close`], so every sample is released exactly
/// once on every path.
#[derive(Debug, PartialEq)]
pub struct MediaSample {
    /// Presentation timestamp in seconds.
    pub timestamp: f64,
    /// Duration in seconds.
    pub duration: f64,
    pub payload: SamplePayload,
}

impl MediaSample {
    pub fn video(timestamp: f64, duration: f64, frame: VideoFrame) -> Self {
        Self {
            timestamp,
            duration,
            payload: SamplePayload::Video(frame),
        }
    }

    pub fn audio(timestamp: f64, pcm: AudioPcm) -> Self {
        Self {
            timestamp,
            duration: pcm.duration_secs(),
            payload: SamplePayload::Audio(pcm),
        }
    }

    /// Rewrite the presentation time onto an output grid slot.
    pub fn retimed(mut self, timestamp: f64, duration: f64) -> Self {
        self.timestamp = timestamp;
        self.duration = duration;
        self
    }

    pub fn as_video(&self) -> Option<&VideoFrame> {
        match &self.payload {
            SamplePayload::Video(f) => Some(f),
            SamplePayload::Audio(_) => None,
        }
    }

    /// Release the sample without passing it on.
    pub fn close(self) {
        drop(self);
    }
}
