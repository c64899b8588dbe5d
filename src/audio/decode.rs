use std::io::Cursor;

use crate::foundation::error::{WarpError, WarpResult};
use crate::media::sample::AudioPcm;

/// Turns an encoded audio blob into interleaved `f32` PCM at a requested layout.
pub trait AudioDecoder: Send + Sync {
    fn name(&self) -> &'static str;

    fn decode(&self, bytes: &[u8], sample_rate: u32, channels: u16) -> WarpResult<AudioPcm>;
}

/// RIFF/WAVE decoder backed by `hound`.
#[derive(Clone, Copy, Debug, Default)]
pub struct WavDecoder;

impl AudioDecoder for WavDecoder {
    fn name(&self) -> &'static str {
        "wav"
    }

    fn decode(&self, bytes: &[u8], sample_rate: u32, channels: u16) -> WarpResult<AudioPcm> {
        let reader = hound::WavReader::new(Cursor::new(bytes))
            .map_err(|e| WarpError::media(format!("wav header: {e}")))?;
        let spec = reader.spec();
        if spec.channels == 0 || spec.sample_rate == 0 {
            return Err(WarpError::media("wav declares zero channels or sample rate"));
        }
        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(|e| WarpError::media(format!("wav samples: {e}")))?,
            hound::SampleFormat::Int => {
                let scale = 1.0 / (1u64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<Result<_, _>>()
                    .map_err(|e| WarpError::media(format!("wav samples: {e}")))?
            }
        };
        let remixed = remix_channels(&samples, spec.channels, channels);
        Ok(AudioPcm {
            sample_rate,
            channels,
            interleaved_f32: resample_linear(&remixed, channels, spec.sample_rate, sample_rate),
        })
    }
}

/// Map interleaved samples between channel layouts. Mono is duplicated; wider layouts keep their
/// leading channels; narrowing to mono averages.
pub(crate) fn remix_channels(samples: &[f32], from: u16, to: u16) -> Vec<f32> {
    if from == to || from == 0 || to == 0 {
        return samples.to_vec();
    }
    let from = usize::from(from);
    let to = usize::from(to);
    let mut out = Vec::with_capacity(samples.len() / from * to);
    for frame in samples.chunks_exact(from) {
        if to == 1 {
            out.push(frame.iter().sum::<f32>() / from as f32);
            continue;
        }
        for c in 0..to {
            out.push(if from == 1 { frame[0] } else { frame.get(c).copied().unwrap_or(0.0) });
        }
    }
    out
}

/// Linear-interpolation sample-rate conversion of interleaved PCM.
pub(crate) fn resample_linear(samples: &[f32], channels: u16, from: u32, to: u32) -> Vec<f32> {
    if from == to || from == 0 || to == 0 || channels == 0 {
        return samples.to_vec();
    }
    let ch = usize::from(channels);
    let src_frames = samples.len() / ch;
    if src_frames == 0 {
        return Vec::new();
    }
    let dst_frames = (src_frames as u64 * u64::from(to)).div_ceil(u64::from(from)) as usize;
    let step = f64::from(from) / f64::from(to);
    let mut out = Vec::with_capacity(dst_frames * ch);
    for i in 0..dst_frames {
        let pos = i as f64 * step;
        let f0 = (pos.floor() as usize).min(src_frames - 1);
        let f1 = (f0 + 1).min(src_frames - 1);
        let frac = (pos - f0 as f64) as f32;
        for c in 0..ch {
            let a = samples[f0 * ch + c];
            let b = samples[f1 * ch + c];
            out.push(a + (b - a) * frac);
        }
    }
    out
}

/// Decoder that shells out to `ffmpeg` for any container it understands.
#[derive(Clone, Debug)]
pub struct FfmpegAudioDecoder {
    pub ffmpeg: std::path::PathBuf,
}

impl Default for FfmpegAudioDecoder {
    fn default() -> Self {
        Self {
            ffmpeg: std::path::PathBuf::from("ffmpeg"),
        }
    }
}

impl AudioDecoder for FfmpegAudioDecoder {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    #[cfg(feature = "media-ffmpeg")]
    fn decode(&self, bytes: &[u8], sample_rate: u32, channels: u16) -> WarpResult<AudioPcm> {
        use anyhow::Context as _;
        use std::io::Write as _;

        let mut input = tempfile::Builder::new()
            .prefix("clipwarp-audio-")
            .tempfile()
            .context("failed to create audio temp file")?;
        input
            .write_all(bytes)
            .and_then(|_| input.flush())
            .context("failed to spool audio to temp file")?;

        let mut cmd = std::process::Command::new(&self.ffmpeg);
        cmd.args(["-v", "error", "-i"])
            .arg(input.path())
            .args([
                "-vn",
                "-f",
                "f32le",
                "-acodec",
                "pcm_f32le",
                "-ac",
                &channels.to_string(),
                "-ar",
                &sample_rate.to_string(),
                "pipe:1",
            ]);
        let out = crate::media::process::run_checked(&mut cmd, "ffmpeg audio decode")?;
        Ok(AudioPcm {
            sample_rate,
            channels,
            interleaved_f32: crate::media::process::f32le_to_vec(&out.stdout)?,
        })
    }

    #[cfg(not(feature = "media-ffmpeg"))]
    fn decode(&self, _bytes: &[u8], _sample_rate: u32, _channels: u16) -> WarpResult<AudioPcm> {
        Err(WarpError::media(
            "ffmpeg audio decoding requires the 'media-ffmpeg' feature",
        ))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/decode.rs"]
mod tests;
