use crate::audio::decode::{AudioDecoder, FfmpegAudioDecoder, WavDecoder};
use crate::foundation::error::{WarpError, WarpResult};
use crate::foundation::progress::{Progress, ProgressObserver};
use crate::media::sample::AudioPcm;

/// Options for [`prepare_audio`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AudioPrepOpts {
    /// Seconds. Positive delays the track behind leading silence; negative skips into it.
    pub offset: f64,
    pub fade_in: f64,
    pub fade_out: f64,
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for AudioPrepOpts {
    fn default() -> Self {
        Self {
            offset: 0.0,
            fade_in: 0.0,
            fade_out: 0.0,
            sample_rate: 48_000,
            channels: 2,
        }
    }
}

/// A prepared audio track and its duration in seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioTrackData {
    pub pcm: AudioPcm,
    pub duration: f64,
}

impl AudioTrackData {
    pub fn new(pcm: AudioPcm) -> Self {
        let duration = pcm.duration_secs();
        Self { pcm, duration }
    }

    /// Cut the track to at most `secs`. Shorter tracks are returned unchanged.
    pub fn trimmed_to(mut self, secs: f64) -> Self {
        let keep = self.pcm.frames_for_secs(secs).min(self.pcm.frames());
        self.pcm
            .interleaved_f32
            .truncate(keep * usize::from(self.pcm.channels));
        Self::new(self.pcm)
    }
}

/// Repeat `pcm` end-to-start until it spans exactly `target` seconds.
pub fn loop_to_duration(pcm: &AudioPcm, target: f64) -> AudioPcm {
    let frames = pcm.frames();
    if frames == 0 || !target.is_finite() || target <= 0.0 {
        return pcm.clone();
    }
    let ch = usize::from(pcm.channels);
    let needed = pcm.frames_for_secs(target) * ch;
    let interleaved_f32 = pcm
        .interleaved_f32
        .iter()
        .take(frames * ch)
        .copied()
        .cycle()
        .take(needed)
        .collect();
    AudioPcm {
        sample_rate: pcm.sample_rate,
        channels: pcm.channels,
        interleaved_f32,
    }
}

/// Shift the track by `offset` seconds on the output timeline.
pub fn apply_offset(mut pcm: AudioPcm, offset: f64) -> AudioPcm {
    if !offset.is_finite() || offset == 0.0 {
        return pcm;
    }
    let ch = usize::from(pcm.channels);
    let shift = pcm.frames_for_secs(offset.abs());
    if offset > 0.0 {
        let mut out = vec![0.0f32; shift * ch];
        out.append(&mut pcm.interleaved_f32);
        pcm.interleaved_f32 = out;
    } else {
        let skip = shift.min(pcm.frames()) * ch;
        pcm.interleaved_f32.drain(..skip);
    }
    pcm
}

/// Linear fade-in/fade-out on every channel.
///
/// When the fades together are longer than the buffer, both shrink proportionally.
pub fn apply_fades(pcm: &mut AudioPcm, fade_in: f64, fade_out: f64) {
    let n = pcm.frames();
    if n == 0 {
        return;
    }
    let to_frames = |secs: f64| {
        if secs.is_finite() && secs > 0.0 {
            (secs * f64::from(pcm.sample_rate)).round() as usize
        } else {
            0
        }
    };
    let (mut fi, mut fo) = (to_frames(fade_in), to_frames(fade_out));
    if fi + fo > n {
        let total = (fi + fo) as f64;
        fi = (fi as f64 * n as f64 / total).floor() as usize;
        fo = (fo as f64 * n as f64 / total).floor() as usize;
    }

    let ch = usize::from(pcm.channels);
    for (i, frame) in pcm.interleaved_f32.chunks_exact_mut(ch).enumerate() {
        let mut gain = 1.0f32;
        if i < fi {
            gain *= i as f32 / fi as f32;
        }
        if fo > 0 && i >= n - fo {
            gain *= (n - 1 - i) as f32 / fo as f32;
        }
        if gain != 1.0 {
            for s in frame {
                *s *= gain;
            }
        }
    }
}

/// [`prepare_audio_with`] using WAV decoding first and `ffmpeg` as the fallback.
pub fn prepare_audio(
    bytes: &[u8],
    target_duration: f64,
    observer: Option<&dyn ProgressObserver>,
    opts: &AudioPrepOpts,
) -> WarpResult<AudioTrackData> {
    let ffmpeg = FfmpegAudioDecoder::default();
    prepare_audio_with(&[&WavDecoder, &ffmpeg], bytes, target_duration, observer, opts)
}

/// Decode, loop to `target_duration`, offset and fade an audio blob.
///
/// Decoders are tried in order; [`WarpError::AudioDecodeFailed`] is returned only when every
/// one of them fails.
#[tracing::instrument(skip_all, fields(bytes = bytes.len(), target = target_duration))]
pub fn prepare_audio_with(
    decoders: &[&dyn AudioDecoder],
    bytes: &[u8],
    target_duration: f64,
    observer: Option<&dyn ProgressObserver>,
    opts: &AudioPrepOpts,
) -> WarpResult<AudioTrackData> {
    let progress = Progress::new(observer);
    progress.step("Decoding audio", 0.0);

    let mut failures = Vec::new();
    let mut decoded = None;
    for decoder in decoders {
        match decoder.decode(bytes, opts.sample_rate, opts.channels) {
            Ok(pcm) => {
                tracing::debug!(decoder = decoder.name(), frames = pcm.frames(), "audio decoded");
                decoded = Some(pcm);
                break;
            }
            Err(err) => {
                tracing::debug!(decoder = decoder.name(), %err, "audio decoder failed");
                failures.push(format!("{}: {err}", decoder.name()));
            }
        }
    }
    let Some(pcm) = decoded else {
        return Err(WarpError::audio_decode(if failures.is_empty() {
            "no audio decoders configured".to_owned()
        } else {
            failures.join("; ")
        }));
    };

    progress.step("Preparing audio", 50.0);
    let offset = if opts.offset.is_finite() { opts.offset } else { 0.0 };
    // A negative offset skips into the track, so loop far enough that the skip still covers it.
    let loop_target = target_duration + offset.min(0.0).abs();
    let mut track = AudioTrackData::new(apply_offset(loop_to_duration(&pcm, loop_target), offset));
    if target_duration.is_finite() && target_duration > 0.0 {
        track = track.trimmed_to(target_duration);
    }
    apply_fades(&mut track.pcm, opts.fade_in, opts.fade_out);

    progress.step("Audio ready", 100.0);
    Ok(track)
}

#[cfg(test)]
#[path = "../../tests/unit/audio/prepare.rs"]
mod tests;
