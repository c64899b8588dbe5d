use super::*;
use crate::foundation::progress::ProgressStatus;
use crate::media::memory::{BackendEvent, CapabilityPolicy, MemoryBackend, Recording, SyntheticClip};
use std::io::Cursor;
use std::sync::Mutex;

fn clip(w: u32, h: u32, fps: f64, frames: u32) -> Vec<u8> {
    SyntheticClip::new(w, h, fps, frames).to_bytes()
}

fn wav(seconds: f64, sample_rate: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut buf = Vec::new();
    {
        let mut w = hound::WavWriter::new(Cursor::new(&mut buf), spec).unwrap();
        for i in 0..(seconds * f64::from(sample_rate)) as u32 {
            w.write_sample(((i % 100) as i16 - 50) * 100).unwrap();
        }
        w.finalize().unwrap();
    }
    buf
}

fn job(backend: &MemoryBackend) -> StitchJob<'_> {
    StitchJob::new(backend, StitchOpts::default())
        .with_audio_decoders(vec![Box::new(WavDecoder)])
}

#[test]
fn empty_clip_list_is_rejected_before_any_work() {
    let backend = MemoryBackend::new();
    let err = job(&backend).run(&[], None, None).unwrap_err();
    assert!(matches!(err, WarpError::NoVideosProvided));
    assert!(backend.events().is_empty());
    assert!(backend.video_queries().is_empty());
}

#[test]
fn two_one_second_clips_make_two_seconds() {
    let backend = MemoryBackend::new();
    let opts = StitchOpts {
        fps: 60,
        ..StitchOpts::default()
    };
    let clips = vec![clip(1920, 1080, 60.0, 60), clip(1920, 1080, 60.0, 60)];
    let out = StitchJob::new(&backend, opts).run(&clips, None, None).unwrap();
    let rec = Recording::from_bytes(&out.bytes).unwrap();
    assert!(rec.frames.windows(2).all(|w| w[0].slot < w[1].slot));
    assert!((rec.video_duration() - 2.0).abs() < 1e-6);
    assert!((out.stats.output_duration - 2.0).abs() < 1e-6);
    assert_eq!(out.stats.clips_used, 2);
    assert_eq!(out.stats.frames_decoded, 120);
    assert_eq!(out.stats.frames_written, 120);
    // Second clip starts right after the first on the grid.
    assert_eq!(rec.frames[60].slot, 60);
    assert_eq!(rec.frames[60].source_index, Some(0));
}

#[test]
fn faster_sources_collapse_onto_the_output_grid() {
    let backend = MemoryBackend::new();
    let clips = vec![clip(1280, 720, 120.0, 120)];
    let out = job(&backend).run(&clips, None, None).unwrap();
    assert_eq!(out.stats.frames_decoded, 120);
    assert_eq!(
        out.stats.frames_written + out.stats.frames_dropped,
        out.stats.frames_decoded
    );
    assert!(out.stats.frames_written <= 31);
    assert!((out.stats.output_duration - 1.0).abs() < 0.05);
}

#[test]
fn clip_with_late_first_timestamp_is_normalized() {
    let backend = MemoryBackend::new();
    let clips = vec![
        clip(1280, 720, 30.0, 30),
        SyntheticClip::new(1280, 720, 30.0, 30)
            .with_start_time(7.5)
            .to_bytes(),
    ];
    let rec = Recording::from_bytes(&job(&backend).run(&clips, None, None).unwrap().bytes).unwrap();
    assert_eq!(rec.frames.len(), 60);
    assert_eq!(rec.frames.last().unwrap().slot, 59);
}

#[test]
fn clips_without_video_are_skipped() {
    let backend = MemoryBackend::new();
    let clips = vec![
        clip(1280, 720, 30.0, 15),
        SyntheticClip::audio_only().to_bytes(),
        clip(1280, 720, 30.0, 15),
    ];
    let out = job(&backend).run(&clips, None, None).unwrap();
    assert_eq!(out.stats.clips_used, 2);
    assert_eq!(out.stats.clips_skipped, 1);
    assert_eq!(out.stats.frames_written, 30);
}

#[test]
fn unreadable_clip_is_skipped() {
    let backend = MemoryBackend::new();
    let clips = vec![
        clip(1280, 720, 30.0, 15),
        b"not a video".to_vec(),
        clip(1280, 720, 30.0, 15),
    ];
    let events = Mutex::new(Vec::<ProgressEvent>::new());
    let observer = |e: &ProgressEvent| events.lock().unwrap().push(e.clone());
    let out = job(&backend).run(&clips, None, Some(&observer)).unwrap();
    assert_eq!(out.stats.clips_used, 2);
    assert_eq!(out.stats.clips_skipped, 1);
    assert_eq!(out.stats.frames_written, 30);
    let items: Vec<_> = events
        .into_inner()
        .unwrap()
        .iter()
        .filter_map(|e| e.current_item)
        .collect();
    assert_eq!(items, vec![1, 3]);
    let disposed = backend
        .events()
        .iter()
        .filter(|e| matches!(e, BackendEvent::InputDisposed(_)))
        .count();
    assert_eq!(disposed, 2);
}

#[test]
fn only_unreadable_clips_fail_without_output() {
    let backend = MemoryBackend::new();
    let clips = vec![b"garbage".to_vec(), b"more garbage".to_vec()];
    let err = job(&backend).run(&clips, None, None).unwrap_err();
    assert!(matches!(err, WarpError::NoFramesEmitted(_)));
    assert!(backend.events().is_empty());
}

#[test]
fn only_audio_clips_fail_without_output() {
    let backend = MemoryBackend::new();
    let clips = vec![SyntheticClip::audio_only().to_bytes()];
    let err = job(&backend).run(&clips, None, None).unwrap_err();
    assert!(matches!(err, WarpError::NoFramesEmitted(_)));
}

#[test]
fn each_clip_is_released_after_consumption() {
    let backend = MemoryBackend::new();
    let clips = vec![clip(640, 360, 30.0, 3), clip(640, 360, 30.0, 3)];
    job(&backend).run(&clips, None, None).unwrap();
    let events = backend.events();
    let pos = |e: BackendEvent| events.iter().position(|x| *x == e).unwrap();
    assert!(pos(BackendEvent::InputDisposed(0)) < pos(BackendEvent::InputDisposed(1)));
    assert!(pos(BackendEvent::InputDisposed(1)) < pos(BackendEvent::VideoClosed));
    assert_eq!(events.last(), Some(&BackendEvent::OutputFinalized));
}

#[test]
fn later_clip_failure_still_releases_every_handle_once() {
    let backend = MemoryBackend::new();
    let clips = vec![
        clip(640, 360, 30.0, 10),
        SyntheticClip::new(640, 360, 30.0, 10)
            .failing_after(3)
            .to_bytes(),
        clip(640, 360, 30.0, 10),
    ];
    let err = job(&backend).run(&clips, None, None).unwrap_err();
    assert!(matches!(err, WarpError::Media(_)));
    let events = backend.events();
    for id in 0..3 {
        assert_eq!(
            events
                .iter()
                .filter(|e| **e == BackendEvent::InputDisposed(id))
                .count(),
            1
        );
    }
    assert!(events.contains(&BackendEvent::OutputCancelled));
    assert!(!events.contains(&BackendEvent::OutputFinalized));
}

#[test]
fn rotation_mismatch_keeps_the_first_rotation() {
    let backend = MemoryBackend::new();
    let clips = vec![
        SyntheticClip::new(1080, 1920, 30.0, 5).with_rotation(90).to_bytes(),
        SyntheticClip::new(1080, 1920, 30.0, 5).to_bytes(),
    ];
    let out = job(&backend).run(&clips, None, None).unwrap();
    let rec = Recording::from_bytes(&out.bytes).unwrap();
    assert_eq!(rec.rotation, Rotation(90));
    assert_eq!(rec.video.dimensions, Dimensions::new(1080, 1920));
}

#[test]
fn bitrate_is_the_capped_source_maximum() {
    let backend = MemoryBackend::new();
    let clips = vec![
        SyntheticClip::new(1280, 720, 30.0, 5).with_bitrate(2_000_000).to_bytes(),
        SyntheticClip::new(1280, 720, 30.0, 5).with_bitrate(3_000_000).to_bytes(),
    ];
    let out = job(&backend).run(&clips, None, None).unwrap();
    assert_eq!(out.stats.tier.bitrate, 3_000_000);

    let hot = vec![SyntheticClip::new(1280, 720, 30.0, 5).with_bitrate(40_000_000).to_bytes()];
    let out = job(&backend).run(&hot, None, None).unwrap();
    assert_eq!(out.stats.tier.bitrate, 8_000_000);
}

#[test]
fn tier_cascade_uses_720p_after_rejection() {
    let backend = MemoryBackend::with_policy(CapabilityPolicy {
        max_pixels: Some(1280 * 720),
        ..CapabilityPolicy::default()
    });
    let out = job(&backend)
        .run(&[clip(1920, 1080, 30.0, 5)], None, None)
        .unwrap();
    assert_eq!(out.stats.tier.name, "720p");
    assert_eq!(out.stats.tier.dimensions, Dimensions::new(1280, 720));
}

#[test]
fn exhausted_cascade_fails_and_releases_inputs() {
    let backend = MemoryBackend::with_policy(CapabilityPolicy {
        reject_first: usize::MAX,
        ..CapabilityPolicy::default()
    });
    let err = job(&backend)
        .run(&[clip(1920, 1080, 30.0, 5)], None, None)
        .unwrap_err();
    assert!(matches!(err, WarpError::UnsupportedProfile(_)));
    assert_eq!(
        backend.events(),
        vec![BackendEvent::InputOpened(0), BackendEvent::InputDisposed(0)]
    );
}

#[test]
fn soundtrack_is_looped_and_trimmed_to_video() {
    let backend = MemoryBackend::new();
    let clips = vec![clip(1280, 720, 30.0, 30), clip(1280, 720, 30.0, 30)];
    let out = job(&backend)
        .run(&clips, Some(&wav(0.5, 8_000)), None)
        .unwrap();
    let rec = Recording::from_bytes(&out.bytes).unwrap();
    let audio = rec.audio.unwrap();
    assert_eq!(audio.codec, AudioCodec::Aac);
    assert_eq!(audio.sample_rate, 48_000);
    assert!((audio.duration - 2.0).abs() < 1e-3);
    assert_eq!(out.stats.audio_codec, Some(AudioCodec::Aac));
}

#[test]
fn missing_audio_codec_continues_silently() {
    let backend = MemoryBackend::with_policy(CapabilityPolicy {
        audio_codecs: Vec::new(),
        ..CapabilityPolicy::default()
    });
    let out = job(&backend)
        .run(&[clip(1280, 720, 30.0, 30)], Some(&wav(0.5, 8_000)), None)
        .unwrap();
    let rec = Recording::from_bytes(&out.bytes).unwrap();
    assert!(rec.audio.is_none());
    assert_eq!(out.stats.audio_codec, None);
    assert!(!backend.events().contains(&BackendEvent::AudioClosed));
}

#[test]
fn undecodable_soundtrack_is_audio_decode_failed() {
    let backend = MemoryBackend::new();
    let err = job(&backend)
        .run(&[clip(1280, 720, 30.0, 30)], Some(b"not audio"), None)
        .unwrap_err();
    assert!(matches!(err, WarpError::AudioDecodeFailed(_)));
    assert_eq!(backend.events().last(), Some(&BackendEvent::InputDisposed(0)));
}

#[test]
fn progress_carries_item_counters() {
    let backend = MemoryBackend::new();
    let events = Mutex::new(Vec::<ProgressEvent>::new());
    let observer = |e: &ProgressEvent| events.lock().unwrap().push(e.clone());
    let clips = vec![clip(640, 360, 30.0, 3), clip(640, 360, 30.0, 3)];
    job(&backend).run(&clips, None, Some(&observer)).unwrap();
    let events = events.into_inner().unwrap();
    let items: Vec<_> = events
        .iter()
        .filter_map(|e| e.current_item.zip(e.total_items))
        .collect();
    assert_eq!(items, vec![(1, 2), (2, 2)]);
    assert_eq!(events.last().unwrap().status, ProgressStatus::Complete);
}
