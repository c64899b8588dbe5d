use super::concat::{ConcatCliOpts, build_concat_list, concat_with_ffmpeg};
use super::ramp::{RampCliOpts, build_frame_list, speed_ramp_with_ffmpeg};
use super::*;
use crate::foundation::error::WarpError;
use crate::warp::lut::compute_easing_lut;
use std::path::PathBuf;

#[test]
fn quotes_embedded_single_quotes() {
    assert_eq!(quote_concat_path(Path::new("/tmp/a.mp4")), "'/tmp/a.mp4'");
    assert_eq!(
        quote_concat_path(Path::new("/tmp/it's.mp4")),
        r"'/tmp/it'\''s.mp4'"
    );
}

#[test]
fn concat_list_has_one_line_per_segment() {
    let list = build_concat_list(&[PathBuf::from("/w/part_000.mp4"), PathBuf::from("/w/part_001.mp4")]);
    assert_eq!(list, "file '/w/part_000.mp4'\nfile '/w/part_001.mp4'\n");
    assert!(build_concat_list(&[]).is_empty());
}

#[test]
fn frame_list_follows_the_lut_and_repeats_the_tail() {
    let lut = compute_easing_lut("easeInQuad", 4);
    assert_eq!(lut, vec![0, 0, 1, 3]);
    let list = build_frame_list(&lut, Path::new("/f"), 0.25);
    let lines: Vec<_> = list.lines().collect();
    assert_eq!(lines[0], "ffconcat version 1.0");
    assert_eq!(lines[1], "file '/f/frame_000001.png'");
    assert_eq!(lines[2], "duration 0.250000");
    assert_eq!(lines[5], "file '/f/frame_000002.png'");
    assert_eq!(lines[7], "file '/f/frame_000004.png'");
    assert_eq!(lines.last(), Some(&"file '/f/frame_000004.png'"));
    assert_eq!(lines.len(), 1 + 4 * 2 + 1);
}

#[test]
fn concat_rejects_empty_input_and_odd_sizes() {
    let out = Path::new("/nonexistent/out.mp4");
    assert!(matches!(
        concat_with_ffmpeg(&[], out, &ConcatCliOpts::default()),
        Err(WarpError::NoVideosProvided)
    ));
    let odd = ConcatCliOpts {
        size: crate::foundation::core::Dimensions::new(1279, 720),
        ..ConcatCliOpts::default()
    };
    assert!(matches!(
        concat_with_ffmpeg(&[PathBuf::from("a.mp4")], out, &odd),
        Err(WarpError::Validation(_))
    ));
}

#[test]
fn ramp_validates_before_spawning() {
    let opts = RampCliOpts {
        input: PathBuf::from("in.mp4"),
        output: PathBuf::from("out.mp4"),
        easing: "easeInQuad".to_owned(),
        input_duration: 0.0,
        output_duration: 0.0,
        fps: 30,
        ffmpeg: PathBuf::from("clipwarp-definitely-not-ffmpeg"),
    };
    assert!(matches!(
        speed_ramp_with_ffmpeg(&opts),
        Err(WarpError::Validation(_))
    ));
    let missing_tool = RampCliOpts {
        input_duration: 2.0,
        ..opts
    };
    assert!(matches!(
        speed_ramp_with_ffmpeg(&missing_tool),
        Err(WarpError::Media(_))
    ));
}
