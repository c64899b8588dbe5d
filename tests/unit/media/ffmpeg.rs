use super::*;

#[test]
fn encoder_list_parsing_skips_legend() {
    let text = "Encoders:\n V..... = Video\n A..... = Audio\n ------\n \
                V....D libx264              libx264 H.264 / AVC\n \
                A....D aac                  AAC (Advanced Audio Coding)\n \
                A....D libopus              libopus Opus\n";
    let set = parse_encoder_list(text);
    assert!(set.contains("libx264"));
    assert!(set.contains("aac"));
    assert!(set.contains("libopus"));
    assert!(!set.contains("="));
    assert_eq!(set.len(), 3);
}

#[test]
fn h264_limits_reject_odd_huge_and_overbudget_configs() {
    let q = |width, height, bitrate| VideoCapabilityQuery {
        width,
        height,
        bitrate,
        profile: Some(CodecProfile::Main),
    };
    assert!(within_h264_limits(&q(1920, 1080, 10_000_000)));
    assert!(within_h264_limits(&q(3840, 2160, 40_000_000)));
    assert!(!within_h264_limits(&q(1921, 1080, 10_000_000)));
    assert!(!within_h264_limits(&q(0, 1080, 10_000_000)));
    assert!(!within_h264_limits(&q(8192, 8192, 10_000_000)));
    assert!(!within_h264_limits(&q(1920, 1080, 500_000_000)));
}

#[test]
fn probe_json_yields_track_info() {
    let json = br#"{
        "streams": [
            {"codec_type": "audio", "duration": "9.0"},
            {"codec_type": "video", "width": 1080, "height": 1920,
             "avg_frame_rate": "30000/1001", "r_frame_rate": "30/1",
             "duration": "4.971", "bit_rate": "6500000",
             "side_data_list": [{"rotation": -90}]}
        ],
        "format": {"duration": "5.02"}
    }"#;
    let info = track_info_from_probe(json).unwrap().unwrap();
    assert_eq!(info.dimensions, Some(Dimensions::new(1080, 1920)));
    assert_eq!(info.rotation, Rotation(90));
    assert_eq!(info.track_duration, Some(4.971));
    assert_eq!(info.container_duration, Some(5.02));
    assert!((info.avg_fps.unwrap() - 29.97).abs() < 1e-2);
    assert_eq!(info.avg_bitrate, Some(6_500_000));
}

#[test]
fn probe_json_tolerates_missing_fields() {
    let json = br#"{"streams": [{"codec_type": "video", "avg_frame_rate": "0/0",
        "r_frame_rate": "25/1", "tags": {"rotate": "180"}}]}"#;
    let info = track_info_from_probe(json).unwrap().unwrap();
    assert_eq!(info.dimensions, None);
    assert_eq!(info.rotation, Rotation(180));
    assert_eq!(info.track_duration, None);
    assert_eq!(info.container_duration, None);
    assert_eq!(info.avg_fps, Some(25.0));

    let audio_only = br#"{"streams": [{"codec_type": "audio"}], "format": {}}"#;
    assert!(track_info_from_probe(audio_only).unwrap().is_none());
    assert!(track_info_from_probe(b"not json").is_err());
}

#[test]
fn packet_times_are_sorted_into_presentation_order() {
    let text = "0.000000\n0.100000\n0.033333,\nN/A\n0.066667\n";
    assert_eq!(
        parse_packet_times(text),
        vec![0.0, 0.033333, 0.066667, 0.1]
    );
}

#[test]
fn read_frame_distinguishes_eof_from_truncation() {
    let mut buf = [0u8; 4];
    let mut full: &[u8] = &[1, 2, 3, 4];
    assert!(read_frame(&mut full, &mut buf).unwrap());
    assert_eq!(buf, [1, 2, 3, 4]);
    let mut empty: &[u8] = &[];
    assert!(!read_frame(&mut empty, &mut buf).unwrap());
    let mut short: &[u8] = &[9, 9];
    assert!(read_frame(&mut short, &mut buf).is_err());
}

#[test]
fn display_rotation_counts_counter_clockwise() {
    assert!(display_rotation_args(Rotation(0)).is_empty());
    assert_eq!(display_rotation_args(Rotation(90)), vec!["-display_rotation", "270"]);
    assert_eq!(display_rotation_args(Rotation(180)), vec!["-display_rotation", "180"]);
    assert_eq!(display_rotation_args(Rotation(270)), vec!["-display_rotation", "90"]);
}
