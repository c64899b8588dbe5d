use super::*;

#[test]
fn fps_rejects_zero() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn fps_from_probed_rates() {
    assert_eq!(Fps::from_f64(30.0).unwrap(), Fps { num: 30, den: 1 });
    assert_eq!(
        Fps::from_f64(29.97).unwrap(),
        Fps {
            num: 30_000,
            den: 1001
        }
    );
    assert_eq!(Fps::from_f64(24.4).unwrap(), Fps { num: 24, den: 1 });
    assert!(Fps::from_f64(f64::NAN).is_err());
    assert!(Fps::from_f64(0.0).is_err());
}

#[test]
fn nearest_frame_rounds() {
    let fps = Fps::new(60, 1).unwrap();
    assert_eq!(fps.secs_to_nearest_frame(0.0), 0);
    assert_eq!(fps.secs_to_nearest_frame(1.0 / 60.0 * 0.6), 1);
    assert_eq!(fps.secs_to_nearest_frame(-1.0), 0);
}

#[test]
fn rotation_normalizes() {
    assert_eq!(Rotation::from_degrees(-90), Rotation(270));
    assert_eq!(Rotation::from_degrees(450), Rotation(90));
    assert_eq!(Rotation::from_degrees(0), Rotation(0));
}
