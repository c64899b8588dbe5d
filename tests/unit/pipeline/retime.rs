use super::*;

fn fps30() -> Fps {
    Fps::new(30, 1).unwrap()
}

#[test]
fn snaps_to_nearest_slot_and_drops_duplicates() {
    let mut r = GridRetimer::new(fps30());
    let a = r.propose(0.0).unwrap();
    r.commit(a);
    // 10ms later rounds to the same slot.
    assert_eq!(r.propose(0.01), None);
    let b = r.propose(0.034).unwrap();
    assert_eq!(b, FrameIndex(1));
    r.commit(b);
    assert_eq!(r.frames_written(), 2);
    assert_eq!(r.next_slot(), 2);
}

#[test]
fn cursor_only_moves_on_commit() {
    let mut r = GridRetimer::new(fps30());
    let s = r.propose(0.5).unwrap();
    assert_eq!(s, FrameIndex(15));
    // Encoder refused the frame: nothing committed, the same slot stays available.
    assert_eq!(r.propose(0.5), Some(FrameIndex(15)));
    assert_eq!(r.last_slot(), None);
    r.commit(s);
    assert_eq!(r.last_slot(), Some(FrameIndex(15)));
    assert_eq!(r.propose(0.2), None);
}

#[test]
fn max_slot_clamps_overshoot() {
    let mut r = GridRetimer::new(fps30()).with_max_slot(29);
    let s = r.propose(1.2).unwrap();
    assert_eq!(s, FrameIndex(29));
    r.commit(s);
    assert_eq!(r.propose(1.5), None);
    assert!((r.duration_secs() - 1.0).abs() < 1e-12);
}

#[test]
fn propose_at_offsets_from_a_base_slot() {
    let mut r = GridRetimer::new(fps30());
    for i in 0..30 {
        let s = r.propose_at(0, f64::from(i) / 30.0).unwrap();
        r.commit(s);
    }
    let base = r.next_slot();
    assert_eq!(base, 30);
    let s = r.propose_at(base, 0.0).unwrap();
    assert_eq!(s, FrameIndex(30));
    r.commit(s);
    assert_eq!(r.propose_at(base, 0.001), None);
    r.note_dropped();
    assert_eq!(r.frames_dropped(), 1);
    assert!((r.slot_timestamp(FrameIndex(30)) - 1.0).abs() < 1e-12);
}
