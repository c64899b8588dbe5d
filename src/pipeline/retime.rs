use crate::foundation::core::{Fps, FrameIndex};

/// Snaps sample timestamps onto a fixed output frame grid and owns the highest-written-slot
/// cursor of one job.
///
/// Slots are proposed first and committed only after the encoder accepted the frame, so a
/// failed write never advances the cursor.
#[derive(Clone, Debug)]
pub struct GridRetimer {
    fps: Fps,
    max_slot: Option<u64>,
    last: Option<u64>,
    written: u64,
    dropped: u64,
}

impl GridRetimer {
    pub fn new(fps: Fps) -> Self {
        Self {
            fps,
            max_slot: None,
            last: None,
            written: 0,
            dropped: 0,
        }
    }

    /// Clamp every proposed slot to `max_slot` (inclusive).
    pub fn with_max_slot(mut self, max_slot: u64) -> Self {
        self.max_slot = Some(max_slot);
        self
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    fn clamp(&self, slot: u64) -> u64 {
        match self.max_slot {
            Some(max) => slot.min(max),
            None => slot,
        }
    }

    /// Grid slot for an output time, or `None` if it does not lie after the cursor.
    pub fn propose(&self, output_secs: f64) -> Option<FrameIndex> {
        self.accept(self.clamp(self.fps.secs_to_nearest_frame(output_secs)))
    }

    /// Grid slot `base + round(offset_secs * fps)`, for timelines that restart at `base`.
    pub fn propose_at(&self, base: u64, offset_secs: f64) -> Option<FrameIndex> {
        let slot = base.saturating_add(self.fps.secs_to_nearest_frame(offset_secs));
        self.accept(self.clamp(slot))
    }

    fn accept(&self, slot: u64) -> Option<FrameIndex> {
        match self.last {
            Some(last) if slot <= last => None,
            _ => Some(FrameIndex(slot)),
        }
    }

    /// Record that the encoder accepted a frame at `slot`.
    pub fn commit(&mut self, slot: FrameIndex) {
        debug_assert!(self.last.is_none_or(|last| slot.0 > last));
        self.last = Some(slot.0);
        self.written += 1;
    }

    /// Record a sample that was released without being written.
    pub fn note_dropped(&mut self) {
        self.dropped += 1;
    }

    /// First slot after the cursor.
    pub fn next_slot(&self) -> u64 {
        self.last.map_or(0, |last| last + 1)
    }

    pub fn last_slot(&self) -> Option<FrameIndex> {
        self.last.map(FrameIndex)
    }

    pub fn frames_written(&self) -> u64 {
        self.written
    }

    pub fn frames_dropped(&self) -> u64 {
        self.dropped
    }

    pub fn slot_timestamp(&self, slot: FrameIndex) -> f64 {
        self.fps.frames_to_secs(slot.0)
    }

    pub fn frame_duration(&self) -> f64 {
        self.fps.frame_duration_secs()
    }

    /// Output duration covered by the written slots.
    pub fn duration_secs(&self) -> f64 {
        self.fps.frames_to_secs(self.next_slot())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/retime.rs"]
mod tests;
