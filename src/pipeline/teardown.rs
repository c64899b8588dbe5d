use crate::foundation::error::{WarpError, WarpResult};
use crate::media::backend::{OutputContainer, SampleSource};

/// Handle to a decoder registered with a [`Teardown`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceId(usize);

/// Codec handles of one job, released exactly once in a fixed order.
///
/// Release order: close the encoder inputs that are still open, cancel the container if it was
/// started but never finalized, then dispose every decoder that is still registered. Each step
/// is guarded on its own; failures become diagnostics and never replace the job's result.
/// Dropping an unreleased `Teardown` performs the same release.
pub struct Teardown {
    output: Option<Box<dyn OutputContainer>>,
    started: bool,
    video_open: bool,
    audio_open: bool,
    sources: Vec<Option<Box<dyn SampleSource>>>,
    diagnostics: Vec<String>,
    released: bool,
}

impl Default for Teardown {
    fn default() -> Self {
        Self::new()
    }
}

impl Teardown {
    pub fn new() -> Self {
        Self {
            output: None,
            started: false,
            video_open: false,
            audio_open: false,
            sources: Vec::new(),
            diagnostics: Vec::new(),
            released: false,
        }
    }

    pub fn add_source(&mut self, source: Box<dyn SampleSource>) -> SourceId {
        self.sources.push(Some(source));
        SourceId(self.sources.len() - 1)
    }

    pub fn source_mut(&mut self, id: SourceId) -> WarpResult<&mut (dyn SampleSource + 'static)> {
        self.sources
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .map(|s| &mut **s)
            .ok_or_else(|| WarpError::media("decoder already released"))
    }

    /// Dispose one decoder early. Failures are recorded as diagnostics.
    pub fn release_source(&mut self, id: SourceId) {
        if let Some(mut src) = self.sources.get_mut(id.0).and_then(Option::take) {
            let outcome = src.dispose();
            self.record("dispose decoder", outcome);
        }
    }

    /// Adopt `output` and start it. A container that fails to start still gets cancelled.
    pub fn start_output(
        &mut self,
        output: Box<dyn OutputContainer>,
        has_audio: bool,
    ) -> WarpResult<()> {
        let out = self.output.insert(output);
        self.started = true;
        self.video_open = true;
        self.audio_open = has_audio;
        out.start()
    }

    pub fn output_mut(&mut self) -> WarpResult<&mut (dyn OutputContainer + 'static)> {
        self.output
            .as_mut()
            .map(|o| &mut **o)
            .ok_or_else(|| WarpError::media("output container is not open"))
    }

    pub fn close_video(&mut self) -> WarpResult<()> {
        self.video_open = false;
        self.output_mut()?.close_video()
    }

    pub fn close_audio(&mut self) -> WarpResult<()> {
        if !self.audio_open {
            return Ok(());
        }
        self.audio_open = false;
        self.output_mut()?.close_audio()
    }

    /// Finalize the container. Once finalized it needs no further cleanup.
    pub fn finalize(&mut self) -> WarpResult<Vec<u8>> {
        let bytes = self.output_mut()?.finalize()?;
        self.output = None;
        self.started = false;
        self.video_open = false;
        self.audio_open = false;
        Ok(bytes)
    }

    fn record(&mut self, step: &str, outcome: WarpResult<()>) {
        if let Err(err) = outcome {
            tracing::warn!(step, %err, "teardown step failed");
            self.diagnostics.push(format!("{step}: {err}"));
        }
    }

    /// Run the release sequence once and return the collected diagnostics.
    pub fn release(&mut self) -> Vec<String> {
        if !self.released {
            self.released = true;
            if let Some(mut out) = self.output.take() {
                if self.video_open {
                    let r = out.close_video();
                    self.record("close video encoder", r);
                }
                if self.audio_open {
                    let r = out.close_audio();
                    self.record("close audio encoder", r);
                }
                if self.started {
                    let r = out.cancel();
                    self.record("cancel container", r);
                }
            }
            self.video_open = false;
            self.audio_open = false;
            self.started = false;
            for id in 0..self.sources.len() {
                self.release_source(SourceId(id));
            }
        }
        std::mem::take(&mut self.diagnostics)
    }
}

impl Drop for Teardown {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/teardown.rs"]
mod tests;
