//! One-shot completion detection over progress reports.

/// Fires once, the first time a progress report shows the analyzer has caught
/// up with a known, non-zero total.
#[derive(Debug, Default, Clone)]
pub struct CompletionDetector {
    fired: bool,
}

impl CompletionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one progress report. Returns `true` exactly once per detector.
    pub fn observe(&mut self, processed_so_far: u64, total_known: u64) -> bool {
        if self.fired || total_known == 0 || processed_so_far != total_known {
            return false;
        }
        self.fired = true;
        true
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }
}
