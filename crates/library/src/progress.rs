//! Progress reporting.
//!
//! Long-running operations publish their [`Progress`] through a
//! [`ProgressReporter`]; any number of observers can [`subscribe`] to it.
//! Observers only ever see the latest value, so fast-moving intermediate
//! values may be skipped.
//!
//! [`subscribe`]: ProgressReporter::subscribe

use tokio::sync::watch;

/// What is currently happening.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    /// Walking dropped entries.
    ProcessingFiles,
    /// Building an archive.
    CreatingZip,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    pub phase: Phase,
    /// 0 to 100.
    pub percent: u8,
}

/// Integer percentage of `completed` out of `total`; nothing to do counts as done.
pub fn percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    u8::try_from(completed.min(total) * 100 / total).unwrap_or(100)
}

/// Publishes [`Progress`] for one operation at a time.
///
/// Within a phase the percentage never goes down. Every phase ends by going
/// back to [`Phase::Idle`] at 0%, so the next operation always starts clean.
#[derive(Debug)]
pub struct ProgressReporter {
    sender: watch::Sender<Progress>,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self { sender: watch::Sender::new(Progress::default()) }
    }

    pub fn subscribe(&self) -> watch::Receiver<Progress> {
        self.sender.subscribe()
    }

    pub fn current(&self) -> Progress {
        *self.sender.borrow()
    }

    /// Start `phase` at 0%.
    pub fn begin(&self, phase: Phase) {
        self.sender.send_replace(Progress { phase, percent: 0 });
    }

    /// Report `completed` out of `total`. Values lower than the current
    /// percentage are ignored.
    pub fn advance(&self, completed: usize, total: usize) {
        let percent = percent(completed, total);
        self.sender.send_if_modified(|progress| {
            if progress.phase == Phase::Idle || percent <= progress.percent {
                return false;
            }
            progress.percent = percent;
            true
        });
    }

    /// Publish 100% for the current phase, then go back to idle.
    pub fn finish(&self) {
        let phase = self.current().phase;
        self.sender.send_replace(Progress { phase, percent: 100 });
        self.sender.send_replace(Progress::default());
    }

    /// Abandon the current phase and go back to idle.
    pub fn fail(&self) {
        self.sender.send_replace(Progress::default());
    }
}
