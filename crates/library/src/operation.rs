use crate::messages::Language;
use derive_more::Display;
use std::sync::atomic::{AtomicU8, Ordering};

/// The user-triggered operations of a [`Session`](crate::Session).
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum OperationKind {
    #[display("load")]
    Load,
    #[display("match")]
    Match,
    #[display("download")]
    Download,
}

impl OperationKind {
    pub fn label(self, language: Language) -> &'static str {
        match (self, language) {
            (Self::Load, Language::En) => "Loading files",
            (Self::Match, Language::En) => "Matching files",
            (Self::Download, Language::En) => "Creating the ZIP file",
            (Self::Load, Language::Zh) => "加载文件",
            (Self::Match, Language::Zh) => "匹配文件",
            (Self::Download, Language::Zh) => "创建ZIP文件",
        }
    }
}

/// `Idle → Running → (Succeeded | Failed)`, and from either end state back to
/// `Running` when the operation is started again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum OperationState {
    Idle = 0,
    Running = 1,
    Succeeded = 2,
    Failed = 3,
}

impl OperationState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Running,
            2 => Self::Succeeded,
            3 => Self::Failed,
            _ => Self::Idle,
        }
    }
}

/// Guards one kind of operation against running twice at the same time.
#[derive(Debug)]
pub struct Operation {
    kind: OperationKind,
    state: AtomicU8,
}

impl Operation {
    pub fn new(kind: OperationKind) -> Self {
        Self { kind, state: AtomicU8::new(OperationState::Idle as u8) }
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn state(&self) -> OperationState {
        OperationState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Move to `Running`, unless the operation is already running.
    ///
    /// The returned guard settles the operation. Dropping it without calling
    /// [`succeed`](OperationGuard::succeed) or [`fail`](OperationGuard::fail)
    /// counts as a failure.
    pub fn start(&self) -> Option<OperationGuard<'_>> {
        let running = OperationState::Running as u8;
        self.state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| (current != running).then_some(running))
            .ok()?;
        tracing::trace!(operation = %self.kind, "Operation started");
        Some(OperationGuard { operation: self, settled: false })
    }
}

/// A running operation. See [`Operation::start`].
#[derive(Debug)]
#[must_use = "dropping the guard marks the operation as failed"]
pub struct OperationGuard<'a> {
    operation: &'a Operation,
    settled: bool,
}

impl OperationGuard<'_> {
    pub fn succeed(mut self) {
        self.settle(OperationState::Succeeded);
    }

    pub fn fail(mut self) {
        self.settle(OperationState::Failed);
    }

    fn settle(&mut self, state: OperationState) {
        self.settled = true;
        self.operation.state.store(state as u8, Ordering::Release);
        tracing::trace!(operation = %self.operation.kind, state = ?state, "Operation settled");
    }
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.settle(OperationState::Failed);
        }
    }
}
