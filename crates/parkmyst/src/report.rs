//! Outcome of one drive of the session.

use parkmyst_core::{EngineError, EventKind, FeedId, InstanceId, LifecycleStatus};

/// One status change of one instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub instance: InstanceId,
    pub from: LifecycleStatus,
    pub to: LifecycleStatus,
}

/// What happened while a session processed one external input.
///
/// Runtime errors do not stop a drive; they accumulate in `errors`.
#[derive(Debug, Default)]
pub struct DriveReport {
    /// Instances that entered `started`, in order.
    pub activated: Vec<InstanceId>,
    /// Activations folded into an already started instance.
    pub coalesced: Vec<InstanceId>,
    pub completed: Vec<InstanceId>,
    /// Targets of reset signals, in order.
    pub reset: Vec<InstanceId>,
    pub cleaned_up: Vec<InstanceId>,
    pub delivered: Vec<(InstanceId, EventKind)>,
    pub transitions: Vec<Transition>,
    /// Feeds released by the runtime after a component's own cleanup.
    pub swept_feeds: Vec<(InstanceId, FeedId)>,
    /// Feeds left behind by components with default cleanup disabled.
    pub leaked_feeds: Vec<(InstanceId, FeedId)>,
    /// Raw events refused at the boundary.
    pub dropped_events: usize,
    /// Signals discarded because the session ended or the limit was hit.
    pub dropped_signals: usize,
    pub end_signals: usize,
    pub session_ended: bool,
    pub errors: Vec<EngineError>,
}

impl DriveReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Converts into a `Result`, keeping the report when no error occurred.
    pub fn into_result(self) -> Result<Self, Vec<EngineError>> {
        if self.errors.is_empty() {
            Ok(self)
        } else {
            Err(self.errors)
        }
    }

    /// `true` if `instance` entered `status` during this drive.
    pub fn reached(&self, instance: InstanceId, status: LifecycleStatus) -> bool {
        self.transitions
            .iter()
            .any(|t| t.instance == instance && t.to == status)
    }

    /// Status path of `instance` during this drive, starting state included.
    pub fn path_of(&self, instance: InstanceId) -> Vec<LifecycleStatus> {
        let mut path = Vec::new();
        for t in self.transitions.iter().filter(|t| t.instance == instance) {
            if path.is_empty() {
                path.push(t.from);
            }
            path.push(t.to);
        }
        path
    }

    pub(crate) fn transition(
        &mut self,
        instance: InstanceId,
        from: LifecycleStatus,
        to: LifecycleStatus,
    ) {
        self.transitions.push(Transition { instance, from, to });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_of() {
        let id = InstanceId::new(1);
        let mut report = DriveReport::default();
        report.transition(id, LifecycleStatus::Idle, LifecycleStatus::Started);
        report.transition(InstanceId::new(2), LifecycleStatus::Idle, LifecycleStatus::Started);
        report.transition(id, LifecycleStatus::Started, LifecycleStatus::Completed);

        assert_eq!(
            report.path_of(id),
            vec![
                LifecycleStatus::Idle,
                LifecycleStatus::Started,
                LifecycleStatus::Completed
            ]
        );
        assert!(report.reached(id, LifecycleStatus::Completed));
        assert!(!report.reached(InstanceId::new(2), LifecycleStatus::Completed));
    }

    #[test]
    fn test_into_result() {
        let report = DriveReport::default();
        assert!(report.into_result().is_ok());

        let report = DriveReport {
            errors: vec![EngineError::SessionEnded],
            ..DriveReport::default()
        };
        assert_eq!(report.into_result().unwrap_err().len(), 1);
    }
}
