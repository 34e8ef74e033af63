use std::time::Duration;

/// At most one outstanding deferred operation.
///
/// Scheduling replaces whatever was pending, so the operation always fires
/// with the most recent payload and never twice.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOperation<T> {
    slot: Option<(Duration, T)>,
}

impl<T> Default for PendingOperation<T> {
    fn default() -> Self {
        Self { slot: None }
    }
}

impl<T> PendingOperation<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the operation for `deadline`, returning the replaced payload.
    pub fn schedule(&mut self, deadline: Duration, payload: T) -> Option<T> {
        self.slot
            .replace((deadline, payload))
            .map(|(_, previous)| previous)
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.slot.take().map(|(_, payload)| payload)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.slot.is_some()
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.slot.as_ref().map(|(deadline, _)| *deadline)
    }

    /// Takes the payload once `now` has reached the deadline.
    pub fn take_due(&mut self, now: Duration) -> Option<T> {
        match &self.slot {
            Some((deadline, _)) if *deadline <= now => self.cancel(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::PendingOperation;

    #[test]
    fn rescheduling_replaces_payload_and_deadline() {
        let mut pending = PendingOperation::new();
        assert_eq!(pending.schedule(Duration::from_millis(600), 1), None);
        assert_eq!(pending.schedule(Duration::from_millis(900), 2), Some(1));
        assert_eq!(pending.take_due(Duration::from_millis(700)), None);
        assert_eq!(pending.take_due(Duration::from_millis(900)), Some(2));
        assert!(!pending.is_pending());
        assert_eq!(pending.take_due(Duration::from_secs(10)), None);
    }

    #[test]
    fn cancel_disarms() {
        let mut pending = PendingOperation::new();
        pending.schedule(Duration::ZERO, "x");
        assert_eq!(pending.cancel(), Some("x"));
        assert_eq!(pending.deadline(), None);
    }
}
