use crate::telemetry::{PingRecord, SpeedTestRecord};

/// Where one dataset stands for the lifetime of this run. Records and an
/// error message are mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetPhase<T> {
    Pending,
    Ready(Vec<T>),
    Error(String),
}

/// One dataset slot. `Pending → Ready` and `Pending → Error` are the only
/// transitions; both are terminal until the process restarts.
#[derive(Debug)]
pub struct DatasetSlot<T> {
    phase: DatasetPhase<T>,
}

// Manual impl: the derive would demand `T: Default` for a slot that starts
// out holding no records at all.
impl<T> Default for DatasetSlot<T> {
    fn default() -> Self {
        Self {
            phase: DatasetPhase::Pending,
        }
    }
}

impl<T> DatasetSlot<T> {
    pub fn mark_pending(&mut self) {
        self.phase = DatasetPhase::Pending;
    }

    pub fn mark_ready(&mut self, records: Vec<T>) {
        if !self.is_pending() {
            tracing::warn!("ignoring data for an already-resolved dataset");
            return;
        }
        self.phase = DatasetPhase::Ready(records);
    }

    pub fn mark_error(&mut self, message: String) {
        if !self.is_pending() {
            tracing::warn!(%message, "ignoring error for an already-resolved dataset");
            return;
        }
        self.phase = DatasetPhase::Error(message);
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.phase, DatasetPhase::Pending)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.phase, DatasetPhase::Ready(_))
    }

    pub fn records(&self) -> &[T] {
        match &self.phase {
            DatasetPhase::Ready(records) => records,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            DatasetPhase::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// The per-run view state. Owns both dataset slots; the renderer only
/// reads. The two slots resolve independently and in either order.
#[derive(Debug, Default)]
pub struct DashboardState {
    pub pings: DatasetSlot<PingRecord>,
    pub speed_tests: DatasetSlot<SpeedTestRecord>,
}

impl DashboardState {
    pub fn new() -> Self {
        let mut state = Self::default();
        state.pings.mark_pending();
        state.speed_tests.mark_pending();
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{RecordId, Timestamp};

    fn ping(id: i64) -> PingRecord {
        PingRecord {
            id: RecordId::Int(id),
            timestamp: Timestamp::Epoch(id as f64),
            target: "8.8.8.8".to_string(),
            success: true,
        }
    }

    #[test]
    fn slots_start_pending_and_empty() {
        let state = DashboardState::new();
        assert!(state.pings.is_pending());
        assert!(state.speed_tests.is_pending());
        assert!(state.pings.records().is_empty());
        assert_eq!(state.pings.error(), None);
    }

    #[test]
    fn ready_holds_records_and_no_error() {
        let mut slot = DatasetSlot::default();
        slot.mark_ready(vec![ping(1), ping(2)]);
        assert!(slot.is_ready());
        assert_eq!(slot.records().len(), 2);
        assert_eq!(slot.error(), None);
    }

    #[test]
    fn error_holds_message_and_no_records() {
        let mut slot: DatasetSlot<PingRecord> = DatasetSlot::default();
        slot.mark_error("No ping data available.".to_string());
        assert!(!slot.is_ready());
        assert!(slot.records().is_empty());
        assert_eq!(slot.error(), Some("No ping data available."));
    }

    #[test]
    fn resolution_is_terminal() {
        let mut slot = DatasetSlot::default();
        slot.mark_ready(vec![ping(1)]);
        slot.mark_error("Failed to fetch ping data.".to_string());
        assert!(slot.is_ready());
        assert_eq!(slot.error(), None);

        let mut slot: DatasetSlot<PingRecord> = DatasetSlot::default();
        slot.mark_error("Failed to fetch ping data.".to_string());
        slot.mark_ready(vec![ping(1)]);
        assert_eq!(slot.error(), Some("Failed to fetch ping data."));
        assert!(slot.records().is_empty());
    }

    #[test]
    fn slots_resolve_independently() {
        let mut state = DashboardState::new();
        state
            .pings
            .mark_error("Failed to fetch ping data.".to_string());
        state.speed_tests.mark_ready(vec![]);
        assert_eq!(state.pings.error(), Some("Failed to fetch ping data."));
        assert!(state.speed_tests.is_ready());
    }
}
