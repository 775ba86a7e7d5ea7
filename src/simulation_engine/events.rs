use crate::control_system::traffic_light_controller::SignalStage;
use crate::shared_data::SimTime;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Work the event loop can be asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    MoveVehicles,
    ReportMetrics,
    CycleLights,
    SpawnEmergency,
    EmitLog,
    /// One-shot: end of a yellow stage.
    CompleteLightTransition { from: SignalStage, to: SignalStage },
    /// One-shot: an emergency vehicle's self-destruct timer.
    ClearEmergency { id: String },
}

impl SimEvent {
    pub fn is_periodic(&self) -> bool {
        matches!(
            self,
            SimEvent::MoveVehicles
                | SimEvent::ReportMetrics
                | SimEvent::CycleLights
                | SimEvent::SpawnEmergency
                | SimEvent::EmitLog
        )
    }
}

#[derive(Debug, Clone)]
pub struct ScheduledEvent {
    pub due: SimTime,
    seq: u64,
    pub event: SimEvent,
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    // Reversed so the max-heap pops the earliest event; ties go to the first scheduled.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Time-ordered queue of pending events.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<ScheduledEvent>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: SimTime, event: SimEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(ScheduledEvent { due, seq, event });
    }

    pub fn next_due(&self) -> Option<SimTime> {
        self.heap.peek().map(|scheduled| scheduled.due)
    }

    /// Pops the earliest event if it is due at or before `now`.
    pub fn pop_due(&mut self, now: SimTime) -> Option<ScheduledEvent> {
        if self.next_due()? <= now {
            self.heap.pop()
        } else {
            None
        }
    }

    /// Removes every pending event, earliest first.
    pub fn drain_in_order(&mut self) -> Vec<ScheduledEvent> {
        std::iter::from_fn(|| self.heap.pop()).collect()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn pending(&self) -> impl Iterator<Item = &ScheduledEvent> {
        self.heap.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_time_order() {
        let mut queue = EventQueue::new();
        queue.schedule(SimTime(500), SimEvent::CycleLights);
        queue.schedule(SimTime(100), SimEvent::MoveVehicles);
        queue.schedule(SimTime(300), SimEvent::EmitLog);

        let order: Vec<_> = std::iter::from_fn(|| queue.pop_due(SimTime(1_000)))
            .map(|s| s.due)
            .collect();
        assert_eq!(order, vec![SimTime(100), SimTime(300), SimTime(500)]);
    }

    #[test]
    fn equal_due_times_keep_schedule_order() {
        let mut queue = EventQueue::new();
        queue.schedule(SimTime(100), SimEvent::ReportMetrics);
        queue.schedule(SimTime(100), SimEvent::MoveVehicles);

        assert_eq!(queue.pop_due(SimTime(100)).map(|s| s.event), Some(SimEvent::ReportMetrics));
        assert_eq!(queue.pop_due(SimTime(100)).map(|s| s.event), Some(SimEvent::MoveVehicles));
    }

    #[test]
    fn future_events_stay_queued() {
        let mut queue = EventQueue::new();
        queue.schedule(SimTime(200), SimEvent::SpawnEmergency);
        assert!(queue.pop_due(SimTime(199)).is_none());
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.next_due(), Some(SimTime(200)));
    }

    #[test]
    fn drain_returns_everything_in_due_order() {
        let mut queue = EventQueue::new();
        queue.schedule(SimTime(700), SimEvent::EmitLog);
        queue.schedule(SimTime(100), SimEvent::MoveVehicles);
        queue.schedule(SimTime(100), SimEvent::CycleLights);

        let drained: Vec<_> = queue
            .drain_in_order()
            .into_iter()
            .map(|s| (s.due, s.event))
            .collect();
        assert_eq!(
            drained,
            vec![
                (SimTime(100), SimEvent::MoveVehicles),
                (SimTime(100), SimEvent::CycleLights),
                (SimTime(700), SimEvent::EmitLog),
            ]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn one_shots_are_not_periodic() {
        assert!(SimEvent::EmitLog.is_periodic());
        assert!(!SimEvent::ClearEmergency { id: "EV-001".into() }.is_periodic());
    }
}
