//! Collision and locomotion events for HUDs and debug overlays.

use std::collections::VecDeque;

use serde::Serialize;

use crate::mode::CameraMode;

/// Why a jump request was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JumpRefusal {
    NotGrounded,
    Crouching,
    HeadBlocked { collider: usize },
}

/// Which candidate the horizontal resolver accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideKind {
    Free,
    AlongX,
    AlongZ,
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LocomotionEvent {
    Landed { collider: usize, y: f32 },
    HitCeiling { collider: usize, y: f32 },
    FallbackFloor { y: f32 },
    Slid { kind: SlideKind },
    Jumped { velocity: f32, bunny_hop: f32 },
    JumpRefused { reason: JumpRefusal },
    BunnyHopReset,
    Crouched,
    Stood,
    StandRefused { collider: usize },
    ModeChanged { mode: CameraMode },
    Teleported { x: f32, y: f32, z: f32 },
    CollidersShifted { delta: f32 },
    CollidersCleared,
}

impl LocomotionEvent {
    /// Snake-case variant name, matching the serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            LocomotionEvent::Landed { .. } => "landed",
            LocomotionEvent::HitCeiling { .. } => "hit_ceiling",
            LocomotionEvent::FallbackFloor { .. } => "fallback_floor",
            LocomotionEvent::Slid { .. } => "slid",
            LocomotionEvent::Jumped { .. } => "jumped",
            LocomotionEvent::JumpRefused { .. } => "jump_refused",
            LocomotionEvent::BunnyHopReset => "bunny_hop_reset",
            LocomotionEvent::Crouched => "crouched",
            LocomotionEvent::Stood => "stood",
            LocomotionEvent::StandRefused { .. } => "stand_refused",
            LocomotionEvent::ModeChanged { .. } => "mode_changed",
            LocomotionEvent::Teleported { .. } => "teleported",
            LocomotionEvent::CollidersShifted { .. } => "colliders_shifted",
            LocomotionEvent::CollidersCleared => "colliders_cleared",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggedEvent {
    pub frame: u64,
    pub event: LocomotionEvent,
}

/// Bounded ring buffer of recent events. Oldest entries are dropped first.
pub struct EventLog {
    log: VecDeque<LoggedEvent>,
    capacity: usize,
    total: u64,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            log: VecDeque::with_capacity(capacity),
            capacity,
            total: 0,
        }
    }

    pub fn push(&mut self, frame: u64, event: LocomotionEvent) {
        tracing::debug!(frame, ?event, "locomotion");
        if self.capacity == 0 {
            self.total += 1;
            return;
        }
        if self.log.len() == self.capacity {
            self.log.pop_front();
        }
        self.log.push_back(LoggedEvent { frame, event });
        self.total += 1;
    }

    pub fn recent(&self) -> impl DoubleEndedIterator<Item = &LoggedEvent> {
        self.log.iter()
    }

    pub fn last(&self) -> Option<&LocomotionEvent> {
        self.log.back().map(|e| &e.event)
    }

    /// Events ever pushed, including evicted ones.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub fn clear(&mut self) {
        self.log.clear();
    }

    /// Count of retained events matching `pred`.
    pub fn count(&self, pred: impl Fn(&LocomotionEvent) -> bool) -> usize {
        self.log.iter().filter(|e| pred(&e.event)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_buffer_evicts_oldest() {
        let mut log = EventLog::new(2);
        log.push(1, LocomotionEvent::Crouched);
        log.push(2, LocomotionEvent::Stood);
        log.push(3, LocomotionEvent::BunnyHopReset);
        assert_eq!(log.len(), 2);
        assert_eq!(log.total(), 3);
        assert_eq!(log.recent().next().map(|e| e.frame), Some(2));
        assert_eq!(log.last(), Some(&LocomotionEvent::BunnyHopReset));
    }

    #[test]
    fn test_count() {
        let mut log = EventLog::new(10);
        log.push(1, LocomotionEvent::FallbackFloor { y: -18.5 });
        log.push(2, LocomotionEvent::Crouched);
        log.push(3, LocomotionEvent::FallbackFloor { y: -18.5 });
        assert_eq!(log.count(|e| matches!(e, LocomotionEvent::FallbackFloor { .. })), 2);
    }

    #[test]
    fn test_serializes_with_tag() {
        let json = serde_json::to_value(LocomotionEvent::StandRefused { collider: 4 }).unwrap();
        assert_eq!(json["type"], "stand_refused");
        assert_eq!(json["collider"], 4);
        assert_eq!(LocomotionEvent::StandRefused { collider: 4 }.kind(), "stand_refused");
    }
}
