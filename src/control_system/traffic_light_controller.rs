use crate::shared_data::{Axis, Direction, LightMap, LightPhase};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Every light configuration the intersection may show.
///
/// South mirrors North and West mirrors East, so the state is really two axis phases.
/// The one exception is `NorthSouthYellow`, where South is already red. Listing the legal
/// stages keeps combinations such as "all green" out of reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalStage {
    /// NS green, EW red.
    NorthSouthGreen,
    /// North yellow, everything else red. Resolves to `EastWestGreen`.
    NorthSouthYellow,
    /// NS red, EW green.
    EastWestGreen,
    /// NS green, EW yellow. Resolves to `NorthSouthGreen`.
    EastWestYellow,
    /// The given approach green, every other approach red.
    EmergencyPriority(Direction),
}

impl SignalStage {
    pub fn axis_phase(self, axis: Axis) -> LightPhase {
        use LightPhase::*;
        let (north_south, east_west) = match self {
            SignalStage::NorthSouthGreen => (Green, Red),
            SignalStage::NorthSouthYellow => (Yellow, Red),
            SignalStage::EastWestGreen => (Red, Green),
            SignalStage::EastWestYellow => (Green, Yellow),
            SignalStage::EmergencyPriority(_) => (Red, Red),
        };
        match axis {
            Axis::NorthSouth => north_south,
            Axis::EastWest => east_west,
        }
    }

    pub fn phase_of(self, direction: Direction) -> LightPhase {
        match self {
            SignalStage::EmergencyPriority(priority) if priority == direction => LightPhase::Green,
            SignalStage::NorthSouthYellow if direction == Direction::South => LightPhase::Red,
            _ => self.axis_phase(direction.axis()),
        }
    }

    pub fn lights(self) -> LightMap {
        LightMap {
            north: self.phase_of(Direction::North),
            south: self.phase_of(Direction::South),
            east: self.phase_of(Direction::East),
            west: self.phase_of(Direction::West),
        }
    }
}

/// What a cycle tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Emergency pre-emption applied; nothing is pending.
    EmergencyOverride(Direction),
    /// Entered the yellow stage `from`; `to` is due after the yellow duration.
    Transition { from: SignalStage, to: SignalStage },
}

/// Two-axis traffic light with emergency pre-emption.
#[derive(Debug, Clone)]
pub struct TrafficLightController {
    stage: SignalStage,
    priority_direction: Direction,
}

impl TrafficLightController {
    pub fn new(initial: SignalStage, priority_direction: Direction) -> Self {
        Self {
            stage: initial,
            priority_direction,
        }
    }

    pub fn stage(&self) -> SignalStage {
        self.stage
    }

    pub fn lights(&self) -> LightMap {
        self.stage.lights()
    }

    pub fn priority_direction(&self) -> Direction {
        self.priority_direction
    }

    /// Runs one cycle tick.
    ///
    /// With an approaching emergency the priority approach goes green at once. Otherwise
    /// the side that currently holds North green starts clearing: North green moves to
    /// `NorthSouthYellow`, anything else moves to `EastWestYellow`.
    pub fn cycle(&mut self, emergency_approaching: bool) -> CycleOutcome {
        if emergency_approaching {
            self.stage = SignalStage::EmergencyPriority(self.priority_direction);
            debug!("Emergency priority: {} green, all others red", self.priority_direction);
            return CycleOutcome::EmergencyOverride(self.priority_direction);
        }

        let (from, to) = if self.stage.phase_of(Direction::North) == LightPhase::Green {
            (SignalStage::NorthSouthYellow, SignalStage::EastWestGreen)
        } else {
            (SignalStage::EastWestYellow, SignalStage::NorthSouthGreen)
        };
        debug!("Light cycle {:?} -> {:?} (pending {:?})", self.stage, from, to);
        self.stage = from;
        CycleOutcome::Transition { from, to }
    }

    /// Finishes a yellow stage. Ignored when the stage has moved on since the
    /// transition was scheduled.
    pub fn complete_transition(&mut self, from: SignalStage, to: SignalStage) -> bool {
        if self.stage != from {
            warn!(
                "Dropping stale light transition {:?} -> {:?}; current stage is {:?}",
                from, to, self.stage
            );
            return false;
        }
        debug!("Light transition complete: {:?}", to);
        self.stage = to;
        true
    }
}
