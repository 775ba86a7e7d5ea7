// src/shared_data.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four approaches into the intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub fn axis(self) -> Axis {
        match self {
            Direction::North | Direction::South => Axis::NorthSouth,
            Direction::East | Direction::West => Axis::EastWest,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Direction::North => write!(f, "North"),
            Direction::South => write!(f, "South"),
            Direction::East => write!(f, "East"),
            Direction::West => write!(f, "West"),
        }
    }
}

/// A pair of opposing approaches that always share a light phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    NorthSouth,
    EastWest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightPhase {
    Red,
    Yellow,
    Green,
}

/// Light phase per approach, as handed to the render surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightMap {
    pub north: LightPhase,
    pub south: LightPhase,
    pub east: LightPhase,
    pub west: LightPhase,
}

impl LightMap {
    pub fn get(&self, direction: Direction) -> LightPhase {
        match direction {
            Direction::North => self.north,
            Direction::South => self.south,
            Direction::East => self.east,
            Direction::West => self.west,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Direction, LightPhase)> + '_ {
        Direction::ALL.into_iter().map(move |d| (d, self.get(d)))
    }

    /// Number of approaches currently showing green.
    pub fn green_count(&self) -> usize {
        self.iter()
            .filter(|(_, phase)| *phase == LightPhase::Green)
            .count()
    }
}

/// Milliseconds of simulated time since the simulation started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct SimTime(pub u64);

impl SimTime {
    pub fn as_millis(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let total_secs = self.0 / 1000;
        let hours = total_secs / 3600;
        let minutes = (total_secs % 3600) / 60;
        let seconds = total_secs % 60;
        write!(f, "{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// A line in the operator-facing log feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub time: SimTime,
    pub severity: Severity,
    pub message: String,
}

impl LogEntry {
    pub fn new(time: SimTime, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            time,
            severity,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_time_formats_as_clock() {
        assert_eq!(SimTime(0).to_string(), "00:00:00");
        assert_eq!(SimTime(3_723_999).to_string(), "01:02:03");
    }

    #[test]
    fn opposing_directions_share_an_axis() {
        assert_eq!(Direction::North.axis(), Direction::South.axis());
        assert_eq!(Direction::East.axis(), Direction::West.axis());
        assert_ne!(Direction::North.axis(), Direction::East.axis());
    }

    #[test]
    fn severity_serializes_uppercase() {
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"CRITICAL\"");
    }
}
