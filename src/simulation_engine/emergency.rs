use crate::global_variables::{
    EMERGENCY_DISTANCE_MAX_M, EMERGENCY_DISTANCE_MIN_M, EMERGENCY_ETA_MAX_S, EMERGENCY_ETA_MIN_S,
};
use crate::shared_data::Direction;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmergencyKind {
    Ambulance,
    FireTruck,
    PoliceCar,
}

impl EmergencyKind {
    pub const ALL: [EmergencyKind; 3] = [
        EmergencyKind::Ambulance,
        EmergencyKind::FireTruck,
        EmergencyKind::PoliceCar,
    ];
}

impl fmt::Display for EmergencyKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EmergencyKind::Ambulance => write!(f, "Ambulance"),
            EmergencyKind::FireTruck => write!(f, "Fire Truck"),
            EmergencyKind::PoliceCar => write!(f, "Police Car"),
        }
    }
}

/// Only `Approaching` vehicles pre-empt the light cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmergencyStatus {
    Approaching,
    EnRoute,
}

impl fmt::Display for EmergencyStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EmergencyStatus::Approaching => write!(f, "Approaching"),
            EmergencyStatus::EnRoute => write!(f, "En Route"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyVehicle {
    pub id: String,
    pub kind: EmergencyKind,
    /// Free text such as "400m North".
    pub location: String,
    pub eta_secs: u32,
    pub status: EmergencyStatus,
}

/// The set of currently active emergency vehicles.
#[derive(Debug, Clone, Default)]
pub struct EmergencyRegistry {
    active: Vec<EmergencyVehicle>,
    next_number: u32,
}

impl EmergencyRegistry {
    pub fn new() -> Self {
        Self {
            active: Vec::new(),
            next_number: 1,
        }
    }

    /// Next id in the `EV-001` series. Ids are never reused within a run.
    fn next_id(&mut self) -> String {
        let id = format!("EV-{:03}", self.next_number);
        self.next_number += 1;
        id
    }

    /// Registers a vehicle with explicit attributes and returns a copy of the record.
    pub fn register(
        &mut self,
        kind: EmergencyKind,
        location: impl Into<String>,
        eta_secs: u32,
        status: EmergencyStatus,
    ) -> EmergencyVehicle {
        let vehicle = EmergencyVehicle {
            id: self.next_id(),
            kind,
            location: location.into(),
            eta_secs,
            status,
        };
        self.active.push(vehicle.clone());
        vehicle
    }

    /// Registers a randomly drawn `Approaching` vehicle.
    pub fn spawn_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> EmergencyVehicle {
        let kind = EmergencyKind::ALL[rng.random_range(0..EmergencyKind::ALL.len())];
        let distance = rng.random_range(EMERGENCY_DISTANCE_MIN_M..EMERGENCY_DISTANCE_MAX_M);
        let direction = Direction::ALL[rng.random_range(0..Direction::ALL.len())];
        let eta_secs = rng.random_range(EMERGENCY_ETA_MIN_S..EMERGENCY_ETA_MAX_S);
        self.register(
            kind,
            format!("{}m {}", distance, direction),
            eta_secs,
            EmergencyStatus::Approaching,
        )
    }

    pub fn remove(&mut self, id: &str) -> Option<EmergencyVehicle> {
        let index = self.active.iter().position(|ev| ev.id == id)?;
        Some(self.active.remove(index))
    }

    pub fn has_approaching(&self) -> bool {
        self.active
            .iter()
            .any(|ev| ev.status == EmergencyStatus::Approaching)
    }

    pub fn active(&self) -> &[EmergencyVehicle] {
        &self.active
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
