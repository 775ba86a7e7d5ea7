use crate::global_variables::{
    VEHICLE_FLAGGED_PROBABILITY, VEHICLE_FLAGGED_SPEED, VEHICLE_SPEED, VEHICLE_START_POSITION_MAX,
};
use crate::shared_data::Direction;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A vehicle moving along one approach lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub direction: Direction,
    /// Fractional progress along the lane, in [0, 1).
    pub position: f64,
    /// Drawn with beacon styling. Not linked to the emergency vehicle records.
    pub is_emergency: bool,
    /// Lane fraction covered per motion tick.
    pub speed: f64,
}

impl Vehicle {
    pub fn new(id: impl Into<String>, direction: Direction, position: f64, is_emergency: bool) -> Self {
        let speed = if is_emergency {
            VEHICLE_FLAGGED_SPEED
        } else {
            VEHICLE_SPEED
        };
        Self {
            id: id.into(),
            direction,
            position,
            is_emergency,
            speed,
        }
    }

    /// Moves one tick forward, wrapping back onto the lane past its end.
    pub fn advance(&mut self) {
        self.position += self.speed;
        if self.position >= 1.0 {
            self.position -= 1.0;
        }
    }
}

/// Builds a fresh batch of `count` vehicles with ids `v-0`, `v-1`, ...
pub fn generate_batch<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<Vehicle> {
    (0..count)
        .map(|i| {
            let direction = Direction::ALL[rng.random_range(0..Direction::ALL.len())];
            let is_emergency = rng.random_bool(VEHICLE_FLAGGED_PROBABILITY);
            let position = rng.random_range(0.0..VEHICLE_START_POSITION_MAX);
            Vehicle::new(format!("v-{}", i), direction, position, is_emergency)
        })
        .collect()
}

/// Advances every vehicle by one motion tick.
pub fn advance_all(vehicles: &mut [Vehicle]) {
    for vehicle in vehicles.iter_mut() {
        vehicle.advance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn flagged_vehicles_move_faster() {
        let normal = Vehicle::new("v-0", Direction::North, 0.0, false);
        let flagged = Vehicle::new("v-1", Direction::North, 0.0, true);
        assert!(flagged.speed > normal.speed);
    }

    #[test]
    fn wraps_when_passing_the_lane_end() {
        let mut vehicle = Vehicle::new("v-0", Direction::East, 0.995, false);
        vehicle.advance();
        assert!((vehicle.position - 0.005).abs() < 1e-9);
    }

    #[test]
    fn stays_on_lane_without_wrap() {
        let mut vehicle = Vehicle::new("v-0", Direction::West, 0.5, false);
        vehicle.advance();
        assert!((vehicle.position - 0.51).abs() < 1e-9);
    }

    #[test]
    fn batch_has_sequential_ids_and_valid_positions() {
        let mut rng = SmallRng::seed_from_u64(3);
        let batch = generate_batch(&mut rng, 15);
        assert_eq!(batch.len(), 15);
        for (i, vehicle) in batch.iter().enumerate() {
            assert_eq!(vehicle.id, format!("v-{}", i));
            assert!((0.0..VEHICLE_START_POSITION_MAX).contains(&vehicle.position));
        }
    }
}
