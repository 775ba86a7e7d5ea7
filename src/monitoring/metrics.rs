use crate::global_variables::*;
use crate::shared_data::{Direction, Severity};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Scalar gauges plus per-approach chart samples for one metrics tick.
///
/// Only `emergency_active` reflects simulation state; the rest are independent draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub total_vehicles: u32,
    pub emergency_active: usize,
    /// Seconds.
    pub avg_wait_time: f64,
    pub queue_lengths: Vec<(Direction, u32)>,
    pub approach_delays: Vec<(Direction, u32)>,
}

pub fn sample_metrics<R: Rng + ?Sized>(rng: &mut R, emergency_active: usize) -> MetricsReport {
    let total_vehicles = rng.random_range(TOTAL_VEHICLES_MIN..TOTAL_VEHICLES_MAX);
    let avg_wait_time = rng.random_range(AVG_WAIT_MIN_S..AVG_WAIT_MAX_S);
    let queue_lengths = Direction::ALL
        .iter()
        .map(|&d| (d, rng.random_range(QUEUE_SAMPLE_MIN..QUEUE_SAMPLE_MAX)))
        .collect();
    let approach_delays = Direction::ALL
        .iter()
        .map(|&d| (d, rng.random_range(DELAY_SAMPLE_MIN_S..DELAY_SAMPLE_MAX_S)))
        .collect();

    MetricsReport {
        total_vehicles,
        emergency_active,
        avg_wait_time,
        queue_lengths,
        approach_delays,
    }
}

/// Picks a severity (INFO or WARNING, evenly), then a message from that pool.
pub fn random_log_message<R: Rng + ?Sized>(rng: &mut R) -> (Severity, &'static str) {
    if rng.random_bool(0.5) {
        (Severity::Info, INFO_MESSAGES[rng.random_range(0..INFO_MESSAGES.len())])
    } else {
        (
            Severity::Warning,
            WARNING_MESSAGES[rng.random_range(0..WARNING_MESSAGES.len())],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn draws_stay_in_their_ranges() {
        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..200 {
            let report = sample_metrics(&mut rng, 2);
            assert!((150..170).contains(&report.total_vehicles));
            assert!(report.avg_wait_time >= 38.0 && report.avg_wait_time < 48.0);
            assert_eq!(report.emergency_active, 2);
            assert_eq!(report.queue_lengths.len(), 4);
            assert!(report.queue_lengths.iter().all(|(_, q)| (5..20).contains(q)));
            assert!(report.approach_delays.iter().all(|(_, d)| (35..55).contains(d)));
        }
    }

    #[test]
    fn random_log_lines_come_from_the_pools() {
        let mut rng = SmallRng::seed_from_u64(9);
        let mut saw_info = false;
        let mut saw_warning = false;
        for _ in 0..100 {
            match random_log_message(&mut rng) {
                (Severity::Info, msg) => {
                    saw_info = true;
                    assert!(INFO_MESSAGES.contains(&msg));
                }
                (Severity::Warning, msg) => {
                    saw_warning = true;
                    assert!(WARNING_MESSAGES.contains(&msg));
                }
                (Severity::Critical, msg) => panic!("unexpected critical line {}", msg),
            }
        }
        assert!(saw_info && saw_warning);
    }
}
