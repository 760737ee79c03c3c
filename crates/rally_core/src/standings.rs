//! Leaderboard and roster statistics derived from race state.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{MalfunctionKind, Race, Vehicle, VehicleClass, VehicleId, VehicleStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Standing {
    /// 1-based.
    pub position: usize,
    pub vehicle_id: VehicleId,
    pub team_name: String,
    pub class: VehicleClass,
    pub status: VehicleStatus,
    pub distance_covered: f64,
    pub remaining_repair_hours: u32,
    pub finished_at_hour: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RaceStatistics {
    pub vehicles: usize,
    pub ready: usize,
    pub running: usize,
    pub under_repair: usize,
    /// Broken with no repair pending.
    pub retired: usize,
    pub completed: usize,
    pub light_malfunctions: usize,
    pub heavy_malfunctions: usize,
    pub by_class: BTreeMap<VehicleClass, usize>,
}

/// Finishers first (earliest hour wins), then everyone else by distance.
/// Ties fall back to vehicle id.
pub fn leaderboard(race: &Race, class: Option<VehicleClass>) -> Vec<Standing> {
    let mut entries: Vec<&Vehicle> = race
        .vehicles
        .iter()
        .filter(|v| class.is_none_or(|c| v.class == c))
        .collect();

    entries.sort_by(|a, b| match (a.finished_at_hour, b.finished_at_hour) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.id.cmp(&b.id)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => b
            .distance_covered
            .total_cmp(&a.distance_covered)
            .then_with(|| a.id.cmp(&b.id)),
    });

    entries
        .into_iter()
        .enumerate()
        .map(|(idx, v)| Standing {
            position: idx + 1,
            vehicle_id: v.id,
            team_name: v.team_name.clone(),
            class: v.class,
            status: v.status,
            distance_covered: v.distance_covered,
            remaining_repair_hours: v.remaining_repair_hours,
            finished_at_hour: v.finished_at_hour,
        })
        .collect()
}

pub fn statistics(race: &Race) -> RaceStatistics {
    let mut stats = RaceStatistics {
        vehicles: race.vehicles.len(),
        ..RaceStatistics::default()
    };

    for vehicle in &race.vehicles {
        match vehicle.status {
            VehicleStatus::Ready => stats.ready += 1,
            VehicleStatus::Running => stats.running += 1,
            VehicleStatus::Broken if vehicle.is_under_repair() => stats.under_repair += 1,
            VehicleStatus::Broken => stats.retired += 1,
            VehicleStatus::CompletedRace => stats.completed += 1,
        }
        for malfunction in &vehicle.malfunctions {
            match malfunction.kind {
                MalfunctionKind::Light => stats.light_malfunctions += 1,
                MalfunctionKind::Heavy => stats.heavy_malfunctions += 1,
            }
        }
        *stats.by_class.entry(vehicle.class).or_insert(0) += 1;
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{running_race, vehicle_with};

    #[test]
    fn finishers_rank_ahead_by_finish_hour() {
        let mut slow_finisher = vehicle_with(1, 10.0, 0.0, 1);
        slow_finisher.status = VehicleStatus::CompletedRace;
        slow_finisher.distance_covered = 100.0;
        slow_finisher.finished_at_hour = Some(9);

        let mut fast_finisher = vehicle_with(2, 10.0, 0.0, 1);
        fast_finisher.status = VehicleStatus::CompletedRace;
        fast_finisher.distance_covered = 100.0;
        fast_finisher.finished_at_hour = Some(4);

        let mut leader_on_course = vehicle_with(3, 10.0, 0.0, 1);
        leader_on_course.distance_covered = 90.0;

        let mut trailing = vehicle_with(4, 10.0, 0.0, 1);
        trailing.distance_covered = 30.0;

        let race = running_race(
            100.0,
            vec![trailing, slow_finisher, leader_on_course, fast_finisher],
        );
        let board = leaderboard(&race, None);
        let order: Vec<usize> = board
            .iter()
            .map(|s| usize::try_from(s.vehicle_id.0.as_u128()).unwrap())
            .collect();
        assert_eq!(order, vec![2, 1, 3, 4]);
        assert_eq!(board[0].position, 1);
        assert_eq!(board[3].position, 4);
    }

    #[test]
    fn class_filter_restricts_board() {
        let mut truck = vehicle_with(1, 10.0, 0.0, 1);
        truck.class = VehicleClass::Truck;
        let mut bike = vehicle_with(2, 10.0, 0.0, 1);
        bike.class = VehicleClass::SportMotorcycle;

        let race = running_race(100.0, vec![truck, bike]);
        let board = leaderboard(&race, Some(VehicleClass::Truck));
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].class, VehicleClass::Truck);
    }

    #[test]
    fn statistics_split_broken_vehicles() {
        let mut repairing = vehicle_with(1, 10.0, 0.0, 3);
        repairing.status = VehicleStatus::Broken;
        repairing.remaining_repair_hours = 2;
        repairing.malfunctions.push(crate::Malfunction {
            kind: MalfunctionKind::Light,
            hour: 1,
        });

        let mut retired = vehicle_with(2, 10.0, 0.0, 3);
        retired.status = VehicleStatus::Broken;
        retired.malfunctions.push(crate::Malfunction {
            kind: MalfunctionKind::Heavy,
            hour: 2,
        });

        let running = vehicle_with(3, 10.0, 0.0, 3);

        let race = running_race(100.0, vec![repairing, retired, running]);
        let stats = statistics(&race);
        assert_eq!(stats.vehicles, 3);
        assert_eq!(stats.under_repair, 1);
        assert_eq!(stats.retired, 1);
        assert_eq!(stats.running, 1);
        assert_eq!(stats.light_malfunctions, 1);
        assert_eq!(stats.heavy_malfunctions, 1);
    }
}
