use super::*;

#[test]
fn fast_vehicle_finishes_in_two_hours() {
    let mut race = running_race(100.0, vec![vehicle_with(1, 50.0, 0.0, 3)]);
    let mut rng = make_rng();

    simulate_hour(&mut race, &mut rng).unwrap();
    assert_eq!(race.vehicles[0].status, VehicleStatus::Running);

    simulate_hour(&mut race, &mut rng).unwrap();
    let vehicle = &race.vehicles[0];
    assert_eq!(vehicle.status, VehicleStatus::CompletedRace);
    assert_close(vehicle.distance_covered, 100.0);
    assert_eq!(vehicle.finished_at_hour, Some(2));
    assert_eq!(race.elapsed_hours, 2);
}

#[test]
fn certain_malfunction_repair_cycle() {
    let mut race = running_race(100.0, vec![vehicle_with(1, 50.0, 1.0, 3)]);
    let mut rng = make_rng();

    simulate_hour(&mut race, &mut rng).unwrap();
    assert_eq!(race.vehicles[0].status, VehicleStatus::Broken);
    assert_eq!(race.vehicles[0].remaining_repair_hours, 3);

    simulate_hour(&mut race, &mut rng).unwrap();
    assert_eq!(race.vehicles[0].remaining_repair_hours, 2);

    simulate_hour(&mut race, &mut rng).unwrap();
    assert_eq!(race.vehicles[0].remaining_repair_hours, 1);

    simulate_hour(&mut race, &mut rng).unwrap();
    assert_eq!(race.vehicles[0].remaining_repair_hours, 0);
    assert_eq!(race.vehicles[0].status, VehicleStatus::Running);

    assert_close(race.vehicles[0].distance_covered, 0.0);
    assert_eq!(race.vehicles[0].malfunctions.len(), 1);
}

#[test]
fn race_finishes_the_hour_the_last_vehicle_turns_terminal() {
    // Vehicle 1 finishes at hour 2; vehicle 2 breaks for good at hour 3.
    let mut quick = vehicle_with(1, 50.0, 0.0, 3);
    quick.heavy_malfunction_probability = 0.0;
    let mut doomed = vehicle_with(2, 10.0, 0.0, 3);
    doomed.heavy_malfunction_probability = 0.5;

    let mut race = running_race(100.0, vec![doomed, quick]);
    // Draws by ascending id: hour 1 (v1, v2), hour 2 (v1, v2), hour 3 (v2).
    let mut rolls = ScriptedRolls::new([0.9, 0.9, 0.9, 0.9, 0.1]);
    let clock = fixed_clock();

    for expected_hour in 1..=2 {
        simulate_hour(&mut race, &mut rolls).unwrap();
        assert_eq!(race.elapsed_hours, expected_hour);
        assert!(!race.is_complete());
        assert!(race.complete(clock.now()).is_err());
        assert_eq!(race.status, RaceStatus::Running);
    }

    let events = simulate_hour(&mut race, &mut rolls).unwrap();
    assert!(events.iter().any(|e| matches!(
        e.event,
        Event::MalfunctionOccurred {
            kind: MalfunctionKind::Heavy,
            ..
        }
    )));
    assert!(race.is_complete());
    race.complete(clock.now()).unwrap();
    assert_eq!(race.status, RaceStatus::Finished);
    assert_eq!(rolls.drawn(), 5);
}

#[test]
fn draws_follow_ascending_vehicle_id() {
    // Roster handed over out of order; the low draw must hit vehicle 1.
    let mut race = running_race(
        1_000.0,
        vec![
            vehicle_with(3, 10.0, 0.5, 2),
            vehicle_with(1, 10.0, 0.5, 2),
            vehicle_with(2, 10.0, 0.5, 2),
        ],
    );
    let mut rolls = ScriptedRolls::new([0.1, 0.9, 0.9]);
    simulate_hour(&mut race, &mut rolls).unwrap();

    let ids: Vec<VehicleId> = race.vehicles.iter().map(|v| v.id).collect();
    assert_eq!(ids, vec![vehicle_id(1), vehicle_id(2), vehicle_id(3)]);
    assert_eq!(race.vehicles[0].status, VehicleStatus::Broken);
    assert_eq!(race.vehicles[1].status, VehicleStatus::Running);
    assert_eq!(race.vehicles[2].status, VehicleStatus::Running);
}

#[test]
fn same_seed_same_race() {
    let roster = || {
        (1..=6)
            .map(|n| vehicle_with(n, 20.0 + n as f64, 0.15, 2))
            .collect::<Vec<_>>()
    };
    let mut a = running_race(500.0, roster());
    let mut b = running_race(500.0, roster());
    let mut rng_a = make_rng();
    let mut rng_b = make_rng();

    for _ in 0..40 {
        let events_a = simulate_hour(&mut a, &mut rng_a).unwrap();
        let events_b = simulate_hour(&mut b, &mut rng_b).unwrap();
        assert_eq!(events_a, events_b);
    }
    assert_eq!(a, b);
}

#[test]
fn distance_never_decreases() {
    let roster = (1..=8)
        .map(|n| {
            let mut v = vehicle_with(n, 30.0, 0.2, 3);
            v.heavy_malfunction_probability = 0.02;
            v
        })
        .collect();
    let mut race = running_race(2_000.0, roster);
    let mut rng = make_rng();

    let mut previous: Vec<f64> = race.vehicles.iter().map(|v| v.distance_covered).collect();
    for _ in 0..200 {
        simulate_hour(&mut race, &mut rng).unwrap();
        for (vehicle, before) in race.vehicles.iter().zip(&previous) {
            assert!(vehicle.distance_covered >= *before);
            if vehicle.remaining_repair_hours > 0 {
                assert_eq!(vehicle.status, VehicleStatus::Broken);
            }
        }
        previous = race.vehicles.iter().map(|v| v.distance_covered).collect();
    }
}

#[test]
fn simulate_rejects_race_that_is_not_running() {
    let mut race = created_race(100.0, vec![vehicle_with(1, 50.0, 0.0, 3)]);
    let mut rng = make_rng();
    assert!(matches!(
        simulate_hour(&mut race, &mut rng),
        Err(EngineError::InvalidState(InvalidState::RaceStatus {
            expected: RaceStatus::Running,
            actual: RaceStatus::Created,
            ..
        }))
    ));
    assert_eq!(race.elapsed_hours, 0);
}
