use std::io::Write;
use std::path::PathBuf;

use rally_core::test_fixtures::epoch;
use rally_core::{RaceStatus, VehicleClass, VehicleStatus};
use rally_world::{build_race, load_roster};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn content_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../content")
}

#[test]
fn bundled_roster_builds_a_valid_race() {
    let roster = load_roster(&content_dir().join("dakar_2024.json")).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let race = build_race(&roster, epoch(), &mut rng).unwrap();

    assert_eq!(race.status, RaceStatus::Created);
    assert_eq!(race.vehicles.len(), roster.entries.len());
    assert!(race
        .vehicles
        .iter()
        .all(|v| v.status == VehicleStatus::Ready && v.race_id == race.id));
    for class in VehicleClass::ALL {
        assert!(
            race.vehicles.iter().any(|v| v.class == class),
            "bundled roster has no {class:?}"
        );
    }
}

#[test]
fn missing_file_reports_path() {
    let err = load_roster(&content_dir().join("no_such_roster.json")).unwrap_err();
    assert!(format!("{err:#}").contains("no_such_roster.json"));
}

#[test]
fn unknown_class_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"race": {{"name": "X", "year": 2024}}, "entries": [
            {{"team_name": "A", "model": "B", "class": "hovercraft"}}
        ]}}"#
    )
    .unwrap();
    let err = load_roster(file.path()).unwrap_err();
    assert!(format!("{err:#}").contains("parsing roster file"));
}

#[test]
fn track_distance_defaults_to_full_rally() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"race": {{"name": "X", "year": 2024}}, "entries": []}}"#
    )
    .unwrap();
    let roster = load_roster(file.path()).unwrap();
    assert!((roster.race.track_distance - rally_core::DEFAULT_TRACK_DISTANCE_KM).abs() < 1e-9);
}
