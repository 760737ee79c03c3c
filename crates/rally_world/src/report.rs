//! Plain-text rendering of race progress for the CLI and daemon.

use std::fmt::Write as _;

use rally_core::{leaderboard, statistics, Race, VehicleStatus};

pub fn status_line(race: &Race) -> String {
    let stats = statistics(race);
    let hour = race.elapsed_hours;
    let day = hour / 24;
    format!(
        "[hour={hour:04}  day={day}  hour_of_day={:02}]  running={:2}  repairing={:2}  \
         retired={:2}  finished={:2}/{}",
        hour % 24,
        stats.running,
        stats.under_repair,
        stats.retired,
        stats.completed,
        stats.vehicles,
    )
}

pub fn render_leaderboard(race: &Race) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} ({:?}, {} simulated hours, {:.0} km)",
        race.name, race.year, race.status, race.elapsed_hours, race.track_distance
    );
    let _ = writeln!(out, "{}", "-".repeat(80));
    for standing in leaderboard(race, None) {
        let outcome = match (standing.status, standing.finished_at_hour) {
            (VehicleStatus::CompletedRace, Some(hour)) => format!("finished @ h{hour}"),
            (VehicleStatus::Broken, _) if standing.remaining_repair_hours > 0 => {
                format!("repairing ({}h left)", standing.remaining_repair_hours)
            }
            (VehicleStatus::Broken, _) => "retired".to_string(),
            (status, _) => format!("{status:?}").to_lowercase(),
        };
        let _ = writeln!(
            out,
            "{:>3}. {:<24} {:<17} {:>9.1} km  {}",
            standing.position,
            standing.team_name,
            standing.class.label(),
            standing.distance_covered,
            outcome,
        );
    }
    out
}
