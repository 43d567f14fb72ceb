//! Environment overrides layered over a TOML file.
//!
//! Kept to a single test so no other test in this binary observes the
//! process environment it sets.

use std::io::Write;
use std::time::Duration;

use roundwatch::{ControlPlane, OrchestrationConfig};

#[test]
fn test_environment_overrides_file_values() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
workers = ["table-1"]

[coordinator]
alignment_tolerance = 0.25
stale_threshold_ms = 4000
"#
    )
    .unwrap();

    std::env::set_var("ROUNDWATCH__WORKERS", "table-1,table-2,table-3");
    std::env::set_var("ROUNDWATCH__COORDINATOR__ALIGNMENT_TOLERANCE", "0.75");
    std::env::set_var("ROUNDWATCH__CACHE__LOOP_SLICE_MS", "5");
    let loaded = OrchestrationConfig::load(Some(file.path()));
    std::env::remove_var("ROUNDWATCH__WORKERS");
    std::env::remove_var("ROUNDWATCH__COORDINATOR__ALIGNMENT_TOLERANCE");
    std::env::remove_var("ROUNDWATCH__CACHE__LOOP_SLICE_MS");

    let config = loaded.unwrap();
    assert_eq!(config.workers, vec!["table-1", "table-2", "table-3"]);
    assert_eq!(config.coordinator.alignment_tolerance, 0.75);
    assert_eq!(config.coordinator.stale_threshold(), Duration::from_secs(4));
    assert_eq!(config.cache.loop_slice(), Duration::from_millis(5));

    let (plane, _channel) = ControlPlane::from_config(&config);
    let status = plane.status_report();
    assert_eq!(status["coordinator"]["total_workers"], 3);
    assert_eq!(status["health"]["total_workers"], 0);
}
