use std::time::Duration;

use xmrwatch_sdk::MetricState;

/// Hashrate units, smallest first.
const HASHRATE_UNITS: &[&str] = &["H/s", "kH/s", "MH/s", "GH/s"];

/// Format a hashrate like "4.82 kH/s".
pub fn format_hashrate(hashes_per_sec: f64) -> String {
    let mut value = hashes_per_sec;
    let mut unit = 0;
    while value >= 1_000.0 && unit + 1 < HASHRATE_UNITS.len() {
        value /= 1_000.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{:.1} {}", value, HASHRATE_UNITS[0])
    } else {
        format!("{:.2} {}", value, HASHRATE_UNITS[unit])
    }
}

/// Format the time since something happened, e.g. "4s", "2m 05s", "1h 03m".
pub fn format_age(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3_600 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{}h {:02}m", secs / 3_600, (secs % 3_600) / 60)
    }
}

/// Render a metric state for the table, scaling hashrates.
pub fn format_state(state: &MetricState, unit: Option<&str>) -> String {
    match (state.as_f64(), unit) {
        (Some(rate), Some("H/s")) => format_hashrate(rate),
        _ => state.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hashrate_plain() {
        assert_eq!(format_hashrate(0.0), "0.0 H/s");
        assert_eq!(format_hashrate(812.34), "812.3 H/s");
    }

    #[test]
    fn test_hashrate_scaled() {
        assert_eq!(format_hashrate(4821.3), "4.82 kH/s");
        assert_eq!(format_hashrate(12_500_000.0), "12.50 MH/s");
    }

    #[test]
    fn test_hashrate_caps_at_largest_unit() {
        assert_eq!(format_hashrate(5.0e12), "5000.00 GH/s");
    }

    #[test]
    fn test_age() {
        assert_eq!(format_age(Duration::from_millis(4_900)), "4s");
        assert_eq!(format_age(Duration::from_secs(125)), "2m 05s");
        assert_eq!(format_age(Duration::from_secs(3_780)), "1h 03m");
    }

    #[test]
    fn test_state() {
        let rate = MetricState::Value(json!(4821.3));
        assert_eq!(format_state(&rate, Some("H/s")), "4.82 kH/s");
        assert_eq!(format_state(&MetricState::Value(json!(1234)), Some("dif")), "1234");
        assert_eq!(format_state(&MetricState::Value(json!("rx/0")), None), "rx/0");
        assert_eq!(format_state(&MetricState::Unknown, Some("H/s")), "unknown");
    }
}
