//! Metric descriptors - the static table of published summary metrics.

/// Path of the hashrate sample array in the summary document.
///
/// The array holds the 10 second, 1 minute and 15 minute averages, in that
/// order. [`Locator::Indexed`] always indexes into this array.
pub const HASHRATE_PATH: &[&str] = &["hashrate", "total"];

/// How a metric's value is located in the summary document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    /// A sequence of object keys walked from the document root.
    Path(&'static [&'static str]),
    /// An index into the array at [`HASHRATE_PATH`].
    Indexed(usize),
}

/// Static definition of one published metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDescriptor {
    /// Key identifying the metric within an instance.
    pub key: &'static str,
    /// Display name, prefixed with the instance name when shown.
    pub name: &'static str,
    /// Icon identifier (Material Design Icons naming).
    pub icon: &'static str,
    /// Unit of measurement, if the metric has one.
    pub unit: Option<&'static str>,
    /// Where the value lives in the summary document.
    pub locator: Locator,
}

const GAUGE: &str = "mdi:gauge";
const COUNTER: &str = "mdi:counter";

/// Every metric published for a summary controller, in dispatch order.
pub static SUMMARY_METRICS: &[MetricDescriptor] = &[
    MetricDescriptor {
        key: "hashrate10s",
        name: "Hashrate 10s",
        icon: GAUGE,
        unit: Some("H/s"),
        locator: Locator::Indexed(0),
    },
    MetricDescriptor {
        key: "hashrate1m",
        name: "Hashrate 1m",
        icon: GAUGE,
        unit: Some("H/s"),
        locator: Locator::Indexed(1),
    },
    MetricDescriptor {
        key: "hashrate15m",
        name: "Hashrate 15m",
        icon: GAUGE,
        unit: Some("H/s"),
        locator: Locator::Indexed(2),
    },
    MetricDescriptor {
        key: "difficulty",
        name: "Difficulty",
        icon: GAUGE,
        unit: Some("dif"),
        locator: Locator::Path(&["results", "diff_current"]),
    },
    MetricDescriptor {
        key: "shares_good",
        name: "Shares good",
        icon: COUNTER,
        unit: Some("cnt"),
        locator: Locator::Path(&["results", "shares_good"]),
    },
    MetricDescriptor {
        key: "shares_total",
        name: "Shares total",
        icon: COUNTER,
        unit: Some("cnt"),
        locator: Locator::Path(&["results", "shares_total"]),
    },
    MetricDescriptor {
        key: "connection",
        name: "Pool",
        icon: "mdi:cable",
        unit: None,
        locator: Locator::Path(&["connection", "pool"]),
    },
    MetricDescriptor {
        key: "algo",
        name: "Algo",
        icon: "mdi:application-braces-outline",
        unit: None,
        locator: Locator::Path(&["algo"]),
    },
];

/// Look up a summary metric by key.
pub fn summary_metric(key: &str) -> Option<&'static MetricDescriptor> {
    SUMMARY_METRICS.iter().find(|m| m.key == key)
}
