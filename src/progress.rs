// Progress units and status-line formatting
//
// Pure formatting: no state beyond the unit table and its byte divisors.
// Callbacks receive the raw numeric tuple; only the stdout line is formatted.

use serde::{Deserialize, Serialize};

/// Callback invoked synchronously on every progress update while a transfer
/// is running: (total bytes, bytes-done in the requested unit, fraction done,
/// rate in bytes/sec, ETA in seconds).
pub type ProgressCallback = dyn Fn(u64, f64, f64, f64, u64) + Send + Sync;

/// Display unit for downloaded byte counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProgressUnit {
    #[default]
    Bytes,
    KB,
    MB,
    GB,
}

impl ProgressUnit {
    /// Bytes per unit
    pub fn divisor(&self) -> u64 {
        match self {
            Self::Bytes => 1,
            Self::KB => 1024,
            Self::MB => 1024 * 1024,
            Self::GB => 1024 * 1024 * 1024,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Bytes => "Bytes",
            Self::KB => "KB",
            Self::MB => "MB",
            Self::GB => "GB",
        }
    }

    /// Parse a unit name; unrecognized values fall back to Bytes
    pub fn parse(name: &str) -> Self {
        match name {
            "KB" => Self::KB,
            "MB" => Self::MB,
            "GB" => Self::GB,
            _ => Self::Bytes,
        }
    }
}

/// Convert a raw byte count into the requested unit, rounded to 2 decimals
pub fn size_done(bytes_done: u64, unit: ProgressUnit) -> f64 {
    let value = bytes_done as f64 / unit.divisor() as f64;
    (value * 100.0).round() / 100.0
}

/// Fixed-width human status line for one progress update.
///
/// `done` is already converted to `unit`; `rate` is in bytes/sec and is shown
/// as KB/s; `fraction` is bytes-done over total.
pub fn status_line(unit: ProgressUnit, done: f64, fraction: f64, rate: f64, eta: u64) -> String {
    let done_text = match unit {
        ProgressUnit::Bytes => format!("{:.0}", done),
        _ => format!("{:.2}", done),
    };
    format!(
        "  {} {} [{:.2}%] received. Rate: [{:4.0} KB/s].  ETA: [{} secs]",
        done_text,
        unit.label(),
        fraction * 100.0,
        rate / 1024.0,
        eta
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divisors() {
        assert_eq!(ProgressUnit::Bytes.divisor(), 1);
        assert_eq!(ProgressUnit::KB.divisor(), 1024);
        assert_eq!(ProgressUnit::MB.divisor(), 1_048_576);
        assert_eq!(ProgressUnit::GB.divisor(), 1_073_741_824);
    }

    #[test]
    fn test_parse_falls_back_to_bytes() {
        assert_eq!(ProgressUnit::parse("KB"), ProgressUnit::KB);
        assert_eq!(ProgressUnit::parse("GB"), ProgressUnit::GB);
        assert_eq!(ProgressUnit::parse("TB"), ProgressUnit::Bytes);
        assert_eq!(ProgressUnit::parse("kilobytes"), ProgressUnit::Bytes);
        assert_eq!(ProgressUnit::parse(""), ProgressUnit::Bytes);
    }

    #[test]
    fn test_size_done_conversion() {
        assert_eq!(size_done(1024, ProgressUnit::Bytes), 1024.0);
        assert_eq!(size_done(1024, ProgressUnit::KB), 1.0);
        assert_eq!(size_done(1536, ProgressUnit::KB), 1.5);
        assert_eq!(size_done(5 * 1024 * 1024, ProgressUnit::MB), 5.0);
        // rounds to 2 decimals
        assert_eq!(size_done(1000, ProgressUnit::KB), 0.98);
    }

    #[test]
    fn test_status_line_shape() {
        let line = status_line(ProgressUnit::MB, 12.5, 0.5, 512.0 * 1024.0, 30);
        assert!(line.starts_with("  12.50 MB"));
        assert!(line.contains("[50.00%] received"));
        assert!(line.contains("[ 512 KB/s]"));
        assert!(line.contains("ETA: [30 secs]"));
    }

    #[test]
    fn test_status_line_bytes_has_no_decimals() {
        let line = status_line(ProgressUnit::Bytes, 2048.0, 0.25, 0.0, 0);
        assert!(line.starts_with("  2048 Bytes"));
    }
}
