//! Time window selection for ledger plots.
//!
//! A window is either the whole history, a fractional slice of the distinct
//! update times, or a literal pair of relative times.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::types::*;

/// Closed interval `[start, end]` of relative times, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: RelTime,
    pub end: RelTime,
}

impl TimeWindow {
    pub fn new(start: RelTime, end: RelTime) -> Self {
        Self { start, end }
    }

    /// Sub-slice of a time-sorted series that falls inside the window
    pub fn slice<'a>(&self, entries: &'a [LedgerEntry]) -> &'a [LedgerEntry] {
        let lo = entries.partition_point(|e| e.time < self.start);
        let hi = entries.partition_point(|e| e.time <= self.end);
        if lo >= hi {
            &[]
        } else {
            &entries[lo..hi]
        }
    }

    pub fn span(&self) -> f64 {
        self.end - self.start
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Time window errors
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum WindowError {
    #[error("fractional range must satisfy 0 <= lo <= hi <= 1, got [{lo}, {hi}]")]
    InvalidFraction { lo: f64, hi: f64 },
    #[error("time range start {start} is after its end {end}")]
    InvalidLiteral { start: f64, end: f64 },
    #[error("time range bounds must be finite")]
    NotFinite,
}

/// How the user asked for the plotted window
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowSpec {
    /// First to last ledger update
    Full,
    /// Fractions of the sorted distinct update times
    Fraction(f64, f64),
    /// Literal relative times
    Literal(RelTime, RelTime),
}

impl WindowSpec {
    /// Resolve against the update times of a ledger table
    pub fn resolve(&self, ledgers: &LedgerTable) -> Result<TimeWindow, WindowError> {
        match *self {
            WindowSpec::Literal(start, end) => {
                if !start.is_finite() || !end.is_finite() {
                    return Err(WindowError::NotFinite);
                }
                if start > end {
                    return Err(WindowError::InvalidLiteral { start, end });
                }
                Ok(TimeWindow::new(start, end))
            }
            WindowSpec::Fraction(lo, hi) => {
                if !(0.0..=1.0).contains(&lo) || !(0.0..=1.0).contains(&hi) || lo > hi {
                    return Err(WindowError::InvalidFraction { lo, hi });
                }
                let times = ledgers.times();
                if times.is_empty() {
                    return Ok(TimeWindow::new(0.0, 0.0));
                }
                let n = times.len();
                let last = n - 1;
                let ti = ((lo * n as f64).floor() as usize).min(last);
                let tf = ((hi * n as f64).ceil() as usize).saturating_sub(1).clamp(ti, last);
                Ok(TimeWindow::new(times[ti], times[tf]))
            }
            WindowSpec::Full => Ok(find_time_range(ledgers)),
        }
    }
}

/// Window spanning every ledger update
pub fn find_time_range(ledgers: &LedgerTable) -> TimeWindow {
    let times = ledgers.times();
    match (times.first(), times.last()) {
        (Some(&start), Some(&end)) => TimeWindow::new(start, end),
        _ => TimeWindow::new(0.0, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(times: &[f64]) -> LedgerTable {
        LedgerTable::from_rows(times.iter().map(|&time| {
            (
                "a".to_string(),
                "b".to_string(),
                LedgerEntry {
                    time,
                    value: 1.0,
                    sent: 0.0,
                    recv: 0.0,
                },
            )
        }))
    }

    #[test]
    fn test_window_slice() {
        let ledgers = table(&[0.0, 1.0, 2.0, 3.0, 4.0]);
        let series = ledgers.series("a", "b").unwrap();

        let slice = TimeWindow::new(1.0, 3.0).slice(series);
        assert_eq!(slice.len(), 3);
        assert_eq!(slice[0].time, 1.0);
        assert_eq!(slice[2].time, 3.0);
        assert!(TimeWindow::new(10.0, 20.0).slice(series).is_empty());

        // both ends are inclusive
        assert_eq!(TimeWindow::new(0.5, 2.0).slice(series).len(), 2);
        assert_eq!(TimeWindow::new(4.0, 4.0).slice(series).len(), 1);
        assert!(TimeWindow::new(1.1, 1.9).slice(series).is_empty());
    }

    #[test]
    fn test_resolve_full() {
        let ledgers = table(&[0.0, 5.0, 10.0]);
        assert_eq!(WindowSpec::Full.resolve(&ledgers), Ok(TimeWindow::new(0.0, 10.0)));
        assert_eq!(
            WindowSpec::Full.resolve(&LedgerTable::default()),
            Ok(TimeWindow::new(0.0, 0.0))
        );
    }

    #[test]
    fn test_resolve_fraction() {
        let ledgers = table(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        // floor(0.2 * 10) = 2, ceil(0.5 * 10) - 1 = 4
        assert_eq!(
            WindowSpec::Fraction(0.2, 0.5).resolve(&ledgers),
            Ok(TimeWindow::new(2.0, 4.0))
        );
        assert_eq!(
            WindowSpec::Fraction(0.0, 1.0).resolve(&ledgers),
            Ok(TimeWindow::new(0.0, 9.0))
        );
        assert_eq!(
            WindowSpec::Fraction(1.0, 1.0).resolve(&ledgers),
            Ok(TimeWindow::new(9.0, 9.0))
        );
    }

    #[test]
    fn test_resolve_invalid() {
        let ledgers = table(&[0.0, 1.0]);
        assert!(matches!(
            WindowSpec::Fraction(0.5, 0.2).resolve(&ledgers),
            Err(WindowError::InvalidFraction { .. })
        ));
        assert!(matches!(
            WindowSpec::Literal(5.0, 1.0).resolve(&ledgers),
            Err(WindowError::InvalidLiteral { .. })
        ));
        assert_eq!(
            WindowSpec::Literal(f64::NAN, 1.0).resolve(&ledgers),
            Err(WindowError::NotFinite)
        );
    }
}
