use chrono::{DateTime, Duration, Utc};

use super::errors::MeasurementError;
use super::measurement::FieldMeasurement;

// ============================================================================
// Drought Detection
// ============================================================================
//
// Pure domain algorithm over an ordered-by-time series of readings. Only the
// trailing contiguous below-threshold run counts: any reading at or above
// the threshold resets the run, even if it precedes later dry readings.
//
// ============================================================================

/// A detected contiguous dry spell. Derived per detection call, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct DroughtCondition {
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
}

impl DroughtCondition {
    pub fn duration_hours(&self) -> i64 {
        self.duration.num_hours()
    }
}

/// Evaluate a time-ordered measurement series against threshold/duration
/// criteria.
///
/// Returns `Ok(None)` when no qualifying drought exists; rejects physically
/// meaningless arguments before looking at the data.
pub fn detect_drought(
    measurements: &[FieldMeasurement],
    threshold_pct: f64,
    min_duration_hours: i64,
) -> Result<Option<DroughtCondition>, MeasurementError> {
    if !(0.0..=100.0).contains(&threshold_pct) {
        return Err(MeasurementError::InvalidThreshold(threshold_pct));
    }
    if min_duration_hours <= 0 {
        return Err(MeasurementError::InvalidMinDuration(min_duration_hours));
    }

    // A single reading cannot establish a spell.
    if measurements.len() < 2 {
        return Ok(None);
    }

    let current = match measurements.iter().max_by_key(|m| m.collected_at) {
        Some(m) => m,
        None => return Ok(None),
    };

    // No active drought if the latest reading is already wet enough.
    if current.soil_moisture_pct >= threshold_pct {
        return Ok(None);
    }

    // Track the start of the most recent unbroken below-threshold run; any
    // at-or-above-threshold reading breaks continuity.
    let mut run_started_at: Option<DateTime<Utc>> = None;
    for m in measurements {
        if m.soil_moisture_pct < threshold_pct {
            run_started_at.get_or_insert(m.collected_at);
        } else {
            run_started_at = None;
        }
    }

    let started_at = match run_started_at {
        Some(t) => t,
        None => return Ok(None),
    };

    let duration = current.collected_at - started_at;
    if duration >= Duration::hours(min_duration_hours) {
        Ok(Some(DroughtCondition {
            started_at,
            duration,
        }))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn series(readings: &[(&str, f64)]) -> Vec<FieldMeasurement> {
        let field_id = Uuid::new_v4();
        readings
            .iter()
            .map(|(time, moisture)| {
                let collected_at = Utc
                    .with_ymd_and_hms(
                        2024,
                        6,
                        1,
                        time[..2].parse().unwrap(),
                        time[3..].parse().unwrap(),
                        0,
                    )
                    .unwrap();
                FieldMeasurement::new(
                    field_id,
                    *moisture,
                    22.0,
                    0.0,
                    collected_at,
                    "agronomist@example.com",
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let data = series(&[("08:00", 18.0), ("10:00", 15.0)]);
        assert!(matches!(
            detect_drought(&data, -1.0, 1),
            Err(MeasurementError::InvalidThreshold(_))
        ));
        assert!(matches!(
            detect_drought(&data, 100.5, 1),
            Err(MeasurementError::InvalidThreshold(_))
        ));
    }

    #[test]
    fn test_nonpositive_min_duration_rejected() {
        let data = series(&[("08:00", 18.0), ("10:00", 15.0)]);
        assert!(matches!(
            detect_drought(&data, 30.0, 0),
            Err(MeasurementError::InvalidMinDuration(0))
        ));
    }

    #[test]
    fn test_fewer_than_two_readings_is_none() {
        assert_eq!(detect_drought(&[], 30.0, 1).unwrap(), None);
        let one = series(&[("08:00", 5.0)]);
        assert_eq!(detect_drought(&one, 30.0, 1).unwrap(), None);
    }

    #[test]
    fn test_wet_current_reading_is_none() {
        let data = series(&[("06:00", 10.0), ("08:00", 12.0), ("10:00", 45.0)]);
        assert_eq!(detect_drought(&data, 30.0, 1).unwrap(), None);
    }

    #[test]
    fn test_two_dry_readings_detect_spell_from_first() {
        // t0=08:00 at 18%, t1=10:00 at 15%, threshold 30%, min 1h.
        let data = series(&[("08:00", 18.0), ("10:00", 15.0)]);
        let condition = detect_drought(&data, 30.0, 1).unwrap().unwrap();
        assert_eq!(
            condition.started_at,
            Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
        );
        assert_eq!(condition.duration, Duration::hours(2));
    }

    #[test]
    fn test_intervening_wet_reading_breaks_run() {
        // Same series with a 35% reading at 09:00: run broken, no drought.
        let data = series(&[("08:00", 18.0), ("09:00", 35.0), ("10:00", 15.0)]);
        assert_eq!(detect_drought(&data, 30.0, 1).unwrap(), None);
    }

    #[test]
    fn test_only_trailing_run_counts() {
        // Long early dry run, one wet reading, then a short trailing run.
        // The early run must not contribute to the duration.
        let data = series(&[
            ("01:00", 10.0),
            ("02:00", 11.0),
            ("08:00", 40.0),
            ("09:00", 14.0),
            ("10:00", 13.0),
        ]);
        let condition = detect_drought(&data, 30.0, 1).unwrap().unwrap();
        assert_eq!(
            condition.started_at,
            Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
        );
        assert_eq!(condition.duration, Duration::hours(1));
    }

    #[test]
    fn test_spell_shorter_than_min_duration_is_none() {
        let data = series(&[("09:30", 18.0), ("10:00", 15.0)]);
        assert_eq!(detect_drought(&data, 30.0, 1).unwrap(), None);
    }

    #[test]
    fn test_reading_exactly_at_threshold_breaks_run() {
        let data = series(&[("06:00", 10.0), ("08:00", 30.0), ("10:00", 15.0)]);
        // 08:00 is at threshold, so the run restarts at 10:00 and is too
        // short on its own.
        assert_eq!(detect_drought(&data, 30.0, 1).unwrap(), None);
    }
}
