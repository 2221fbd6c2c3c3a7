use chrono::{DateTime, TimeZone, Utc};

use crate::core::Rect;
use crate::error::{TimelineError, TimelineResult};

#[must_use]
pub fn datetime_to_millis(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64
}

pub fn millis_to_datetime(millis: f64) -> TimelineResult<DateTime<Utc>> {
    if !millis.is_finite() {
        return Err(TimelineError::InvalidData(
            "timestamp must be finite".to_owned(),
        ));
    }
    Utc.timestamp_millis_opt(millis.round() as i64)
        .single()
        .ok_or_else(|| TimelineError::InvalidData(format!("timestamp {millis} is out of range")))
}

/// Half-pixel shift that keeps odd-width strokes crisp.
#[must_use]
pub fn stroke_shift(thickness: f64) -> f64 {
    if (thickness.round() as i64) % 2 != 0 {
        0.5
    } else {
        0.0
    }
}

/// Rounds every edge of `rect` to the pixel grid and applies the stroke shift.
#[must_use]
pub fn snap_rect(rect: Rect, thickness: f64) -> Rect {
    let shift = stroke_shift(thickness);
    let left = rect.left.round() + shift;
    let top = rect.top.round() + shift;
    let right = rect.right().round() + shift;
    let bottom = rect.bottom().round() + shift;
    Rect::from_edges(left, top, right, bottom)
}

#[must_use]
pub fn snap_coordinate(value: f64, thickness: f64) -> f64 {
    value.round() + stroke_shift(thickness)
}

#[cfg(test)]
mod tests {
    use super::{datetime_to_millis, millis_to_datetime, snap_rect};
    use crate::core::Rect;
    use chrono::{TimeZone, Utc};

    #[test]
    fn datetime_millis_conversion_is_lossless_for_whole_millis() {
        let time = Utc
            .with_ymd_and_hms(2024, 3, 1, 8, 30, 0)
            .single()
            .expect("valid date");
        let millis = datetime_to_millis(time);
        assert_eq!(millis_to_datetime(millis).expect("back"), time);
    }

    #[test]
    fn odd_stroke_snaps_to_half_pixels() {
        let snapped = snap_rect(Rect::new(10.2, 19.7, 30.4, 10.0), 1.0);
        assert_eq!(snapped.left, 10.5);
        assert_eq!(snapped.top, 20.5);
        assert_eq!(snapped.right(), 41.5);

        let even = snap_rect(Rect::new(10.2, 19.7, 30.4, 10.0), 2.0);
        assert_eq!(even.left, 10.0);
    }
}
