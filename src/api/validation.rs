use crate::error::{TimelineError, TimelineResult};

use super::TimelineStyle;

pub(super) fn validate_timeline_style(style: TimelineStyle) -> TimelineResult<TimelineStyle> {
    style.background_color.validate()?;
    style.row_separator_color.validate()?;
    style.selected_row_color.validate()?;
    style.task_fill_color.validate()?;
    style.task_border_color.validate()?;
    style.summary_fill_color.validate()?;
    style.milestone_fill_color.validate()?;
    style.baseline_fill_color.validate()?;
    style.period_fill_color.validate()?;
    style.progress_fill_color.validate()?;
    style.selection_border_color.validate()?;
    style.connector_color.validate()?;
    style.selected_connector_color.validate()?;
    style.preview_color.validate()?;
    style.label_color.validate()?;
    style.row_marker_color.validate()?;
    style.axis_line_marker_color.validate()?;
    style.axis_range_marker_color.validate()?;
    style.axis_text_marker_color.validate()?;
    if !style.axis_text_marker_font_size_px.is_finite()
        || style.axis_text_marker_font_size_px <= 0.0
    {
        return Err(TimelineError::InvalidData(
            "axis text marker font size must be finite and > 0".to_owned(),
        ));
    }
    if !style.bar_border_width.is_finite() || style.bar_border_width < 0.0 {
        return Err(TimelineError::InvalidData(
            "bar border width must be finite and >= 0".to_owned(),
        ));
    }
    if !style.bar_corner_radius.is_finite() || style.bar_corner_radius < 0.0 {
        return Err(TimelineError::InvalidData(
            "bar corner radius must be finite and >= 0".to_owned(),
        ));
    }
    Ok(style)
}

/// Rejects non-finite pointer coordinates before they reach a gesture.
pub(super) fn validate_pointer(x: f64, y: f64) -> TimelineResult<()> {
    if !x.is_finite() || !y.is_finite() {
        return Err(TimelineError::InvalidData(
            "pointer coordinates must be finite".to_owned(),
        ));
    }
    Ok(())
}
