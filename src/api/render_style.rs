use crate::render::Color;

/// Colors used when building timeline frames.
///
/// Not serialized with the engine config: hosts usually derive it from their
/// theme at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineStyle {
    pub background_color: Color,
    pub row_separator_color: Color,
    pub selected_row_color: Color,
    pub task_fill_color: Color,
    pub task_border_color: Color,
    pub summary_fill_color: Color,
    pub milestone_fill_color: Color,
    pub baseline_fill_color: Color,
    pub period_fill_color: Color,
    pub progress_fill_color: Color,
    pub selection_border_color: Color,
    pub bar_border_width: f64,
    pub bar_corner_radius: f64,
    pub connector_color: Color,
    pub selected_connector_color: Color,
    pub preview_color: Color,
    pub label_color: Color,
    pub row_marker_color: Color,
    pub axis_line_marker_color: Color,
    pub axis_range_marker_color: Color,
    pub axis_text_marker_color: Color,
    pub axis_text_marker_font_size_px: f64,
}

impl Default for TimelineStyle {
    fn default() -> Self {
        Self {
            background_color: Color::rgb(1.0, 1.0, 1.0),
            row_separator_color: Color::rgb(0.9, 0.91, 0.93),
            selected_row_color: Color::rgba(0.2, 0.45, 0.9, 0.08),
            task_fill_color: Color::rgb(0.36, 0.58, 0.93),
            task_border_color: Color::rgb(0.2, 0.4, 0.75),
            summary_fill_color: Color::rgb(0.27, 0.3, 0.36),
            milestone_fill_color: Color::rgb(0.85, 0.45, 0.1),
            baseline_fill_color: Color::rgb(0.72, 0.74, 0.78),
            period_fill_color: Color::rgb(0.3, 0.68, 0.52),
            progress_fill_color: Color::rgb(0.13, 0.29, 0.6),
            selection_border_color: Color::rgb(0.95, 0.6, 0.1),
            bar_border_width: 1.0,
            bar_corner_radius: 2.0,
            connector_color: Color::rgb(0.35, 0.37, 0.42),
            selected_connector_color: Color::rgb(0.95, 0.6, 0.1),
            preview_color: Color::rgba(0.2, 0.4, 0.75, 0.6),
            label_color: Color::rgb(0.15, 0.16, 0.2),
            row_marker_color: Color::rgb(0.85, 0.25, 0.3),
            axis_line_marker_color: Color::rgb(0.85, 0.25, 0.3),
            axis_range_marker_color: Color::rgba(0.95, 0.75, 0.2, 0.18),
            axis_text_marker_color: Color::rgb(0.45, 0.3, 0.1),
            axis_text_marker_font_size_px: 11.0,
        }
    }
}
