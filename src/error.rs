use thiserror::Error;

pub type TimelineResult<T> = Result<T, TimelineError>;

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("unknown row: `{0}`")]
    UnknownRow(String),

    #[error("unknown period {period_index} on row `{row_id}`")]
    UnknownPeriod { row_id: String, period_index: usize },

    #[error("a drag gesture is already in progress")]
    GestureInProgress,

    #[error("no drag gesture is in progress")]
    NoActiveGesture,

    #[error("render backend failure: {0}")]
    Backend(String),
}
