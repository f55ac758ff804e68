use thiserror::Error;

use crate::views::ViewId;

pub type DashResult<T> = Result<T, DashError>;

#[derive(Debug, Error)]
pub enum DashError {
    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("no view registered with id {0}")]
    UnknownView(ViewId),

    #[error("view with id {0} is already registered")]
    DuplicateView(ViewId),

    #[error("dataset has no metric series named `{0}`")]
    UnknownMetric(String),

    #[error("event cascade exceeded {limit} dispatches in one drain")]
    DispatchOverflow { limit: usize },

    #[error("csv input: {0}")]
    Csv(#[from] csv::Error),
}
