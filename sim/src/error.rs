//! Error type for the simulation core.
//!
//! The core does no I/O, so the taxonomy is narrow: rejected commands and bad
//! parameters, out-of-range terrain queries, commands after the match ended,
//! and config parsing.

use crate::components::Side;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// A command or parameter was rejected. Nothing was changed.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A terrain column outside `[0, width)` was queried.
    #[error("column {column} is outside the playfield (width {width})")]
    OutOfBoundsQuery { column: i64, width: usize },

    /// The match already has a winner.
    #[error("match is over, {winner:?} won")]
    MatchOver { winner: Side },

    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

impl SimError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}

pub type SimResult<T> = Result<T, SimError>;
