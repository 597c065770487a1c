use crate::types::{DisplayId, GameState};

/// Reasons a room command was not applied.
///
/// None of these are reported back to the sender; the socket layer logs them
/// and carries on.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("only the host can {0}")]
    NotHost(&'static str),

    #[error("player is not in this room")]
    UnknownPlayer,

    #[error("answer is empty")]
    EmptyAnswer,

    #[error("answer exceeds {0} characters")]
    AnswerTooLong(usize),

    #[error("player already answered this round")]
    AlreadyAnswered,

    #[error("no answer with display id {0} this round")]
    InvalidDisplayId(DisplayId),

    #[error("cannot {action} while in {state:?}")]
    WrongState {
        action: &'static str,
        state: GameState,
    },
}

/// Invalid server configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}
