use std::fmt;

/// Failure taxonomy for lobby operations. Every operation returns one of
/// these as a typed failure; none of them is fatal to the room store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LobbyError {
    /// Malformed input; surfaced to the caller, never retried.
    InvalidParameter(String),
    /// Room or player absent.
    NotFound(String),
    RoomFull,
    GameInProgress,
    AlreadyStarted,
    GameNotStarted,
    /// Live-room cap reached even after an eager sweep.
    CapacityExceeded,
    /// Code allocator could not find a free code within its attempt budget.
    ExhaustedAttempts,
}

impl LobbyError {
    /// Whether the caller may reasonably retry after a delay.
    pub fn retryable(&self) -> bool {
        matches!(self, Self::CapacityExceeded | Self::ExhaustedAttempts)
    }
}

impl fmt::Display for LobbyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter(m) | Self::NotFound(m) => write!(f, "{m}"),
            Self::RoomFull => write!(f, "room is full"),
            Self::GameInProgress => write!(f, "game is in progress"),
            Self::AlreadyStarted => write!(f, "game has already started"),
            Self::GameNotStarted => write!(f, "game has not started yet"),
            Self::CapacityExceeded => {
                write!(f, "maximum number of rooms reached, try again later")
            },
            Self::ExhaustedAttempts => {
                write!(f, "unable to generate a unique room code, try again later")
            },
        }
    }
}

impl std::error::Error for LobbyError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(LobbyError::CapacityExceeded.retryable());
        assert!(LobbyError::ExhaustedAttempts.retryable());
        assert!(!LobbyError::RoomFull.retryable());
        assert!(!LobbyError::NotFound("room ABC123 not found".into()).retryable());
        assert!(!LobbyError::InvalidParameter("bad goal".into()).retryable());
    }

    #[test]
    fn display_carries_message() {
        let err = LobbyError::NotFound("room ABC123 not found".into());
        assert_eq!(err.to_string(), "room ABC123 not found");
        assert_eq!(LobbyError::RoomFull.to_string(), "room is full");
    }
}
