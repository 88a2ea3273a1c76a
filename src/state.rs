//! Handler lifecycle states
//!
//! Every gesture handler moves through the same small lifecycle, and hosts
//! see the numeric codes below in event payloads, so the codes are wire
//! format and must not change.

/// Lifecycle state of a gesture handler.
///
/// The happy path is `Undetermined -> Began -> Active -> End`; recognition
/// can bail out to `Failed` (before activation) or `Cancelled` (after).
/// Terminal states reset back to `Undetermined` for the next touch sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Undetermined,
    Failed,
    Began,
    Cancelled,
    Active,
    End,
}

impl State {
    /// Numeric wire code, as delivered to hosts in `state` / `oldState`
    pub fn code(self) -> i64 {
        match self {
            State::Undetermined => 0,
            State::Failed => 1,
            State::Began => 2,
            State::Cancelled => 3,
            State::Active => 4,
            State::End => 5,
        }
    }

    /// Lowercase name for logs
    pub fn name(self) -> &'static str {
        match self {
            State::Undetermined => "undetermined",
            State::Failed => "failed",
            State::Began => "began",
            State::Cancelled => "cancelled",
            State::Active => "active",
            State::End => "end",
        }
    }

    /// Failed, Cancelled and End all terminate a recognition cycle
    pub fn is_terminal(self) -> bool {
        matches!(self, State::Failed | State::Cancelled | State::End)
    }

    /// Whether moving from `self` to `next` is a legal lifecycle step
    pub fn can_transition_to(self, next: State) -> bool {
        match self {
            State::Undetermined => matches!(next, State::Began | State::Failed),
            State::Began => matches!(next, State::Active | State::Failed | State::Cancelled),
            State::Active => matches!(next, State::End | State::Cancelled | State::Failed),
            // Terminal states only reset
            State::Failed | State::Cancelled | State::End => next == State::Undetermined,
        }
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_codes_are_stable() {
        assert_eq!(State::Undetermined.code(), 0);
        assert_eq!(State::Failed.code(), 1);
        assert_eq!(State::Began.code(), 2);
        assert_eq!(State::Cancelled.code(), 3);
        assert_eq!(State::Active.code(), 4);
        assert_eq!(State::End.code(), 5);
    }

    #[test]
    fn test_happy_path_is_legal() {
        assert!(State::Undetermined.can_transition_to(State::Began));
        assert!(State::Began.can_transition_to(State::Active));
        assert!(State::Active.can_transition_to(State::End));
        assert!(State::End.can_transition_to(State::Undetermined));
    }

    #[test]
    fn test_illegal_steps_rejected() {
        assert!(!State::Undetermined.can_transition_to(State::Active));
        assert!(!State::Undetermined.can_transition_to(State::End));
        assert!(!State::Active.can_transition_to(State::Began));
        assert!(!State::End.can_transition_to(State::Active));
        assert!(!State::Failed.can_transition_to(State::Began));
    }

    #[test]
    fn test_terminal_classification() {
        assert!(State::Failed.is_terminal());
        assert!(State::Cancelled.is_terminal());
        assert!(State::End.is_terminal());
        assert!(!State::Undetermined.is_terminal());
        assert!(!State::Began.is_terminal());
        assert!(!State::Active.is_terminal());
    }
}
