//! State machine trait for status enums.
//!
//! Lifecycle statuses (orders, tables) implement [`StateMachine`] and get a
//! checked [`StateMachine::transition_to`] for free.

use std::fmt;

/// Rejected transition, carrying both ends so callers can name them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition<S> {
    pub from: S,
    pub to: S,
}

impl<S: fmt::Display> fmt::Display for InvalidTransition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cannot transition from {} to {}", self.from, self.to)
    }
}

impl<S: fmt::Debug + fmt::Display> std::error::Error for InvalidTransition<S> {}

/// Trait for status enums that represent state machines.
pub trait StateMachine: Sized + Copy + PartialEq + fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation.
    fn transition_to(&self, target: Self) -> Result<Self, InvalidTransition<Self>> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(InvalidTransition {
                from: *self,
                to: target,
            })
        }
    }

    /// Terminal states have no outgoing transitions.
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Ticket {
        Open,
        Fired,
        Served,
        Voided,
    }

    impl fmt::Display for Ticket {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    impl StateMachine for Ticket {
        fn can_transition_to(&self, target: &Self) -> bool {
            self.valid_transitions().contains(target)
        }

        fn valid_transitions(&self) -> Vec<Self> {
            use Ticket::*;
            match self {
                Open => vec![Fired, Voided],
                Fired => vec![Served],
                Served | Voided => vec![],
            }
        }
    }

    #[test]
    fn valid_transition_returns_target() {
        assert_eq!(Ticket::Open.transition_to(Ticket::Fired), Ok(Ticket::Fired));
    }

    #[test]
    fn invalid_transition_names_both_ends() {
        let err = Ticket::Fired.transition_to(Ticket::Voided).unwrap_err();
        assert_eq!(err.from, Ticket::Fired);
        assert_eq!(err.to, Ticket::Voided);
        assert_eq!(err.to_string(), "Cannot transition from Fired to Voided");
    }

    #[test]
    fn terminal_states_have_no_exits() {
        assert!(Ticket::Served.is_terminal());
        assert!(Ticket::Voided.is_terminal());
        assert!(!Ticket::Open.is_terminal());
    }
}
