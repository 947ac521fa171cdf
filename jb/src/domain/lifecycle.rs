//! Session lifecycle
//!
//! `Confirmed` and `Quit` are terminal; the session is deleted on reaching
//! either. `Cancelled` is momentary and settles back to `Building`.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    #[default]
    Building,
    Confirmed,
    Cancelled,
    Quit,
}

/// A command that can move a session between lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Confirm, carrying whether the full validation passed
    Confirm { valid: bool },
    Cancel,
    Quit,
}

impl Lifecycle {
    /// Apply an event; terminal states absorb everything
    pub fn next(self, event: LifecycleEvent) -> Lifecycle {
        match (self, event) {
            (Lifecycle::Confirmed | Lifecycle::Quit, _) => self,
            (_, LifecycleEvent::Confirm { valid: true }) => Lifecycle::Confirmed,
            (_, LifecycleEvent::Confirm { valid: false }) => Lifecycle::Building,
            (_, LifecycleEvent::Cancel) => Lifecycle::Cancelled,
            (_, LifecycleEvent::Quit) => Lifecycle::Quit,
        }
    }

    /// The state the session rests in after a transition
    pub fn settle(self) -> Lifecycle {
        match self {
            Lifecycle::Cancelled => Lifecycle::Building,
            other => other,
        }
    }

    /// Whether the session must be deleted
    pub fn is_terminal(self) -> bool {
        matches!(self, Lifecycle::Confirmed | Lifecycle::Quit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_requires_valid_journey() {
        let state = Lifecycle::Building;
        assert_eq!(state.next(LifecycleEvent::Confirm { valid: false }), Lifecycle::Building);
        assert_eq!(state.next(LifecycleEvent::Confirm { valid: true }), Lifecycle::Confirmed);
    }

    #[test]
    fn test_cancel_settles_to_building() {
        let state = Lifecycle::Building.next(LifecycleEvent::Cancel);
        assert_eq!(state, Lifecycle::Cancelled);
        assert!(!state.is_terminal());
        assert_eq!(state.settle(), Lifecycle::Building);
    }

    #[test]
    fn test_quit_is_terminal_regardless_of_validity() {
        let state = Lifecycle::Building.next(LifecycleEvent::Quit);
        assert!(state.is_terminal());
    }

    #[test]
    fn test_terminal_states_absorb_events() {
        for terminal in [Lifecycle::Confirmed, Lifecycle::Quit] {
            for event in [
                LifecycleEvent::Confirm { valid: true },
                LifecycleEvent::Cancel,
                LifecycleEvent::Quit,
            ] {
                assert_eq!(terminal.next(event), terminal);
            }
        }
    }
}
