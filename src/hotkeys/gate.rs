use crate::hotkeys::{KeyEvent, ModeToggle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Disabled,
    Global,
    FocusLocked,
    FocusActive,
}

/// Decides whether a key event may reach the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeGate {
    pub enabled: bool,
    /// Shortcuts work everywhere except editable fields, rather than only
    /// while the pointer is over the player.
    pub global_mode: bool,
}

impl Default for ModeGate {
    fn default() -> Self {
        Self {
            enabled: true,
            global_mode: true,
        }
    }
}

impl ModeGate {
    /// Flips the flag behind `toggle` and returns its new value.
    pub fn toggle(&mut self, toggle: ModeToggle) -> bool {
        let flag = match toggle {
            ModeToggle::Enabled => &mut self.enabled,
            ModeToggle::GlobalMode => &mut self.global_mode,
        };
        *flag = !*flag;
        *flag
    }

    pub fn state(&self, player_focused: bool) -> GateState {
        match (self.enabled, self.global_mode, player_focused) {
            (false, _, _) => GateState::Disabled,
            (true, true, _) => GateState::Global,
            (true, false, false) => GateState::FocusLocked,
            (true, false, true) => GateState::FocusActive,
        }
    }

    pub fn permits(&self, event: &KeyEvent, player_focused: bool) -> bool {
        match self.state(player_focused) {
            GateState::Disabled | GateState::FocusLocked => false,
            GateState::FocusActive => true,
            GateState::Global => !event.target.is_editable(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hotkeys::{keys, EventTarget};

    #[test]
    fn test_global_mode_skips_editable_targets() {
        let gate = ModeGate::default();
        let plain = KeyEvent::new(keys::SPACE);
        assert!(gate.permits(&plain, false));

        for node in ["INPUT", "textarea", "Select"] {
            let event = KeyEvent::new(keys::SPACE).targeting(EventTarget::element(node));
            assert!(!gate.permits(&event, true), "{} should be protected", node);
        }

        let editable = KeyEvent::new(keys::SPACE).targeting(EventTarget {
            node_name: "DIV".to_string(),
            content_editable: true,
        });
        assert!(!gate.permits(&editable, false));
    }

    #[test]
    fn test_focus_mode_requires_pointer() {
        let mut gate = ModeGate::default();
        assert!(!gate.toggle(ModeToggle::GlobalMode));

        let event = KeyEvent::new(keys::SPACE);
        assert_eq!(gate.state(false), GateState::FocusLocked);
        assert!(!gate.permits(&event, false));
        assert_eq!(gate.state(true), GateState::FocusActive);
        assert!(gate.permits(&event, true));
    }

    #[test]
    fn test_disabled_blocks_everything() {
        let mut gate = ModeGate::default();
        assert!(!gate.toggle(ModeToggle::Enabled));
        assert_eq!(gate.state(true), GateState::Disabled);
        assert!(!gate.permits(&KeyEvent::new(keys::SPACE), true));
        assert!(gate.toggle(ModeToggle::Enabled));
    }
}
