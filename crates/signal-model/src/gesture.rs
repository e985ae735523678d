//! Gesture events emitted by the blink state machine, and the pointer
//! device actions they map to.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of one blink analysis call.
///
/// Exactly one value is produced per call; [`GestureEvent::None`] means no
/// decision was made this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureEvent {
    /// Nothing happened.
    #[default]
    None,
    /// A both-eyes blink judged reflexive rather than intentional.
    NaturalBlink,
    /// Regular both-eyes blink.
    BothBlink,
    /// Both eyes held closed past the long-blink window.
    LongBlink,
    /// Second both-eyes blink in quick succession.
    DoubleBlink,
    /// Left eye closed while the right stays open.
    LeftClosed,
    /// Left eye reopened after [`GestureEvent::LeftClosed`].
    LeftOpened,
    /// Right eye closed while the left stays open.
    RightClosed,
    /// Right eye reopened after [`GestureEvent::RightClosed`].
    RightOpened,
}

impl GestureEvent {
    /// Every variant, in declaration order.
    pub const ALL: [GestureEvent; 9] = [
        GestureEvent::None,
        GestureEvent::NaturalBlink,
        GestureEvent::BothBlink,
        GestureEvent::LongBlink,
        GestureEvent::DoubleBlink,
        GestureEvent::LeftClosed,
        GestureEvent::LeftOpened,
        GestureEvent::RightClosed,
        GestureEvent::RightOpened,
    ];

    /// Display text for the event.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::NaturalBlink => "NaturalBlink",
            Self::BothBlink => "BothBlink",
            Self::LongBlink => "LongBlink",
            Self::DoubleBlink => "DoubleBlink",
            Self::LeftClosed => "LeftClosed",
            Self::LeftOpened => "LeftOpened",
            Self::RightClosed => "RightClosed",
            Self::RightOpened => "RightOpened",
        }
    }

    /// Whether the event expresses user intent (maps to device actions).
    pub fn is_user_input(&self) -> bool {
        !matches!(self, Self::None | Self::NaturalBlink)
    }

    /// Whether the event starts or ends a held single-eye gesture.
    pub fn is_single_eye(&self) -> bool {
        matches!(
            self,
            Self::LeftClosed | Self::LeftOpened | Self::RightClosed | Self::RightOpened
        )
    }

    /// Pointer device actions triggered by this event, in order.
    pub fn actions(&self) -> &'static [DeviceAction] {
        const LEFT_CLICK: DeviceAction = DeviceAction::Click(MouseButton::Left);
        match self {
            Self::None | Self::NaturalBlink => &[],
            Self::BothBlink => &[LEFT_CLICK],
            Self::LongBlink => &[LEFT_CLICK, LEFT_CLICK],
            Self::DoubleBlink => &[DeviceAction::Click(MouseButton::Middle)],
            Self::LeftClosed => &[DeviceAction::Button(MouseButton::Left, ButtonState::Down)],
            Self::LeftOpened => &[DeviceAction::Button(MouseButton::Left, ButtonState::Up)],
            Self::RightClosed => &[DeviceAction::Button(MouseButton::Right, ButtonState::Down)],
            Self::RightOpened => &[DeviceAction::Button(MouseButton::Right, ButtonState::Up)],
        }
    }
}

impl fmt::Display for GestureEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Button state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonState {
    Down,
    Up,
}

/// A single pointer device action requested from the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "action", content = "button", rename_all = "snake_case")]
pub enum DeviceAction {
    /// Press and release.
    Click(MouseButton),
    /// Press or release only.
    Button(MouseButton, ButtonState),
}

impl fmt::Display for DeviceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Click(button) => write!(f, "click {button:?}"),
            Self::Button(button, ButtonState::Down) => write!(f, "press {button:?}"),
            Self::Button(button, ButtonState::Up) => write!(f, "release {button:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_text_is_unique() {
        let mut names: Vec<&str> = GestureEvent::ALL.iter().map(|e| e.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), GestureEvent::ALL.len());
        assert_eq!(GestureEvent::LongBlink.to_string(), "LongBlink");
    }

    #[test]
    fn test_non_input_events_have_no_actions() {
        for event in GestureEvent::ALL {
            assert_eq!(event.is_user_input(), !event.actions().is_empty());
        }
    }

    #[test]
    fn test_action_mapping() {
        assert_eq!(
            GestureEvent::BothBlink.actions(),
            &[DeviceAction::Click(MouseButton::Left)]
        );
        assert_eq!(GestureEvent::LongBlink.actions().len(), 2);
        assert_eq!(
            GestureEvent::DoubleBlink.actions(),
            &[DeviceAction::Click(MouseButton::Middle)]
        );
        assert_eq!(
            GestureEvent::RightClosed.actions(),
            &[DeviceAction::Button(MouseButton::Right, ButtonState::Down)]
        );
        assert_eq!(
            GestureEvent::LeftOpened.actions(),
            &[DeviceAction::Button(MouseButton::Left, ButtonState::Up)]
        );
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&GestureEvent::DoubleBlink).unwrap();
        assert_eq!(json, "\"double_blink\"");

        let action = DeviceAction::Button(MouseButton::Left, ButtonState::Down);
        let json = serde_json::to_string(&action).unwrap();
        assert_eq!(json, r#"{"action":"button","button":["left","down"]}"#);
    }
}
