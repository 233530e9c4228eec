//! Synthesized input events handed to the scene's event sink.

use serde::{Deserialize, Serialize};
use std::ops::BitOr;

use crate::geometry::Point;

/// Mouse button
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    /// Primary button
    #[default]
    Left,
    /// Secondary button
    Right,
    /// Wheel button
    Middle,
}

/// Keyboard modifier mask (toolkit-independent bit layout)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyModifiers(u32);

impl KeyModifiers {
    /// No modifier
    pub const NONE: Self = Self(0);
    /// Shift
    pub const SHIFT: Self = Self(1);
    /// Control
    pub const CONTROL: Self = Self(1 << 1);
    /// Alt / Option
    pub const ALT: Self = Self(1 << 2);
    /// Meta / Command
    pub const META: Self = Self(1 << 3);

    /// Wrap raw bits as received over a protocol
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bits
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether all bits of `other` are set
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether no modifier is set
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for KeyModifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Where a synthesized event is delivered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTarget {
    /// Through the item's window, as a real user input would arrive
    #[default]
    Window,
    /// Directly to the item, bypassing hit-testing
    Item,
}

impl EventTarget {
    /// Map the `event_to_item` flag of the click commands
    #[must_use]
    pub const fn from_event_to_item(event_to_item: bool) -> Self {
        if event_to_item {
            Self::Item
        } else {
            Self::Window
        }
    }
}

/// Payload of an external drag-and-drop
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasteboardContent {
    /// Dropped URLs
    pub urls: Vec<String>,
    /// Dropped plain text
    pub text: Option<String>,
}

impl PasteboardContent {
    /// Content holding only URLs
    #[must_use]
    pub fn with_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
            text: None,
        }
    }

    /// Set the plain-text part
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Input event synthesized by a command.
///
/// Positions are in the coordinates of the item the event is posted to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Mouse button pressed
    MouseDown {
        /// Position
        pos: Point,
        /// Button
        button: MouseButton,
    },
    /// Mouse button released
    MouseUp {
        /// Position
        pos: Point,
        /// Button
        button: MouseButton,
    },
    /// Second press of a double click
    MouseDoubleClick {
        /// Position
        pos: Point,
        /// Button
        button: MouseButton,
    },
    /// Mouse moved (with the buttons currently held)
    MouseMove {
        /// Position
        pos: Point,
        /// Held button, if dragging
        button: Option<MouseButton>,
    },
    /// Key pressed
    KeyPress {
        /// Toolkit key code
        key_code: i32,
        /// Active modifiers
        modifiers: KeyModifiers,
    },
    /// Key released
    KeyRelease {
        /// Toolkit key code
        key_code: i32,
        /// Active modifiers
        modifiers: KeyModifiers,
    },
    /// Committed text input
    TextInput {
        /// Text
        text: String,
    },
    /// Content dropped from outside the application
    ExternalDrop {
        /// Position
        pos: Point,
        /// Dropped content
        content: PasteboardContent,
    },
}

impl InputEvent {
    /// Create a mouse-down event
    #[must_use]
    pub const fn mouse_down(pos: Point, button: MouseButton) -> Self {
        Self::MouseDown { pos, button }
    }

    /// Create a mouse-up event
    #[must_use]
    pub const fn mouse_up(pos: Point, button: MouseButton) -> Self {
        Self::MouseUp { pos, button }
    }

    /// Create a mouse-move event
    #[must_use]
    pub const fn mouse_move(pos: Point, button: Option<MouseButton>) -> Self {
        Self::MouseMove { pos, button }
    }

    /// Create a key-press event
    #[must_use]
    pub const fn key_press(key_code: i32, modifiers: KeyModifiers) -> Self {
        Self::KeyPress {
            key_code,
            modifiers,
        }
    }

    /// Create a key-release event
    #[must_use]
    pub const fn key_release(key_code: i32, modifiers: KeyModifiers) -> Self {
        Self::KeyRelease {
            key_code,
            modifiers,
        }
    }

    /// Create a text input event
    #[must_use]
    pub fn text_input(text: impl Into<String>) -> Self {
        Self::TextInput { text: text.into() }
    }

    /// Whether this is a mouse event
    #[must_use]
    pub const fn is_mouse(&self) -> bool {
        matches!(
            self,
            Self::MouseDown { .. }
                | Self::MouseUp { .. }
                | Self::MouseDoubleClick { .. }
                | Self::MouseMove { .. }
        )
    }
}
