//! Fire-and-forget input commands: mouse, drag and drop, keyboard.
//!
//! Mouse commands act on the center of the target item unless stated
//! otherwise.

use super::{Command, CommandEnvironment};
use crate::event::{EventTarget, InputEvent, KeyModifiers, MouseButton, PasteboardContent};
use crate::path::ItemPath;

/// Press and release a mouse button on an item
#[derive(Debug)]
pub struct ClickOnItem {
    path: ItemPath,
    button: MouseButton,
    target: EventTarget,
}

impl ClickOnItem {
    /// Command name
    pub const NAME: &'static str = "ClickOnItem";

    /// Create the command
    #[must_use]
    pub const fn new(path: ItemPath, button: MouseButton, target: EventTarget) -> Self {
        Self {
            path,
            button,
            target,
        }
    }
}

impl Command for ClickOnItem {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(self: Box<Self>, env: &mut CommandEnvironment<'_>) {
        let Some(item) = env.resolve(Self::NAME, &self.path) else {
            return;
        };
        let pos = item.size().center();
        let scene = env.scene();
        scene.post_event(&*item, InputEvent::mouse_down(pos, self.button), self.target);
        scene.post_event(&*item, InputEvent::mouse_up(pos, self.button), self.target);
    }
}

/// Double click an item with the left button
#[derive(Debug)]
pub struct DoubleClickOnItem {
    path: ItemPath,
    target: EventTarget,
}

impl DoubleClickOnItem {
    /// Command name
    pub const NAME: &'static str = "DoubleClickOnItem";

    /// Create the command
    #[must_use]
    pub const fn new(path: ItemPath, target: EventTarget) -> Self {
        Self { path, target }
    }
}

impl Command for DoubleClickOnItem {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(self: Box<Self>, env: &mut CommandEnvironment<'_>) {
        let Some(item) = env.resolve(Self::NAME, &self.path) else {
            return;
        };
        let pos = item.size().center();
        let button = MouseButton::Left;
        let sequence = [
            InputEvent::mouse_down(pos, button),
            InputEvent::mouse_up(pos, button),
            InputEvent::MouseDoubleClick { pos, button },
            InputEvent::mouse_up(pos, button),
        ];
        let scene = env.scene();
        for event in sequence {
            scene.post_event(&*item, event, self.target);
        }
    }
}

/// Press the left button on an item and keep it held
#[derive(Debug)]
pub struct DragBegin {
    path: ItemPath,
}

impl DragBegin {
    /// Command name
    pub const NAME: &'static str = "DragBegin";

    /// Create the command
    #[must_use]
    pub const fn new(path: ItemPath) -> Self {
        Self { path }
    }
}

impl Command for DragBegin {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(self: Box<Self>, env: &mut CommandEnvironment<'_>) {
        let Some(item) = env.resolve(Self::NAME, &self.path) else {
            return;
        };
        let pos = item.size().center();
        env.scene().post_event(
            &*item,
            InputEvent::mouse_down(pos, MouseButton::Left),
            EventTarget::Window,
        );
    }
}

/// Move the held mouse onto an item and release it there
#[derive(Debug)]
pub struct DragEnd {
    path: ItemPath,
}

impl DragEnd {
    /// Command name
    pub const NAME: &'static str = "DragEnd";

    /// Create the command
    #[must_use]
    pub const fn new(path: ItemPath) -> Self {
        Self { path }
    }
}

impl Command for DragEnd {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(self: Box<Self>, env: &mut CommandEnvironment<'_>) {
        let Some(item) = env.resolve(Self::NAME, &self.path) else {
            return;
        };
        let pos = item.size().center();
        let scene = env.scene();
        scene.post_event(
            &*item,
            InputEvent::mouse_move(pos, Some(MouseButton::Left)),
            EventTarget::Window,
        );
        scene.post_event(
            &*item,
            InputEvent::mouse_up(pos, MouseButton::Left),
            EventTarget::Window,
        );
    }
}

/// Grab an item at its center and drag it by `(dx, dy)`
#[derive(Debug)]
pub struct DragItem {
    path: ItemPath,
    dx: i32,
    dy: i32,
}

impl DragItem {
    /// Command name
    pub const NAME: &'static str = "DragItem";

    /// Create the command
    #[must_use]
    pub const fn new(path: ItemPath, dx: i32, dy: i32) -> Self {
        Self { path, dx, dy }
    }
}

impl Command for DragItem {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(self: Box<Self>, env: &mut CommandEnvironment<'_>) {
        let Some(item) = env.resolve(Self::NAME, &self.path) else {
            return;
        };
        let from = item.size().center();
        let to = from.offset(f64::from(self.dx), f64::from(self.dy));
        let button = MouseButton::Left;
        let sequence = [
            InputEvent::mouse_down(from, button),
            InputEvent::mouse_move(to, Some(button)),
            InputEvent::mouse_up(to, button),
        ];
        let scene = env.scene();
        for event in sequence {
            scene.post_event(&*item, event, EventTarget::Window);
        }
    }
}

/// Drop external content (URLs) onto an item
#[derive(Debug)]
pub struct DropFromExt {
    path: ItemPath,
    content: PasteboardContent,
}

impl DropFromExt {
    /// Command name
    pub const NAME: &'static str = "DropFromExt";

    /// Create the command
    #[must_use]
    pub const fn new(path: ItemPath, content: PasteboardContent) -> Self {
        Self { path, content }
    }
}

impl Command for DropFromExt {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(self: Box<Self>, env: &mut CommandEnvironment<'_>) {
        let Some(item) = env.resolve(Self::NAME, &self.path) else {
            return;
        };
        let pos = item.size().center();
        env.scene().post_event(
            &*item,
            InputEvent::ExternalDrop {
                pos,
                content: self.content,
            },
            EventTarget::Window,
        );
    }
}

/// Type text into an item
#[derive(Debug)]
pub struct InputText {
    path: ItemPath,
    text: String,
}

impl InputText {
    /// Command name
    pub const NAME: &'static str = "InputText";

    /// Create the command
    #[must_use]
    pub const fn new(path: ItemPath, text: String) -> Self {
        Self { path, text }
    }
}

impl Command for InputText {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(self: Box<Self>, env: &mut CommandEnvironment<'_>) {
        let Some(item) = env.resolve(Self::NAME, &self.path) else {
            return;
        };
        env.scene().post_event(
            &*item,
            InputEvent::TextInput { text: self.text },
            EventTarget::Item,
        );
    }
}

/// Press and release a key on an item
#[derive(Debug)]
pub struct EnterKey {
    path: ItemPath,
    key_code: i32,
    modifiers: KeyModifiers,
}

impl EnterKey {
    /// Command name
    pub const NAME: &'static str = "EnterKey";

    /// Create the command
    #[must_use]
    pub const fn new(path: ItemPath, key_code: i32, modifiers: KeyModifiers) -> Self {
        Self {
            path,
            key_code,
            modifiers,
        }
    }
}

impl Command for EnterKey {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(self: Box<Self>, env: &mut CommandEnvironment<'_>) {
        let Some(item) = env.resolve(Self::NAME, &self.path) else {
            return;
        };
        let scene = env.scene();
        scene.post_event(
            &*item,
            InputEvent::key_press(self.key_code, self.modifiers),
            EventTarget::Item,
        );
        scene.post_event(
            &*item,
            InputEvent::key_release(self.key_code, self.modifiers),
            EventTarget::Item,
        );
    }
}
