//! The scene collaborator: the embedding toolkit's view of its UI tree.
//!
//! Marionette never renders or lays out anything. A toolkit integration
//! implements [`Scene`] and [`Item`]; commands only resolve paths and call
//! these traits, always on the thread that drains the
//! [`CommandExecuter`](crate::CommandExecuter).

use std::any::Any;
use std::io;
use std::path::Path;

use crate::event::{EventTarget, InputEvent};
use crate::geometry::{Color, Point, Rect, Size};
use crate::path::ItemPath;
use crate::variant::Variant;

/// Handle to a live UI node.
///
/// Handles are short-lived: a command obtains one from
/// [`Scene::item_at_path`] and drops it before returning.
pub trait Item: Any {
    /// Downcast hook so a scene can recover its own handle type in
    /// [`Scene::post_event`] and friends
    fn as_any(&self) -> &dyn Any;

    /// Object name the node is addressed by
    fn object_name(&self) -> String;

    /// Toolkit type name (e.g. `Button`)
    fn type_name(&self) -> String;

    /// Whether the node is currently visible
    fn visible(&self) -> bool;

    /// Object names of the direct children
    fn children_names(&self) -> Vec<String>;

    /// Bounding box in scene coordinates
    fn bounds(&self) -> Rect;

    /// Size in item coordinates
    fn size(&self) -> Size {
        self.bounds().size()
    }

    /// Read a property as a string; `None` if the property does not exist
    fn string_property(&self, name: &str) -> Option<String>;

    /// Write a property from a string; `false` if it could not be written
    fn set_string_property(&self, name: &str, value: &str) -> bool;

    /// Invoke a method; `None` if it does not exist or the call failed
    fn invoke_method(&self, method: &str, args: &[Variant]) -> Option<Variant>;
}

/// The UI tree as seen from the command executer
pub trait Scene {
    /// Resolve a path to a live node
    fn item_at_path(&self, path: &ItemPath) -> Option<Box<dyn Item>>;

    /// Deliver a synthesized input event to `item`
    fn post_event(&mut self, item: &dyn Item, event: InputEvent, target: EventTarget);

    /// Render `item` and save the image to `file_path`
    fn take_screenshot(&mut self, item: &dyn Item, file_path: &Path) -> io::Result<()>;

    /// Color of the rendered pixel at `pos` (item coordinates); `None` if
    /// the position lies outside the item
    fn pick_color(&mut self, item: &dyn Item, pos: Point) -> Option<Color>;

    /// Ask the application to leave its main loop
    fn quit(&mut self);
}
