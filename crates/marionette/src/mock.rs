//! In-memory scene for unit and integration tests.
//!
//! [`MockScene`] keeps a flat map of paths to [`MockNode`]s, records every
//! posted event and every method call, and renders screenshots as solid
//! PNG images of the node's fill color.

use std::any::Any;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::Path;
use std::rc::Rc;

use image::{ImageError, ImageFormat, Rgb, RgbImage};

use crate::event::{EventTarget, InputEvent};
use crate::geometry::{Color, Point, Rect};
use crate::path::ItemPath;
use crate::scene::{Item, Scene};
use crate::variant::Variant;

/// Node stored in a [`MockScene`]
#[derive(Debug, Clone)]
pub struct MockNode {
    /// Object name; filled from the last path segment when empty
    pub object_name: String,
    /// Type name reported by the item
    pub type_name: String,
    /// Visibility
    pub visible: bool,
    /// Bounding box in scene coordinates
    pub bounds: Rect,
    /// String properties
    pub properties: BTreeMap<String, String>,
    /// Properties that reject writes
    pub read_only: BTreeSet<String>,
    /// Invokable methods and the value they return
    pub methods: BTreeMap<String, Variant>,
    /// Color every pixel renders as
    pub fill: Color,
}

impl MockNode {
    /// Visible node of the given type with a 100x100 box
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            object_name: String::new(),
            type_name: type_name.into(),
            visible: true,
            bounds: Rect::new(0.0, 0.0, 100.0, 100.0),
            properties: BTreeMap::new(),
            read_only: BTreeSet::new(),
            methods: BTreeMap::new(),
            fill: Color::rgb(255, 255, 255),
        }
    }

    /// Override the object name
    pub fn with_object_name(mut self, name: impl Into<String>) -> Self {
        self.object_name = name.into();
        self
    }

    /// Set the bounding box
    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self
    }

    /// Set visibility
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Add a writable property
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Add a property that rejects writes
    pub fn with_read_only(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.read_only.insert(name.clone());
        self.properties.insert(name, value.into());
        self
    }

    /// Add a method returning `result`
    pub fn with_method(mut self, name: impl Into<String>, result: Variant) -> Self {
        self.methods.insert(name.into(), result);
        self
    }

    /// Set the fill color
    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = fill;
        self
    }
}

/// An input event delivered to the mock scene
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    /// Path of the receiving item
    pub path: ItemPath,
    /// The event
    pub event: InputEvent,
    /// Delivery target
    pub target: EventTarget,
}

#[derive(Debug, Default)]
struct MockTree {
    nodes: BTreeMap<ItemPath, MockNode>,
    call_history: Vec<String>,
}

type SharedTree = Rc<RefCell<MockTree>>;

/// Item handle returned by [`MockScene::item_at_path`]
#[derive(Debug, Clone)]
pub struct MockItem {
    path: ItemPath,
    tree: SharedTree,
}

impl MockItem {
    /// Path this handle was resolved from
    #[must_use]
    pub fn path(&self) -> &ItemPath {
        &self.path
    }

    fn with_node<R>(&self, default: R, f: impl FnOnce(&MockNode) -> R) -> R {
        self.tree.borrow().nodes.get(&self.path).map_or(default, f)
    }
}

impl Item for MockItem {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn object_name(&self) -> String {
        self.with_node(String::new(), |n| n.object_name.clone())
    }

    fn type_name(&self) -> String {
        self.with_node(String::new(), |n| n.type_name.clone())
    }

    fn visible(&self) -> bool {
        self.with_node(false, |n| n.visible)
    }

    fn children_names(&self) -> Vec<String> {
        let tree = self.tree.borrow();
        tree.nodes
            .iter()
            .filter(|(path, _)| path.parent().as_ref() == Some(&self.path))
            .map(|(_, node)| node.object_name.clone())
            .collect()
    }

    fn bounds(&self) -> Rect {
        self.with_node(Rect::default(), |n| n.bounds)
    }

    fn string_property(&self, name: &str) -> Option<String> {
        self.with_node(None, |n| n.properties.get(name).cloned())
    }

    fn set_string_property(&self, name: &str, value: &str) -> bool {
        let mut tree = self.tree.borrow_mut();
        tree.call_history
            .push(format!("{}.set:{name}={value}", self.path));
        match tree.nodes.get_mut(&self.path) {
            Some(node) if !node.read_only.contains(name) => {
                node.properties.insert(name.to_string(), value.to_string());
                true
            }
            _ => false,
        }
    }

    fn invoke_method(&self, method: &str, args: &[Variant]) -> Option<Variant> {
        let mut tree = self.tree.borrow_mut();
        tree.call_history
            .push(format!("{}.{method}({})", self.path, args.len()));
        tree.nodes
            .get(&self.path)
            .and_then(|n| n.methods.get(method).cloned())
    }
}

/// Largest screenshot edge the mock renders, in pixels
pub const MAX_SCREENSHOT_EXTENT: u32 = 8192;

/// Pixel length of one item edge; at least one pixel
fn screenshot_extent(length: f64) -> io::Result<u32> {
    if !length.is_finite() || length > f64::from(MAX_SCREENSHOT_EXTENT) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("cannot render an item edge of {length} pixels"),
        ));
    }
    Ok(length.ceil().max(1.0) as u32)
}

/// In-memory [`Scene`]
#[derive(Debug, Default)]
pub struct MockScene {
    tree: SharedTree,
    events: Vec<RecordedEvent>,
    quit_requested: bool,
}

impl MockScene {
    /// Create an empty scene
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the node at `path`
    pub fn add_item(&mut self, path: impl Into<ItemPath>, mut node: MockNode) {
        let path = path.into();
        if node.object_name.is_empty() {
            node.object_name = path.leaf_name().unwrap_or_default().to_string();
        }
        self.tree.borrow_mut().nodes.insert(path, node);
    }

    /// Remove the node at `path`, returning it
    pub fn remove_item(&mut self, path: &ItemPath) -> Option<MockNode> {
        self.tree.borrow_mut().nodes.remove(path)
    }

    /// Change the visibility of an existing node
    pub fn set_visible(&mut self, path: &ItemPath, visible: bool) -> bool {
        match self.tree.borrow_mut().nodes.get_mut(path) {
            Some(node) => {
                node.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Current value of a property
    #[must_use]
    pub fn property(&self, path: &ItemPath, name: &str) -> Option<String> {
        self.tree
            .borrow()
            .nodes
            .get(path)
            .and_then(|n| n.properties.get(name).cloned())
    }

    /// Every event delivered so far
    #[must_use]
    pub fn recorded_events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Events delivered to `path`, in order
    #[must_use]
    pub fn events_for(&self, path: &ItemPath) -> Vec<InputEvent> {
        self.events
            .iter()
            .filter(|e| &e.path == path)
            .map(|e| e.event.clone())
            .collect()
    }

    /// Call history for verification
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.tree.borrow().call_history.clone()
    }

    /// Check if a call starting with `prefix` was made
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.tree
            .borrow()
            .call_history
            .iter()
            .any(|c| c.starts_with(prefix))
    }

    /// Whether [`Scene::quit`] was called
    #[must_use]
    pub const fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    fn path_of(item: &dyn Item) -> ItemPath {
        item.as_any()
            .downcast_ref::<MockItem>()
            .map_or_else(
                || ItemPath::from_segments([item.object_name()]),
                |m| m.path.clone(),
            )
    }

    fn record(&self, call: String) {
        self.tree.borrow_mut().call_history.push(call);
    }
}

impl Scene for MockScene {
    fn item_at_path(&self, path: &ItemPath) -> Option<Box<dyn Item>> {
        if !self.tree.borrow().nodes.contains_key(path) {
            return None;
        }
        Some(Box::new(MockItem {
            path: path.clone(),
            tree: Rc::clone(&self.tree),
        }))
    }

    fn post_event(&mut self, item: &dyn Item, event: InputEvent, target: EventTarget) {
        let path = Self::path_of(item);
        self.events.push(RecordedEvent {
            path,
            event,
            target,
        });
    }

    fn take_screenshot(&mut self, item: &dyn Item, file_path: &Path) -> io::Result<()> {
        let path = Self::path_of(item);
        self.record(format!("screenshot:{path}"));
        let fill = self
            .tree
            .borrow()
            .nodes
            .get(&path)
            .map(|n| n.fill)
            .unwrap_or_default();
        let size = item.size();
        let (width, height) = (
            screenshot_extent(size.width)?,
            screenshot_extent(size.height)?,
        );

        RgbImage::from_pixel(width, height, Rgb([fill.r, fill.g, fill.b]))
            .save_with_format(file_path, ImageFormat::Png)
            .map_err(|e| match e {
                ImageError::IoError(e) => e,
                other => io::Error::other(other),
            })
    }

    fn pick_color(&mut self, item: &dyn Item, pos: Point) -> Option<Color> {
        let path = Self::path_of(item);
        self.record(format!("pick_color:{path}"));
        let size = item.size();
        let local = Rect::new(0.0, 0.0, size.width, size.height);
        if !local.contains(pos) {
            return None;
        }
        self.tree.borrow().nodes.get(&path).map(|n| n.fill)
    }

    fn quit(&mut self) {
        self.record("quit".to_string());
        self.quit_requested = true;
    }
}
