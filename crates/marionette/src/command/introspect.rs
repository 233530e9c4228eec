//! Read-only queries about items in the scene

use serde::{Deserialize, Serialize};

use super::{Command, CommandEnvironment};
use crate::geometry::Rect;
use crate::path::ItemPath;
use crate::reply::Reply;

/// Bounding box of an item; the zero rect if the item is missing
#[derive(Debug)]
pub struct GetBoundingBox {
    path: ItemPath,
    reply: Reply<Rect>,
}

impl GetBoundingBox {
    /// Command name
    pub const NAME: &'static str = "GetBoundingBox";

    /// Create the command
    #[must_use]
    pub const fn new(path: ItemPath, reply: Reply<Rect>) -> Self {
        Self { path, reply }
    }
}

impl Command for GetBoundingBox {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(self: Box<Self>, env: &mut CommandEnvironment<'_>) {
        let bounds = env
            .resolve(Self::NAME, &self.path)
            .map(|item| item.bounds())
            .unwrap_or_default();
        self.reply.send(bounds);
    }
}

/// Whether an item exists and is visible.
///
/// A missing item replies `false` and is also reported as an error.
#[derive(Debug)]
pub struct ExistsAndVisible {
    path: ItemPath,
    reply: Reply<bool>,
}

impl ExistsAndVisible {
    /// Command name
    pub const NAME: &'static str = "ExistsAndVisible";

    /// Create the command
    #[must_use]
    pub const fn new(path: ItemPath, reply: Reply<bool>) -> Self {
        Self { path, reply }
    }
}

impl Command for ExistsAndVisible {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(self: Box<Self>, env: &mut CommandEnvironment<'_>) {
        let visible = env
            .resolve(Self::NAME, &self.path)
            .is_some_and(|item| item.visible());
        self.reply.send(visible);
    }
}

/// Object names of an item's direct children
#[derive(Debug)]
pub struct GetChildrenNames {
    path: ItemPath,
    reply: Reply<Vec<String>>,
}

impl GetChildrenNames {
    /// Command name
    pub const NAME: &'static str = "GetChildrenNames";

    /// Create the command
    #[must_use]
    pub const fn new(path: ItemPath, reply: Reply<Vec<String>>) -> Self {
        Self { path, reply }
    }
}

impl Command for GetChildrenNames {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(self: Box<Self>, env: &mut CommandEnvironment<'_>) {
        let names = env
            .resolve(Self::NAME, &self.path)
            .map(|item| item.children_names())
            .unwrap_or_default();
        self.reply.send(names);
    }
}

/// Summary of a single item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementInfo {
    /// Object name
    pub object_name: String,
    /// Toolkit type name
    pub type_name: String,
    /// Visibility
    pub visible: bool,
    /// Object names of the direct children
    pub children: Vec<String>,
}

/// Describe an item; the default [`ElementInfo`] if it is missing
#[derive(Debug)]
pub struct GetElementInfo {
    path: ItemPath,
    reply: Reply<ElementInfo>,
}

impl GetElementInfo {
    /// Command name
    pub const NAME: &'static str = "GetElementInfo";

    /// Create the command
    #[must_use]
    pub const fn new(path: ItemPath, reply: Reply<ElementInfo>) -> Self {
        Self { path, reply }
    }
}

impl Command for GetElementInfo {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(self: Box<Self>, env: &mut CommandEnvironment<'_>) {
        let info = env
            .resolve(Self::NAME, &self.path)
            .map(|item| ElementInfo {
                object_name: item.object_name(),
                type_name: item.type_name(),
                visible: item.visible(),
                children: item.children_names(),
            })
            .unwrap_or_default();
        self.reply.send(info);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockNode, MockScene};
    use crate::reply;
    use crate::state::TestState;

    fn scene() -> MockScene {
        let mut scene = MockScene::new();
        scene.add_item(
            "main",
            MockNode::new("Window").with_bounds(Rect::new(0.0, 0.0, 800.0, 600.0)),
        );
        scene.add_item(
            "main/ok",
            MockNode::new("Button").with_bounds(Rect::new(10.0, 10.0, 80.0, 30.0)),
        );
        scene.add_item("main/cancel", MockNode::new("Button").with_visible(false));
        scene
    }

    fn run(scene: &mut MockScene, state: &TestState, command: impl Command + 'static) {
        let mut env = CommandEnvironment::new(scene, state);
        Box::new(command).execute(&mut env);
    }

    #[test]
    fn test_bounding_box() {
        let mut scene = scene();
        let state = TestState::new();
        let (tx, rx) = reply::channel(GetBoundingBox::NAME);
        run(&mut scene, &state, GetBoundingBox::new("main/ok".into(), tx));
        assert_eq!(rx.wait().unwrap(), Rect::new(10.0, 10.0, 80.0, 30.0));
    }

    #[test]
    fn test_bounding_box_missing_is_zero() {
        let mut scene = scene();
        let state = TestState::new();
        let (tx, rx) = reply::channel(GetBoundingBox::NAME);
        run(&mut scene, &state, GetBoundingBox::new("main/gone".into(), tx));
        assert_eq!(rx.wait().unwrap(), Rect::default());
        assert_eq!(state.error_count(), 1);
    }

    #[test]
    fn test_exists_and_visible() {
        let mut scene = scene();
        let state = TestState::new();

        let (tx, rx) = reply::channel(ExistsAndVisible::NAME);
        run(&mut scene, &state, ExistsAndVisible::new("main/ok".into(), tx));
        assert!(rx.wait().unwrap());

        let (tx, rx) = reply::channel(ExistsAndVisible::NAME);
        run(
            &mut scene,
            &state,
            ExistsAndVisible::new("main/cancel".into(), tx),
        );
        assert!(!rx.wait().unwrap());
        assert!(!state.has_errors());
    }

    #[test]
    fn test_exists_and_visible_missing_reports() {
        let mut scene = scene();
        let state = TestState::new();
        let (tx, rx) = reply::channel(ExistsAndVisible::NAME);
        run(
            &mut scene,
            &state,
            ExistsAndVisible::new("main/missing".into(), tx),
        );
        assert!(!rx.wait().unwrap());
        assert_eq!(
            state.errors(),
            vec!["ExistsAndVisible: Item not found: main/missing"]
        );
    }

    #[test]
    fn test_children_names() {
        let mut scene = scene();
        let state = TestState::new();
        let (tx, rx) = reply::channel(GetChildrenNames::NAME);
        run(&mut scene, &state, GetChildrenNames::new("main".into(), tx));
        assert_eq!(rx.wait().unwrap(), vec!["cancel", "ok"]);
    }

    #[test]
    fn test_element_info() {
        let mut scene = scene();
        let state = TestState::new();
        let (tx, rx) = reply::channel(GetElementInfo::NAME);
        run(&mut scene, &state, GetElementInfo::new("main".into(), tx));
        let info = rx.wait().unwrap();
        assert_eq!(info.object_name, "main");
        assert_eq!(info.type_name, "Window");
        assert!(info.visible);
        assert_eq!(info.children.len(), 2);
    }

    #[test]
    fn test_element_info_serializes() {
        let info = ElementInfo {
            object_name: "ok".into(),
            type_name: "Button".into(),
            visible: true,
            children: vec![],
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["type_name"], "Button");
    }
}
