//! Property access and method invocation

use super::{Command, CommandEnvironment};
use crate::path::ItemPath;
use crate::reply::Reply;
use crate::variant::Variant;

/// Read a property as a string.
///
/// Replies with the empty string when the item or the property is missing.
#[derive(Debug)]
pub struct GetProperty {
    path: ItemPath,
    property: String,
    reply: Reply<String>,
}

impl GetProperty {
    /// Command name
    pub const NAME: &'static str = "GetProperty";

    /// Create the command
    #[must_use]
    pub const fn new(path: ItemPath, property: String, reply: Reply<String>) -> Self {
        Self {
            path,
            property,
            reply,
        }
    }
}

impl Command for GetProperty {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(self: Box<Self>, env: &mut CommandEnvironment<'_>) {
        let Self {
            path,
            property,
            reply,
        } = *self;
        let Some(item) = env.resolve(Self::NAME, &path) else {
            reply.send(String::new());
            return;
        };
        let value = item.string_property(&property).unwrap_or_else(|| {
            env.report_error(format!(
                "{}: Property not found: {property} on {path}",
                Self::NAME
            ));
            String::new()
        });
        reply.send(value);
    }
}

/// Write a property from a string
#[derive(Debug)]
pub struct SetProperty {
    path: ItemPath,
    property: String,
    value: String,
}

impl SetProperty {
    /// Command name
    pub const NAME: &'static str = "SetProperty";

    /// Create the command
    #[must_use]
    pub const fn new(path: ItemPath, property: String, value: String) -> Self {
        Self {
            path,
            property,
            value,
        }
    }
}

impl Command for SetProperty {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(self: Box<Self>, env: &mut CommandEnvironment<'_>) {
        let Some(item) = env.resolve(Self::NAME, &self.path) else {
            return;
        };
        if !item.set_string_property(&self.property, &self.value) {
            env.report_error(format!(
                "{}: Failed to set property: {} on {}",
                Self::NAME,
                self.property,
                self.path
            ));
        }
    }
}

/// Invoke a method on an item.
///
/// Replies with [`Variant::Empty`] when the item or the method is missing.
#[derive(Debug)]
pub struct InvokeMethod {
    path: ItemPath,
    method: String,
    args: Vec<Variant>,
    reply: Reply<Variant>,
}

impl InvokeMethod {
    /// Command name
    pub const NAME: &'static str = "InvokeMethod";

    /// Create the command
    #[must_use]
    pub const fn new(
        path: ItemPath,
        method: String,
        args: Vec<Variant>,
        reply: Reply<Variant>,
    ) -> Self {
        Self {
            path,
            method,
            args,
            reply,
        }
    }
}

impl Command for InvokeMethod {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(self: Box<Self>, env: &mut CommandEnvironment<'_>) {
        let Self {
            path,
            method,
            args,
            reply,
        } = *self;
        let Some(item) = env.resolve(Self::NAME, &path) else {
            reply.send(Variant::Empty);
            return;
        };
        let result = item.invoke_method(&method, &args).unwrap_or_else(|| {
            env.report_error(format!(
                "{}: Failed to invoke method: {method} on {path}",
                Self::NAME
            ));
            Variant::Empty
        });
        reply.send(result);
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
            "w/field",
            MockNode::new("TextField")
                .with_property("text", "initial")
                .with_read_only("placeholder", "type here")
                .with_method("sum", Variant::Int(3)),
        );
        scene
    }

    fn run(scene: &mut MockScene, state: &TestState, command: impl Command + 'static) {
        let mut env = CommandEnvironment::new(scene, state);
        Box::new(command).execute(&mut env);
    }

    #[test]
    fn test_get_property() {
        let mut scene = scene();
        let state = TestState::new();
        let (tx, rx) = reply::channel(GetProperty::NAME);
        run(
            &mut scene,
            &state,
            GetProperty::new("w/field".into(), "text".into(), tx),
        );
        assert_eq!(rx.wait().unwrap(), "initial");
        assert!(!state.has_errors());
    }

    #[test]
    fn test_get_property_missing_item_replies_empty() {
        let mut scene = scene();
        let state = TestState::new();
        let (tx, rx) = reply::channel(GetProperty::NAME);
        run(
            &mut scene,
            &state,
            GetProperty::new("bogus/path".into(), "text".into(), tx),
        );
        assert_eq!(rx.wait().unwrap(), "");
        assert_eq!(
            state.errors(),
            vec!["GetProperty: Item not found: bogus/path"]
        );
    }

    #[test]
    fn test_get_property_missing_property_reports() {
        let mut scene = scene();
        let state = TestState::new();
        let (tx, rx) = reply::channel(GetProperty::NAME);
        run(
            &mut scene,
            &state,
            GetProperty::new("w/field".into(), "nope".into(), tx),
        );
        assert_eq!(rx.wait().unwrap(), "");
        assert_eq!(
            state.errors(),
            vec!["GetProperty: Property not found: nope on w/field"]
        );
    }

    #[test]
    fn test_set_then_get() {
        let mut scene = scene();
        let state = TestState::new();
        run(
            &mut scene,
            &state,
            SetProperty::new("w/field".into(), "text".into(), "Hello".into()),
        );
        assert_eq!(
            scene.property(&"w/field".into(), "text").as_deref(),
            Some("Hello")
        );
    }

    #[test]
    fn test_set_read_only_reports() {
        let mut scene = scene();
        let state = TestState::new();
        run(
            &mut scene,
            &state,
            SetProperty::new("w/field".into(), "placeholder".into(), "x".into()),
        );
        assert_eq!(
            state.errors(),
            vec!["SetProperty: Failed to set property: placeholder on w/field"]
        );
        assert_eq!(
            scene.property(&"w/field".into(), "placeholder").as_deref(),
            Some("type here")
        );
    }

    #[test]
    fn test_invoke_method() {
        let mut scene = scene();
        let state = TestState::new();
        let (tx, rx) = reply::channel(InvokeMethod::NAME);
        run(
            &mut scene,
            &state,
            InvokeMethod::new(
                "w/field".into(),
                "sum".into(),
                vec![Variant::Int(1), Variant::Int(2)],
                tx,
            ),
        );
        assert_eq!(rx.wait().unwrap(), Variant::Int(3));
        assert!(scene.was_called("w/field.sum"));
    }

    #[test]
    fn test_invoke_unknown_method() {
        let mut scene = scene();
        let state = TestState::new();
        let (tx, rx) = reply::channel(InvokeMethod::NAME);
        run(
            &mut scene,
            &state,
            InvokeMethod::new("w/field".into(), "explode".into(), Vec::new(), tx),
        );
        assert_eq!(rx.wait().unwrap(), Variant::Empty);
        assert_eq!(
            state.errors(),
            vec!["InvokeMethod: Failed to invoke method: explode on w/field"]
        );
    }
}
