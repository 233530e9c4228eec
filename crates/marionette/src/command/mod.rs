//! The command object model.
//!
//! A [`Command`] is a unit of work queued by a test thread and executed on
//! the UI thread. Each concrete command owns its parameters and, for
//! queries, exactly one [`Reply`](crate::reply::Reply).
//!
//! Every command that targets an item resolves it through
//! [`CommandEnvironment::resolve`], which records
//! `"<CommandName>: Item not found: <path>"` when the path does not resolve.
//! The command then completes with its documented default.

mod control;
mod input;
mod introspect;
mod property;
mod render;

pub use control::{CustomCmd, GetTestStatus, Quit, Wait};
pub use input::{
    ClickOnItem, DoubleClickOnItem, DragBegin, DragEnd, DragItem, DropFromExt, EnterKey,
    InputText,
};
pub use introspect::{
    ElementInfo, ExistsAndVisible, GetBoundingBox, GetChildrenNames, GetElementInfo,
};
pub use property::{GetProperty, InvokeMethod, SetProperty};
pub use render::{ColorPick, Screenshot};

use crate::path::ItemPath;
use crate::scene::{Item, Scene};
use crate::state::TestState;

/// A unit of work executed against the scene
pub trait Command: Send {
    /// Name used in logs and error messages
    fn name(&self) -> &'static str;

    /// Whether the command may run in the current drain.
    ///
    /// A command that is not ready stays at the head of the queue, together
    /// with everything behind it, until a later drain.
    fn can_execute_now(&self) -> bool {
        true
    }

    /// Run the command. Query commands resolve their reply here, on every
    /// path including "item not found".
    fn execute(self: Box<Self>, env: &mut CommandEnvironment<'_>);
}

/// Execution context handed to a command for one `execute` call
pub struct CommandEnvironment<'a> {
    scene: &'a mut dyn Scene,
    state: &'a TestState,
    quit_requested: bool,
}

impl<'a> CommandEnvironment<'a> {
    /// Bundle the scene and the run state
    pub fn new(scene: &'a mut dyn Scene, state: &'a TestState) -> Self {
        Self {
            scene,
            state,
            quit_requested: false,
        }
    }

    /// The scene collaborator
    pub fn scene(&mut self) -> &mut dyn Scene {
        &mut *self.scene
    }

    /// The run-wide test state
    #[must_use]
    pub const fn state(&self) -> &TestState {
        self.state
    }

    /// Resolve `path`, reporting `"<command>: Item not found: <path>"` if
    /// the scene has no such item
    pub fn resolve(&self, command: &str, path: &ItemPath) -> Option<Box<dyn Item>> {
        let item = self.scene.item_at_path(path);
        if item.is_none() {
            self.state
                .report_error(format!("{command}: Item not found: {path}"));
        }
        item
    }

    /// Report an error on behalf of a command
    pub fn report_error(&self, message: impl Into<String>) {
        self.state.report_error(message);
    }

    /// Ask the executer to stop after this command
    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    /// Whether a quit was requested during this call
    #[must_use]
    pub const fn quit_requested(&self) -> bool {
        self.quit_requested
    }
}

impl std::fmt::Debug for CommandEnvironment<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandEnvironment")
            .field("run_id", &self.state.run_id())
            .field("quit_requested", &self.quit_requested)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockNode, MockScene};

    #[test]
    fn test_resolve_existing_item() {
        let mut scene = MockScene::new();
        scene.add_item("w/button", MockNode::new("Button"));
        let state = TestState::new();
        let env = CommandEnvironment::new(&mut scene, &state);

        let item = env.resolve("ClickOnItem", &ItemPath::from("w/button"));
        assert!(item.is_some());
        assert!(!state.has_errors());
    }

    #[test]
    fn test_resolve_missing_item_reports() {
        let mut scene = MockScene::new();
        let state = TestState::new();
        let env = CommandEnvironment::new(&mut scene, &state);

        assert!(env.resolve("ClickOnItem", &ItemPath::from("w/nope")).is_none());
        assert_eq!(
            state.errors(),
            vec!["ClickOnItem: Item not found: w/nope".to_string()]
        );
    }

    #[test]
    fn test_request_quit_flag() {
        let mut scene = MockScene::new();
        let state = TestState::new();
        let mut env = CommandEnvironment::new(&mut scene, &state);
        assert!(!env.quit_requested());
        env.request_quit();
        assert!(env.quit_requested());
    }

    mod missing_item_tests {
        use super::*;
        use crate::event::{EventTarget, KeyModifiers, MouseButton, PasteboardContent};
        use crate::geometry::Rect;
        use crate::reply::{self, Reply};
        use crate::variant::Variant;

        type Check = Box<dyn FnOnce()>;

        fn expect_reply<T>(command: &'static str, expected: T) -> (Reply<T>, Check)
        where
            T: PartialEq + std::fmt::Debug + 'static,
        {
            let (reply, pending) = reply::channel(command);
            let check = Box::new(move || {
                assert_eq!(pending.wait().unwrap(), expected, "{command} reply");
            });
            (reply, check)
        }

        fn no_reply() -> Check {
            Box::new(|| {})
        }

        fn all_commands(path: &ItemPath) -> Vec<(&'static str, Box<dyn Command>, Check)> {
            let p = || path.clone();
            let mut rows: Vec<(&'static str, Box<dyn Command>, Check)> = vec![
                (
                    ClickOnItem::NAME,
                    Box::new(ClickOnItem::new(p(), MouseButton::Left, EventTarget::Window)),
                    no_reply(),
                ),
                (
                    DoubleClickOnItem::NAME,
                    Box::new(DoubleClickOnItem::new(p(), EventTarget::Item)),
                    no_reply(),
                ),
                (DragBegin::NAME, Box::new(DragBegin::new(p())), no_reply()),
                (DragEnd::NAME, Box::new(DragEnd::new(p())), no_reply()),
                (DragItem::NAME, Box::new(DragItem::new(p(), 5, 5)), no_reply()),
                (
                    DropFromExt::NAME,
                    Box::new(DropFromExt::new(
                        p(),
                        PasteboardContent::with_urls(["file:///tmp/a.txt"]),
                    )),
                    no_reply(),
                ),
                (
                    InputText::NAME,
                    Box::new(InputText::new(p(), "abc".to_string())),
                    no_reply(),
                ),
                (
                    EnterKey::NAME,
                    Box::new(EnterKey::new(p(), 0x0100_0004, KeyModifiers::NONE)),
                    no_reply(),
                ),
                (
                    SetProperty::NAME,
                    Box::new(SetProperty::new(p(), "text".to_string(), "x".to_string())),
                    no_reply(),
                ),
                (
                    Screenshot::NAME,
                    Box::new(Screenshot::new(p(), std::env::temp_dir().join("never.png"))),
                    no_reply(),
                ),
            ];

            let (reply, check) = expect_reply(GetProperty::NAME, String::new());
            rows.push((
                GetProperty::NAME,
                Box::new(GetProperty::new(p(), "text".to_string(), reply)),
                check,
            ));
            let (reply, check) = expect_reply(InvokeMethod::NAME, Variant::Empty);
            rows.push((
                InvokeMethod::NAME,
                Box::new(InvokeMethod::new(p(), "toggle".to_string(), vec![], reply)),
                check,
            ));
            let (reply, check) = expect_reply(GetBoundingBox::NAME, Rect::default());
            rows.push((GetBoundingBox::NAME, Box::new(GetBoundingBox::new(p(), reply)), check));
            let (reply, check) = expect_reply(ExistsAndVisible::NAME, false);
            rows.push((
                ExistsAndVisible::NAME,
                Box::new(ExistsAndVisible::new(p(), reply)),
                check,
            ));
            let (reply, check) = expect_reply(GetChildrenNames::NAME, Vec::<String>::new());
            rows.push((
                GetChildrenNames::NAME,
                Box::new(GetChildrenNames::new(p(), reply)),
                check,
            ));
            let (reply, check) = expect_reply(GetElementInfo::NAME, ElementInfo::default());
            rows.push((GetElementInfo::NAME, Box::new(GetElementInfo::new(p(), reply)), check));
            let (reply, check) = expect_reply(ColorPick::NAME, String::new());
            rows.push((ColorPick::NAME, Box::new(ColorPick::new(p(), 1, 1, reply)), check));
            rows
        }

        #[test]
        fn test_every_command_reports_missing_item() {
            let path = ItemPath::from("main/ghost");
            let rows = all_commands(&path);
            assert_eq!(rows.len(), 17);

            for (name, command, check) in rows {
                let mut scene = MockScene::new();
                scene.add_item("main", MockNode::new("Window"));
                let state = TestState::new();
                assert_eq!(command.name(), name);

                let mut env = CommandEnvironment::new(&mut scene, &state);
                command.execute(&mut env);
                check();

                assert_eq!(
                    state.errors(),
                    vec![format!("{name}: Item not found: main/ghost")],
                    "{name} error"
                );
                assert!(scene.recorded_events().is_empty(), "{name} sent events");
                assert!(scene.history().is_empty(), "{name} touched the scene");
            }
        }
    }
}
