//! Commands that read rendered pixels

use std::path::PathBuf;

use super::{Command, CommandEnvironment};
use crate::geometry::Point;
use crate::path::ItemPath;
use crate::reply::Reply;

/// Render an item and save the image to a file
#[derive(Debug)]
pub struct Screenshot {
    path: ItemPath,
    file_path: PathBuf,
}

impl Screenshot {
    /// Command name
    pub const NAME: &'static str = "Screenshot";

    /// Create the command
    #[must_use]
    pub const fn new(path: ItemPath, file_path: PathBuf) -> Self {
        Self { path, file_path }
    }
}

impl Command for Screenshot {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(self: Box<Self>, env: &mut CommandEnvironment<'_>) {
        let Some(item) = env.resolve(Self::NAME, &self.path) else {
            return;
        };
        if let Err(e) = env.scene().take_screenshot(&*item, &self.file_path) {
            env.report_error(format!(
                "{}: Failed to save {}: {e}",
                Self::NAME,
                self.file_path.display()
            ));
        }
    }
}

/// Color of the pixel at `(x, y)` in item coordinates, as `#rrggbb`.
///
/// Replies with the empty string when the item is missing or the position
/// lies outside it.
#[derive(Debug)]
pub struct ColorPick {
    path: ItemPath,
    x: i32,
    y: i32,
    reply: Reply<String>,
}

impl ColorPick {
    /// Command name
    pub const NAME: &'static str = "ColorPick";

    /// Create the command
    #[must_use]
    pub const fn new(path: ItemPath, x: i32, y: i32, reply: Reply<String>) -> Self {
        Self { path, x, y, reply }
    }
}

impl Command for ColorPick {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(self: Box<Self>, env: &mut CommandEnvironment<'_>) {
        let Self { path, x, y, reply } = *self;
        let Some(item) = env.resolve(Self::NAME, &path) else {
            reply.send(String::new());
            return;
        };
        let pos = Point::new(f64::from(x), f64::from(y));
        let name = match env.scene().pick_color(&*item, pos) {
            Some(color) => color.name(),
            None => {
                env.report_error(format!(
                    "{}: Position outside item: ({x}, {y}) on {path}",
                    Self::NAME
                ));
                String::new()
            }
        };
        reply.send(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Color, Rect};
    use crate::mock::{MockNode, MockScene};
    use crate::reply;
    use crate::state::TestState;

    fn scene() -> MockScene {
        let mut scene = MockScene::new();
        scene.add_item(
            "w/swatch",
            MockNode::new("Rectangle")
                .with_bounds(Rect::new(0.0, 0.0, 20.0, 20.0))
                .with_fill(Color::rgb(255, 0, 0)),
        );
        scene
    }

    fn run(scene: &mut MockScene, state: &TestState, command: impl Command + 'static) {
        let mut env = CommandEnvironment::new(scene, state);
        Box::new(command).execute(&mut env);
    }

    #[test]
    fn test_screenshot_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("swatch.png");
        let mut scene = scene();
        let state = TestState::new();
        run(
            &mut scene,
            &state,
            Screenshot::new("w/swatch".into(), file.clone()),
        );
        assert!(file.exists());
        assert!(!state.has_errors());
    }

    #[test]
    fn test_screenshot_unwritable_reports() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("missing-dir").join("shot.png");
        let mut scene = scene();
        let state = TestState::new();
        run(&mut scene, &state, Screenshot::new("w/swatch".into(), file));
        let errors = state.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Screenshot: Failed to save"));
    }

    #[test]
    fn test_color_pick() {
        let mut scene = scene();
        let state = TestState::new();
        let (tx, rx) = reply::channel(ColorPick::NAME);
        run(&mut scene, &state, ColorPick::new("w/swatch".into(), 5, 5, tx));
        assert_eq!(rx.wait().unwrap(), "#ff0000");
    }

    #[test]
    fn test_color_pick_outside_reports() {
        let mut scene = scene();
        let state = TestState::new();
        let (tx, rx) = reply::channel(ColorPick::NAME);
        run(
            &mut scene,
            &state,
            ColorPick::new("w/swatch".into(), 50, 5, tx),
        );
        assert_eq!(rx.wait().unwrap(), "");
        assert_eq!(
            state.errors(),
            vec!["ColorPick: Position outside item: (50, 5) on w/swatch"]
        );
    }

    #[test]
    fn test_color_pick_missing_item() {
        let mut scene = scene();
        let state = TestState::new();
        let (tx, rx) = reply::channel(ColorPick::NAME);
        run(&mut scene, &state, ColorPick::new("w/none".into(), 1, 1, tx));
        assert_eq!(rx.wait().unwrap(), "");
        assert_eq!(state.error_count(), 1);
    }
}
