//! The test server: runs a test script on its own thread and turns every
//! client call into a queued command.
//!
//! ```text
//! ┌────────────── test thread ──────────────┐      ┌──── UI thread ────┐
//! │ script.execute_test(&client)            │      │ loop {            │
//! │   client.set_string_property(..)  ──────┼─────►│   executer.drain()│
//! │   client.get_string_property(..)  ──────┼─────►│ }                 │
//! │        ▲ blocks on Reply ◄──────────────┼──────┤                   │
//! └─────────────────────────────────────────┘      └───────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::command::{
    ClickOnItem, ColorPick, Command, CustomCmd, DoubleClickOnItem, DragBegin, DragEnd, DragItem,
    DropFromExt, ElementInfo, EnterKey, ExistsAndVisible, GetBoundingBox, GetChildrenNames,
    GetElementInfo, GetProperty, GetTestStatus, InputText, InvokeMethod, Quit, Screenshot,
    SetProperty, Wait,
};
use crate::config::ServerConfig;
use crate::event::{EventTarget, KeyModifiers, MouseButton, PasteboardContent};
use crate::executer::{CommandExecuter, ExecuterHandle};
use crate::geometry::Rect;
use crate::path::ItemPath;
use crate::reply::{self, Reply};
use crate::result::{panic_message, MarionetteError, MarionetteResult};
use crate::variant::Variant;

/// Handler for generic commands: `(command, payload) -> response`.
///
/// Runs on the UI thread inside the command's `execute`.
pub type GenericCommandHandler = Arc<dyn Fn(&str, &str) -> String + Send + Sync>;

/// Name of the command queued by [`TestClient::generic_command`]
pub const GENERIC_COMMAND: &str = "GenericCommand";

/// User test logic run on the server's thread
pub trait TestScript: Send + 'static {
    /// Drive the application through `client`.
    ///
    /// Errors caused by shutdown (see [`MarionetteError::is_shutdown`]) are
    /// treated as a normal end of the run.
    fn execute_test(&mut self, client: &TestClient) -> MarionetteResult<()>;
}

impl<F> TestScript for F
where
    F: FnMut(&TestClient) -> MarionetteResult<()> + Send + 'static,
{
    fn execute_test(&mut self, client: &TestClient) -> MarionetteResult<()> {
        self(client)
    }
}

/// Owner of the test thread
pub struct TestServer {
    config: Arc<ServerConfig>,
    executer: Option<ExecuterHandle>,
    handler: Option<GenericCommandHandler>,
    thread: Option<JoinHandle<MarionetteResult<()>>>,
}

impl Default for TestServer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TestServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestServer")
            .field("config", &self.config)
            .field("has_executer", &self.executer.is_some())
            .field("has_handler", &self.handler.is_some())
            .field("running", &self.is_running())
            .finish()
    }
}

impl TestServer {
    /// Server with the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: Arc::new(ServerConfig::default()),
            executer: None,
            handler: None,
            thread: None,
        }
    }

    /// Server with a validated configuration
    pub fn with_config(config: ServerConfig) -> MarionetteResult<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            executer: None,
            handler: None,
            thread: None,
        })
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Bind the executer commands are queued on; required before `start`
    pub fn set_command_executer(&mut self, executer: &CommandExecuter) {
        self.executer = Some(executer.handle());
    }

    /// Bind an executer through an existing handle
    pub fn set_executer_handle(&mut self, handle: ExecuterHandle) {
        self.executer = Some(handle);
    }

    /// Install the generic command handler.
    ///
    /// Clients created afterwards (including the one handed to the script
    /// by `start`) use it.
    pub fn set_generic_command_handler<F>(&mut self, handler: F)
    where
        F: Fn(&str, &str) -> String + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
    }

    /// A client bound to this server's executer
    pub fn client(&self) -> MarionetteResult<TestClient> {
        let executer = self.executer.clone().ok_or(MarionetteError::NoExecuter)?;
        Ok(TestClient {
            executer,
            handler: self.handler.clone(),
            config: Arc::clone(&self.config),
        })
    }

    /// Spawn the test thread running `script`
    pub fn start<S: TestScript>(&mut self, mut script: S) -> MarionetteResult<()> {
        if self.thread.is_some() {
            return Err(MarionetteError::AlreadyStarted);
        }
        let client = self.client()?;
        let handle = std::thread::Builder::new()
            .name(self.config.thread_name.clone())
            .spawn(move || {
                let result = script.execute_test(&client);
                match &result {
                    Ok(()) => debug!("test script finished"),
                    Err(e) if e.is_shutdown() => debug!(error = %e, "test script ended by shutdown"),
                    Err(e) => warn!(error = %e, "test script failed"),
                }
                result
            })
            .map_err(MarionetteError::ThreadSpawn)?;
        info!(thread = %self.config.thread_name, "test server started");
        self.thread = Some(handle);
        Ok(())
    }

    /// Whether the test thread is still running
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Wait for the test thread and return the script's outcome.
    ///
    /// Shutdown errors are mapped to `Ok`. Joining a server that was never
    /// started is a no-op. The UI thread must keep draining while the
    /// script still waits on replies.
    pub fn join(&mut self) -> MarionetteResult<()> {
        let Some(handle) = self.thread.take() else {
            return Ok(());
        };
        let outcome = handle
            .join()
            .map_err(|payload| MarionetteError::TestThreadPanicked {
                message: panic_message(&*payload),
            })?;
        info!(thread = %self.config.thread_name, "test thread joined");
        match outcome {
            Err(e) if e.is_shutdown() => Ok(()),
            other => other,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if self.thread.is_some() {
            if let Err(e) = self.join() {
                warn!(error = %e, "test thread ended with an error");
            }
        }
    }
}

/// Command surface handed to test scripts; cheap to clone
#[derive(Clone)]
pub struct TestClient {
    executer: ExecuterHandle,
    handler: Option<GenericCommandHandler>,
    config: Arc<ServerConfig>,
}

impl std::fmt::Debug for TestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestClient")
            .field("executer", &self.executer)
            .field("has_handler", &self.handler.is_some())
            .finish_non_exhaustive()
    }
}

impl TestClient {
    fn submit<C: Command + 'static>(&self, command: C) -> MarionetteResult<()> {
        if self.config.log_commands {
            info!(command = command.name(), "queueing command");
        }
        self.executer.enqueue(Box::new(command))
    }

    fn query<T, C>(
        &self,
        name: &'static str,
        build: impl FnOnce(Reply<T>) -> C,
    ) -> MarionetteResult<T>
    where
        C: Command + 'static,
    {
        let (reply, pending) = reply::channel(name);
        self.submit(build(reply))?;
        match self.config.reply_timeout() {
            Some(timeout) => pending.wait_timeout(timeout, self.config.poll_interval()),
            None => pending.wait(),
        }
    }

    /// Queue an arbitrary command built by the embedder
    pub fn submit_custom(&self, command: CustomCmd) -> MarionetteResult<()> {
        self.submit(command)
    }

    /// Pause the UI thread for `duration`
    pub fn wait(&self, duration: Duration) -> MarionetteResult<()> {
        self.submit(Wait::new(duration))
    }

    /// Left click the center of an item
    pub fn mouse_click(
        &self,
        path: impl Into<ItemPath>,
        event_to_item: bool,
    ) -> MarionetteResult<()> {
        self.mouse_click_button(path, MouseButton::Left, event_to_item)
    }

    /// Click the center of an item with `button`
    pub fn mouse_click_button(
        &self,
        path: impl Into<ItemPath>,
        button: MouseButton,
        event_to_item: bool,
    ) -> MarionetteResult<()> {
        self.submit(ClickOnItem::new(
            path.into(),
            button,
            EventTarget::from_event_to_item(event_to_item),
        ))
    }

    /// Double click the center of an item
    pub fn mouse_double_click(
        &self,
        path: impl Into<ItemPath>,
        event_to_item: bool,
    ) -> MarionetteResult<()> {
        self.submit(DoubleClickOnItem::new(
            path.into(),
            EventTarget::from_event_to_item(event_to_item),
        ))
    }

    /// Press the left button on an item and hold it
    pub fn mouse_begin_drag(&self, path: impl Into<ItemPath>) -> MarionetteResult<()> {
        self.submit(DragBegin::new(path.into()))
    }

    /// Release the held button over an item
    pub fn mouse_end_drag(&self, path: impl Into<ItemPath>) -> MarionetteResult<()> {
        self.submit(DragEnd::new(path.into()))
    }

    /// Drag an item by `(x, y)` from its center
    pub fn drag_item(&self, path: impl Into<ItemPath>, x: i32, y: i32) -> MarionetteResult<()> {
        self.submit(DragItem::new(path.into(), x, y))
    }

    /// Drop URLs onto an item as if dragged in from outside
    pub fn mouse_drop_urls<I, S>(&self, path: impl Into<ItemPath>, urls: I) -> MarionetteResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.submit(DropFromExt::new(
            path.into(),
            PasteboardContent::with_urls(urls),
        ))
    }

    /// Run the generic command handler on the UI thread
    pub fn generic_command(
        &self,
        command: impl Into<String>,
        payload: impl Into<String>,
    ) -> MarionetteResult<String> {
        let handler = self
            .handler
            .clone()
            .ok_or_else(|| MarionetteError::config("no generic command handler set"))?;
        let (command, payload) = (command.into(), payload.into());
        self.query(GENERIC_COMMAND, move |reply| {
            CustomCmd::new(GENERIC_COMMAND, move |_| {
                reply.send(handler(&command, &payload));
            })
        })
    }

    /// Type text into an item
    pub fn input_text(
        &self,
        path: impl Into<ItemPath>,
        text: impl Into<String>,
    ) -> MarionetteResult<()> {
        self.submit(InputText::new(path.into(), text.into()))
    }

    /// Press and release a key on an item
    pub fn enter_key(
        &self,
        path: impl Into<ItemPath>,
        key_code: i32,
        modifiers: KeyModifiers,
    ) -> MarionetteResult<()> {
        self.submit(EnterKey::new(path.into(), key_code, modifiers))
    }

    /// Read a property as a string
    pub fn get_string_property(
        &self,
        path: impl Into<ItemPath>,
        property: impl Into<String>,
    ) -> MarionetteResult<String> {
        let (path, property) = (path.into(), property.into());
        self.query(GetProperty::NAME, |reply| {
            GetProperty::new(path, property, reply)
        })
    }

    /// Write a property from a string
    pub fn set_string_property(
        &self,
        path: impl Into<ItemPath>,
        property: impl Into<String>,
        value: impl Into<String>,
    ) -> MarionetteResult<()> {
        self.submit(SetProperty::new(path.into(), property.into(), value.into()))
    }

    /// Invoke a method and return its result
    pub fn invoke_method(
        &self,
        path: impl Into<ItemPath>,
        method: impl Into<String>,
        args: Vec<Variant>,
    ) -> MarionetteResult<Variant> {
        let (path, method) = (path.into(), method.into());
        self.query(InvokeMethod::NAME, |reply| {
            InvokeMethod::new(path, method, args, reply)
        })
    }

    /// Bounding box of an item in scene coordinates
    pub fn get_bounding_box(&self, path: impl Into<ItemPath>) -> MarionetteResult<Rect> {
        let path = path.into();
        self.query(GetBoundingBox::NAME, |reply| {
            GetBoundingBox::new(path, reply)
        })
    }

    /// Whether an item exists and is visible
    pub fn exists_and_visible(&self, path: impl Into<ItemPath>) -> MarionetteResult<bool> {
        let path = path.into();
        self.query(ExistsAndVisible::NAME, |reply| {
            ExistsAndVisible::new(path, reply)
        })
    }

    /// Drain and return the errors reported since the last call
    pub fn get_errors(&self) -> MarionetteResult<Vec<String>> {
        self.query(GetTestStatus::NAME, |reply| GetTestStatus::new(true, reply))
    }

    /// Errors reported so far, without draining them
    pub fn peek_errors(&self) -> MarionetteResult<Vec<String>> {
        self.query(GetTestStatus::NAME, |reply| {
            GetTestStatus::new(false, reply)
        })
    }

    /// Render an item into an image file
    pub fn take_screenshot(
        &self,
        path: impl Into<ItemPath>,
        file_path: impl Into<PathBuf>,
    ) -> MarionetteResult<()> {
        self.submit(Screenshot::new(path.into(), file_path.into()))
    }

    /// Color at `(x, y)` in item coordinates, as `#rrggbb`
    pub fn pick_color_at(
        &self,
        path: impl Into<ItemPath>,
        x: i32,
        y: i32,
    ) -> MarionetteResult<String> {
        let path = path.into();
        self.query(ColorPick::NAME, |reply| ColorPick::new(path, x, y, reply))
    }

    /// Object names of an item's direct children
    pub fn get_children_names(&self, path: impl Into<ItemPath>) -> MarionetteResult<Vec<String>> {
        let path = path.into();
        self.query(GetChildrenNames::NAME, |reply| {
            GetChildrenNames::new(path, reply)
        })
    }

    /// Summary of an item
    pub fn get_element_info(&self, path: impl Into<ItemPath>) -> MarionetteResult<ElementInfo> {
        let path = path.into();
        self.query(GetElementInfo::NAME, |reply| {
            GetElementInfo::new(path, reply)
        })
    }

    /// Quit the application; later calls fail with a shutdown error
    pub fn quit(&self) -> MarionetteResult<()> {
        info!("quit requested by test script");
        self.submit(Quit)
    }
}
