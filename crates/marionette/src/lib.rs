//! Marionette: remote-control a live GUI scene from a test thread
//!
//! Test logic runs on its own thread and talks to the application through a
//! [`TestClient`]. Every call becomes a [`Command`] queued on a
//! [`CommandExecuter`], which the UI thread drains between frames. Queries
//! block the test thread on a single-use [`Reply`] until the UI thread has
//! run them, so a script reads UI state synchronously while only the UI
//! thread ever touches the scene.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  MARIONETTE Architecture                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ TestServer │    │ Command    │    │ Scene      │            │
//! │   │ (test      │───►│ Executer   │───►│ (UI        │            │
//! │   │  thread)   │    │ FIFO queue │    │  thread)   │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! │         ▲                                   │                   │
//! │         └──────────── Reply ◄───────────────┘                   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Items that do not resolve are never hard failures: the command records
//! `"<Command>: Item not found: <path>"` in the [`TestState`] and replies
//! with a default. Scripts collect those with [`TestClient::get_errors`].
//!
//! # Example
//!
//! ```no_run
//! use marionette::mock::{MockNode, MockScene};
//! use marionette::{CommandExecuter, MarionetteResult, TestClient, TestServer, TestState};
//! use std::time::Duration;
//!
//! # fn main() -> MarionetteResult<()> {
//! let executer = CommandExecuter::new();
//! let mut server = TestServer::new();
//! server.set_command_executer(&executer);
//! server.start(|client: &TestClient| -> MarionetteResult<()> {
//!     client.set_string_property("main/title", "text", "Hello")?;
//!     assert_eq!(client.get_string_property("main/title", "text")?, "Hello");
//!     client.quit()
//! })?;
//!
//! let mut scene = MockScene::new();
//! scene.add_item("main/title", MockNode::new("Text"));
//! let state = TestState::new();
//! executer.run_until_quit(&mut scene, &state, Duration::from_millis(10));
//! server.join()
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

/// Concrete commands and the [`Command`] trait
pub mod command;
mod config;
mod event;
mod executer;
mod geometry;
/// Tracing subscriber helpers
pub mod logging;
/// In-memory scene for tests
pub mod mock;
mod path;
/// Single-use reply channels
pub mod reply;
mod result;
mod scene;
mod server;
mod state;
mod variant;

pub use command::{Command, CommandEnvironment, CustomCmd, ElementInfo};
pub use config::{ServerConfig, DEFAULT_POLL_INTERVAL_MS, DEFAULT_THREAD_NAME};
pub use event::{EventTarget, InputEvent, KeyModifiers, MouseButton, PasteboardContent};
pub use executer::{CommandExecuter, DrainReport, ExecuterHandle};
pub use geometry::{Color, Point, Rect, Size};
pub use path::{ItemPath, SEPARATOR};
pub use reply::{PendingReply, Reply};
pub use result::{MarionetteError, MarionetteResult};
pub use scene::{Item, Scene};
pub use server::{GenericCommandHandler, TestClient, TestScript, TestServer, GENERIC_COMMAND};
pub use state::TestState;
pub use variant::Variant;

/// Property-based testing strategies
#[cfg(any(test, feature = "proptest"))]
pub use variant::strategies;
