//! Commands that steer the run rather than a single item

use std::fmt;
use std::time::Duration;

use super::{Command, CommandEnvironment};
use crate::reply::Reply;

/// Pause the executer for a fixed duration.
///
/// The sleep happens on the thread that drains the queue, so nothing else
/// executes meanwhile.
#[derive(Debug)]
pub struct Wait {
    duration: Duration,
}

impl Wait {
    /// Command name
    pub const NAME: &'static str = "Wait";

    /// Create the command
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl Command for Wait {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(self: Box<Self>, _env: &mut CommandEnvironment<'_>) {
        std::thread::sleep(self.duration);
    }
}

/// Ask the application to quit and close the executer
#[derive(Debug, Default)]
pub struct Quit;

impl Quit {
    /// Command name
    pub const NAME: &'static str = "Quit";
}

impl Command for Quit {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(self: Box<Self>, env: &mut CommandEnvironment<'_>) {
        env.scene().quit();
        env.request_quit();
    }
}

/// Errors reported so far.
///
/// With `clear` set the log is drained, otherwise a snapshot is returned.
#[derive(Debug)]
pub struct GetTestStatus {
    clear: bool,
    reply: Reply<Vec<String>>,
}

impl GetTestStatus {
    /// Command name
    pub const NAME: &'static str = "GetTestStatus";

    /// Create the command
    #[must_use]
    pub const fn new(clear: bool, reply: Reply<Vec<String>>) -> Self {
        Self { clear, reply }
    }
}

impl Command for GetTestStatus {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(self: Box<Self>, env: &mut CommandEnvironment<'_>) {
        let errors = if self.clear {
            env.state().take_errors()
        } else {
            env.state().errors()
        };
        self.reply.send(errors);
    }
}

type Body = Box<dyn FnOnce(&mut CommandEnvironment<'_>) + Send>;
type Readiness = Box<dyn Fn() -> bool + Send>;

/// A command built from closures.
///
/// Used for generic string commands and by embedders that need a one-off
/// operation on the UI thread.
pub struct CustomCmd {
    name: &'static str,
    body: Body,
    ready: Readiness,
}

impl CustomCmd {
    /// Command that is always ready
    pub fn new<F>(name: &'static str, body: F) -> Self
    where
        F: FnOnce(&mut CommandEnvironment<'_>) + Send + 'static,
    {
        Self {
            name,
            body: Box::new(body),
            ready: Box::new(|| true),
        }
    }

    /// Defer execution until `ready` returns true
    #[must_use]
    pub fn with_readiness<R>(mut self, ready: R) -> Self
    where
        R: Fn() -> bool + Send + 'static,
    {
        self.ready = Box::new(ready);
        self
    }
}

impl fmt::Debug for CustomCmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomCmd")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Command for CustomCmd {
    fn name(&self) -> &'static str {
        self.name
    }

    fn can_execute_now(&self) -> bool {
        (self.ready)()
    }

    fn execute(self: Box<Self>, env: &mut CommandEnvironment<'_>) {
        (self.body)(env);
    }
}
