//! The command queue and its UI-thread drain loop.
//!
//! Any thread may enqueue through an [`ExecuterHandle`]. Only the thread
//! that owns the [`Scene`] calls [`CommandExecuter::drain`], typically once
//! per frame or event-loop iteration.
//!
//! ```text
//! test thread ──enqueue──► [ FIFO queue ] ──drain (UI thread)──► Scene
//!      ▲                                          │
//!      └────────────── Reply (oneshot) ◄──────────┘
//! ```

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, error, trace};

use crate::command::{Command, CommandEnvironment};
use crate::result::{panic_message, MarionetteError, MarionetteResult};
use crate::scene::Scene;
use crate::state::TestState;

#[derive(Default)]
struct Queue {
    pending: VecDeque<Box<dyn Command>>,
    closed: bool,
}

#[derive(Default)]
struct Shared {
    queue: Mutex<Queue>,
    available: Condvar,
}

impl Shared {
    /// Mark closed and drop everything still queued
    fn close(&self) -> usize {
        let dropped = {
            let mut queue = self.queue.lock();
            queue.closed = true;
            std::mem::take(&mut queue.pending)
        };
        self.available.notify_all();
        // Replies are abandoned outside the lock
        let count = dropped.len();
        drop(dropped);
        count
    }
}

/// Outcome of one [`CommandExecuter::drain`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Commands whose `execute` ran (including ones that panicked)
    pub executed: usize,
    /// Commands whose `execute` panicked
    pub panicked: usize,
    /// Commands left queued because the head was not ready
    pub deferred: usize,
    /// Commands discarded because the executer closed
    pub dropped: usize,
    /// A quit command ran
    pub quit: bool,
}

impl DrainReport {
    /// Whether the host loop should keep draining
    #[must_use]
    pub const fn should_continue(&self) -> bool {
        !self.quit
    }

    fn absorb(&mut self, other: Self) {
        self.executed += other.executed;
        self.panicked += other.panicked;
        self.deferred = other.deferred;
        self.dropped += other.dropped;
        self.quit |= other.quit;
    }
}

/// Owner of the command queue, drained on the UI thread.
///
/// Dropping the executer closes it: queued commands are discarded and
/// their callers observe [`MarionetteError::Abandoned`].
pub struct CommandExecuter {
    shared: Arc<Shared>,
    drain_lock: Mutex<()>,
}

impl Default for CommandExecuter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CommandExecuter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let queue = self.shared.queue.lock();
        f.debug_struct("CommandExecuter")
            .field("pending", &queue.pending.len())
            .field("closed", &queue.closed)
            .finish()
    }
}

impl CommandExecuter {
    /// Create an open executer with an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared::default()),
            drain_lock: Mutex::new(()),
        }
    }

    /// Cloneable producer handle for other threads
    #[must_use]
    pub fn handle(&self) -> ExecuterHandle {
        ExecuterHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Queue a command from the owning thread
    pub fn enqueue(&self, command: Box<dyn Command>) -> MarionetteResult<()> {
        self.handle().enqueue(command)
    }

    /// Number of queued commands
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.shared.queue.lock().pending.len()
    }

    /// Whether the executer refuses new commands
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.queue.lock().closed
    }

    /// Refuse new commands and discard the queued ones
    pub fn close(&self) {
        let dropped = self.shared.close();
        if dropped > 0 {
            debug!(dropped, "executer closed with queued commands");
        }
    }

    /// Execute queued commands in FIFO order.
    ///
    /// The current queue contents form one batch; commands enqueued while
    /// the batch runs wait for the next drain. If a command is not ready,
    /// it and everything behind it go back to the front of the queue ahead
    /// of newer commands. A panicking command is reported to `state` and
    /// the batch continues. A quit closes the executer and drops the rest.
    ///
    /// Calls made while another drain is running return an empty report.
    pub fn drain(&self, scene: &mut dyn Scene, state: &TestState) -> DrainReport {
        let mut report = DrainReport::default();
        let Some(_guard) = self.drain_lock.try_lock() else {
            debug!("drain already in progress");
            return report;
        };

        let mut batch = std::mem::take(&mut self.shared.queue.lock().pending);
        if batch.is_empty() {
            return report;
        }
        trace!(batch = batch.len(), "draining commands");

        while let Some(command) = batch.pop_front() {
            if !command.can_execute_now() {
                batch.push_front(command);
                report.deferred = batch.len();
                self.requeue_front(batch);
                break;
            }

            let name = command.name();
            let mut env = CommandEnvironment::new(&mut *scene, state);
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| command.execute(&mut env)));
            report.executed += 1;

            if let Err(payload) = outcome {
                report.panicked += 1;
                let message = panic_message(&*payload);
                error!(command = name, %message, "command panicked");
                state.report_error(format!("{name}: Command panicked: {message}"));
            }

            if env.quit_requested() {
                report.quit = true;
                report.dropped = batch.len() + self.shared.close();
                debug!(dropped = report.dropped, "quit requested, executer closed");
                break;
            }
        }
        report
    }

    fn requeue_front(&self, mut batch: VecDeque<Box<dyn Command>>) {
        let mut queue = self.shared.queue.lock();
        if queue.closed {
            drop(queue);
            return;
        }
        batch.append(&mut queue.pending);
        queue.pending = batch;
    }

    /// Block until a command is queued, the executer closes, or `timeout`
    /// elapses. Returns whether commands are pending.
    pub fn wait_for_commands(&self, timeout: Duration) -> bool {
        let mut queue = self.shared.queue.lock();
        if queue.pending.is_empty() && !queue.closed {
            let _ = self.shared.available.wait_for(&mut queue, timeout);
        }
        !queue.pending.is_empty()
    }

    /// Host loop for embedders without their own event loop: wait and
    /// drain until a quit runs or the executer is closed and empty.
    pub fn run_until_quit(
        &self,
        scene: &mut dyn Scene,
        state: &TestState,
        tick: Duration,
    ) -> DrainReport {
        let mut total = DrainReport::default();
        loop {
            if !self.wait_for_commands(tick) {
                if self.is_closed() {
                    break;
                }
                continue;
            }
            let report = self.drain(scene, state);
            total.absorb(report);
            if !report.should_continue() {
                break;
            }
            if report.deferred > 0 {
                std::thread::sleep(tick);
            }
        }
        total
    }
}

impl Drop for CommandExecuter {
    fn drop(&mut self) {
        self.shared.close();
    }
}

/// Producer side of the queue; cheap to clone and `Send`
#[derive(Clone)]
pub struct ExecuterHandle {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for ExecuterHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecuterHandle")
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl ExecuterHandle {
    /// Queue a boxed command.
    ///
    /// Fails with [`MarionetteError::ExecuterClosed`] once the executer is
    /// closed; the command is dropped and any reply it owns is abandoned.
    pub fn enqueue(&self, command: Box<dyn Command>) -> MarionetteResult<()> {
        let name = command.name();
        {
            let mut queue = self.shared.queue.lock();
            if queue.closed {
                drop(queue);
                drop(command);
                return Err(MarionetteError::ExecuterClosed { command: name });
            }
            queue.pending.push_back(command);
        }
        trace!(command = name, "command enqueued");
        self.shared.available.notify_one();
        Ok(())
    }

    /// Queue a command by value
    pub fn enqueue_command<C: Command + 'static>(&self, command: C) -> MarionetteResult<()> {
        self.enqueue(Box::new(command))
    }

    /// Number of queued commands
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.shared.queue.lock().pending.len()
    }

    /// Whether the executer refuses new commands
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.queue.lock().closed
    }
}
