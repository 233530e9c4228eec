//! Single-use result channels between the UI thread and a waiting caller.
//!
//! A query command owns a [`Reply`] and resolves it exactly once while it
//! executes. The caller holds the matching [`PendingReply`]. If the command
//! is dropped without resolving (the executer closed, or `execute`
//! panicked), the caller observes [`MarionetteError::Abandoned`] instead of
//! blocking forever.

use std::fmt;
use std::time::{Duration, Instant};

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tracing::debug;

use crate::result::{MarionetteError, MarionetteResult};

/// Create a connected reply pair for the named command
#[must_use]
pub fn channel<T>(command: &'static str) -> (Reply<T>, PendingReply<T>) {
    let (tx, rx) = oneshot::channel();
    (Reply { command, tx }, PendingReply { command, rx })
}

/// Producer half, owned by the command
pub struct Reply<T> {
    command: &'static str,
    tx: oneshot::Sender<T>,
}

impl<T> Reply<T> {
    /// Name of the command this reply belongs to
    #[must_use]
    pub const fn command(&self) -> &'static str {
        self.command
    }

    /// Resolve the reply.
    ///
    /// A caller that stopped waiting (timed out) is not an error.
    pub fn send(self, value: T) {
        if self.tx.send(value).is_err() {
            debug!(command = self.command, "reply receiver dropped before result");
        }
    }
}

impl<T> fmt::Debug for Reply<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reply")
            .field("command", &self.command)
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

/// Consumer half, held by the caller
pub struct PendingReply<T> {
    command: &'static str,
    rx: oneshot::Receiver<T>,
}

impl<T> PendingReply<T> {
    /// Name of the command this reply belongs to
    #[must_use]
    pub const fn command(&self) -> &'static str {
        self.command
    }

    /// Block the calling thread until the command resolves its reply.
    ///
    /// # Panics
    ///
    /// Panics if called from inside an async runtime; use
    /// [`PendingReply::recv`] there.
    pub fn wait(self) -> MarionetteResult<T> {
        let command = self.command;
        self.rx
            .blocking_recv()
            .map_err(|_| MarionetteError::Abandoned { command })
    }

    /// Block for at most `timeout`, polling every `poll_interval`
    pub fn wait_timeout(
        mut self,
        timeout: Duration,
        poll_interval: Duration,
    ) -> MarionetteResult<T> {
        let start = Instant::now();
        loop {
            match self.rx.try_recv() {
                Ok(value) => return Ok(value),
                Err(TryRecvError::Closed) => {
                    return Err(MarionetteError::Abandoned {
                        command: self.command,
                    })
                }
                Err(TryRecvError::Empty) => {}
            }
            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return Err(MarionetteError::Timeout {
                    ms: timeout.as_millis() as u64,
                });
            }
            std::thread::sleep(poll_interval.min(timeout - elapsed));
        }
    }

    /// Await the reply from async code (e.g. an RPC bridge)
    pub async fn recv(self) -> MarionetteResult<T> {
        let command = self.command;
        self.rx
            .await
            .map_err(|_| MarionetteError::Abandoned { command })
    }

    /// Take the value if it is already there
    pub fn try_take(&mut self) -> MarionetteResult<Option<T>> {
        match self.rx.try_recv() {
            Ok(value) => Ok(Some(value)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Closed) => Err(MarionetteError::Abandoned {
                command: self.command,
            }),
        }
    }
}

impl<T> fmt::Debug for PendingReply<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingReply")
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_then_wait() {
        let (reply, pending) = channel::<String>("GetProperty");
        reply.send("Hello".to_string());
        assert_eq!(pending.wait().unwrap(), "Hello");
    }

    #[test]
    fn test_wait_across_threads() {
        let (reply, pending) = channel::<u32>("ExistsAndVisible");
        let producer = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            reply.send(7);
        });
        assert_eq!(pending.wait().unwrap(), 7);
        producer.join().unwrap();
    }

    #[test]
    fn test_dropped_reply_is_abandoned() {
        let (reply, pending) = channel::<bool>("ExistsAndVisible");
        drop(reply);
        let err = pending.wait().unwrap_err();
        assert!(matches!(
            err,
            MarionetteError::Abandoned {
                command: "ExistsAndVisible"
            }
        ));
        assert!(err.is_shutdown());
    }

    #[test]
    fn test_wait_timeout_expires() {
        let (_reply, pending) = channel::<u8>("ColorPick");
        let err = pending
            .wait_timeout(Duration::from_millis(30), Duration::from_millis(5))
            .unwrap_err();
        assert!(matches!(err, MarionetteError::Timeout { ms: 30 }));
    }

    #[test]
    fn test_wait_timeout_sees_abandonment() {
        let (reply, pending) = channel::<u8>("ColorPick");
        drop(reply);
        let err = pending
            .wait_timeout(Duration::from_secs(5), Duration::from_millis(5))
            .unwrap_err();
        assert!(err.is_shutdown());
    }

    #[test]
    fn test_send_after_receiver_dropped_is_silent() {
        let (reply, pending) = channel::<u8>("GetProperty");
        drop(pending);
        reply.send(1);
    }

    #[test]
    fn test_try_take() {
        let (reply, mut pending) = channel::<u8>("GetProperty");
        assert!(pending.try_take().unwrap().is_none());
        reply.send(3);
        assert_eq!(pending.try_take().unwrap(), Some(3));
    }

    mod async_tests {
        use super::*;
        use futures::executor::block_on;

        #[test]
        fn test_recv_resolves_from_other_thread() {
            let (reply, pending) = channel::<String>("GetProperty");
            let producer = std::thread::spawn(move || reply.send("Hello".to_string()));
            assert_eq!(block_on(pending.recv()).unwrap(), "Hello");
            producer.join().unwrap();
        }

        #[test]
        fn test_recv_dropped_reply_is_abandoned() {
            let (reply, pending) = channel::<bool>("ExistsAndVisible");
            drop(reply);
            let err = block_on(pending.recv()).unwrap_err();
            assert!(matches!(
                err,
                MarionetteError::Abandoned {
                    command: "ExistsAndVisible"
                }
            ));
        }
    }
}
