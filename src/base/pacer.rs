use crate::base::error::{Error, Result};
use crate::internals::OPCN3_CANCEL_POLL_INTERVAL;
use log::{debug, trace};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Shared flag used to abort a measurement in progress.
///
/// Clones share the same flag, so a clone can be moved into a signal handler or another
/// thread while the device keeps sampling on the calling thread.
///
/// # Example
/// ```ignore
/// let token = device.cancel_token();
/// std::thread::spawn(move || {
///     wait_for_shutdown_request();
///     token.cancel();
/// });
/// let frame = device.sample(flush, sample); // powers down, then returns `Failed(Cancelled)`
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    /// Requests cancellation of the current and of every later cancellable wait.
    pub fn cancel(&self) {
        debug!("Cancellation requested");
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Clears a previous cancellation request.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}

/// Sleeps on the calling thread.
///
/// `sleep` is used for protocol pacing and cannot be interrupted, so power-down sequences
/// complete even after cancellation. `wait` is used for the long flush and sampling
/// periods and returns early with `Error::Cancelled`.
#[derive(Debug, Clone, Default)]
pub struct Pacer {
    token: CancelToken,
}

impl Pacer {
    pub fn new(token: CancelToken) -> Pacer {
        Pacer { token }
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// Sleeps for `duration`, ignoring cancellation.
    pub fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }

    /// Fails with `Error::Cancelled` if cancellation has been requested.
    pub fn check(&self) -> Result<()> {
        if self.token.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Sleeps for `duration` unless cancellation is requested first.
    ///
    /// A `duration` too long to be represented as an `Instant` waits until cancelled.
    pub fn wait(&self, duration: Duration) -> Result<()> {
        trace!("Waiting {:?}", duration);
        let deadline = Instant::now().checked_add(duration);
        loop {
            self.check()?;
            let step = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Ok(());
                    }
                    (deadline - now).min(OPCN3_CANCEL_POLL_INTERVAL)
                }
                None => OPCN3_CANCEL_POLL_INTERVAL,
            };
            thread::sleep(step);
        }
    }
}
