//! Bounded retry for operations that can hit a transient lock.
//!
//! Files on the shared volume may be locked by another process that is
//! writing the same record. The open then fails with `WouldBlock`; every
//! other error is returned immediately.

use std::io;
use std::thread;

use tracing::debug;

use crate::config::RetryPolicy;

/// Outcome of [`retry_on_would_block`] when it does not succeed.
#[derive(Debug)]
pub enum RetryError {
    /// Every attempt failed with `WouldBlock`.
    Exhausted { attempts: u32 },
    /// A non-transient error.
    Io(io::Error),
}

/// Run `op` until it succeeds, fails with an error other than `WouldBlock`,
/// or `policy.max_attempts` attempts have been made. Sleeps `policy.delay()`
/// between attempts.
pub fn retry_on_would_block<T, F>(policy: &RetryPolicy, mut op: F) -> Result<T, RetryError>
where
    F: FnMut() -> io::Result<T>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                if attempt >= max_attempts {
                    return Err(RetryError::Exhausted { attempts: attempt });
                }
                debug!(attempt, max_attempts, "resource busy, retrying");
                thread::sleep(policy.delay());
                attempt += 1;
            }
            Err(err) => return Err(RetryError::Io(err)),
        }
    }
}
