//! Keystroke probing — "is input waiting right now?"
//!
//! Uses `FIONREAD` for the pending-byte count and `select()` for bounded
//! readiness waits. Operates on the raw descriptor so the count reflects the
//! kernel's input queue; no userspace read buffering happens here.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::io::{AsRawFd, FromRawFd, RawFd};
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::ProbeError;
use crate::mode::TermMode;

/// Process-global probe backing [`stdin_pending`].
///
/// Lives for the life of the process once created, so the terminal stays in
/// non-canonical mode — callers wanting deterministic restoration should hold
/// an owned [`KeyProbe`] instead.
static STDIN_PROBE: Mutex<Option<KeyProbe>> = Mutex::new(None);

/// Non-blocking keystroke detector for a terminal descriptor.
///
/// Construction switches the terminal to non-canonical mode; dropping the
/// probe restores the attributes that were in effect before.
pub struct KeyProbe {
    // Declared before `file` so restoration runs while the fd is still open.
    mode: TermMode,
    file: File,
}

impl KeyProbe {
    /// Open a probe on the process's controlling terminal.
    ///
    /// Prefers stdin (if it's a tty), falling back to `/dev/tty` — e.g. when
    /// stdin was redirected but the process still has a controlling terminal.
    pub fn open() -> Result<Self, ProbeError> {
        let file = Self::dup_stdin_if_tty()
            .or_else(|_| Self::open_tty())
            .map_err(|source| ProbeError::Open { source })?;
        // Don't leak the fd to child processes
        unsafe {
            libc::fcntl(file.as_raw_fd(), libc::F_SETFD, libc::FD_CLOEXEC);
        }
        tracing::debug!("probing terminal input on fd {}", file.as_raw_fd());
        Self::from_file(file)
    }

    /// Build a probe over an already-open terminal descriptor.
    ///
    /// Returns [`ProbeError::NotATty`] for anything that isn't a terminal
    /// device (regular files, pipes), rather than reporting a count that
    /// would mean "remaining file bytes" instead of "pending keystrokes".
    pub fn from_file(file: File) -> Result<Self, ProbeError> {
        let fd = file.as_raw_fd();
        if unsafe { libc::isatty(fd) } != 1 {
            return Err(ProbeError::NotATty);
        }
        let mode = TermMode::enter(fd)?;
        Ok(Self { mode, file })
    }

    fn open_tty() -> io::Result<File> {
        OpenOptions::new().read(true).write(true).open("/dev/tty")
    }

    fn dup_stdin_if_tty() -> io::Result<File> {
        let is_tty = unsafe { libc::isatty(libc::STDIN_FILENO) == 1 };
        if !is_tty {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "stdin is not a tty",
            ));
        }
        let fd = unsafe { libc::dup(libc::STDIN_FILENO) };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(unsafe { File::from_raw_fd(fd) })
    }

    /// Number of bytes currently queued and readable without blocking.
    ///
    /// Returns 0 when nothing is pending. Never consumes input — a later
    /// read still sees every counted byte.
    pub fn pending(&self) -> Result<usize, ProbeError> {
        let mut count: libc::c_int = 0;
        if unsafe { libc::ioctl(self.file.as_raw_fd(), libc::FIONREAD, &mut count) } != 0 {
            return Err(ProbeError::Query {
                source: io::Error::last_os_error(),
            });
        }
        Ok(count as usize)
    }

    /// Wait up to `timeout` for input to become readable.
    ///
    /// Returns `Ok(false)` on timeout. `Duration::ZERO` makes this a pure
    /// non-blocking readiness check.
    pub fn poll(&self, timeout: Duration) -> Result<bool, ProbeError> {
        let timeout_ms = timeout.as_millis().min(i32::MAX as u128) as i32;
        self.select(timeout_ms)
    }

    /// Restore the terminal attributes saved at construction time.
    ///
    /// Dropping the probe does the same; this form surfaces the error.
    pub fn restore(mut self) -> Result<(), ProbeError> {
        self.mode.restore()
    }

    /// Raw file descriptor, for external polling if needed.
    pub fn fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }

    /// Wait for readability using `select()` — reliable on macOS (unlike
    /// `poll()`).
    fn select(&self, timeout_ms: i32) -> Result<bool, ProbeError> {
        let fd = self.file.as_raw_fd();
        unsafe {
            let mut read_fds: libc::fd_set = std::mem::zeroed();
            libc::FD_ZERO(&mut read_fds);
            libc::FD_SET(fd, &mut read_fds);

            let mut tv = libc::timeval {
                tv_sec: (timeout_ms / 1000) as libc::time_t,
                tv_usec: ((timeout_ms % 1000) * 1000) as libc::suseconds_t,
            };

            loop {
                let ret = libc::select(
                    fd + 1,
                    &mut read_fds,
                    std::ptr::null_mut(),
                    std::ptr::null_mut(),
                    &mut tv,
                );
                if ret < 0 {
                    let err = io::Error::last_os_error();
                    if err.kind() == io::ErrorKind::Interrupted {
                        // EINTR: re-init fd_set (select may have clobbered it)
                        libc::FD_ZERO(&mut read_fds);
                        libc::FD_SET(fd, &mut read_fds);
                        continue;
                    }
                    return Err(ProbeError::Poll { source: err });
                }
                return Ok(ret > 0);
            }
        }
    }
}

/// Pending-byte count on the process's terminal input.
///
/// The original "key hit" contract: the first call opens a process-global
/// [`KeyProbe`] (switching the terminal to non-canonical mode for the rest of
/// the process); every call reports how many bytes are waiting. Concurrent
/// first calls are serialized, so the mode switch happens exactly once. If
/// opening fails (no terminal at all), the error is returned and the next
/// call retries.
pub fn stdin_pending() -> Result<usize, ProbeError> {
    let mut guard = STDIN_PROBE.lock();
    let probe = match &mut *guard {
        Some(probe) => probe,
        slot => slot.insert(KeyProbe::open()?),
    };
    probe.pending()
}
