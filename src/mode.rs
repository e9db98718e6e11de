//! Terminal mode switching.
//!
//! Handles the canonical → non-canonical transition a probe needs so that
//! keystrokes become visible byte-by-byte instead of line-by-line, and
//! restores the original attributes when the guard is dropped.

use std::io;
use std::os::unix::io::RawFd;

use crate::error::ProbeError;

/// Owned guard over a terminal's line-discipline attributes.
///
/// `enter` saves the current attributes and switches the terminal to
/// non-canonical mode (ICANON cleared, VMIN=1, VTIME=0). Dropping the guard
/// restores the saved attributes; `restore` does the same explicitly.
///
/// The guard assumes it is the only code reconfiguring this terminal for its
/// lifetime. Attribute changes are per-device, so they affect every
/// descriptor referring to the same terminal.
pub struct TermMode {
    fd: RawFd,
    saved: libc::termios,
    restored: bool,
}

impl TermMode {
    /// Switch the terminal behind `fd` to non-canonical mode.
    ///
    /// The descriptor must stay open for the lifetime of the guard — it is
    /// needed again at restore time.
    pub fn enter(fd: RawFd) -> Result<Self, ProbeError> {
        let mut term = unsafe { std::mem::zeroed::<libc::termios>() };
        if unsafe { libc::tcgetattr(fd, &mut term) } != 0 {
            return Err(ProbeError::GetAttr {
                source: io::Error::last_os_error(),
            });
        }
        let saved = term;

        // Deliver bytes as they arrive rather than waiting for a newline.
        term.c_lflag &= !libc::ICANON;
        term.c_cc[libc::VMIN] = 1;
        term.c_cc[libc::VTIME] = 0;

        if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &term) } != 0 {
            return Err(ProbeError::SetAttr {
                source: io::Error::last_os_error(),
            });
        }

        tracing::debug!("terminal fd {} switched to non-canonical mode", fd);
        Ok(Self {
            fd,
            saved,
            restored: false,
        })
    }

    /// Restore the attributes saved at `enter` time.
    ///
    /// Safe to call more than once; only the first call writes to the
    /// terminal.
    pub fn restore(&mut self) -> Result<(), ProbeError> {
        if self.restored {
            return Ok(());
        }
        if unsafe { libc::tcsetattr(self.fd, libc::TCSANOW, &self.saved) } != 0 {
            return Err(ProbeError::SetAttr {
                source: io::Error::last_os_error(),
            });
        }
        self.restored = true;
        tracing::debug!("terminal fd {} attributes restored", self.fd);
        Ok(())
    }
}

impl Drop for TermMode {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            tracing::warn!("failed to restore terminal attributes: {}", e);
        }
    }
}
