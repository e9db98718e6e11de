//! Shared pseudo-terminal helpers for probe integration tests.

#![allow(dead_code)]

use std::fs::File;
use std::io;
use std::os::unix::io::{AsRawFd, FromRawFd};
use std::ptr;

/// A connected pty pair. Bytes written to `master` queue as input on
/// `slave`, as if typed at a keyboard.
pub struct PtyPair {
    pub master: File,
    pub slave: File,
}

/// Open a fresh pty pair with default attributes (canonical mode).
pub fn open_pty() -> io::Result<PtyPair> {
    let mut master = -1;
    let mut slave = -1;
    let rc = unsafe {
        libc::openpty(
            &mut master,
            &mut slave,
            ptr::null_mut(),
            ptr::null_mut(),
            ptr::null_mut(),
        )
    };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    unsafe {
        Ok(PtyPair {
            master: File::from_raw_fd(master),
            slave: File::from_raw_fd(slave),
        })
    }
}

/// Local-mode flags of the terminal behind `file`.
pub fn lflag(file: &File) -> libc::tcflag_t {
    let mut term = unsafe { std::mem::zeroed::<libc::termios>() };
    let rc = unsafe { libc::tcgetattr(file.as_raw_fd(), &mut term) };
    assert_eq!(rc, 0, "tcgetattr failed: {}", io::Error::last_os_error());
    term.c_lflag
}

/// True if the terminal behind `file` is in canonical (line-buffered) mode.
pub fn is_canonical(file: &File) -> bool {
    lflag(file) & libc::ICANON != 0
}
