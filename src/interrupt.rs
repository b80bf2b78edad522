//! Ctrl-C bookkeeping.
//!
//! SIGINT reaches the whole foreground process group, so the cracking tool
//! stops on its own. We only record that it happened, which lets the engine
//! unwind normally and drop the current mode's temp files.
use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// True once SIGINT has been received.
pub fn requested() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// Mark the run as interrupted.
pub fn request() {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

#[cfg(unix)]
extern "C" fn on_sigint(_signal: libc::c_int) {
    request();
}

/// Route SIGINT into [`requested`] instead of terminating the process.
#[cfg(unix)]
pub fn install() {
    let handler = on_sigint as extern "C" fn(libc::c_int);
    // SAFETY: the handler only stores to an atomic, which is async-signal-safe.
    let previous = unsafe { libc::signal(libc::SIGINT, handler as libc::sighandler_t) };
    if previous == libc::SIG_ERR {
        log::warn!("could not install SIGINT handler; Ctrl-C may leave temp files behind");
    }
}

#[cfg(not(unix))]
pub fn install() {}
