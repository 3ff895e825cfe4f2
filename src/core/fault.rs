//! Handlers for SIGILL, SIGFPE, SIGSEGV and SIGBUS. tokio refuses to install
//! these, so they go through signal-hook-registry directly. A delivery sent
//! with kill(2) is forwarded like any other signal; a real fault restores the
//! default action so the faulting instruction terminates the process.

use crate::domain::model::CaughtSignal;
use crate::domain::signals::name_of;
use crate::utils::error::{Result, WatchError};
use libc::c_int;
use signal_hook_registry::SigId;
use std::collections::BTreeSet;
use std::os::unix::io::AsRawFd;
use std::os::unix::net::UnixStream;
use std::sync::{Arc, Mutex};
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

// Signals whose inherited handler has already been dropped in this process.
static CLEARED: Mutex<BTreeSet<c_int>> = Mutex::new(BTreeSet::new());

#[derive(Debug)]
pub struct FaultCatcher {
    ids: Vec<SigId>,
    reader: JoinHandle<()>,
}

impl FaultCatcher {
    pub fn register(numbers: &[c_int], tx: UnboundedSender<CaughtSignal>) -> Result<Self> {
        let (reader, writer) = UnixStream::pair()?;
        reader.set_nonblocking(true)?;
        writer.set_nonblocking(true)?;
        let writer = Arc::new(writer);

        let mut ids = Vec::with_capacity(numbers.len());
        for &number in numbers {
            clear_inherited_handler(number)?;
            let writer = writer.clone();
            // SAFETY: the action only reads siginfo and calls write(2) or
            // signal(2), both async-signal-safe.
            let id = unsafe {
                signal_hook_registry::register_unchecked(number, move |info: &libc::siginfo_t| {
                    forward_or_fault(number, info, &writer)
                })
            }
            .map_err(|source| WatchError::Registration {
                signal: name_of(number),
                source,
            })?;
            ids.push(id);
        }

        let mut reader = tokio::net::UnixStream::from_std(reader)?;
        let reader = tokio::spawn(async move {
            let mut buf = [0u8; 64];
            loop {
                match reader.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        for &byte in &buf[..n] {
                            if tx.send(CaughtSignal::new(c_int::from(byte))).is_err() {
                                return;
                            }
                        }
                    }
                }
            }
        });

        Ok(Self { ids, reader })
    }

    pub fn abort(&mut self) {
        for id in self.ids.drain(..) {
            signal_hook_registry::unregister(id);
        }
        self.reader.abort();
    }
}

impl Drop for FaultCatcher {
    fn drop(&mut self) {
        self.abort();
    }
}

fn forward_or_fault(number: c_int, info: &libc::siginfo_t, writer: &UnixStream) {
    // si_code <= 0: SI_USER, SI_QUEUE, SI_TKILL. Anything positive comes
    // from the kernel.
    if info.si_code <= 0 {
        let byte = number as u8;
        unsafe {
            libc::write(
                writer.as_raw_fd(),
                &byte as *const u8 as *const libc::c_void,
                1,
            );
        }
    } else {
        unsafe {
            libc::signal(number, libc::SIG_DFL);
        }
    }
}

/// std installs its stack overflow handler on SIGSEGV and SIGBUS. The
/// registry would chain to it, and it resets the action to SIG_DFL on any
/// fault outside a guard page, so the second delivery would kill us.
fn clear_inherited_handler(number: c_int) -> Result<()> {
    if number != libc::SIGSEGV && number != libc::SIGBUS {
        return Ok(());
    }

    let mut cleared = CLEARED.lock().unwrap_or_else(|e| e.into_inner());
    if !cleared.insert(number) {
        return Ok(());
    }

    // SAFETY: plain sigaction(2) with a zeroed struct and SIG_DFL.
    let rc = unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = libc::SIG_DFL;
        libc::sigaction(number, &action, std::ptr::null_mut())
    };
    if rc != 0 {
        cleared.remove(&number);
        return Err(WatchError::Registration {
            signal: name_of(number),
            source: std::io::Error::last_os_error(),
        });
    }
    Ok(())
}
