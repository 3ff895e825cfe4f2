#![cfg(all(unix, feature = "cli"))]

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::io::{BufRead, BufReader};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(10);

struct Running {
    child: Child,
    lines: Receiver<String>,
}

impl Running {
    fn spawn(args: &[&str]) -> Self {
        let mut child = Command::new(env!("CARGO_BIN_EXE_sigcatch"))
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("failed to spawn sigcatch");

        let stdout = child.stdout.take().unwrap();
        let (tx, lines) = mpsc::channel();
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        });

        Self { child, lines }
    }

    fn pid(&self) -> Pid {
        Pid::from_raw(self.child.id() as i32)
    }

    fn send(&self, signal: Signal) {
        kill(self.pid(), signal).expect("failed to send signal");
    }

    /// Reads lines until `expected` shows up; fails on timeout or EOF.
    fn expect_line(&self, expected: &str) {
        loop {
            match self.lines.recv_timeout(TIMEOUT) {
                Ok(line) if line == expected => return,
                Ok(_) => continue,
                Err(e) => panic!("never saw {:?}: {}", expected, e),
            }
        }
    }

    fn assert_alive(&mut self) {
        assert!(
            self.child.try_wait().unwrap().is_none(),
            "sigcatch exited after a catchable signal"
        );
    }
}

impl Drop for Running {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[test]
fn test_default_run_survives_termination_signals() {
    let mut running = Running::spawn(&[]);

    // The first heartbeat means every handler is installed.
    running.expect_line("Still here");

    for (signal, line) in [
        (Signal::SIGTERM, "Caught terminated"),
        (Signal::SIGINT, "Caught interrupt"),
        (Signal::SIGHUP, "Caught hangup"),
        (Signal::SIGQUIT, "Caught quit"),
        (Signal::SIGUSR1, "Caught user defined signal 1"),
    ] {
        running.send(signal);
        running.expect_line(line);
        running.assert_alive();
    }

    running.expect_line("Still here");
    running.assert_alive();
}

#[test]
fn test_sigkill_still_terminates() {
    let mut running = Running::spawn(&["--interval", "0.1"]);
    running.expect_line("Still here");

    running.send(Signal::SIGKILL);
    let status = running.child.wait().unwrap();
    assert!(!status.success());
}

#[test]
fn test_flags_change_output() {
    let running = Running::spawn(&[
        "--signals",
        "TERM",
        "--interval",
        "0.1",
        "--message",
        "alive",
        "--names",
    ]);
    running.expect_line("alive");

    running.send(Signal::SIGTERM);
    running.expect_line("Caught SIGTERM");
}

#[cfg(target_os = "linux")]
#[test]
fn test_fault_signals_sent_by_kill_are_caught() {
    let mut running = Running::spawn(&[]);
    running.expect_line("Still here");

    for (signal, line) in [
        (Signal::SIGBUS, "Caught bus error"),
        (Signal::SIGBUS, "Caught bus error"),
        (Signal::SIGSEGV, "Caught segmentation fault"),
        (Signal::SIGSEGV, "Caught segmentation fault"),
        (Signal::SIGILL, "Caught illegal instruction"),
        (Signal::SIGFPE, "Caught floating point exception"),
    ] {
        running.send(signal);
        running.expect_line(line);
        running.assert_alive();
    }

    running.expect_line("Still here");
    running.assert_alive();
}

#[cfg(target_os = "linux")]
#[test]
fn test_realtime_signal_is_caught() {
    let mut running = Running::spawn(&[]);
    running.expect_line("Still here");

    let number = libc::SIGRTMIN() + 1;
    let rc = unsafe { libc::kill(running.child.id() as libc::pid_t, number) };
    assert_eq!(rc, 0);

    running.expect_line(&format!("Caught signal {}", number));
    running.assert_alive();
}

#[test]
fn test_survives_closed_stdout() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_sigcatch"))
        .args(["--interval", "0.1"])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn sigcatch");

    let mut reader = BufReader::new(child.stdout.take().unwrap());
    let mut first = String::new();
    reader.read_line(&mut first).unwrap();
    assert_eq!(first.trim_end(), "Still here");
    drop(reader);

    let pid = Pid::from_raw(child.id() as i32);
    kill(pid, Signal::SIGTERM).unwrap();
    thread::sleep(Duration::from_millis(500));

    let status = child.try_wait().unwrap();
    let _ = child.kill();
    let _ = child.wait();
    assert!(status.is_none(), "sigcatch exited once stdout was closed");
}

#[test]
fn test_invalid_signal_exits_with_config_error() {
    let status = Command::new(env!("CARGO_BIN_EXE_sigcatch"))
        .args(["--signals", "SIGNOTREAL"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(1));
}

#[test]
fn test_list_prints_catalog() {
    let output = Command::new(env!("CARGO_BIN_EXE_sigcatch"))
        .arg("--list")
        .stderr(Stdio::null())
        .output()
        .unwrap();
    assert!(output.status.success());

    let text = String::from_utf8(output.stdout).unwrap();
    assert!(text.lines().any(|l| l.ends_with("\tSIGTERM\tterminated")));
    assert!(!text.contains("SIGKILL"));
}
