//! Signal catalog: names, descriptions and the selectors users write on the
//! command line or in a config file.

use crate::utils::error::{Result, WatchError};
use libc::c_int;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SignalInfo {
    pub number: c_int,
    pub name: &'static str,
    pub description: &'static str,
}

const fn info(number: c_int, name: &'static str, description: &'static str) -> SignalInfo {
    SignalInfo {
        number,
        name,
        description,
    }
}

#[cfg(unix)]
const NAMED: &[SignalInfo] = &[
    info(libc::SIGHUP, "SIGHUP", "hangup"),
    info(libc::SIGINT, "SIGINT", "interrupt"),
    info(libc::SIGQUIT, "SIGQUIT", "quit"),
    info(libc::SIGILL, "SIGILL", "illegal instruction"),
    info(libc::SIGTRAP, "SIGTRAP", "trace/breakpoint trap"),
    info(libc::SIGABRT, "SIGABRT", "aborted"),
    info(libc::SIGBUS, "SIGBUS", "bus error"),
    info(libc::SIGFPE, "SIGFPE", "floating point exception"),
    info(libc::SIGKILL, "SIGKILL", "killed"),
    info(libc::SIGUSR1, "SIGUSR1", "user defined signal 1"),
    info(libc::SIGSEGV, "SIGSEGV", "segmentation fault"),
    info(libc::SIGUSR2, "SIGUSR2", "user defined signal 2"),
    info(libc::SIGPIPE, "SIGPIPE", "broken pipe"),
    info(libc::SIGALRM, "SIGALRM", "alarm clock"),
    info(libc::SIGTERM, "SIGTERM", "terminated"),
    #[cfg(target_os = "linux")]
    info(libc::SIGSTKFLT, "SIGSTKFLT", "stack fault"),
    info(libc::SIGCHLD, "SIGCHLD", "child exited"),
    info(libc::SIGCONT, "SIGCONT", "continued"),
    info(libc::SIGSTOP, "SIGSTOP", "stopped (signal)"),
    info(libc::SIGTSTP, "SIGTSTP", "stopped"),
    info(libc::SIGTTIN, "SIGTTIN", "stopped (tty input)"),
    info(libc::SIGTTOU, "SIGTTOU", "stopped (tty output)"),
    info(libc::SIGURG, "SIGURG", "urgent I/O condition"),
    info(libc::SIGXCPU, "SIGXCPU", "CPU time limit exceeded"),
    info(libc::SIGXFSZ, "SIGXFSZ", "file size limit exceeded"),
    info(libc::SIGVTALRM, "SIGVTALRM", "virtual timer expired"),
    info(libc::SIGPROF, "SIGPROF", "profiling timer expired"),
    info(libc::SIGWINCH, "SIGWINCH", "window changed"),
    info(libc::SIGIO, "SIGIO", "I/O possible"),
    #[cfg(target_os = "linux")]
    info(libc::SIGPWR, "SIGPWR", "power failure"),
    info(libc::SIGSYS, "SIGSYS", "bad system call"),
];

#[cfg(not(unix))]
const NAMED: &[SignalInfo] = &[info(libc::SIGINT, "SIGINT", "interrupt")];

/// Signals the kernel refuses to hand to a handler.
#[cfg(target_os = "linux")]
const UNCATCHABLE: &[c_int] = &[libc::SIGKILL, libc::SIGSTOP];

// Without siginfo codes to tell kill(2) from a real fault, a returning
// handler would re-run the faulting instruction forever.
#[cfg(all(unix, not(target_os = "linux")))]
const UNCATCHABLE: &[c_int] = &[
    libc::SIGKILL,
    libc::SIGSTOP,
    libc::SIGILL,
    libc::SIGFPE,
    libc::SIGSEGV,
    libc::SIGBUS,
];

#[cfg(not(unix))]
const UNCATCHABLE: &[c_int] = &[];

/// Synchronous fault signals. Only deliveries sent from another process
/// are reported; a real fault still terminates.
#[cfg(target_os = "linux")]
const FAULT: &[c_int] = &[libc::SIGILL, libc::SIGFPE, libc::SIGSEGV, libc::SIGBUS];

#[cfg(not(target_os = "linux"))]
const FAULT: &[c_int] = &[];

#[cfg(target_os = "linux")]
fn realtime_range() -> Option<(c_int, c_int)> {
    Some((libc::SIGRTMIN(), libc::SIGRTMAX()))
}

#[cfg(not(target_os = "linux"))]
fn realtime_range() -> Option<(c_int, c_int)> {
    None
}

pub fn info_of(number: c_int) -> Option<&'static SignalInfo> {
    NAMED.iter().find(|s| s.number == number)
}

pub fn is_uncatchable(number: c_int) -> bool {
    UNCATCHABLE.contains(&number)
}

pub fn is_fault(number: c_int) -> bool {
    FAULT.contains(&number)
}

fn is_realtime(number: c_int) -> bool {
    realtime_range().is_some_and(|(min, max)| (min..=max).contains(&number))
}

pub fn is_known(number: c_int) -> bool {
    info_of(number).is_some() || is_realtime(number)
}

/// 取得標準名稱，例如 `SIGTERM` 或 `SIGRTMIN+2`
pub fn name_of(number: c_int) -> String {
    if let Some(info) = info_of(number) {
        return info.name.to_string();
    }
    match realtime_range() {
        Some((min, _)) if number == min => "SIGRTMIN".to_string(),
        Some((min, max)) if number > min && number <= max => {
            format!("SIGRTMIN+{}", number - min)
        }
        _ => format!("SIG{}", number),
    }
}

/// 取得 strsignal 風格的說明文字
pub fn describe(number: c_int) -> String {
    match info_of(number) {
        Some(info) => info.description.to_string(),
        None => format!("signal {}", number),
    }
}

/// Canonical name to number. Accepts `SIGTERM`, `TERM`, `sigterm`,
/// `RTMIN+3` and `SIGRTMAX-1`.
pub fn lookup(name: &str) -> Option<c_int> {
    let upper = name.trim().to_ascii_uppercase();
    let bare = upper.strip_prefix("SIG").unwrap_or(&upper);

    if let Some(rest) = bare.strip_prefix("RTMIN") {
        let (min, max) = realtime_range()?;
        let number = min.checked_add(parse_offset(rest, '+')?)?;
        return (number <= max).then_some(number);
    }
    if let Some(rest) = bare.strip_prefix("RTMAX") {
        let (min, max) = realtime_range()?;
        let number = max.checked_sub(parse_offset(rest, '-')?)?;
        return (number >= min).then_some(number);
    }

    NAMED
        .iter()
        .find(|s| s.name.strip_prefix("SIG") == Some(bare))
        .map(|s| s.number)
}

fn parse_offset(rest: &str, sign: char) -> Option<c_int> {
    if rest.is_empty() {
        return Some(0);
    }
    rest.strip_prefix(sign)?.parse::<c_int>().ok().filter(|n| *n >= 0)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalSelector {
    All,
    Number(c_int),
}

impl FromStr for SignalSelector {
    type Err = WatchError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(SignalSelector::All);
        }
        if let Ok(number) = trimmed.parse::<c_int>() {
            if is_known(number) {
                return Ok(SignalSelector::Number(number));
            }
            return Err(WatchError::UnknownSignal {
                name: trimmed.to_string(),
            });
        }
        lookup(trimmed)
            .map(SignalSelector::Number)
            .ok_or_else(|| WatchError::UnknownSignal {
                name: trimmed.to_string(),
            })
    }
}

/// Ordered, de-duplicated set of raw signal numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalSet {
    numbers: BTreeSet<c_int>,
}

impl SignalSet {
    /// Every signal a handler may be installed for on this platform.
    pub fn catchable() -> Self {
        let mut numbers: BTreeSet<c_int> = NAMED
            .iter()
            .map(|s| s.number)
            .filter(|n| !is_uncatchable(*n))
            .collect();
        if let Some((min, max)) = realtime_range() {
            numbers.extend(min..=max);
        }
        Self { numbers }
    }

    /// 展開 include / exclude 清單
    pub fn resolve<I, E>(include: I, exclude: E) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let mut numbers = BTreeSet::new();
        for entry in include {
            match entry.as_ref().parse::<SignalSelector>()? {
                SignalSelector::All => numbers.extend(Self::catchable().numbers),
                SignalSelector::Number(n) => {
                    if is_uncatchable(n) {
                        return Err(WatchError::ForbiddenSignal { name: name_of(n) });
                    }
                    numbers.insert(n);
                }
            }
        }

        for entry in exclude {
            match entry.as_ref().parse::<SignalSelector>()? {
                SignalSelector::All => numbers.clear(),
                SignalSelector::Number(n) => {
                    numbers.remove(&n);
                }
            }
        }

        if numbers.is_empty() {
            return Err(WatchError::InvalidConfigValueError {
                field: "signals".to_string(),
                value: String::new(),
                reason: "No signals left to watch after applying exclusions".to_string(),
            });
        }

        Ok(Self { numbers })
    }

    pub fn contains(&self, number: c_int) -> bool {
        self.numbers.contains(&number)
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = c_int> + '_ {
        self.numbers.iter().copied()
    }
}

impl fmt::Display for SignalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.iter().map(name_of).collect();
        write!(f, "{}", names.join(","))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_accepts_common_spellings() {
        assert_eq!(lookup("SIGTERM"), Some(libc::SIGTERM));
        assert_eq!(lookup("term"), Some(libc::SIGTERM));
        assert_eq!(lookup(" SigHup "), Some(libc::SIGHUP));
        assert_eq!(lookup("SIGNOPE"), None);
    }

    #[test]
    fn test_name_and_description() {
        assert_eq!(name_of(libc::SIGINT), "SIGINT");
        assert_eq!(describe(libc::SIGINT), "interrupt");
        assert_eq!(describe(libc::SIGUSR1), "user defined signal 1");
    }

    #[test]
    fn test_catchable_excludes_kill_and_stop() {
        let set = SignalSet::catchable();
        assert!(set.contains(libc::SIGTERM));
        assert!(set.contains(libc::SIGINT));
        assert!(set.contains(libc::SIGCHLD));
        assert!(!set.contains(libc::SIGKILL));
        assert!(!set.contains(libc::SIGSTOP));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_fault_signals_are_catchable_on_linux() {
        let set = SignalSet::catchable();
        for number in [libc::SIGBUS, libc::SIGSEGV, libc::SIGILL, libc::SIGFPE] {
            assert!(set.contains(number), "{} missing", name_of(number));
            assert!(is_fault(number));
        }
        assert!(!is_fault(libc::SIGTERM));

        let set = SignalSet::resolve(["BUS", "SEGV"], Vec::<String>::new()).unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_resolve_include_and_exclude() {
        let set = SignalSet::resolve(["all"], ["SIGCHLD", "winch"]).unwrap();
        assert!(set.contains(libc::SIGTERM));
        assert!(!set.contains(libc::SIGCHLD));
        assert!(!set.contains(libc::SIGWINCH));

        let set = SignalSet::resolve(["TERM", "15", "INT"], Vec::<String>::new()).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.to_string(), "SIGINT,SIGTERM");
    }

    #[test]
    fn test_resolve_rejects_uncatchable_and_unknown() {
        let err = SignalSet::resolve(["SIGKILL"], Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, WatchError::ForbiddenSignal { .. }));

        let err = SignalSet::resolve(["SIGBOGUS"], Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, WatchError::UnknownSignal { .. }));

        let err = SignalSet::resolve(["9999"], Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, WatchError::UnknownSignal { .. }));
    }

    #[test]
    fn test_resolve_rejects_empty_result() {
        let err = SignalSet::resolve(["TERM"], ["TERM"]).unwrap_err();
        assert!(matches!(err, WatchError::InvalidConfigValueError { .. }));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_realtime_names_round_trip() {
        let min = libc::SIGRTMIN();
        let max = libc::SIGRTMAX();
        assert_eq!(name_of(min), "SIGRTMIN");
        assert_eq!(name_of(min + 2), "SIGRTMIN+2");
        assert_eq!(lookup("RTMIN+2"), Some(min + 2));
        assert_eq!(lookup("SIGRTMAX-1"), Some(max - 1));
        assert_eq!(lookup("RTMIN+500"), None);
        assert!(SignalSet::catchable().contains(max));
    }
}
