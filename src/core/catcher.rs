//! Signal listeners. One tokio signal stream per watched signal, all
//! forwarding into a single channel drained by the printer.

#[cfg(target_os = "linux")]
use crate::core::fault::FaultCatcher;
use crate::domain::model::CaughtSignal;
use crate::domain::signals::SignalSet;
use crate::utils::error::Result;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

#[derive(Debug)]
pub struct Catcher {
    watched: SignalSet,
    tasks: Vec<JoinHandle<()>>,
    #[cfg(target_os = "linux")]
    faults: Option<FaultCatcher>,
}

impl Catcher {
    /// Installs a handler for every signal in `set`, then spawns the
    /// forwarding tasks. Every handler is installed before this returns.
    /// Must be called from inside a tokio runtime.
    #[cfg(unix)]
    pub fn register(set: &SignalSet, tx: UnboundedSender<CaughtSignal>) -> Result<Self> {
        use crate::domain::signals::{is_fault, name_of};
        use crate::utils::error::WatchError;
        use tokio::signal::unix::{signal, SignalKind};

        let (faults, regular): (Vec<_>, Vec<_>) = set.iter().partition(|n| is_fault(*n));

        let mut streams = Vec::with_capacity(regular.len());
        for number in regular {
            let stream = signal(SignalKind::from_raw(number)).map_err(|source| {
                WatchError::Registration {
                    signal: name_of(number),
                    source,
                }
            })?;
            streams.push((number, stream));
        }

        #[cfg(target_os = "linux")]
        let faults = if faults.is_empty() {
            None
        } else {
            Some(FaultCatcher::register(&faults, tx.clone())?)
        };
        #[cfg(not(target_os = "linux"))]
        debug_assert!(faults.is_empty());

        let tasks = streams
            .into_iter()
            .map(|(number, mut stream)| {
                let tx = tx.clone();
                tokio::spawn(async move {
                    while stream.recv().await.is_some() {
                        if tx.send(CaughtSignal::new(number)).is_err() {
                            break;
                        }
                    }
                })
            })
            .collect();

        tracing::debug!(signals = %set, "handlers installed");
        Ok(Self {
            watched: set.clone(),
            tasks,
            #[cfg(target_os = "linux")]
            faults,
        })
    }

    // Only Ctrl-C can be observed here.
    #[cfg(not(unix))]
    pub fn register(set: &SignalSet, tx: UnboundedSender<CaughtSignal>) -> Result<Self> {
        use crate::utils::error::WatchError;

        let mut ctrl_c = tokio::signal::windows::ctrl_c().map_err(|source| {
            WatchError::Registration {
                signal: "SIGINT".to_string(),
                source,
            }
        })?;

        let task = tokio::spawn(async move {
            while ctrl_c.recv().await.is_some() {
                if tx.send(CaughtSignal::new(libc::SIGINT)).is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            watched: set.clone(),
            tasks: vec![task],
        })
    }

    pub fn watched(&self) -> &SignalSet {
        &self.watched
    }

    pub fn abort(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
        #[cfg(target_os = "linux")]
        if let Some(faults) = self.faults.as_mut() {
            faults.abort();
        }
    }
}

impl Drop for Catcher {
    fn drop(&mut self) {
        self.abort();
    }
}
