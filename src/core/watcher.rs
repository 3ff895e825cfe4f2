use crate::config::WatchConfig;
use crate::core::catcher::Catcher;
use crate::core::heartbeat::Heartbeat;
use crate::domain::model::WatchReport;
use crate::domain::ports::LineSink;
use crate::utils::error::Result;
use crate::utils::monitor::ProcessMonitor;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub struct Watcher<S: LineSink + 'static> {
    config: WatchConfig,
    sink: Arc<S>,
}

#[derive(Debug, Default)]
struct Counters {
    caught: AtomicU64,
    beats: AtomicU64,
}

impl Counters {
    fn snapshot(&self, started: Instant) -> WatchReport {
        WatchReport {
            signals_caught: self.caught.load(Ordering::Relaxed),
            heartbeats: self.beats.load(Ordering::Relaxed),
            elapsed: started.elapsed(),
        }
    }
}

/// Emits lines to the sink. Write failures are logged once at warn level
/// and never stop the caller's loop.
struct Emitter<S: LineSink> {
    sink: Arc<S>,
    warned: AtomicBool,
}

impl<S: LineSink> Emitter<S> {
    fn emit(&self, line: &str) {
        if let Err(e) = self.sink.write_line(line) {
            if !self.warned.swap(true, Ordering::Relaxed) {
                tracing::warn!("⚠️ Failed to write output line: {}", e);
            } else {
                tracing::debug!("output still failing: {}", e);
            }
        }
    }
}

impl<S: LineSink + 'static> Watcher<S> {
    pub fn new(config: WatchConfig, sink: S) -> Self {
        Self {
            config,
            sink: Arc::new(sink),
        }
    }

    /// 註冊所有訊號並啟動印出與心跳兩個任務
    pub fn start(self) -> Result<WatchHandle> {
        let started = Instant::now();
        let signals = self.config.signal_set()?;
        let format = self.config.line_format();
        let counters = Arc::new(Counters::default());
        let emitter = Arc::new(Emitter {
            sink: self.sink,
            warned: AtomicBool::new(false),
        });

        let (tx, mut rx) = mpsc::unbounded_channel();
        let catcher = Catcher::register(&signals, tx)?;
        tracing::info!("👂 Watching {} signals", catcher.watched().len());

        let printer = {
            let counters = counters.clone();
            let emitter = emitter.clone();
            let format = format.clone();
            tokio::spawn(async move {
                while let Some(caught) = rx.recv().await {
                    counters.caught.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(
                        signal = %caught.name,
                        number = caught.number,
                        "signal received"
                    );
                    emitter.emit(&format.caught(&caught));
                }
            })
        };

        let heartbeat = {
            let counters = counters.clone();
            let monitor = ProcessMonitor::new(self.config.monitor);
            if monitor.is_enabled() {
                tracing::info!("🔍 Process monitoring enabled");
            }
            let heartbeat = Heartbeat::new(self.config.interval, self.config.heartbeat_message);
            tokio::spawn(heartbeat.run(move |beat, message| {
                counters.beats.store(beat, Ordering::Relaxed);
                emitter.emit(&format.heartbeat(message));
                monitor.log_stats(beat);
            }))
        };

        tracing::info!(
            pid = std::process::id(),
            interval = ?self.config.interval,
            "✅ Ready"
        );

        Ok(WatchHandle {
            catcher,
            printer,
            heartbeat,
            counters,
            started,
        })
    }

    /// Runs until `shutdown` completes.
    pub async fn run<F>(self, shutdown: F) -> Result<WatchReport>
    where
        F: Future<Output = ()>,
    {
        let handle = self.start()?;
        shutdown.await;
        let report = handle.shutdown().await;
        tracing::info!(
            "🏁 Stopped after {:?}: {} signals caught, {} heartbeats",
            report.elapsed,
            report.signals_caught,
            report.heartbeats
        );
        Ok(report)
    }

    /// Never returns unless startup fails.
    pub async fn run_forever(self) -> Result<()> {
        self.run(std::future::pending::<()>()).await.map(|_| ())
    }
}

#[derive(Debug)]
pub struct WatchHandle {
    catcher: Catcher,
    printer: JoinHandle<()>,
    heartbeat: JoinHandle<()>,
    counters: Arc<Counters>,
    started: Instant,
}

impl WatchHandle {
    pub fn report(&self) -> WatchReport {
        self.counters.snapshot(self.started)
    }

    pub async fn shutdown(mut self) -> WatchReport {
        self.abort();
        let _ = (&mut self.heartbeat).await;
        let _ = (&mut self.printer).await;
        self.report()
    }

    fn abort(&mut self) {
        self.catcher.abort();
        self.heartbeat.abort();
        self.printer.abort();
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.abort();
    }
}
