//! src/scheduler.rs
//!
//! Owns the recurring jobs of one client. Every job runs on its own task, so a
//! slow request only delays that job's next tick. `shutdown` flips a watch
//! channel that every task listens to, including while a job is mid-request.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at, timeout};
use tracing::{debug, error, warn};

pub struct Scheduler {
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl Scheduler {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            shutdown_tx: tx,
            shutdown_rx: rx,
            tasks: Vec::new(),
        }
    }

    /// Runs `job` every `period`, first after one full period. A run in
    /// progress at shutdown is dropped.
    pub fn spawn_periodic<F, Fut>(&mut self, name: &'static str, period: Duration, job: F)
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.spawn_loop(name, period, None, job);
    }

    /// Like [`Scheduler::spawn_periodic`], but a run in progress at shutdown
    /// gets up to `grace` to finish before it is dropped.
    pub fn spawn_periodic_draining<F, Fut>(
        &mut self,
        name: &'static str,
        period: Duration,
        grace: Duration,
        job: F,
    ) where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.spawn_loop(name, period, Some(grace), job);
    }

    fn spawn_loop<F, Fut>(
        &mut self,
        name: &'static str,
        period: Duration,
        grace: Option<Duration>,
        job: F,
    ) where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut rx = self.shutdown_rx.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            debug!("{} task started (every {:?})", name, period);

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_signalled(&mut rx) => break,
                    _ = ticker.tick() => {
                        let run = job();
                        tokio::pin!(run);
                        tokio::select! {
                            biased;
                            _ = shutdown_signalled(&mut rx) => {
                                if let Some(grace) = grace {
                                    if timeout(grace, &mut run).await.is_err() {
                                        warn!("{} task dropped its in-flight run after {:?}", name, grace);
                                    }
                                }
                                break;
                            }
                            _ = &mut run => {}
                        }
                    }
                }
            }
            debug!("{} task stopped", name);
        });
        self.tasks.push((name, handle));
    }

    /// Runs `fut` once, right away.
    pub fn spawn_once<Fut>(&mut self, name: &'static str, fut: Fut)
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut rx = self.shutdown_rx.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = shutdown_signalled(&mut rx) => debug!("{} cancelled", name),
                _ = fut => {}
            }
        });
        self.tasks.push((name, handle));
    }

    pub fn task_names(&self) -> Vec<&'static str> {
        self.tasks.iter().map(|(name, _)| *name).collect()
    }

    pub fn is_shutdown(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    /// Signals every task and waits for all of them to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        for (name, handle) in self.tasks {
            if let Err(e) = handle.await {
                error!("{} task ended abnormally: {:?}", name, e);
            }
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

async fn shutdown_signalled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}
