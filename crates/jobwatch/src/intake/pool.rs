use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{debug, error, info};

use crate::error::IntakeError;
use crate::intake::{IntakeBroadcaster, IntakeHandler, NotificationEvent};

/// Worker threads that classify and store notification events.
///
/// Dropping the pool without `wait` stops the workers after their current
/// event and joins them; queued events are discarded.
pub struct IntakePool {
    /// `None` once the pool is winding down.
    event_sender: Option<Sender<NotificationEvent>>,
    workers: Vec<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
    outcomes: IntakeBroadcaster,
}

impl IntakePool {
    pub fn new(
        handler: IntakeHandler,
        worker_count: usize,
        outcomes: IntakeBroadcaster,
    ) -> Result<Self, IntakeError> {
        if worker_count == 0 {
            return Err(IntakeError::SpawnFailed(
                "worker_count must be > 0".to_string(),
            ));
        }

        let (event_sender, event_receiver) = bounded::<NotificationEvent>(worker_count * 2);
        let shutdown = Arc::new(AtomicBool::new(false));

        let mut workers = Vec::with_capacity(worker_count);

        for worker_id in 0..worker_count {
            let event_rx = event_receiver.clone();
            let shutdown_flag = Arc::clone(&shutdown);
            let worker_handler = handler.clone();
            let worker_outcomes = outcomes.clone();

            let handle = thread::Builder::new()
                .name(format!("intake-{}", worker_id))
                .spawn(move || {
                    run_worker(
                        worker_id,
                        event_rx,
                        shutdown_flag,
                        worker_handler,
                        worker_outcomes,
                    );
                })
                .map_err(|e| IntakeError::SpawnFailed(e.to_string()))?;

            workers.push(handle);
        }

        info!("Started {} intake workers", worker_count);

        Ok(Self {
            event_sender: Some(event_sender),
            workers,
            shutdown,
            outcomes,
        })
    }

    /// Queues an event. Blocks while the queue is full.
    pub fn submit(&self, event: NotificationEvent) -> Result<(), IntakeError> {
        send(self.event_sender.as_ref(), &self.shutdown, event)
    }

    /// A handle that can submit events from other threads.
    pub fn submitter(&self) -> IntakeSubmitter {
        IntakeSubmitter {
            event_sender: self.event_sender.clone(),
            shutdown: Arc::clone(&self.shutdown),
        }
    }

    /// A handle that can stop the workers without holding the queue open.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            shutdown: Arc::clone(&self.shutdown),
        }
    }

    pub fn outcomes(&self) -> &IntakeBroadcaster {
        &self.outcomes
    }

    /// Stops workers after their current event; queued events are dropped.
    pub fn shutdown(&self) {
        info!("Shutting down intake pool...");
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Closes the queue and joins the workers. Without a prior `shutdown`
    /// every queued event is processed first.
    pub fn wait(mut self) {
        self.join_workers();
    }

    fn join_workers(&mut self) {
        // Workers exit once the channel is drained and disconnected
        self.event_sender.take();

        for (i, worker) in self.workers.drain(..).enumerate() {
            if let Err(e) = worker.join() {
                error!("Intake worker {} panicked: {:?}", i, e);
            } else {
                debug!("Intake worker {} finished", i);
            }
        }

        info!("All intake workers have stopped");
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}

/// Cloneable submit handle detached from the pool's lifetime.
///
/// Outstanding submitters keep the queue open, so drop them before
/// calling `IntakePool::wait`.
#[derive(Clone)]
pub struct IntakeSubmitter {
    event_sender: Option<Sender<NotificationEvent>>,
    shutdown: Arc<AtomicBool>,
}

impl IntakeSubmitter {
    pub fn submit(&self, event: NotificationEvent) -> Result<(), IntakeError> {
        send(self.event_sender.as_ref(), &self.shutdown, event)
    }
}

fn send(
    sender: Option<&Sender<NotificationEvent>>,
    shutdown: &AtomicBool,
    event: NotificationEvent,
) -> Result<(), IntakeError> {
    if shutdown.load(Ordering::Relaxed) {
        return Err(IntakeError::ChannelClosed);
    }

    sender
        .ok_or(IntakeError::ChannelClosed)?
        .send(event)
        .map_err(|_| IntakeError::ChannelClosed)
}

/// Signals the pool to stop, e.g. from a Ctrl-C handler.
#[derive(Clone)]
pub struct ShutdownHandle {
    shutdown: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        info!("Intake shutdown requested");
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

impl Drop for IntakePool {
    fn drop(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        self.shutdown.store(true, Ordering::Relaxed);
        self.join_workers();
    }
}

fn run_worker(
    worker_id: usize,
    event_receiver: Receiver<NotificationEvent>,
    shutdown: Arc<AtomicBool>,
    handler: IntakeHandler,
    outcomes: IntakeBroadcaster,
) {
    debug!("Intake worker {} started", worker_id);

    loop {
        if shutdown.load(Ordering::Relaxed) {
            debug!("Intake worker {} received shutdown signal", worker_id);
            break;
        }

        match event_receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                let outcome = handler.process_event(&event);
                outcomes.send(outcome);
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                continue;
            }
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                debug!("Intake worker {} event channel disconnected", worker_id);
                break;
            }
        }
    }

    debug!("Intake worker {} stopped", worker_id);
}
