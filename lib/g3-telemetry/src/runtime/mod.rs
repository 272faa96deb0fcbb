/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use anyhow::anyhow;
use log::{debug, error};
use tokio::sync::{mpsc, oneshot};

use crate::config::TelemetryConfig;
use crate::store::{ErrorRecorder, MetricStore};
use crate::types::MetricMeta;

mod worker;
use worker::StoreWorker;

pub(crate) enum Command {
    Add(Arc<MetricMeta>, String),
    Set(Arc<MetricMeta>, Vec<String>),
    SubmitPing(String),
    Sync(oneshot::Sender<usize>),
    Shutdown,
}

/// Handle to the single store worker thread.
///
/// Commands are applied strictly in submission order, which is what makes
/// the drain barrier in [`Dispatcher::sync`] meaningful.
pub(crate) struct Dispatcher {
    sender: mpsc::UnboundedSender<Command>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl Dispatcher {
    pub(crate) fn spawn(
        config: Arc<TelemetryConfig>,
        store: Arc<MetricStore>,
        errors: Arc<ErrorRecorder>,
    ) -> anyhow::Result<Dispatcher> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let store_worker = StoreWorker::new(config, store, errors, receiver);
        let thread = std::thread::Builder::new()
            .name("telemetry-store".to_string())
            .spawn(move || {
                let rt = match tokio::runtime::Builder::new_current_thread().build() {
                    Ok(rt) => rt,
                    Err(e) => {
                        error!("failed to build store worker runtime: {e}");
                        return;
                    }
                };
                rt.block_on(store_worker.into_running());
            })
            .map_err(|e| anyhow!("failed to spawn store worker thread: {e}"))?;
        Ok(Dispatcher {
            sender,
            thread: Mutex::new(Some(thread)),
        })
    }

    /// Fire-and-forget: returning only means the command is queued.
    pub(crate) fn send(&self, cmd: Command) {
        if self.sender.send(cmd).is_err() {
            debug!("store worker is stopped, command dropped");
        }
    }

    /// Drain barrier: blocks until all previously queued commands have
    /// been applied. Returns the number of commands applied so far.
    pub(crate) fn sync(&self) -> usize {
        let (sender, receiver) = oneshot::channel();
        if self.sender.send(Command::Sync(sender)).is_err() {
            return 0;
        }
        receiver.blocking_recv().unwrap_or(0)
    }

    pub(crate) fn shutdown(&self) {
        if self.sender.send(Command::Shutdown).is_err() {
            debug!("store worker is already stopped");
        }
        let Some(thread) = self.thread.lock().unwrap().take() else {
            return;
        };
        let _ = thread.join();
    }
}
