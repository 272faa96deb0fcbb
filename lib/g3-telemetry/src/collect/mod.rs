/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Context, anyhow};
use foldhash::fast::FixedState;

use crate::config::TelemetryConfig;
use crate::runtime::{Command, Dispatcher};
use crate::store::{ErrorRecorder, MetricStore};
use crate::types::{MetricMeta, MetricName};

mod string_list;
pub use string_list::StringListMetric;

pub(crate) struct Shared {
    pub(crate) store: Arc<MetricStore>,
    pub(crate) errors: Arc<ErrorRecorder>,
    pub(crate) dispatcher: Dispatcher,
    registry: Mutex<HashMap<MetricName, Arc<MetricMeta>, FixedState>>,
}

impl Shared {
    pub(crate) fn is_live(&self, name: &MetricName) -> bool {
        let ht = self.registry.lock().unwrap();
        ht.contains_key(name)
    }

    fn remove(&self, name: &MetricName) -> bool {
        let mut ht = self.registry.lock().unwrap();
        ht.remove(name).is_some()
    }
}

/// The telemetry recording engine.
///
/// All mutation funnels through one background worker; callers on any
/// thread may record values or submit pings without blocking.
pub struct Collector {
    shared: Arc<Shared>,
}

impl Collector {
    /// Explicit engine init: creates the data directory, reloads
    /// user-lifetime values and starts the store worker.
    pub fn spawn(config: TelemetryConfig) -> anyhow::Result<Collector> {
        config.check()?;
        std::fs::create_dir_all(config.data_dir()).context(format!(
            "failed to create data directory {}",
            config.data_dir().display()
        ))?;

        let config = Arc::new(config);
        let store = Arc::new(MetricStore::default());
        let errors = Arc::new(ErrorRecorder::default());
        let dispatcher = Dispatcher::spawn(config, store.clone(), errors.clone())?;

        Ok(Collector {
            shared: Arc::new(Shared {
                store,
                errors,
                dispatcher,
                registry: Mutex::new(HashMap::with_hasher(FixedState::default())),
            }),
        })
    }

    /// Register a string list metric. The returned handle is a lookup
    /// reference; recorded data stays owned by the engine.
    pub fn register_string_list(&self, meta: MetricMeta) -> anyhow::Result<StringListMetric> {
        if meta.send_in_pings().is_empty() {
            return Err(anyhow!(
                "metric {} should have at least one destination ping",
                meta.name()
            ));
        }

        let meta = Arc::new(meta);
        let mut ht = self.shared.registry.lock().unwrap();
        if ht.contains_key(meta.name()) {
            return Err(anyhow!("metric {} is already registered", meta.name()));
        }
        ht.insert(meta.name().clone(), meta.clone());
        drop(ht);

        Ok(StringListMetric::new(self.shared.clone(), meta))
    }

    /// Snapshot all data destined for `name`, spool the payload and clear
    /// ping-lifetime values. Fire-and-forget.
    pub fn submit_ping(&self, name: &str) {
        self.shared
            .dispatcher
            .send(Command::SubmitPing(name.to_string()));
    }

    /// Block until all previously queued commands have been applied.
    pub fn drain(&self) -> usize {
        self.shared.dispatcher.sync()
    }

    /// Drain the queue, persist user-lifetime data and stop the worker.
    /// Operations on outstanding metric handles become no-ops.
    pub fn shutdown(self) {
        self.shared.dispatcher.shutdown();
    }
}
