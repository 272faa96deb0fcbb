/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use ahash::AHashMap;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use tokio::sync::mpsc;

use crate::config::TelemetryConfig;
use crate::export;
use crate::store::{ErrorRecorder, MetricStore, load_user_store, save_user_store};
use crate::types::{Lifetime, MetricMeta};
use crate::validate;

use super::Command;

const BATCH_SIZE: usize = 128;

pub(super) struct StoreWorker {
    config: Arc<TelemetryConfig>,
    store: Arc<MetricStore>,
    errors: Arc<ErrorRecorder>,
    cmd_receiver: mpsc::UnboundedReceiver<Command>,

    run_start: DateTime<Utc>,
    ping_start: AHashMap<String, DateTime<Utc>>,
    applied: usize,
    user_dirty: bool,
}

impl StoreWorker {
    pub(super) fn new(
        config: Arc<TelemetryConfig>,
        store: Arc<MetricStore>,
        errors: Arc<ErrorRecorder>,
        cmd_receiver: mpsc::UnboundedReceiver<Command>,
    ) -> Self {
        StoreWorker {
            config,
            store,
            errors,
            cmd_receiver,
            run_start: Utc::now(),
            ping_start: AHashMap::default(),
            applied: 0,
            user_dirty: false,
        }
    }

    pub(super) async fn into_running(mut self) {
        match load_user_store(&self.config.user_store_path()).await {
            Ok(data) => self.store.replace_user(data),
            Err(e) => warn!("failed to load user metrics store: {e:?}"),
        }

        let mut buffer = Vec::with_capacity(BATCH_SIZE);
        loop {
            let nr = self.cmd_receiver.recv_many(&mut buffer, BATCH_SIZE).await;
            if nr == 0 {
                break;
            }
            let quit = self.handle_batch(&mut buffer).await;
            if self.user_dirty {
                self.persist_user().await;
            }
            if quit {
                break;
            }
        }
        debug!("store worker stopped");
    }

    async fn handle_batch(&mut self, buffer: &mut Vec<Command>) -> bool {
        for cmd in buffer.drain(..) {
            match cmd {
                Command::Add(meta, value) => self.apply_add(&meta, value),
                Command::Set(meta, values) => self.apply_set(&meta, values),
                Command::SubmitPing(name) => self.submit_ping(&name).await,
                Command::Sync(sender) => {
                    let _ = sender.send(self.applied);
                }
                Command::Shutdown => return true,
            }
        }
        false
    }

    fn apply_add(&mut self, meta: &MetricMeta, value: String) {
        let id = meta.name().identifier();
        for ping in meta.send_in_pings() {
            let mut list = self
                .store
                .get(meta.lifetime(), ping, &id)
                .unwrap_or_default();
            list.push(value.clone());
            // the concatenation may re-trigger the list length limit
            let (accepted, errors) = validate::validate_list(list, &id);
            self.store.insert(meta.lifetime(), ping, &id, accepted);
            for kind in errors {
                self.errors.record(&id, kind, ping);
            }
        }
        self.applied += 1;
        if meta.lifetime() == Lifetime::User {
            self.user_dirty = true;
        }
    }

    fn apply_set(&mut self, meta: &MetricMeta, values: Vec<String>) {
        let id = meta.name().identifier();
        for ping in meta.send_in_pings() {
            let (accepted, errors) = validate::validate_list(values.clone(), &id);
            self.store.insert(meta.lifetime(), ping, &id, accepted);
            for kind in errors {
                self.errors.record(&id, kind, ping);
            }
        }
        self.applied += 1;
        if meta.lifetime() == Lifetime::User {
            self.user_dirty = true;
        }
    }

    async fn submit_ping(&mut self, ping: &str) {
        let end_time = Utc::now();
        let start_time = self
            .ping_start
            .insert(ping.to_string(), end_time)
            .unwrap_or(self.run_start);

        let metrics = self.store.snapshot_ping(ping);
        let errors = self.errors.drain_ping(ping);
        self.store.clear_ping_lifetime(ping);
        self.applied += 1;

        if metrics.is_empty() && errors.is_empty() {
            debug!("no data recorded for ping {ping}, skip submission");
            return;
        }

        match export::spool_ping(&self.config, ping, start_time, end_time, metrics, errors).await {
            Ok(path) => debug!("ping {ping} spooled to {}", path.display()),
            Err(e) => warn!("failed to spool ping {ping}: {e:?}"),
        }
    }

    async fn persist_user(&mut self) {
        let data = self.store.clone_user();
        match save_user_store(&self.config.user_store_path(), &data).await {
            Ok(_) => self.user_dirty = false,
            Err(e) => warn!("failed to persist user metrics store: {e:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ErrorKind, MetricName};
    use crate::validate::MAX_LIST_LENGTH;

    fn test_worker() -> StoreWorker {
        let (_sender, receiver) = mpsc::unbounded_channel();
        StoreWorker::new(
            Arc::new(TelemetryConfig::new("/nonexistent")),
            Arc::new(MetricStore::default()),
            Arc::new(ErrorRecorder::default()),
            receiver,
        )
    }

    fn test_meta(pings: &[&str]) -> MetricMeta {
        MetricMeta::new(
            MetricName::new("tags", "list1").unwrap(),
            pings.iter().map(|s| s.to_string()).collect(),
            Lifetime::Ping,
        )
    }

    #[test]
    fn add_appends_in_order() {
        let mut worker = test_worker();
        let meta = test_meta(&["metrics"]);

        worker.apply_add(&meta, "x".to_string());
        worker.apply_add(&meta, "y".to_string());

        assert_eq!(
            worker.store.get(Lifetime::Ping, "metrics", "tags.list1"),
            Some(vec!["x".to_string(), "y".to_string()])
        );
        assert_eq!(worker.applied, 2);
        assert_eq!(
            worker
                .errors
                .count("tags.list1", ErrorKind::InvalidOverflow, "metrics"),
            0
        );
    }

    #[test]
    fn add_revalidates_concatenation() {
        let mut worker = test_worker();
        let meta = test_meta(&["metrics"]);

        worker.apply_set(&meta, vec!["a".to_string(); MAX_LIST_LENGTH]);
        worker.apply_add(&meta, "b".to_string());

        let stored = worker
            .store
            .get(Lifetime::Ping, "metrics", "tags.list1")
            .unwrap();
        assert_eq!(stored.len(), MAX_LIST_LENGTH);
        assert!(stored.iter().all(|v| v == "a"));
        assert_eq!(
            worker
                .errors
                .count("tags.list1", ErrorKind::InvalidOverflow, "metrics"),
            1
        );
    }

    #[test]
    fn set_records_per_destination_ping() {
        let mut worker = test_worker();
        let meta = test_meta(&["metrics", "baseline"]);

        worker.apply_set(&meta, vec!["a".to_string(); MAX_LIST_LENGTH + 1]);

        for ping in ["metrics", "baseline"] {
            let stored = worker
                .store
                .get(Lifetime::Ping, ping, "tags.list1")
                .unwrap();
            assert_eq!(stored.len(), MAX_LIST_LENGTH);
            assert_eq!(
                worker
                    .errors
                    .count("tags.list1", ErrorKind::InvalidOverflow, ping),
                1
            );
        }
        assert_eq!(worker.applied, 1);
    }
}
