/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use log::debug;

use crate::runtime::Command;
use crate::types::{ErrorKind, MetricMeta, NoValueError};

use super::Shared;

/// Records an ordered list of strings into one or more destination pings.
///
/// Values longer than the engine string limit and lists longer than the
/// engine list limit are truncated, with the truncation counted as an
/// `invalid_overflow` data-quality error.
#[derive(Clone)]
pub struct StringListMetric {
    shared: Arc<Shared>,
    meta: Arc<MetricMeta>,
}

impl StringListMetric {
    pub(super) fn new(shared: Arc<Shared>, meta: Arc<MetricMeta>) -> Self {
        StringListMetric { shared, meta }
    }

    fn live(&self) -> bool {
        if !self.shared.is_live(self.meta.name()) {
            debug!("metric {} is already disposed", self.meta.name());
            return false;
        }
        true
    }

    /// Append a value to the recorded list. Fire-and-forget.
    pub fn add<S: Into<String>>(&self, value: S) {
        if self.meta.disabled() || !self.live() {
            return;
        }
        self.shared
            .dispatcher
            .send(Command::Add(self.meta.clone(), value.into()));
    }

    /// Replace the recorded list. Fire-and-forget.
    pub fn set(&self, values: Vec<String>) {
        if self.meta.disabled() || !self.live() {
            return;
        }
        self.shared
            .dispatcher
            .send(Command::Set(self.meta.clone(), values));
    }

    /// Release the registry entry for this metric. Queued mutations are
    /// drained first; calling this more than once is a no-op.
    pub fn dispose(&self) {
        if !self.shared.is_live(self.meta.name()) {
            return;
        }
        self.shared.dispatcher.sync();
        self.shared.remove(self.meta.name());
    }

    fn query_ping<'a>(&'a self, ping: Option<&'a str>) -> &'a str {
        ping.unwrap_or_else(|| self.meta.default_ping())
    }

    /// Whether a value is recorded, for test assertions.
    /// Drains the command queue before reading.
    pub fn test_has_value<'a, S: Into<Option<&'a str>>>(&self, ping: S) -> bool {
        self.shared.dispatcher.sync();
        let ping = self.query_ping(ping.into());
        self.shared
            .store
            .get(self.meta.lifetime(), ping, &self.meta.name().identifier())
            .is_some()
    }

    /// The currently recorded list, for test assertions.
    /// Drains the command queue before reading.
    pub fn test_get_value<'a, S: Into<Option<&'a str>>>(
        &self,
        ping: S,
    ) -> Result<Vec<String>, NoValueError> {
        self.shared.dispatcher.sync();
        let ping = self.query_ping(ping.into());
        let id = self.meta.name().identifier();
        self.shared
            .store
            .get(self.meta.lifetime(), ping, &id)
            .ok_or_else(|| NoValueError::new(id, ping.to_string()))
    }

    /// The number of data-quality errors recorded, for test assertions.
    /// Drains the command queue before reading.
    pub fn test_get_num_recorded_errors<'a, S: Into<Option<&'a str>>>(
        &self,
        kind: ErrorKind,
        ping: S,
    ) -> u64 {
        self.shared.dispatcher.sync();
        let ping = self.query_ping(ping.into());
        self.shared
            .errors
            .count(&self.meta.name().identifier(), kind, ping)
    }
}
