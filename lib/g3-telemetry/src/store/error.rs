/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Mutex;

use ahash::AHashMap;

use crate::types::ErrorKind;

/// Per-ping data-quality error counters.
///
/// Incremented by the store worker only; counts for a ping are dropped
/// when that ping gets submitted.
#[derive(Default)]
pub(crate) struct ErrorRecorder {
    // ping name -> (metric identifier, kind) -> occurrences
    counters: Mutex<AHashMap<String, AHashMap<(String, ErrorKind), u64>>>,
}

impl ErrorRecorder {
    pub(crate) fn record(&self, id: &str, kind: ErrorKind, ping: &str) {
        let mut counters = self.counters.lock().unwrap();
        counters
            .entry(ping.to_string())
            .or_default()
            .entry((id.to_string(), kind))
            .and_modify(|v| *v += 1)
            .or_insert(1);
    }

    pub(crate) fn count(&self, id: &str, kind: ErrorKind, ping: &str) -> u64 {
        let counters = self.counters.lock().unwrap();
        counters
            .get(ping)
            .and_then(|m| m.get(&(id.to_string(), kind)))
            .copied()
            .unwrap_or(0)
    }

    /// Take and reset all counters recorded for `ping`.
    pub(crate) fn drain_ping(&self, ping: &str) -> Vec<(String, ErrorKind, u64)> {
        let mut counters = self.counters.lock().unwrap();
        let Some(map) = counters.remove(ping) else {
            return Vec::new();
        };
        map.into_iter().map(|((id, kind), v)| (id, kind, v)).collect()
    }
}
