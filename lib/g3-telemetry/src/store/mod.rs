/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::BTreeMap;
use std::sync::Mutex;

use ahash::AHashMap;

use crate::types::Lifetime;

mod error;
pub(crate) use error::ErrorRecorder;

mod persist;
pub(crate) use persist::{load_user_store, save_user_store};

/// ping name -> metric identifier -> recorded values
pub(crate) type PingMap = AHashMap<String, AHashMap<String, Vec<String>>>;

/// Lifetime-scoped value storage.
///
/// Only the store worker writes here. Other threads read after taking the
/// dispatcher drain barrier, so reads never see a half-applied command.
#[derive(Default)]
pub(crate) struct MetricStore {
    ping: Mutex<PingMap>,
    application: Mutex<PingMap>,
    user: Mutex<PingMap>,
}

impl MetricStore {
    fn map(&self, lifetime: Lifetime) -> &Mutex<PingMap> {
        match lifetime {
            Lifetime::Ping => &self.ping,
            Lifetime::Application => &self.application,
            Lifetime::User => &self.user,
        }
    }

    pub(crate) fn get(&self, lifetime: Lifetime, ping: &str, id: &str) -> Option<Vec<String>> {
        let map = self.map(lifetime).lock().unwrap();
        map.get(ping).and_then(|metrics| metrics.get(id)).cloned()
    }

    pub(crate) fn insert(&self, lifetime: Lifetime, ping: &str, id: &str, values: Vec<String>) {
        let mut map = self.map(lifetime).lock().unwrap();
        map.entry(ping.to_string())
            .or_default()
            .insert(id.to_string(), values);
    }

    /// Collect all values destined for `ping` across lifetimes, keyed by
    /// metric identifier in canonical order.
    pub(crate) fn snapshot_ping(&self, ping: &str) -> BTreeMap<String, Vec<String>> {
        let mut snapshot = BTreeMap::new();
        for lifetime in [Lifetime::Ping, Lifetime::Application, Lifetime::User] {
            let map = self.map(lifetime).lock().unwrap();
            if let Some(metrics) = map.get(ping) {
                for (id, values) in metrics.iter() {
                    snapshot.insert(id.clone(), values.clone());
                }
            }
        }
        snapshot
    }

    pub(crate) fn clear_ping_lifetime(&self, ping: &str) {
        let mut map = self.ping.lock().unwrap();
        map.remove(ping);
    }

    pub(crate) fn replace_user(&self, data: PingMap) {
        *self.user.lock().unwrap() = data;
    }

    pub(crate) fn clone_user(&self) -> PingMap {
        self.user.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let store = MetricStore::default();
        assert!(store.get(Lifetime::Ping, "metrics", "t.m").is_none());

        store.insert(Lifetime::Ping, "metrics", "t.m", vec!["x".to_string()]);
        assert_eq!(
            store.get(Lifetime::Ping, "metrics", "t.m"),
            Some(vec!["x".to_string()])
        );
        // lifetimes are separate key spaces
        assert!(store.get(Lifetime::User, "metrics", "t.m").is_none());
        assert!(store.get(Lifetime::Ping, "other", "t.m").is_none());
    }

    #[test]
    fn snapshot_merges_lifetimes() {
        let store = MetricStore::default();
        store.insert(Lifetime::Ping, "metrics", "a.m", vec!["1".to_string()]);
        store.insert(Lifetime::User, "metrics", "b.m", vec!["2".to_string()]);
        store.insert(Lifetime::Application, "other", "c.m", vec!["3".to_string()]);

        let snapshot = store.snapshot_ping("metrics");
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("a.m"), Some(&vec!["1".to_string()]));
        assert_eq!(snapshot.get("b.m"), Some(&vec!["2".to_string()]));
    }

    #[test]
    fn clear_ping_lifetime_only() {
        let store = MetricStore::default();
        store.insert(Lifetime::Ping, "metrics", "a.m", vec!["1".to_string()]);
        store.insert(Lifetime::User, "metrics", "b.m", vec!["2".to_string()]);

        store.clear_ping_lifetime("metrics");
        assert!(store.get(Lifetime::Ping, "metrics", "a.m").is_none());
        assert_eq!(
            store.get(Lifetime::User, "metrics", "b.m"),
            Some(vec!["2".to_string()])
        );
    }
}
