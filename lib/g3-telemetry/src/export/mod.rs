/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::anyhow;
use chrono::{DateTime, SecondsFormat, Utc};
use log::warn;
use serde_json::{Map, Number, Value};
use uuid::Uuid;

use crate::config::TelemetryConfig;
use crate::types::ErrorKind;

fn build_payload(
    ping: &str,
    document_id: &str,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    metrics: &BTreeMap<String, Vec<String>>,
    errors: &[(String, ErrorKind, u64)],
) -> Value {
    let mut ping_info = Map::with_capacity(4);
    ping_info.insert("ping_name".to_string(), Value::String(ping.to_string()));
    ping_info.insert(
        "document_id".to_string(),
        Value::String(document_id.to_string()),
    );
    ping_info.insert(
        "start_time".to_string(),
        Value::String(start_time.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    ping_info.insert(
        "end_time".to_string(),
        Value::String(end_time.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );

    let mut root = Map::with_capacity(3);
    root.insert("ping_info".to_string(), Value::Object(ping_info));

    if !metrics.is_empty() {
        let mut string_list = Map::with_capacity(metrics.len());
        for (id, values) in metrics {
            let items = values.iter().map(|v| Value::String(v.clone())).collect();
            string_list.insert(id.clone(), Value::Array(items));
        }
        let mut metric_map = Map::with_capacity(1);
        metric_map.insert("string_list".to_string(), Value::Object(string_list));
        root.insert("metrics".to_string(), Value::Object(metric_map));
    }

    if !errors.is_empty() {
        let mut by_kind: BTreeMap<&'static str, Map<String, Value>> = BTreeMap::new();
        for (id, kind, count) in errors {
            by_kind
                .entry(kind.as_str())
                .or_default()
                .insert(id.clone(), Value::Number(Number::from(*count)));
        }
        let mut error_map = Map::with_capacity(by_kind.len());
        for (kind, counts) in by_kind {
            error_map.insert(kind.to_string(), Value::Object(counts));
        }
        root.insert("errors".to_string(), Value::Object(error_map));
    }

    Value::Object(root)
}

/// Serialize the collected data for `ping` and spool it for upload.
pub(crate) async fn spool_ping(
    config: &TelemetryConfig,
    ping: &str,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    metrics: BTreeMap<String, Vec<String>>,
    errors: Vec<(String, ErrorKind, u64)>,
) -> anyhow::Result<PathBuf> {
    let document_id = Uuid::new_v4().to_string();
    let payload = build_payload(ping, &document_id, start_time, end_time, &metrics, &errors);
    let content = serde_json::to_string(&payload)
        .map_err(|e| anyhow!("failed to encode ping {ping} as json: {e:?}"))?;

    let dir = config.pending_ping_dir();
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| anyhow!("failed to create spool directory {}: {e:?}", dir.display()))?;
    let path = dir.join(format!("{document_id}.json"));
    tokio::fs::write(&path, content)
        .await
        .map_err(|e| anyhow!("failed to write ping file {}: {e:?}", path.display()))?;

    if let Err(e) = prune_pending(&dir, config.max_pending_pings()).await {
        warn!("failed to prune spool directory {}: {e:?}", dir.display());
    }

    Ok(path)
}

/// Keep at most `max` spooled ping files, dropping the oldest first.
async fn prune_pending(dir: &Path, max: usize) -> anyhow::Result<()> {
    let mut entries = Vec::new();
    let mut rd = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| anyhow!("failed to read directory: {e:?}"))?;
    while let Some(entry) = rd
        .next_entry()
        .await
        .map_err(|e| anyhow!("failed to read directory entry: {e:?}"))?
    {
        let path = entry.path();
        if path.extension().map(|ext| ext == "json").unwrap_or(false) {
            let modified = match entry.metadata().await {
                Ok(metadata) => metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
                Err(_) => SystemTime::UNIX_EPOCH,
            };
            entries.push((modified, path));
        }
    }

    if entries.len() <= max {
        return Ok(());
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    let n_stale = entries.len() - max;
    for (_, path) in entries.drain(..n_stale) {
        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!("failed to remove stale ping file {}: {e:?}", path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_shape() {
        let mut metrics = BTreeMap::new();
        metrics.insert(
            "tags.list1".to_string(),
            vec!["x".to_string(), "y".to_string()],
        );
        let errors = vec![("tags.list1".to_string(), ErrorKind::InvalidOverflow, 2)];

        let start = DateTime::from_timestamp(1700000000, 0).unwrap();
        let end = DateTime::from_timestamp(1700000060, 0).unwrap();
        let payload = build_payload("metrics", "doc-1", start, end, &metrics, &errors);

        assert_eq!(payload["ping_info"]["ping_name"], "metrics");
        assert_eq!(payload["ping_info"]["document_id"], "doc-1");
        assert_eq!(
            payload["metrics"]["string_list"]["tags.list1"],
            serde_json::json!(["x", "y"])
        );
        assert_eq!(payload["errors"]["invalid_overflow"]["tags.list1"], 2);
    }

    #[test]
    fn payload_omits_empty_sections() {
        let start = DateTime::from_timestamp(1700000000, 0).unwrap();
        let payload = build_payload("metrics", "doc-1", start, start, &BTreeMap::new(), &[]);

        let Value::Object(root) = &payload else {
            panic!("payload root should be an object");
        };
        assert!(root.contains_key("ping_info"));
        assert!(!root.contains_key("metrics"));
        assert!(!root.contains_key("errors"));
    }
}
