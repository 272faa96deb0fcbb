/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::path::Path;

use anyhow::anyhow;
use serde_json::{Map, Value};

use super::PingMap;

fn encode(data: &PingMap) -> Value {
    let mut root = Map::with_capacity(data.len());
    for (ping, metrics) in data.iter() {
        let mut metric_map = Map::with_capacity(metrics.len());
        for (id, values) in metrics.iter() {
            let items = values.iter().map(|v| Value::String(v.clone())).collect();
            metric_map.insert(id.clone(), Value::Array(items));
        }
        root.insert(ping.clone(), Value::Object(metric_map));
    }
    Value::Object(root)
}

fn decode(doc: Value) -> anyhow::Result<PingMap> {
    let Value::Object(root) = doc else {
        return Err(anyhow!("the root value should be an object"));
    };
    let mut data = PingMap::default();
    for (ping, v) in root {
        let Value::Object(metrics) = v else {
            return Err(anyhow!("the value for ping {ping} should be an object"));
        };
        let inner = data.entry(ping).or_default();
        for (id, v) in metrics {
            let Value::Array(items) = v else {
                return Err(anyhow!("the value for metric {id} should be an array"));
            };
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                let Value::String(s) = item else {
                    return Err(anyhow!("the items for metric {id} should be strings"));
                };
                values.push(s);
            }
            inner.insert(id, values);
        }
    }
    Ok(data)
}

pub(crate) async fn load_user_store(path: &Path) -> anyhow::Result<PingMap> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(PingMap::default()),
        Err(e) => {
            return Err(anyhow!(
                "failed to read content of store file {}: {e:?}",
                path.display()
            ));
        }
    };
    if contents.is_empty() {
        return Ok(PingMap::default());
    }
    let doc = serde_json::from_str(&contents).map_err(|e| {
        anyhow!(
            "invalid json content for store file {}: {e:?}",
            path.display()
        )
    })?;
    decode(doc)
}

pub(crate) async fn save_user_store(path: &Path, data: &PingMap) -> anyhow::Result<()> {
    let content = serde_json::to_string(&encode(data))
        .map_err(|e| anyhow!("failed to encode store data as json: {e:?}"))?;
    let tmp_path = path.with_extension("tmp");
    tokio::fs::write(&tmp_path, content)
        .await
        .map_err(|e| {
            anyhow!(
                "failed to write to store file {}: {e:?}",
                tmp_path.display()
            )
        })?;
    tokio::fs::rename(&tmp_path, path).await.map_err(|e| {
        anyhow!(
            "failed to move store file {} to {}: {e:?}",
            tmp_path.display(),
            path.display()
        )
    })?;
    Ok(())
}
