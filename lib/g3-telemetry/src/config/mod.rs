/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::{Path, PathBuf};

use anyhow::anyhow;

mod yaml;

const USER_STORE_FILE: &str = "user_metrics.json";
const PENDING_PING_DIR: &str = "pending_pings";

const DEFAULT_MAX_PENDING_PINGS: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    data_dir: PathBuf,
    max_pending_pings: usize,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        TelemetryConfig {
            data_dir: PathBuf::new(),
            max_pending_pings: DEFAULT_MAX_PENDING_PINGS,
        }
    }
}

impl TelemetryConfig {
    pub fn new<P: Into<PathBuf>>(data_dir: P) -> Self {
        TelemetryConfig {
            data_dir: data_dir.into(),
            max_pending_pings: DEFAULT_MAX_PENDING_PINGS,
        }
    }

    pub fn set_data_dir<P: Into<PathBuf>>(&mut self, data_dir: P) {
        self.data_dir = data_dir.into();
    }

    /// Cap on spooled ping files; the oldest are pruned beyond it.
    pub fn set_max_pending_pings(&mut self, max: usize) {
        self.max_pending_pings = max;
    }

    #[inline]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    #[inline]
    pub(crate) fn max_pending_pings(&self) -> usize {
        self.max_pending_pings
    }

    pub(crate) fn user_store_path(&self) -> PathBuf {
        self.data_dir.join(USER_STORE_FILE)
    }

    pub(crate) fn pending_ping_dir(&self) -> PathBuf {
        self.data_dir.join(PENDING_PING_DIR)
    }

    pub(crate) fn check(&self) -> anyhow::Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(anyhow!("no data directory has been set"));
        }
        Ok(())
    }
}
