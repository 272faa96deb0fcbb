/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use super::{Lifetime, MetricName};

/// Immutable registration data for a metric.
#[derive(Debug, Clone)]
pub struct MetricMeta {
    name: MetricName,
    send_in_pings: Vec<String>,
    lifetime: Lifetime,
    disabled: bool,
}

impl MetricMeta {
    pub fn new(name: MetricName, send_in_pings: Vec<String>, lifetime: Lifetime) -> Self {
        MetricMeta {
            name,
            send_in_pings,
            lifetime,
            disabled: false,
        }
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    #[inline]
    pub fn name(&self) -> &MetricName {
        &self.name
    }

    #[inline]
    pub fn send_in_pings(&self) -> &[String] {
        &self.send_in_pings
    }

    #[inline]
    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    #[inline]
    pub fn disabled(&self) -> bool {
        self.disabled
    }

    pub(crate) fn default_ping(&self) -> &str {
        self.send_in_pings.first().map(|s| s.as_str()).unwrap_or_default()
    }
}
