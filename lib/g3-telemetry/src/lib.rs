/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod config;
pub use config::TelemetryConfig;

mod types;
pub use types::{ErrorKind, Lifetime, MetricMeta, MetricName, NoValueError, ParseError};

mod validate;

mod store;

mod runtime;

mod export;

mod collect;
pub use collect::{Collector, StringListMetric};
