/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;

use thiserror::Error;

/// Data-quality error categories tracked per metric and destination ping.
///
/// These are never returned to callers. Offending data is coerced into a
/// usable form and the occurrence is counted, so collection keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKind {
    InvalidValue,
    InvalidLabel,
    InvalidState,
    InvalidOverflow,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidValue => "invalid_value",
            ErrorKind::InvalidLabel => "invalid_label",
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::InvalidOverflow => "invalid_overflow",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned by test introspection when a metric has recorded nothing yet.
#[derive(Debug, Error)]
#[error("no value recorded for metric {metric} in ping {ping}")]
pub struct NoValueError {
    metric: String,
    ping: String,
}

impl NoValueError {
    pub(crate) fn new(metric: String, ping: String) -> Self {
        NoValueError { metric, ping }
    }
}
