/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;

use super::{ParseError, chars_allowed_in_name};

/// Identity of a metric, a validated (category, name) pair.
///
/// The category may be empty for uncategorized metrics, the name may not.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetricName {
    category: String,
    name: String,
}

impl MetricName {
    pub fn new(category: &str, name: &str) -> Result<Self, ParseError> {
        if name.is_empty() {
            return Err(ParseError::Empty);
        }
        chars_allowed_in_name(category)?;
        chars_allowed_in_name(name)?;
        Ok(MetricName {
            category: category.to_string(),
            name: name.to_string(),
        })
    }

    #[inline]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The storage and payload key for this metric.
    pub fn identifier(&self) -> String {
        if self.category.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.category, self.name)
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.category.is_empty() {
            f.write_str(&self.category)?;
            f.write_str(".")?;
        }
        f.write_str(&self.name)
    }
}
