/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

mod name;
pub use name::MetricName;

mod meta;
pub use meta::MetricMeta;

mod error;
pub use error::{ErrorKind, NoValueError};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("empty name")]
    Empty,
    #[error("invalid graphic char: {0}")]
    InvalidGraphic(char),
    #[error("not alpha numeric char")]
    NotAlphaNumeric,
}

/// How long recorded values for a metric are kept around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// Cleared when the destination ping gets submitted.
    Ping,
    /// Kept in memory for the duration of one application run.
    Application,
    /// Persisted on disk and reloaded across application runs.
    User,
}

fn chars_allowed_in_name(s: &str) -> Result<(), ParseError> {
    for c in s.chars() {
        if c.is_ascii() {
            match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' | '/' => {}
                _ => {
                    return if c.is_ascii_graphic() {
                        Err(ParseError::InvalidGraphic(c))
                    } else {
                        Err(ParseError::NotAlphaNumeric)
                    };
                }
            }
        } else if !c.is_alphanumeric() {
            return Err(ParseError::NotAlphaNumeric);
        }
    }
    Ok(())
}
