/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use log::warn;

use crate::types::ErrorKind;

pub(crate) const MAX_LIST_LENGTH: usize = 20;
pub(crate) const MAX_STRING_LENGTH: usize = 50;

/// Truncate `s` to at most `max` bytes, never splitting a char.
/// Returns true if the string was shortened.
pub(crate) fn truncate_string(s: &mut String, max: usize) -> bool {
    if s.len() <= max {
        return false;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
    true
}

/// Enforce the list and string limits on a candidate value.
///
/// Over-long lists keep their first MAX_LIST_LENGTH entries, over-long
/// strings are cut at MAX_STRING_LENGTH bytes. Each applied truncation
/// yields one error entry; the returned list is always usable.
pub(crate) fn validate_list(mut values: Vec<String>, id: &str) -> (Vec<String>, Vec<ErrorKind>) {
    let mut errors = Vec::new();

    if values.len() > MAX_LIST_LENGTH {
        warn!("string list {id} exceeds {MAX_LIST_LENGTH} items, truncating");
        values.truncate(MAX_LIST_LENGTH);
        errors.push(ErrorKind::InvalidOverflow);
    }

    for v in values.iter_mut() {
        if truncate_string(v, MAX_STRING_LENGTH) {
            warn!("string list {id} has an item longer than {MAX_STRING_LENGTH} bytes, truncating");
            errors.push(ErrorKind::InvalidOverflow);
        }
    }

    (values, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn within_limits() {
        let values = vec!["a".to_string(), "b".to_string()];
        let (accepted, errors) = validate_list(values.clone(), "t.m");
        assert_eq!(accepted, values);
        assert!(errors.is_empty());

        let (accepted, errors) = validate_list(Vec::new(), "t.m");
        assert!(accepted.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn list_overflow() {
        let values = vec!["a".to_string(); MAX_LIST_LENGTH + 30];
        let (accepted, errors) = validate_list(values, "t.m");
        assert_eq!(accepted.len(), MAX_LIST_LENGTH);
        assert_eq!(errors, vec![ErrorKind::InvalidOverflow]);
    }

    #[test]
    fn string_overflow() {
        let values = vec!["a".repeat(MAX_STRING_LENGTH + 1), "b".to_string()];
        let (accepted, errors) = validate_list(values, "t.m");
        assert_eq!(accepted[0].len(), MAX_STRING_LENGTH);
        assert_eq!(accepted[1], "b");
        assert_eq!(errors, vec![ErrorKind::InvalidOverflow]);
    }

    #[test]
    fn string_overflow_per_item() {
        let values = vec![
            "a".repeat(MAX_STRING_LENGTH + 1),
            "b".repeat(MAX_STRING_LENGTH + 1),
        ];
        let (accepted, errors) = validate_list(values, "t.m");
        assert_eq!(accepted[0].len(), MAX_STRING_LENGTH);
        assert_eq!(accepted[1].len(), MAX_STRING_LENGTH);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn truncate_on_char_boundary() {
        let mut s = "ä".repeat(MAX_STRING_LENGTH);
        assert!(truncate_string(&mut s, MAX_STRING_LENGTH));
        assert!(s.len() <= MAX_STRING_LENGTH);
        assert!(s.is_char_boundary(s.len()));

        let mut s = "short".to_string();
        assert!(!truncate_string(&mut s, MAX_STRING_LENGTH));
        assert_eq!(s, "short");
    }
}
