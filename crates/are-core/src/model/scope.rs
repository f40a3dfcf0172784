//! Jurisdictional, temporal, and operational boundaries on claims.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CompileError;

/// The boundaries within which a claim applies.
///
/// Empty sets are universal for their dimension: a claim with no
/// jurisdictions applies in all jurisdictions. Scope is fail-open by
/// design; authorization stays fail-closed because it requires a matching
/// claim to exist at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    /// Jurisdictions this claim applies in. Empty means all.
    #[serde(default)]
    pub jurisdictions: Vec<String>,
    /// Operation names this claim covers. Empty means all.
    #[serde(default)]
    pub operations: Vec<String>,
    /// Inclusive start of the validity window, if bounded.
    #[serde(default)]
    pub time_start: Option<DateTime<Utc>>,
    /// Inclusive end of the validity window, if bounded.
    #[serde(default)]
    pub time_end: Option<DateTime<Utc>>,
}

impl Scope {
    /// Checks that the temporal bounds are ordered.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::InvalidScope`] if `time_start` is after
    /// `time_end`.
    pub fn validate(&self) -> Result<(), CompileError> {
        if let (Some(start), Some(end)) = (self.time_start, self.time_end) {
            if start > end {
                return Err(CompileError::InvalidScope);
            }
        }
        Ok(())
    }

    /// Whether this scope is contained within `outer`.
    ///
    /// Containment requires subset jurisdictions, subset operations, and
    /// (where both sides bound a temporal end) tighter bounds on this
    /// side. An absent bound on `outer` is universal on that side; an
    /// absent bound here is not constrained against a present outer bound
    /// (the inner scope inherits it).
    #[must_use]
    pub fn is_contained_in(&self, outer: &Self) -> bool {
        let outer_jurisdictions: HashSet<&str> =
            outer.jurisdictions.iter().map(String::as_str).collect();
        if !self
            .jurisdictions
            .iter()
            .all(|j| outer_jurisdictions.contains(j.as_str()))
        {
            return false;
        }

        let outer_operations: HashSet<&str> =
            outer.operations.iter().map(String::as_str).collect();
        if !self
            .operations
            .iter()
            .all(|o| outer_operations.contains(o.as_str()))
        {
            return false;
        }

        if let (Some(outer_start), Some(inner_start)) = (outer.time_start, self.time_start) {
            if inner_start < outer_start {
                return false;
            }
        }
        if let (Some(outer_end), Some(inner_end)) = (outer.time_end, self.time_end) {
            if inner_end > outer_end {
                return false;
            }
        }

        true
    }

    /// Specificity score used by the precedence key.
    ///
    /// Counts named jurisdictions and operations, with each present time
    /// bound contributing −10.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn specificity(&self) -> i64 {
        let mut specificity =
            self.jurisdictions.len() as i64 + self.operations.len() as i64;
        if self.time_start.is_some() {
            specificity -= 10;
        }
        if self.time_end.is_some() {
            specificity -= 10;
        }
        specificity
    }
}
