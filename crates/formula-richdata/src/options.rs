use serde::{Deserialize, Serialize};

/// How writers treat `count=` attributes on list containers (`cellMetadata`, `valueMetadata`,
/// `futureMetadata`, `rvData`).
///
/// An absent count is never written, whatever the policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CountPolicy {
    /// Write the actual number of children in place of a stored count, so edited lists never
    /// produce self-inconsistent output.
    #[default]
    Recompute,
    /// Write the stored count as-is, even when it no longer matches the list.
    Preserve,
}

impl CountPolicy {
    pub(crate) fn resolve(self, stored: Option<i64>, actual: usize) -> Option<i64> {
        match self {
            Self::Recompute => stored.map(|_| len_to_count(actual)),
            Self::Preserve => stored,
        }
    }
}

pub(crate) fn len_to_count(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

/// Options for the part writers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOptions {
    pub count_policy: CountPolicy,
}

impl WriteOptions {
    /// Re-emit every stored count exactly as parsed.
    pub const PRESERVE_COUNTS: Self = Self {
        count_policy: CountPolicy::Preserve,
    };
}
