//! Limits for entity replication.

use crate::mask::MAX_COMPONENTS;

/// Replication limits enforced per entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicationLimits {
    /// Maximum number of components per entity. Capped at
    /// [`MAX_COMPONENTS`] regardless of this value.
    pub max_components: usize,
    /// Consecutive deserialize passes with a size correction before the
    /// stream is rejected.
    pub max_consecutive_mismatches: usize,
}

impl Default for ReplicationLimits {
    fn default() -> Self {
        Self {
            max_components: MAX_COMPONENTS,
            max_consecutive_mismatches: 8,
        }
    }
}

impl ReplicationLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_components: 8,
            max_consecutive_mismatches: 2,
        }
    }

    /// Creates the loosest limits the mask width allows.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_components: MAX_COMPONENTS,
            max_consecutive_mismatches: usize::MAX,
        }
    }

    /// Returns the effective component limit.
    #[must_use]
    pub const fn component_limit(&self) -> usize {
        if self.max_components < MAX_COMPONENTS {
            self.max_components
        } else {
            MAX_COMPONENTS
        }
    }
}
