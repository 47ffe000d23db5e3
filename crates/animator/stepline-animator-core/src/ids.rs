//! Animator identities.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Scheduler registry key. Every constructed animator receives a fresh one.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnimatorId(pub u64);

impl fmt::Display for AnimatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

static NEXT_ANIMATOR: AtomicU64 = AtomicU64::new(1);

impl AnimatorId {
    /// Allocate the next process-wide identity.
    /// Monotonic; never hands out the same value twice.
    #[inline]
    pub fn next() -> Self {
        AnimatorId(NEXT_ANIMATOR.fetch_add(1, Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let a = AnimatorId::next();
        let b = AnimatorId::next();
        assert!(b > a);
        assert_ne!(a, b);
        assert_eq!(AnimatorId(7).to_string(), "#7");
    }
}
