//! Invariant hooks for grid containers.
//!
//! Checks are active in debug builds, or in release builds compiled with the
//! `strict-invariants` / `check-invariants` features.

use crate::mesh_error::MeshError;

/// Whether invariant assertions are compiled in.
pub const INVARIANTS_ENABLED: bool = cfg!(any(
    debug_assertions,
    feature = "strict-invariants",
    feature = "check-invariants"
));

/// Types whose internal consistency can be checked on demand.
pub trait DebugInvariants {
    /// Validate invariants and return the first error encountered.
    fn validate_invariants(&self) -> Result<(), MeshError>;

    /// Panic on the first violated invariant when invariant checking is
    /// enabled; no-op otherwise.
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "{}", std::any::type_name::<Self>());
    }
}

/// Run a fallible check and panic with a formatted context on error when
/// invariant checking is enabled.
///
/// ```should_panic
/// # use icogrid::mesh_error::MeshError;
/// let check: Result<(), MeshError> = Err(MeshError::InvalidConfig("x".into()));
/// icogrid::debug_invariants!(check, "crop of {} cells", 3);
/// ```
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        if $crate::debug_invariants::INVARIANTS_ENABLED {
            if let Err(e) = $expr {
                panic!("[invariants] {}: {}", format!($($ctx)*), e);
            }
        }
    };
}
