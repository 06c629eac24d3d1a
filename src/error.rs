use std::fmt;

use thiserror::Error;

/// A push was rejected because the backing pool has no free node.
///
/// Carries the rejected value back to the caller, so nothing is lost and
/// the push can be retried after a pop frees a slot.
#[derive(Error, Clone, Copy, PartialEq, Eq)]
#[error("node pool exhausted")]
pub struct Full<T>(pub T);

impl<T> Full<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

// No `T: Debug` bound, same as std's SendError.
impl<T> fmt::Debug for Full<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Full(..)")
    }
}
