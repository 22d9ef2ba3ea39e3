//! Sealed trait marker for [`Transport`](super::Transport) implementations.

pub(crate) mod private {
    /// Sealed trait marker.
    ///
    /// Cannot be implemented outside this crate, so every transport sends the
    /// fixed gateway headers and honors signing.
    pub trait Sealed {}
}
