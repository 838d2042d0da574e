//! Low-level scroll primitives supplied by the host.

/// Moves the host's scroll viewport.
///
/// Calls are fire-and-forget: the navigator issues a command and does not
/// observe its outcome. Methods take `&self` because the host keeps its own
/// interior state (the same handle is usually shared with the view).
pub trait Scroller {
    /// Scrolls relative to the current position.
    ///
    /// `append_to_history` chains the move onto a scroll already in flight
    /// instead of starting from the settled position.
    fn scroll_by(&self, amount: f64, append_to_history: bool);

    /// Scrolls to an absolute offset.
    fn scroll_to(&self, offset: f64);
}
