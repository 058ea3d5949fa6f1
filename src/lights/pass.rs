/// Where a `RayHandler` is inside of a frame.
///
/// ```text
/// Idle ─ update ─> Updated ─ prepare ─> Accumulating ─> (Blurring) ─> Accumulated
///                                                                          │
///                                   Composited <─ render_only ─────────────┘
/// ```
///
/// A new frame starts from `Idle`, `Updated`, `Accumulated` or `Composited`. Resizing
/// and disposing go back to `Idle`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PassState {
    Idle,
    Updated,
    Accumulating,
    Blurring,
    Accumulated,
    Composited,
}

impl Default for PassState {
    fn default() -> Self {
        PassState::Idle
    }
}

impl PassState {
    /// Returns true if a pass is running, lights are drawn or the light map is
    /// blurred.
    #[inline]
    pub fn is_in_pass(self) -> bool {
        self == PassState::Accumulating || self == PassState::Blurring
    }

    /// Returns true if `self -> next` is a legal transition.
    pub fn can_transit(self, next: PassState) -> bool {
        use self::PassState::*;

        match next {
            Idle | Updated | Accumulating => !self.is_in_pass(),
            Blurring => self == Accumulating,
            Accumulated => self == Accumulating || self == Blurring,
            Composited => self == Accumulated || self == Composited,
        }
    }
}
