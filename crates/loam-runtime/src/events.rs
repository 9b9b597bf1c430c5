/// Signals raised to the host on the primary context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WorldEvent {
    /// The first generation cycle finished syncing. Raised once per world lifetime.
    WorldCreated,
    /// A cycle started by `load_additional_chunks` finished syncing.
    NewChunksGenerated,
    /// A cycle was superseded, shut down, or observed a cancelled token.
    CycleCancelled,
}
