//! The inputs a presentation function is given: the player's local register
//! view and its own event history, per spec.md §4.H.

use std::collections::BTreeMap;

use xent_core::XentEvent;

/// A presentation function's view of the world: the visible register
/// snapshot (already filtered to what this player is allowed to see — never
/// built from the live runtime registers directly) and the player's own
/// causally-ordered event history.
pub struct PresentationContext<'a> {
    pub state: BTreeMap<char, String>,
    pub history: &'a [XentEvent],
}

impl<'a> PresentationContext<'a> {
    pub fn new(state: BTreeMap<char, String>, history: &'a [XentEvent]) -> Self {
        Self { state, history }
    }

    /// Convenience accessor mirroring the original's `state["s"]`-style
    /// dictionary lookups; panics are never appropriate here since a
    /// missing register means the game's presentation function is
    /// misconfigured, which is a configuration-kind error the registry
    /// surfaces before this is ever called.
    pub fn get(&self, register: char) -> Option<&str> {
        self.state.get(&register).map(String::as_str)
    }
}
