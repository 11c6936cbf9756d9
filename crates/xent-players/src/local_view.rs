//! Shared machinery for the player variants that build a prompt from a
//! presentation function: accumulate this player's event history via
//! `post`, then render `(state, history)` through the configured function.

use std::collections::BTreeMap;
use std::sync::Mutex;

use xent_core::{RegisterValue, XentEvent};
use xent_presentation::{PresentationContext, PresentationFn};

pub struct LocalView {
    history: Mutex<Vec<XentEvent>>,
    present: PresentationFn,
}

impl LocalView {
    pub fn new(present: PresentationFn) -> Self {
        Self {
            history: Mutex::new(Vec::new()),
            present,
        }
    }

    pub fn post(&self, event: XentEvent) {
        self.history.lock().expect("local view mutex poisoned").push(event);
    }

    pub fn render(&self, register_snapshot: &BTreeMap<char, RegisterValue>) -> String {
        let state: BTreeMap<char, String> = register_snapshot
            .iter()
            .map(|(name, value)| {
                let rendered = match value {
                    RegisterValue::Str(s) => s.primary().to_string(),
                    RegisterValue::List(l) => l.iter().map(|s| s.primary()).collect::<Vec<_>>().join(", "),
                };
                (*name, rendered)
            })
            .collect();
        let history = self.history.lock().expect("local view mutex poisoned");
        let ctx = PresentationContext::new(state, &history);
        (self.present)(&ctx)
    }
}
