//! Resolves a `player_type` string from a `PlayerConfig` to a concrete
//! `Player` implementation. Populated once at process startup; registering
//! the same type twice is a configuration error rather than a silent
//! overwrite, since a duplicate almost always means a programming mistake
//! rather than an intentional override.

use std::collections::HashMap;
use std::sync::Arc;

use xent_core::{PlayerConfig, XentError};

use crate::mock::MockPlayer;
use crate::player::Player;

pub type PlayerFactory = Arc<dyn Fn(&PlayerConfig) -> Result<Arc<dyn Player>, XentError> + Send + Sync>;

pub struct PlayerRegistry {
    factories: HashMap<String, PlayerFactory>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self { factories: HashMap::new() }
    }

    /// A registry pre-populated with the `mock` and `halting` player types,
    /// the only two that require no external configuration to construct.
    /// `default`, `human`, and `websocket` are registered by `xentd` at
    /// startup once their configuration (provider credentials, presentation
    /// registry, websocket channel) is available.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .register("mock", Arc::new(|cfg: &PlayerConfig| {
                let responses = cfg
                    .options
                    .get("responses")
                    .and_then(|v| v.as_array())
                    .map(|values| values.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
                    .unwrap_or_default();
                Ok(Arc::new(MockPlayer::new(responses)) as Arc<dyn Player>)
            }))
            .expect("builtin registration cannot collide");
        registry
            .register("halting", Arc::new(|_cfg: &PlayerConfig| Ok(Arc::new(crate::halting::HaltingPlayer) as Arc<dyn Player>)))
            .expect("builtin registration cannot collide");
        registry
    }

    pub fn register(&mut self, player_type: &str, factory: PlayerFactory) -> Result<(), XentError> {
        if self.factories.contains_key(player_type) {
            return Err(XentError::Configuration(format!("player type '{player_type}' is already registered")));
        }
        self.factories.insert(player_type.to_string(), factory);
        Ok(())
    }

    pub fn build(&self, config: &PlayerConfig) -> Result<Arc<dyn Player>, XentError> {
        let factory = self
            .factories
            .get(&config.player_type)
            .ok_or_else(|| XentError::Configuration(format!("unknown player type '{}'", config.player_type)))?;
        factory(config)
    }
}

impl Default for PlayerRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
