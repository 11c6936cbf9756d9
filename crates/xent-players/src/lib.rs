//! Player implementations and the registry that resolves a `PlayerConfig`'s
//! `player_type` to one of them.

pub mod default_player;
pub mod envelope;
pub mod halting;
pub mod human;
pub mod local_view;
pub mod mock;
pub mod player;
pub mod registry;
pub mod websocket;

pub use default_player::{DefaultPlayer, Provider, ProviderClient};
pub use halting::HaltingPlayer;
pub use human::HumanPlayer;
pub use mock::MockPlayer;
pub use player::{MoveResult, Player, HALT_SENTINEL};
pub use registry::{PlayerFactory, PlayerRegistry};
pub use websocket::{WebSocketPlayer, WsElicitRequest};
