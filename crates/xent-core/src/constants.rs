//! Fixed enumerations referenced throughout the data model. Mirrors
//! `xent.common.constants` from the original implementation.

use crate::config::PlayerName;

/// The full set of registers a DSL program may reference.
pub const ALL_REGISTERS: &[char] = &['a', 'b', 'c', 'l', 's', 't', 'x', 'y', 'p'];

/// Registers that hold list-valued (`XList`) data rather than `XString`.
pub const LIST_REGISTERS: &[char] = &['l'];

/// Registers that are write-once: assigning to an already-bound static
/// register is a game-kind error.
pub const STATIC_REGISTERS: &[char] = &['a', 'b', 'c'];

/// Registers visible to presentation functions.
pub const PUBLIC_REGISTERS: &[char] = &['a', 'b', 'p'];

/// Every player name a `PlayerConfig` may declare.
pub const ALL_PLAYERS: &[PlayerName] = &[
    PlayerName::Black,
    PlayerName::White,
    PlayerName::Alice,
    PlayerName::Bob,
    PlayerName::Carol,
    PlayerName::Env,
];

/// Players who see every register, public or not, when constructing a
/// presentation (they are trusted collaborators, not adversaries).
pub const OMNISCIENT_PLAYERS: &[PlayerName] = &[PlayerName::Black, PlayerName::White, PlayerName::Env];

/// Player name pairs whose rewards are constrained to sum to zero per round.
pub const ZERO_SUM_PLAYER_PAIRS: &[(PlayerName, PlayerName)] = &[(PlayerName::Black, PlayerName::White)];

/// Players whose `reward` events never affect any player's score.
pub const NO_REWARD_PLAYERS: &[PlayerName] = &[PlayerName::Env];

/// The canonical smoke-test program from the end-to-end scenarios (spec.md
/// §8 scenario 1): reveal a story, elicit a prefix, strip shared words, and
/// reward the judge's cross-entropy of the remainder.
pub const SIMPLE_GAME_CODE: &str = "assign(s=story())\nreveal(s)\nelicit(x, 10)\nassign(x=remove_common_words(x, s))\nreward(xed(s | x))";

/// Returns true if `name` is one of the two names in a zero-sum pair.
pub fn zero_sum_counterpart(name: PlayerName) -> Option<PlayerName> {
    for &(a, b) in ZERO_SUM_PLAYER_PAIRS {
        if a == name {
            return Some(b);
        }
        if b == name {
            return Some(a);
        }
    }
    None
}

pub fn is_static_register(r: char) -> bool {
    STATIC_REGISTERS.contains(&r)
}

pub fn is_public_register(r: char) -> bool {
    PUBLIC_REGISTERS.contains(&r)
}

pub fn is_list_register(r: char) -> bool {
    LIST_REGISTERS.contains(&r)
}

pub fn is_known_register(r: char) -> bool {
    ALL_REGISTERS.contains(&r)
}
