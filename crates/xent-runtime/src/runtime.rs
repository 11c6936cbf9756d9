//! Drives one parsed program through one round: register management,
//! instruction dispatch, player interaction, and scoring. See spec.md §4.D.

use std::collections::BTreeMap;
use std::sync::Arc;

use xent_core::constants::{zero_sum_counterpart, NO_REWARD_PLAYERS, OMNISCIENT_PLAYERS};
use xent_core::{GameMapRoundResult, PlayerName, RegisterFile, RegisterValue, RegisterValueSnapshot, TokenUsage, XString, XentError, XentEvent};
use xent_dsl::{Instruction, Program};
use xent_judge::Judge;
use xent_players::{Player, HALT_SENTINEL};
use xent_textgen::TextGenerator;

use crate::register_io::RegisterFileExt;
use crate::value::{eval_cond, eval_expr};

/// One fully wired game instance: a parsed program plus everything needed
/// to execute it against a concrete set of players.
pub struct GameRuntime {
    program: Program,
    judge: Arc<dyn Judge>,
    text_generator: Arc<dyn TextGenerator>,
    players: BTreeMap<PlayerName, Arc<dyn Player>>,
    store_full_player_interactions: bool,
    /// Players present for flavor or scripted opposition who never accrue
    /// score (SPEC_FULL.md's NPC supplement). Empty for ordinary units.
    npc_names: Vec<PlayerName>,
    /// The best reward any scored player has reached across rounds already
    /// played on this runtime. Updated at the end of each round; read at
    /// the start of the next to report `round_started`'s `best_score`.
    best_score: std::sync::Mutex<Option<f64>>,
}

impl GameRuntime {
    pub fn new(
        program: Program,
        judge: Arc<dyn Judge>,
        text_generator: Arc<dyn TextGenerator>,
        players: BTreeMap<PlayerName, Arc<dyn Player>>,
        store_full_player_interactions: bool,
    ) -> Self {
        Self {
            program,
            judge,
            text_generator,
            players,
            store_full_player_interactions,
            npc_names: Vec::new(),
            best_score: std::sync::Mutex::new(None),
        }
    }

    /// Marks `names` as NPCs: they remain addressable by `elicit`/`reveal`
    /// and receive broadcast events like any other player, but `reward`
    /// instructions targeting them never affect the unit's score.
    pub fn with_npcs(mut self, names: Vec<PlayerName>) -> Self {
        self.npc_names = names;
        self
    }

    /// The sole non-`env` player, used when an `elicit`/`reward` omits an
    /// explicit player name. Fails with a game-kind error for any map with
    /// more than one addressable player, since the omission is only
    /// unambiguous for single-player games.
    fn sole_player(&self) -> Result<PlayerName, XentError> {
        let mut candidates = self.players.keys().copied().filter(|name| *name != PlayerName::Env && !self.npc_names.contains(name));
        let first = candidates.next().ok_or_else(|| XentError::Game("no non-env player configured for this unit".into()))?;
        if candidates.next().is_some() {
            return Err(XentError::Game("elicit/reward omitted a player name in a multi-player game".into()));
        }
        Ok(first)
    }

    fn broadcast(&self, recipients: &[PlayerName], event: &XentEvent) {
        for name in recipients {
            if let Some(player) = self.players.get(name) {
                player.post(event.clone());
            }
        }
        if let Some(env) = self.players.get(&PlayerName::Env) {
            if !recipients.contains(&PlayerName::Env) {
                env.post(event.clone());
            }
        }
    }

    /// All configured player names, for events every participant should
    /// see (reveals, round lifecycle, failed ensures). `broadcast` adds
    /// `env` on top of whatever is passed here, so `env` is excluded to
    /// avoid posting the same event to it twice.
    fn all_players(&self) -> Vec<PlayerName> {
        self.players.keys().copied().filter(|name| *name != PlayerName::Env).collect()
    }

    /// Play one round to completion, returning its result. Does not mutate
    /// any state shared with other rounds: a fresh `RegisterFile` is used
    /// for each call.
    pub async fn run_round(&self, round_index: u32) -> Result<GameMapRoundResult, XentError> {
        let mut registers = RegisterFile::new();
        let mut rewards: BTreeMap<PlayerName, f64> = BTreeMap::new();
        let mut interactions = Vec::new();
        let mut history = Vec::new();
        let mut token_usage = TokenUsage::default();
        let mut halted = false;
        let mut pc = 0usize;

        let best_score_before = *self.best_score.lock().expect("best_score mutex is never poisoned");
        let round_started = XentEvent::RoundStarted {
            round_index,
            best_score: best_score_before,
        };
        self.broadcast(&self.all_players(), &round_started);
        history.push(round_started);

        while pc < self.program.instructions.len() {
            match &self.program.instructions[pc] {
                Instruction::Assign { register, expr, .. } => {
                    let value = eval_expr(expr, &registers, self.judge.as_ref(), self.text_generator.as_ref())?;
                    registers.write(*register, value.into_register_value()?)?;
                    pc += 1;
                },
                Instruction::Reveal { registers: names, .. } => {
                    let recipients = self.all_players();
                    for name in names {
                        let value = registers.read(*name)?;
                        let event = XentEvent::Reveal {
                            register: *name,
                            value: value.into(),
                        };
                        self.broadcast(&recipients, &event);
                        history.push(event);
                    }
                    pc += 1;
                },
                Instruction::Elicit {
                    player,
                    register,
                    max_tokens,
                    line,
                } => {
                    let player_name = player.unwrap_or(self.sole_player()?);
                    let player_impl = self
                        .players
                        .get(&player_name)
                        .ok_or_else(|| XentError::Game(format!("player '{player_name}' is not configured for this unit")))?
                        .clone();
                    let public_snapshot = registers.public_snapshot();
                    let snapshot = if OMNISCIENT_PLAYERS.contains(&player_name) { registers.full_snapshot() } else { public_snapshot.clone() };
                    let public_registers = public_snapshot.iter().map(|(name, value)| (*name, RegisterValueSnapshot::from(value))).collect();

                    let elicit_request = XentEvent::ElicitRequest {
                        line: *line,
                        player: player_name,
                        register: *register,
                        prompt: String::new(),
                        max_tokens: *max_tokens,
                        public_registers,
                    };
                    self.broadcast(&[player_name], &elicit_request);
                    history.push(elicit_request);

                    let result = player_impl.make_move(*register, snapshot, *max_tokens).await?;

                    if result.response == HALT_SENTINEL {
                        halted = true;
                        break;
                    }

                    registers.write(*register, RegisterValue::Str(XString::new(result.response.clone())))?;
                    token_usage = token_usage + result.token_usage;

                    let elicit_response = XentEvent::ElicitResponse {
                        player: player_name,
                        register: *register,
                        text: result.response.clone(),
                        usage: result.token_usage,
                    };
                    self.broadcast(&[player_name], &elicit_response);
                    history.push(elicit_response);

                    if self.store_full_player_interactions {
                        interactions.push(serde_json::json!({
                            "line": line,
                            "player": player_name.as_str(),
                            "register": register.to_string(),
                            "prompts": result.prompts,
                            "full_response": result.full_response,
                            "response": result.response,
                            "token_usage": result.token_usage,
                        }));
                    }

                    pc += 1;
                },
                Instruction::Reward { player, expr, .. } => {
                    let player_name = player.unwrap_or(self.sole_player()?);
                    let value = eval_expr(expr, &registers, self.judge.as_ref(), self.text_generator.as_ref())?;
                    let xent = match value {
                        crate::value::Value::Xent(x) => x,
                        other => return Err(XentError::Type(format!("reward expression must produce a token-xent list, found {other:?}"))),
                    };

                    let reward_event = XentEvent::Reward {
                        player: player_name,
                        xent: xent.clone(),
                    };
                    self.broadcast(&[player_name], &reward_event);
                    history.push(reward_event);

                    if !NO_REWARD_PLAYERS.contains(&player_name) && !self.npc_names.contains(&player_name) {
                        let total = xent.total_xent();
                        *rewards.entry(player_name).or_insert(0.0) += total;
                        if let Some(counterpart) = zero_sum_counterpart(player_name) {
                            *rewards.entry(counterpart).or_insert(0.0) -= total;
                        }
                    }

                    pc += 1;
                },
                Instruction::Ensure { conditions, beacon, line } => {
                    let mut outcomes = Vec::with_capacity(conditions.len());
                    for cond in conditions {
                        outcomes.push(eval_cond(cond, &registers, self.judge.as_ref(), self.text_generator.as_ref())?);
                    }
                    if outcomes.iter().all(|ok| *ok) {
                        pc += 1;
                    } else {
                        let failed_ensure = XentEvent::FailedEnsure {
                            line: *line,
                            outcomes,
                            beacon: beacon.clone(),
                        };
                        self.broadcast(&self.all_players(), &failed_ensure);
                        history.push(failed_ensure);
                        pc = self
                            .program
                            .resolve_label(beacon)
                            .ok_or_else(|| XentError::Game(format!("ensure beacon '{beacon}' is not declared")))?;
                    }
                },
                Instruction::Label { .. } => {
                    pc += 1;
                },
            }
        }

        let round_best = rewards.values().copied().fold(f64::NEG_INFINITY, f64::max);
        let best_score_after = match (best_score_before, rewards.is_empty()) {
            (best, true) => best,
            (Some(best), false) => Some(best.max(round_best)),
            (None, false) => Some(round_best),
        };
        *self.best_score.lock().expect("best_score mutex is never poisoned") = best_score_after;

        let round_finished = XentEvent::RoundFinished {
            round_index,
            halted,
            rewards: rewards.clone(),
            best_score: best_score_after,
        };
        self.broadcast(&self.all_players(), &round_finished);
        history.push(round_finished);

        let public_registers = registers
            .public_snapshot()
            .into_iter()
            .filter_map(|(name, value)| match value {
                RegisterValue::Str(s) => Some((name, s)),
                RegisterValue::List(_) => None,
            })
            .collect();

        Ok(GameMapRoundResult {
            round_index,
            halted,
            rewards,
            token_usage,
            public_registers,
            history,
            interactions,
        })
    }
}
