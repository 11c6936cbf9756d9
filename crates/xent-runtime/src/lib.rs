//! The game runtime: executes one parsed program against a set of players
//! for one round, managing registers, player interaction, and scoring.

pub mod register_io;
pub mod runtime;
pub mod value;

pub use runtime::GameRuntime;
pub use value::Value;

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use xent_core::PlayerName;
    use xent_dsl::parse;
    use xent_judge::DeterministicJudge;
    use xent_players::{HaltingPlayer, MockPlayer, Player};
    use xent_textgen::{CorpusMode, CorpusTextGenerator};

    use super::*;

    fn players(map: Vec<(PlayerName, Arc<dyn Player>)>) -> BTreeMap<PlayerName, Arc<dyn Player>> {
        map.into_iter().collect()
    }

    #[tokio::test]
    async fn smoke_test_program_produces_one_reward() {
        let program = parse(xent_core::constants::SIMPLE_GAME_CODE).unwrap();
        let judge = Arc::new(DeterministicJudge::default());
        let text_generator = Arc::new(CorpusTextGenerator::new(vec!["the quick brown fox".into()], CorpusMode::Sequential, 0));
        let mock: Arc<dyn Player> = Arc::new(MockPlayer::fixed("zzzzz"));
        let runtime = GameRuntime::new(program, judge, text_generator, players(vec![(PlayerName::Black, mock)]), false);

        let result = runtime.run_round(0).await.unwrap();
        assert!(!result.halted);
        assert_eq!(result.rewards.len(), 1);
        assert!(*result.rewards.values().next().unwrap() >= 0.0);
    }

    #[tokio::test]
    async fn ensure_failure_jumps_to_beacon_and_retries() {
        let source = "retry:\nelicit(x,5)\nensure(len(x)>0, beacon=retry)\nreward(xed(\"a\" | x))\n";
        let program = parse(source).unwrap();
        let judge = Arc::new(DeterministicJudge::default());
        let text_generator = Arc::new(CorpusTextGenerator::new(vec!["unused".into()], CorpusMode::Sequential, 0));
        let mock: Arc<dyn Player> = Arc::new(MockPlayer::new(vec!["".into(), "a".into()]));
        let runtime = GameRuntime::new(program, judge, text_generator, players(vec![(PlayerName::Black, mock)]), false);

        let result = runtime.run_round(0).await.unwrap();
        assert!(!result.halted);
        assert_eq!(result.rewards.len(), 1, "retrying elicit after the failed ensure should eventually reach the reward");
    }

    #[tokio::test]
    async fn ensure_with_multiple_conditions_records_every_outcome() {
        let source = "retry:\nelicit(x,5)\nensure(len(x)>0, len(x)>10, beacon=retry)\nreward(xed(\"a\" | x))\n";
        let program = parse(source).unwrap();
        let judge = Arc::new(DeterministicJudge::default());
        let text_generator = Arc::new(CorpusTextGenerator::new(vec!["unused".into()], CorpusMode::Sequential, 0));
        let mock: Arc<dyn Player> = Arc::new(MockPlayer::new(vec!["a".into(), "aaaaaaaaaaaa".into()]));
        let runtime = GameRuntime::new(program, judge, text_generator, players(vec![(PlayerName::Black, mock)]), false);

        let result = runtime.run_round(0).await.unwrap();
        let failures: Vec<_> = result
            .history
            .iter()
            .filter_map(|e| match e {
                xent_core::XentEvent::FailedEnsure { outcomes, beacon, .. } => Some((outcomes.clone(), beacon.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, vec![true, false], "the first condition held but the second didn't, and both must be recorded");
        assert_eq!(failures[0].1, "retry");
    }

    #[tokio::test]
    async fn round_result_sums_token_usage_and_retains_full_history() {
        let program = parse(xent_core::constants::SIMPLE_GAME_CODE).unwrap();
        let judge = Arc::new(DeterministicJudge::default());
        let text_generator = Arc::new(CorpusTextGenerator::new(vec!["the quick brown fox".into()], CorpusMode::Sequential, 0));
        let mock: Arc<dyn Player> = Arc::new(MockPlayer::fixed("zzzzz").with_usage(xent_core::TokenUsage::new(7, 3)));
        let runtime = GameRuntime::new(program, judge, text_generator, players(vec![(PlayerName::Black, mock)]), false);

        let result = runtime.run_round(0).await.unwrap();
        assert_eq!(result.token_usage, xent_core::TokenUsage::new(7, 3), "the round's single elicit response's usage should be reflected in the round total");
        assert!(matches!(result.history.first(), Some(xent_core::XentEvent::RoundStarted { .. })));
        assert!(matches!(result.history.last(), Some(xent_core::XentEvent::RoundFinished { .. })));
        assert!(result.history.iter().any(|e| matches!(e, xent_core::XentEvent::Reveal { .. })));
        assert!(result.history.iter().any(|e| matches!(e, xent_core::XentEvent::Reward { .. })));
    }

    #[tokio::test]
    async fn best_score_tracks_the_best_reward_across_sequential_rounds() {
        let source = "elicit(x,5)\nreward(xed(\"aaaa\" | x))\n";
        let program = parse(source).unwrap();
        let judge = Arc::new(DeterministicJudge::default());
        let text_generator = Arc::new(CorpusTextGenerator::new(vec!["unused".into()], CorpusMode::Sequential, 0));
        let mock: Arc<dyn Player> = Arc::new(MockPlayer::new(vec!["a".into(), "aaaa".into()]));
        let runtime = GameRuntime::new(program, judge, text_generator, players(vec![(PlayerName::Black, mock)]), false);

        let first = runtime.run_round(0).await.unwrap();
        let first_started = first.history.first().unwrap();
        assert!(matches!(first_started, xent_core::XentEvent::RoundStarted { best_score: None, .. }));

        let second = runtime.run_round(1).await.unwrap();
        let second_started = second.history.first().unwrap();
        assert!(matches!(second_started, xent_core::XentEvent::RoundStarted { best_score: Some(_), .. }), "the second round should start knowing the first round's best score");
    }

    #[tokio::test]
    async fn halting_player_ends_the_round_without_a_reward() {
        let source = "elicit(x,5)\nreward(xed(\"a\" | x))\n";
        let program = parse(source).unwrap();
        let judge = Arc::new(DeterministicJudge::default());
        let text_generator = Arc::new(CorpusTextGenerator::new(vec!["unused".into()], CorpusMode::Sequential, 0));
        let halting: Arc<dyn Player> = Arc::new(HaltingPlayer);
        let runtime = GameRuntime::new(program, judge, text_generator, players(vec![(PlayerName::Black, halting)]), false);

        let result = runtime.run_round(0).await.unwrap();
        assert!(result.halted);
        assert!(result.rewards.is_empty());
    }

    #[tokio::test]
    async fn npc_rewards_are_excluded_from_scoring() {
        let source = "elicit(black, x, 5)\nelicit(alice, y, 5)\nreward(black, xed(\"context\" | x))\nreward(alice, xed(\"context\" | y))\n";
        let program = parse(source).unwrap();
        let judge = Arc::new(DeterministicJudge::default());
        let text_generator = Arc::new(CorpusTextGenerator::new(vec!["unused".into()], CorpusMode::Sequential, 0));
        let black: Arc<dyn Player> = Arc::new(MockPlayer::fixed("alpha"));
        let alice: Arc<dyn Player> = Arc::new(MockPlayer::fixed("beta"));
        let runtime = GameRuntime::new(program, judge, text_generator, players(vec![(PlayerName::Black, black), (PlayerName::Alice, alice)]), false)
            .with_npcs(vec![PlayerName::Alice]);

        let result = runtime.run_round(0).await.unwrap();
        assert_eq!(result.rewards.len(), 1);
        assert!(result.rewards.contains_key(&PlayerName::Black));
        assert!(!result.rewards.contains_key(&PlayerName::Alice));
    }

    #[tokio::test]
    async fn zero_sum_pair_rewards_sum_to_zero() {
        let source = "elicit(black, x, 5)\nelicit(white, y, 5)\nreward(black, xed(\"context\" | x))\nreward(white, xed(\"context\" | y))\n";
        let program = parse(source).unwrap();
        let judge = Arc::new(DeterministicJudge::default());
        let text_generator = Arc::new(CorpusTextGenerator::new(vec!["unused".into()], CorpusMode::Sequential, 0));
        let black: Arc<dyn Player> = Arc::new(MockPlayer::fixed("alpha"));
        let white: Arc<dyn Player> = Arc::new(MockPlayer::fixed("beta"));
        let runtime = GameRuntime::new(program, judge, text_generator, players(vec![(PlayerName::Black, black), (PlayerName::White, white)]), false);

        let result = runtime.run_round(0).await.unwrap();
        let total: f64 = result.rewards.values().sum();
        assert!(total.abs() < 1e-9);
    }

    proptest::proptest! {
        #[test]
        fn zero_sum_pair_rewards_sum_to_zero_for_arbitrary_moves(context in "[^\"\n]{0,30}", black_move in ".{0,20}", white_move in ".{0,20}") {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let source = format!("elicit(black, x, 20)\nelicit(white, y, 20)\nreward(black, xed(\"{context}\" | x))\nreward(white, xed(\"{context}\" | y))\n");
                let program = parse(&source).unwrap();
                let judge = Arc::new(DeterministicJudge::default());
                let text_generator = Arc::new(CorpusTextGenerator::new(vec!["unused".into()], CorpusMode::Sequential, 0));
                let black: Arc<dyn Player> = Arc::new(MockPlayer::fixed(black_move));
                let white: Arc<dyn Player> = Arc::new(MockPlayer::fixed(white_move));
                let runtime = GameRuntime::new(program, judge, text_generator, players(vec![(PlayerName::Black, black), (PlayerName::White, white)]), false);

                let result = runtime.run_round(0).await.unwrap();
                let total: f64 = result.rewards.values().sum();
                proptest::prop_assert!(total.abs() < 1e-6);
                Ok(())
            })?;
        }
    }
}
