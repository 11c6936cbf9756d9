//! The built-in presentation functions, ported from the original
//! implementation's `games/*_presentation.py` modules. Each renders the
//! player's visible state and its own history into a single prompt string,
//! wrapped for the `<move></move>` envelope that `xent_players::envelope`
//! strips back off the response.

use xent_core::XentEvent;

use crate::context::PresentationContext;

const MOVE_INSTRUCTIONS_FIRST: &str =
    "Provide your prefix inside of `<move></move>` tags. Any other text in your response will be ignored. You will be given feedback on your prefix and a chance to improve your prefix.";
const MOVE_INSTRUCTIONS_RETRY: &str =
    "Use your previous attempts above to further optimize your prefix. Provide your prefix inside of `<move></move>` tags. Any other text in your response will be ignored.";

fn wrap_with_attempts(overview: String, attempts: Vec<String>) -> String {
    if attempts.is_empty() {
        [overview, MOVE_INSTRUCTIONS_FIRST.to_string()].join("\n")
    } else {
        let mut lines = vec![overview, "<previousAttempts>".to_string()];
        lines.extend(attempts);
        lines.push("</previousAttempts>".to_string());
        lines.push(MOVE_INSTRUCTIONS_RETRY.to_string());
        lines.join("\n")
    }
}

/// One text, one prefix: minimize the cross-entropy of `s` given the
/// player's response. Ported from `single_presentation.py`.
pub fn single(ctx: &PresentationContext) -> String {
    let story = ctx.get('s').unwrap_or_default();
    let overview = format!(
        "I am going to give you a short text. Your job is to provide a string that will prefix that text. Your goal is to minimize the cross-entropy of the text given the prefix you provide. You should respond with what will make the text as likely as possible.\n\nThe text is: \"{story}\"\n\nYour response will be used as the prefix to that text and you will be scored on how well it helps predict that text. You may not use any words from the text in your response, regardless of case or punctuation. You can only use a maximum of 10 tokens for your prefix."
    );

    let mut attempts = Vec::new();
    for event in ctx.history {
        match event {
            XentEvent::ElicitResponse { text, .. } => {
                attempts.push("<attempt>".to_string());
                attempts.push(format!("You provided: {text}"));
            },
            XentEvent::Reward { xent, .. } => {
                attempts.push(format!("Total score for that response: {:.2}", xent.total_xent()));
                attempts.push(format!("Per token score for that response: {xent}"));
                attempts.push("</attempt>".to_string());
            },
            _ => {},
        }
    }
    wrap_with_attempts(overview, attempts)
}

const ORDINALS: &[&str] = &["first", "second", "third"];

/// Three texts, one shared prefix: minimize the summed cross-entropy across
/// all three. Ported from `multi_presentation.py`.
pub fn multi(ctx: &PresentationContext) -> String {
    let s1 = ctx.get('a').unwrap_or_default();
    let s2 = ctx.get('b').unwrap_or_default();
    let s3 = ctx.get('c').unwrap_or_default();
    let overview = format!(
        "I am going to give you 3 short texts. Your job is to provide a string that will prefix those texts. Your goal is to minimize the cross-entropy of each of the texts given the prefix you provide. You should respond with what will make the text as likely as possible.\n\nFirst text: \"{s1}\"\nSecond text: \"{s2}\"\nThird text: \"{s3}\"\n\nYour response will be used as a prefix to each of those texts and you will be scored on how well it helps predict those texts. Your score will be the sum of the cross entropy of the texts given the prefix. You may not use any words from any of the texts in your response, regardless of case or punctuation. You can only use a maximum of 10 tokens for your prefix."
    );
    render_multi_reward_attempts(ctx, overview, 3)
}

/// Two texts, one shared prefix, opposing goals: minimize cross-entropy of
/// the first while maximizing it for the second. Ported from
/// `dex_presentation.py`.
pub fn dex(ctx: &PresentationContext) -> String {
    let s1 = ctx.get('a').unwrap_or_default();
    let s2 = ctx.get('b').unwrap_or_default();
    let overview = format!(
        "I am going to give you two short texts. Your job is to provide a string such that when the first story is prefixed with your string, the cross entropy of the text is minimized. But when the second story is prefixed with your string, the cross entropy of the text is maximized. So you want to find a string that helps predict the first story, while also making the second story less likely. Your score will be the negative of the cross entropy of the first text plus the cross entropy of the second text.\n\nFirst text: {s1}\nSecond text: {s2}\n\nYour string must not use any words from either text, regardless of case or punctuation. Your string must be at most 10 tokens long.\n\nSo think hard about what you can say in 10 tokens that will minimize the cross entropy of the first text, while maximizing the cross entropy of the second text."
    );
    render_multi_reward_attempts(ctx, overview, 2)
}

fn render_multi_reward_attempts(ctx: &PresentationContext, overview: String, rewards_per_attempt: usize) -> String {
    let mut attempts = Vec::new();
    let mut reward_count = 0usize;
    for event in ctx.history {
        match event {
            XentEvent::ElicitResponse { text, .. } => {
                attempts.push("<attempt>".to_string());
                attempts.push(format!("You provided: {text}"));
            },
            XentEvent::Reward { xent, .. } => {
                let label = ORDINALS.get(reward_count).copied().unwrap_or("additional");
                attempts.push(format!("Score for the {label} text: {:.2}", xent.total_xent()));
                attempts.push(format!("Per token score for the {label} text: {xent}"));
                reward_count += 1;
                if reward_count == rewards_per_attempt {
                    attempts.push("</attempt>".to_string());
                    reward_count = 0;
                }
            },
            _ => {},
        }
    }
    wrap_with_attempts(overview, attempts)
}

/// A chain of continuations, each retried on `ensure` failure until it
/// succeeds. Ported from `likely_sequence_unlikely_result_presentation.py`.
pub fn likely_sequence_unlikely_result(ctx: &PresentationContext) -> String {
    let story = ctx.get('s').unwrap_or_default();

    let mut successful_texts = vec![story.to_string()];
    let mut failures_by_step: Vec<Vec<String>> = Vec::new();
    let mut current_step_failures: Vec<String> = Vec::new();

    for (i, event) in ctx.history.iter().enumerate() {
        if let XentEvent::ElicitResponse { text, .. } = event {
            let is_failure = ctx.history.get(i + 1).is_some_and(|next| matches!(next, XentEvent::FailedEnsure { .. }));
            if is_failure {
                current_step_failures.push(text.clone());
            } else {
                successful_texts.push(text.clone());
                failures_by_step.push(std::mem::take(&mut current_step_failures));
            }
        }
    }

    let mut lines = Vec::new();
    if ctx.history.is_empty() {
        lines.push("You are starting a new game.".to_string());
        lines.push(format!("The initial text is: \"{story}\""));
    } else {
        lines.push("A history of your play so far:".to_string());
        lines.push("\n<fullHistory>".to_string());

        for (i, failures) in failures_by_step.iter().enumerate() {
            let prompt_text = &successful_texts[i];
            let success_text = &successful_texts[i + 1];
            lines.push(format!("  <step index=\"{}\">", i + 1));
            lines.push(format!("    <prompt>Continuing from: \"{prompt_text}\"</prompt>"));
            if !failures.is_empty() {
                lines.push("    <failures>".to_string());
                for attempt in failures {
                    lines.push(format!("      <attempt>\"{attempt}\"</attempt>"));
                }
                lines.push("    </failures>".to_string());
            }
            lines.push(format!("    <success>\"{success_text}\"</success>"));
            lines.push("  </step>".to_string());
        }

        if !current_step_failures.is_empty() {
            let prompt_text = successful_texts.last().unwrap();
            lines.push(format!("  <currentStep index=\"{}\">", successful_texts.len()));
            lines.push(format!("    <prompt>Continuing from: \"{prompt_text}\"</prompt>"));
            lines.push("    <failures>".to_string());
            for attempt in &current_step_failures {
                lines.push(format!("      <attempt>\"{attempt}\"</attempt>"));
            }
            lines.push("    </failures>".to_string());
            lines.push("  </currentStep>".to_string());
        }

        lines.push("</fullHistory>".to_string());
    }

    lines.push("\n---".to_string());

    let full_story_so_far = ctx.get('l').map(str::to_string).unwrap_or_else(|| successful_texts.join(" "));
    let last_successful_text = ctx.get('x').map(str::to_string).unwrap_or_else(|| story.to_string());

    lines.push(format!("The full text so far is: \"{full_story_so_far}\""));
    lines.push(format!("The previous item you are building off of is: \"{last_successful_text}\""));
    lines.push("\nNow provide your next move within the <move></move> tags.".to_string());

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use xent_core::TokenXentList;

    use super::*;

    fn state(pairs: &[(char, &str)]) -> BTreeMap<char, String> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn single_includes_story_and_first_time_instructions() {
        let history = Vec::new();
        let ctx = PresentationContext::new(state(&[('s', "the fox jumps")]), &history);
        let text = single(&ctx);
        assert!(text.contains("the fox jumps"));
        assert!(text.contains(MOVE_INSTRUCTIONS_FIRST));
    }

    #[test]
    fn single_renders_prior_attempt_scores() {
        let history = vec![
            XentEvent::ElicitResponse {
                player: xent_core::PlayerName::Black,
                register: 'x',
                text: "my prefix".to_string(),
                usage: Default::default(),
            },
            XentEvent::Reward {
                player: xent_core::PlayerName::Black,
                xent: TokenXentList::new(vec![("tok".to_string(), 1.5)]),
            },
        ];
        let ctx = PresentationContext::new(state(&[('s', "story")]), &history);
        let text = single(&ctx);
        assert!(text.contains("You provided: my prefix"));
        assert!(text.contains("Total score for that response: 1.50"));
        assert!(text.contains(MOVE_INSTRUCTIONS_RETRY));
    }

    #[test]
    fn dex_alternates_first_and_second_labels() {
        let history = vec![
            XentEvent::Reward {
                player: xent_core::PlayerName::Black,
                xent: TokenXentList::new(vec![("t".to_string(), 1.0)]),
            },
            XentEvent::Reward {
                player: xent_core::PlayerName::Black,
                xent: TokenXentList::new(vec![("t".to_string(), 2.0)]),
            },
        ];
        let ctx = PresentationContext::new(state(&[('a', "s1"), ('b', "s2")]), &history);
        let text = dex(&ctx);
        assert!(text.contains("Score for the first text"));
        assert!(text.contains("Score for the second text"));
    }

    #[test]
    fn likely_sequence_starts_fresh_with_empty_history() {
        let history = Vec::new();
        let ctx = PresentationContext::new(state(&[('s', "once upon a time")]), &history);
        let text = likely_sequence_unlikely_result(&ctx);
        assert!(text.contains("You are starting a new game."));
        assert!(text.contains("once upon a time"));
    }

    proptest::proptest! {
        #[test]
        fn single_prompt_always_quotes_the_story_verbatim(story in "[^\"\n]{0,40}") {
            let history = Vec::new();
            let ctx = PresentationContext::new(state(&[('s', &story)]), &history);
            let text = single(&ctx);
            proptest::prop_assert!(text.contains(&story));
        }
    }
}
