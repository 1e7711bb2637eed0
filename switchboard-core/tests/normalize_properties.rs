//! Property tests for message normalization and cost calculation

use proptest::prelude::*;
use switchboard_core::pricing::calculate_cost;
use switchboard_core::protocol::{ChatInput, Message, MessageRole, TokenUsage};
use switchboard_core::providers::normalize::{
    collapse_runs, enforce_alternation, normalize_alternating, NormalizeStrategy, PROMPT_FILLER,
};

fn role() -> impl Strategy<Value = MessageRole> {
    prop_oneof![
        Just(MessageRole::User),
        Just(MessageRole::Assistant),
        Just(MessageRole::System),
    ]
}

fn history() -> impl Strategy<Value = Vec<Message>> {
    prop::collection::vec(
        (role(), "[a-z ]{1,12}").prop_map(|(role, content)| Message::new(role, content)),
        0..12,
    )
}

/// Alternating user/assistant history with the given first role
fn alternating(len: usize, starts_with_user: bool) -> Vec<Message> {
    (0..len)
        .map(|i| {
            let user = (i % 2 == 0) == starts_with_user;
            if user {
                Message::user(format!("u{}", i))
            } else {
                Message::assistant(format!("a{}", i))
            }
        })
        .collect()
}

fn no_adjacent_roles(messages: &[Message]) -> bool {
    messages.windows(2).all(|pair| pair[0].role != pair[1].role)
}

proptest! {
    #[test]
    fn prop_alternating_output_never_repeats_a_role(
        history in history(),
        context in "[a-z]{0,8}",
        prompt in "[a-z]{0,8}",
    ) {
        let chat = ChatInput::new("sys", prompt).with_history(history).with_context(context);
        let messages = NormalizeStrategy::StrictAlternation.apply(&chat);
        prop_assert!(no_adjacent_roles(&messages));
        prop_assert!(messages.iter().all(|m| m.role != MessageRole::System));
    }

    #[test]
    fn prop_alternating_history_is_left_unchanged(len in 0usize..10, starts_with_user: bool) {
        let history = alternating(len, starts_with_user);
        let chat = ChatInput::new("sys", "").with_history(history.clone());
        prop_assert_eq!(normalize_alternating(&chat), history);
    }

    #[test]
    fn prop_prompt_after_user_gets_exactly_one_filler(len in 1usize..10, starts_with_user: bool) {
        let history = alternating(len, starts_with_user);
        let ends_with_user = history.last().map(|m| m.role == MessageRole::User).unwrap_or(false);
        let chat = ChatInput::new("sys", "next").with_history(history.clone());
        let messages = normalize_alternating(&chat);

        let mut expected = history;
        if ends_with_user {
            expected.push(Message::assistant(PROMPT_FILLER));
        }
        expected.push(Message::user("next"));
        prop_assert_eq!(messages, expected);
    }

    #[test]
    fn prop_run_collapses_to_single_entry(parts in prop::collection::vec("[a-z]{1,6}", 1..8)) {
        let run: Vec<Message> = parts.iter().map(|p| Message::assistant(p.clone())).collect();
        let collapsed = collapse_runs(&run);
        prop_assert_eq!(collapsed, vec![Message::assistant(parts.join("\n\n"))]);
    }

    #[test]
    fn prop_enforced_alternation_has_no_adjacent_roles(history in history()) {
        prop_assert!(no_adjacent_roles(&enforce_alternation(collapse_runs(&history))));
    }

    #[test]
    fn prop_system_prefixed_starts_with_system(history in history(), prompt in "[a-z]{1,8}") {
        let chat = ChatInput::new("be nice", prompt).with_history(history);
        let messages = NormalizeStrategy::SystemPrefixed.apply(&chat);
        prop_assert_eq!(&messages[0], &Message::system("be nice"));
        prop_assert_eq!(messages.last().map(|m| m.role), Some(MessageRole::User));
    }

    #[test]
    fn prop_cost_is_linear(a_in in 0u64..5_000_000, a_out in 0u64..5_000_000, b_in in 0u64..5_000_000, b_out in 0u64..5_000_000) {
        for provider in ["anthropic", "openai"] {
            let a = calculate_cost(provider, &TokenUsage::new(a_in, a_out)).unwrap();
            let b = calculate_cost(provider, &TokenUsage::new(b_in, b_out)).unwrap();
            let sum = calculate_cost(provider, &TokenUsage::new(a_in + b_in, a_out + b_out)).unwrap();
            prop_assert!((a.total + b.total - sum.total).abs() < 1e-6);
            prop_assert!((a.input + a.output - a.total).abs() < 1e-9);
        }
    }

    #[test]
    fn prop_free_provider_is_always_zero(tokens_in: u32, tokens_out: u32) {
        let costs = calculate_cost("groq", &TokenUsage::new(tokens_in as u64, tokens_out as u64)).unwrap();
        prop_assert_eq!(costs.total, 0.0);
        prop_assert_eq!(costs.input, 0.0);
        prop_assert_eq!(costs.output, 0.0);
    }
}

#[test]
fn test_hello_only() {
    let chat = ChatInput::new("sys", "Hello");
    assert_eq!(normalize_alternating(&chat), vec![Message::user("Hello")]);
}
