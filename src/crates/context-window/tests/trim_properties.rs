//! Property tests for trimming and token accounting

use context_window::{cost_of_message, cost_of_sequence, cost_of_text, trim, Message, ToolCall};
use proptest::prelude::*;

const MODEL: &str = "gpt-4o";

fn arb_message() -> impl Strategy<Value = Message> {
    let content = "[a-zA-Z0-9 ,.!?áé]{0,40}";
    prop_oneof![
        1 => content.prop_map(Message::system),
        4 => content.prop_map(Message::user),
        4 => content.prop_map(Message::assistant),
        1 => (content, "[a-z_]{1,12}", "[a-z0-9]{0,10}").prop_map(|(text, name, arg)| {
            Message::assistant(text).with_tool_calls(vec![ToolCall::new(
                "call_1",
                name,
                format!("{{\"arg\":\"{}\"}}", arg),
            )])
        }),
    ]
}

fn arb_history() -> impl Strategy<Value = Vec<Message>> {
    prop::collection::vec(arb_message(), 0..24)
}

proptest! {
    #[test]
    fn sequence_cost_is_additive(messages in arb_history()) {
        let sum: usize = messages.iter().map(|m| cost_of_message(m, MODEL)).sum();
        prop_assert_eq!(cost_of_sequence(&messages, MODEL), sum);
    }

    #[test]
    fn empty_text_is_free(model in "[a-z0-9.-]{0,20}") {
        prop_assert_eq!(cost_of_text("", &model), 0);
    }

    #[test]
    fn trim_is_identity_under_slack(messages in arb_history(), slack in 0usize..50) {
        let budget = cost_of_sequence(&messages, MODEL) + slack + 1;
        let trimmed = trim(&messages, budget, MODEL).unwrap();
        // Identity holds for histories already in system-first order
        let system_first = messages
            .iter()
            .skip_while(|m| m.is_system())
            .all(|m| !m.is_system());
        if system_first {
            prop_assert_eq!(trimmed, messages);
        } else {
            prop_assert_eq!(trimmed.len(), messages.len());
        }
    }

    #[test]
    fn trim_respects_budget(messages in arb_history(), budget in 1usize..400) {
        let trimmed = trim(&messages, budget, MODEL).unwrap();
        let systems: Vec<Message> = messages.iter().filter(|m| m.is_system()).cloned().collect();

        prop_assert!(
            cost_of_sequence(&trimmed, MODEL) <= budget || trimmed == systems,
            "trimmed history exceeds budget without being system-only"
        );
    }

    #[test]
    fn trim_keeps_every_system_message(messages in arb_history(), budget in 1usize..400) {
        let trimmed = trim(&messages, budget, MODEL).unwrap();
        let systems: Vec<&Message> = messages.iter().filter(|m| m.is_system()).collect();
        let kept_systems: Vec<&Message> = trimmed.iter().filter(|m| m.is_system()).collect();

        prop_assert_eq!(kept_systems, systems.clone());
        prop_assert!(trimmed.iter().take(systems.len()).all(|m| m.is_system()));
    }

    #[test]
    fn trim_keeps_contiguous_trailing_run(messages in arb_history(), budget in 1usize..400) {
        let trimmed = trim(&messages, budget, MODEL).unwrap();
        let others: Vec<&Message> = messages.iter().filter(|m| !m.is_system()).collect();
        let kept: Vec<&Message> = trimmed.iter().filter(|m| !m.is_system()).collect();

        prop_assert!(kept.len() <= others.len());
        prop_assert_eq!(&others[others.len() - kept.len()..], &kept[..]);
    }
}
