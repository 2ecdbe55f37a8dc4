//! Property-based tests for the conversation boundary types

use proptest::prelude::*;
use sdk::types::{Intent, Turn, TurnRole};

proptest! {
    /// Label resolution is total: any string resolves to one of the four
    /// declared intents, without panicking.
    #[test]
    fn intent_from_label_is_total(label in ".*") {
        let intent = Intent::from_label(&label);
        prop_assert!(Intent::ALL.contains(&intent));
    }

    /// Labels that are not declared always resolve to the fallback intent.
    #[test]
    fn unknown_labels_fall_back(label in "[a-z_]{1,24}") {
        prop_assume!(!matches!(
            label.as_str(),
            "create_task" | "get_current_issues" | "get_user_issues" | "fallback"
        ));
        prop_assert_eq!(Intent::from_label(&label), Intent::Fallback);
    }

    /// Turns survive a serde round trip unchanged.
    #[test]
    fn turn_serde_round_trip(content in ".*") {
        let turn = Turn::user(content.clone());
        let json = serde_json::to_string(&turn).unwrap();
        let back: Turn = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back.role, TurnRole::User);
        prop_assert_eq!(back.content, content);
    }
}
