//! Conversation state for the two-step /ask flow.
//!
//! The state machine is minimal: `Idle → AwaitingQuestion → Idle`. Sending
//! `/ask` moves the user's dialogue to `AwaitingQuestion`; the next plain
//! message from the same user is consumed as the question.

use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

/// Longest accepted question, in characters.
pub const MAX_QUESTION_CHARS: usize = 500;

/// Per-user conversation state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AskState {
    #[default]
    Idle,
    AwaitingQuestion,
}

/// Type alias for the ask dialogue.
pub type AskDialogue = Dialogue<AskState, InMemStorage<AskState>>;

/// Validate a question submitted in response to the /ask prompt.
pub fn validate_question(text: &str) -> Result<String, &'static str> {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Err("empty");
    }

    if trimmed.chars().count() > MAX_QUESTION_CHARS {
        return Err("too_long");
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_validation() {
        assert!(validate_question("что такое гравитация?").is_ok());
        assert!(validate_question("  почему небо синее  ").is_ok());

        assert_eq!(validate_question(""), Err("empty"));
        assert_eq!(validate_question("   "), Err("empty"));
        assert_eq!(
            validate_question(&"ю".repeat(MAX_QUESTION_CHARS + 1)),
            Err("too_long")
        );
    }

    #[test]
    fn test_question_is_trimmed() {
        assert_eq!(
            validate_question("  почему небо синее  ").unwrap(),
            "почему небо синее"
        );
    }

    #[test]
    fn test_default_state_is_idle() {
        assert_eq!(AskState::default(), AskState::Idle);
    }
}
