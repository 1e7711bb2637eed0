//! Message normalization per provider family
//!
//! Providers disagree on how a conversation must be laid out. Anthropic needs
//! strictly alternating user/assistant turns with the system prompt carried
//! outside the list; OpenAI-style APIs take a leading `system` message and
//! accept whatever follows. Both layouts are produced here from the same
//! [`ChatInput`].

use crate::protocol::types::{ChatInput, Message, MessageRole};

/// Filler spliced between two same-role turns in the history
pub const CONTINUE_FILLER: &str = "Understood. Please continue.";

/// Filler placed before the context block when the list ends on a user turn
pub const CONTEXT_FILLER: &str = "I understand. Please provide more information.";

/// Filler placed before the user prompt when the list ends on a user turn
pub const PROMPT_FILLER: &str = "I see. What else can I help you with?";

/// Context at or below this many characters is treated as a placeholder
pub const CONTEXT_MIN_CHARS: usize = 5;

/// How a provider family wants its messages laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeStrategy {
    /// Strict user/assistant alternation, system prompt sent separately
    StrictAlternation,
    /// Leading system message, history passed through as-is
    SystemPrefixed,
}

impl NormalizeStrategy {
    pub fn apply(self, chat: &ChatInput) -> Vec<Message> {
        match self {
            NormalizeStrategy::StrictAlternation => normalize_alternating(chat),
            NormalizeStrategy::SystemPrefixed => normalize_system_prefixed(chat),
        }
    }
}

/// Collapse runs of same-role messages into one, joined by a blank line.
///
/// `system` entries are folded into user turns since they cannot appear in an
/// alternating list.
pub fn collapse_runs(history: &[Message]) -> Vec<Message> {
    let mut collapsed: Vec<Message> = Vec::with_capacity(history.len());

    for message in history {
        let role = match message.role {
            MessageRole::System => MessageRole::User,
            role => role,
        };
        match collapsed.last_mut() {
            Some(last) if last.role == role => {
                last.content.push_str("\n\n");
                last.content.push_str(&message.content);
            }
            _ => collapsed.push(Message::new(role, message.content.clone())),
        }
    }

    collapsed
}

/// Splice a filler turn between any two adjacent same-role messages
pub fn enforce_alternation(messages: Vec<Message>) -> Vec<Message> {
    let mut out: Vec<Message> = Vec::with_capacity(messages.len());

    for message in messages {
        if let Some(last) = out.last() {
            if last.role == message.role {
                out.push(Message::new(last.role.opposite(), CONTINUE_FILLER));
            }
        }
        out.push(message);
    }

    out
}

/// Append a user turn, inserting `filler` as an assistant turn first if the
/// list already ends on a user turn
pub fn push_user_turn(messages: &mut Vec<Message>, content: String, filler: &str) {
    if matches!(messages.last(), Some(last) if last.role != MessageRole::Assistant) {
        messages.push(Message::assistant(filler));
    }
    messages.push(Message::user(content));
}

/// Strict-alternation layout (Anthropic). The system prompt is not included.
pub fn normalize_alternating(chat: &ChatInput) -> Vec<Message> {
    let mut messages = enforce_alternation(collapse_runs(&chat.message_history));

    if !chat.message_context.is_empty() {
        push_user_turn(
            &mut messages,
            chat.message_context.render(),
            CONTEXT_FILLER,
        );
    }

    if !chat.user_prompt.is_empty() {
        push_user_turn(&mut messages, chat.user_prompt.clone(), PROMPT_FILLER);
    }

    messages
}

/// System-prefixed layout (OpenAI, Groq)
pub fn normalize_system_prefixed(chat: &ChatInput) -> Vec<Message> {
    let mut messages = Vec::with_capacity(chat.message_history.len() + 3);
    messages.push(Message::system(chat.system_prompt.clone()));
    messages.extend(chat.message_history.iter().cloned());

    // Callers sometimes append the new turn to history before dispatching
    if let Some(last) = chat.message_history.last() {
        if last.role == MessageRole::User && last.content == chat.user_prompt {
            return messages;
        }
    }

    let context = chat.message_context.render();
    if context.chars().count() > CONTEXT_MIN_CHARS {
        messages.push(Message::assistant(context));
    }

    messages.push(Message::user(chat.user_prompt.clone()));
    messages
}
