//! Chat messages and the retrieval-augmented prompt layout.
//!
//! With tips: `[system(instruction), assistant(prefix + tip lines + suffix), ..history]`.
//! Without: `[system(fallback)?, ..history]`.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Wording of the injected messages for one conversation style.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptTemplate {
    /// System message used when tips are injected.
    pub instruction: &'static str,
    pub tips_prefix: &'static str,
    /// Appended after the tip list.
    pub suffix: &'static str,
    /// System message when no tip made the cut; `None` sends history only.
    pub fallback: Option<&'static str>,
}

impl PromptTemplate {
    /// Free-form chat with the coach.
    pub const fn chat() -> Self {
        Self {
            instruction: "You are an expert gym coach. Use these tips where helpful.",
            tips_prefix: "Here are some relevant tips:\n",
            suffix: "",
            fallback: Some("You are a helpful assistant."),
        }
    }

    /// Feedback on measured squat metrics.
    pub const fn squat_feedback() -> Self {
        Self {
            instruction: "You are an expert squat coach.",
            tips_prefix: "Here are some coaching tips for this squat:\n",
            suffix: "\nPlease give friendly, corrective feedback:",
            fallback: Some("You are an expert squat coach."),
        }
    }

    /// Prefix, one `- tip` line per tip joined by newlines, suffix.
    pub fn tips_block<S: AsRef<str>>(&self, tips: &[S]) -> String {
        let lines: Vec<String> = tips.iter().map(|t| format!("- {}", t.as_ref())).collect();
        format!("{}{}{}", self.tips_prefix, lines.join("\n"), self.suffix)
    }
}

/// Messages for one generation call: injected context, then `history`.
pub fn build_rag_messages<S: AsRef<str>>(
    history: &[ChatMessage],
    tips: &[S],
    template: &PromptTemplate,
) -> Vec<ChatMessage> {
    let mut out = Vec::with_capacity(history.len() + 2);
    if tips.is_empty() {
        out.extend(template.fallback.map(ChatMessage::system));
    } else {
        out.push(ChatMessage::system(template.instruction));
        out.push(ChatMessage::assistant(template.tips_block(tips)));
    }
    out.extend_from_slice(history);
    out
}

/// User turn describing measured angles, one decimal place each.
pub fn metrics_message(knee_angle: f64, trunk_angle: f64) -> ChatMessage {
    ChatMessage::user(format!(
        "Athlete metrics:\n- Knee angle: {knee_angle:.1}°\n- Trunk lean: {trunk_angle:.1}°"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tips_are_injected_after_the_instruction() {
        let history = vec![ChatMessage::user("How deep should I squat?")];
        let msgs = build_rag_messages(
            &history,
            &["Knees out.", "Chest up."],
            &PromptTemplate::chat(),
        );

        assert_eq!(msgs.len(), 3);
        assert_eq!(
            msgs[0],
            ChatMessage::system("You are an expert gym coach. Use these tips where helpful.")
        );
        assert_eq!(
            msgs[1],
            ChatMessage::assistant("Here are some relevant tips:\n- Knees out.\n- Chest up.")
        );
        assert_eq!(msgs[2], history[0]);
    }

    #[test]
    fn no_tips_uses_fallback_instruction() {
        let history = vec![ChatMessage::user("hi")];
        let none: [&str; 0] = [];
        let msgs = build_rag_messages(&history, &none, &PromptTemplate::chat());
        assert_eq!(msgs[0], ChatMessage::system("You are a helpful assistant."));
        assert_eq!(msgs.len(), 2);

        let bare = PromptTemplate {
            fallback: None,
            ..PromptTemplate::chat()
        };
        assert_eq!(build_rag_messages(&history, &none, &bare), history);
    }

    #[test]
    fn squat_feedback_ends_with_request() {
        let msgs = build_rag_messages(
            &[metrics_message(95.0, 40.0)],
            &["Sit back."],
            &PromptTemplate::squat_feedback(),
        );
        assert_eq!(msgs[0].content, "You are an expert squat coach.");
        assert_eq!(
            msgs[1].content,
            "Here are some coaching tips for this squat:\n- Sit back.\n\
             Please give friendly, corrective feedback:"
        );
        assert_eq!(msgs[2].role, Role::User);
    }

    #[test]
    fn metrics_message_rounds_to_one_decimal() {
        let m = metrics_message(95.04, 39.96);
        assert_eq!(m.role, Role::User);
        assert_eq!(
            m.content,
            "Athlete metrics:\n- Knee angle: 95.0°\n- Trunk lean: 40.0°"
        );
    }

    #[test]
    fn roles_serialize_lowercase() {
        let json = serde_json::to_string(&ChatMessage::assistant("ok")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"ok"}"#);
        assert_eq!(Role::System.as_str(), "system");
    }
}
