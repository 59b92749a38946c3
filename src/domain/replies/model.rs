use serde::{Deserialize, Serialize};

pub const MAX_TAROF_LEVEL: u8 = 10;

/// What the user wants the reply to achieve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    KeepGoing,
    Flirt,
    SetBoundary,
    Reschedule,
    AskOut,
    EndPolitely,
    Negotiate,
    Apologize,
}

impl Goal {
    pub fn label(&self) -> &'static str {
        match self {
            Goal::KeepGoing => "keep the conversation going",
            Goal::Flirt => "flirt and be charming",
            Goal::SetBoundary => "set a boundary",
            Goal::Reschedule => "reschedule the meeting",
            Goal::AskOut => "suggest going out",
            Goal::EndPolitely => "end the conversation politely",
            Goal::Negotiate => "negotiate or bargain",
            Goal::Apologize => "apologize and make amends",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Friendly,
    Witty,
    Confident,
    Cute,
    Direct,
    Formal,
    Dry,
}

impl Tone {
    pub fn label(&self) -> &'static str {
        match self {
            Tone::Friendly => "friendly and warm",
            Tone::Witty => "witty and playful",
            Tone::Confident => "confident",
            Tone::Cute => "cute and sweet",
            Tone::Direct => "blunt and straightforward",
            Tone::Formal => "formal and official",
            Tone::Dry => "cold and reserved",
        }
    }
}

/// Output language of the generated replies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Persian,
    /// Persian written in Latin script
    Finglish,
    English,
}

impl Language {
    pub fn label(&self) -> &'static str {
        match self {
            Language::Persian => "Persian (Farsi script)",
            Language::Finglish => "Finglish (Persian written with Latin letters)",
            Language::English => "English",
        }
    }

    /// Languages where taarof (ritual politeness) applies
    pub fn uses_tarof(&self) -> bool {
        matches!(self, Language::Persian | Language::Finglish)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyLength {
    Short,
    Medium,
    Long,
}

impl ReplyLength {
    pub fn label(&self) -> &'static str {
        match self {
            ReplyLength::Short => "short (one line)",
            ReplyLength::Medium => "medium (one or two sentences)",
            ReplyLength::Long => "long (a few sentences)",
        }
    }
}

/// Settings chosen on the configuration form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    pub goal: Goal,
    pub tone: Tone,
    pub language: Language,
    pub tarof_level: u8,
    pub length: ReplyLength,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_context: Option<String>,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            goal: Goal::KeepGoing,
            tone: Tone::Friendly,
            language: Language::Persian,
            tarof_level: 5,
            length: ReplyLength::Medium,
            additional_context: None,
        }
    }
}

impl UserConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.tarof_level > MAX_TAROF_LEVEL {
            return Err(format!(
                "Politeness level must be between 0 and {}",
                MAX_TAROF_LEVEL
            ));
        }
        Ok(())
    }

    /// Politeness level, only when the language gives it meaning
    pub fn effective_tarof(&self) -> Option<u8> {
        self.language.uses_tarof().then_some(self.tarof_level)
    }

    /// Additional context with surrounding whitespace removed, if any is left
    pub fn context(&self) -> Option<&str> {
        self.additional_context
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedReply {
    pub text: String,
    pub tone_label: String,
    pub explanation: String,
}

/// Structured result of a generation; `safest_reply` is always present
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyResponse {
    pub safest_reply: GeneratedReply,
    #[serde(default)]
    pub reply_options: Vec<GeneratedReply>,
    #[serde(default)]
    pub follow_ups: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_flags: Option<Vec<String>>,
}

impl ReplyResponse {
    pub fn has_risks(&self) -> bool {
        self.risk_flags.as_ref().is_some_and(|flags| !flags.is_empty())
    }
}
