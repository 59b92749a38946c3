use serde_json::{json, Value};

use super::model::UserConfig;

pub const SPEAKER_ME: &str = "Me";
pub const SPEAKER_THEM: &str = "Them";

/// Number of alternative replies asked from the model
pub const REPLY_OPTION_COUNT: usize = 5;

/// Instruction sent along with the screenshot
pub fn extraction_instruction() -> String {
    format!(
        r#"This is a screenshot of a chat (for example Telegram or WhatsApp).
Extract the text of every message and state exactly who sent it.

Speaker rule:
1. Messages on the RIGHT side of the image (usually blue, green or colored) are from "{me}" (the user).
2. Messages on the LEFT side of the image (usually white or dark) are from "{them}" (the other person).

Write the output line by line in chronological order (top to bottom):
{me}: [message text]
{them}: [message text]

If the text is Persian, write it in Persian exactly. If it is Finglish or English, keep it as it is.
Drop extra items such as times (e.g. 10:24 PM) and dates."#,
        me = SPEAKER_ME,
        them = SPEAKER_THEM,
    )
}

/// System instruction for reply generation
pub fn system_instruction(config: &UserConfig) -> String {
    let politeness = match config.effective_tarof() {
        Some(level) => format!(
            "   - Apply taarof according to the configured level: {} out of 10 \
             (0 = completely direct and western, 5 = polite and ordinary, 10 = heavy, ceremonial taarof).\n",
            level
        ),
        None => String::new(),
    };

    format!(
        r#"You are "ReplyLens", a smart and professional assistant for social communication, dating and etiquette, with a special focus on Persian language and culture.

Critical instructions:
1. Reply language: the replies must be written exactly in {language}.
2. Culture and tone:
   - If the language is Persian, use its linguistic subtleties and common idioms.
{politeness}3. User goal: {goal}
4. Requested tone: {tone}
5. Reply length: {length}

Your task:
- Analyze the conversation. Find the last message from "{them}" and answer it.
- If the user gave additional context, you must apply it when writing the replies (for example, if they say there was a fight, adjust the tone).
- Write {count} varied reply suggestions.
- Provide 1 suggestion as the "safest option", the one with the least risk.
- Write a short explanation for each suggestion saying why it is a good answer.
- If the conversation suggests threats, fraud or harassment, fill the 'risk_flags' list.

The output must follow the requested JSON format exactly."#,
        language = config.language.label(),
        politeness = politeness,
        goal = config.goal.label(),
        tone = config.tone.label(),
        length = config.length.label(),
        them = SPEAKER_THEM,
        count = REPLY_OPTION_COUNT,
    )
}

/// User content: the transcript followed by the optional context block
pub fn generation_content(transcript: &str, config: &UserConfig) -> String {
    let mut content = format!("Conversation:\n{}\n", transcript.trim());

    if let Some(context) = config.context() {
        content.push_str(&format!(
            "\n---\nAdditional notes from the user (conversation context):\n{}\n---\n",
            context
        ));
    }

    content
}

fn reply_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "text": { "type": "STRING" },
            "tone_label": { "type": "STRING" },
            "explanation": { "type": "STRING" }
        },
        "required": ["text", "tone_label", "explanation"]
    })
}

/// Response schema in the provider-neutral uppercase type notation
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "safest_reply": reply_schema(),
            "reply_options": {
                "type": "ARRAY",
                "items": reply_schema()
            },
            "follow_ups": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            },
            "risk_flags": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            }
        },
        "required": ["safest_reply", "reply_options", "follow_ups"]
    })
}

/// Same schema with JSON Schema lowercase type names
pub fn json_schema() -> Value {
    fn lower(value: &Value) -> Value {
        match value {
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, v)| match (key.as_str(), v) {
                        ("type", Value::String(t)) => (key.clone(), Value::String(t.to_lowercase())),
                        _ => (key.clone(), lower(v)),
                    })
                    .collect(),
            ),
            Value::Array(items) => Value::Array(items.iter().map(lower).collect()),
            other => other.clone(),
        }
    }
    lower(&response_schema())
}
