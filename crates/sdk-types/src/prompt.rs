use serde::{Deserialize, Serialize};

use crate::types::json::JsonMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum PromptMessage {
    System { content: String },
    User { content: Vec<PromptPart> },
    Assistant { content: Vec<PromptPart> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PromptPart {
    Text { text: String },
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        PromptMessage::System {
            content: content.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        PromptMessage::User {
            content: vec![PromptPart::Text { text: text.into() }],
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        PromptMessage::Assistant {
            content: vec![PromptPart::Text { text: text.into() }],
        }
    }

    /// Concatenate all text parts of the message.
    pub fn text(&self) -> String {
        match self {
            PromptMessage::System { content } => content.clone(),
            PromptMessage::User { content } | PromptMessage::Assistant { content } => content
                .iter()
                .map(|PromptPart::Text { text }| text.as_str())
                .collect::<Vec<_>>()
                .join(""),
        }
    }
}

/// Options for a single generate or stream call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallOptions {
    pub prompt: Vec<PromptMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "JsonMap::is_empty")]
    pub provider_options: JsonMap,
    /// Call options this crate does not interpret.
    #[serde(flatten)]
    pub extra: JsonMap,
}

impl CallOptions {
    pub fn new(prompt: Vec<PromptMessage>) -> Self {
        Self {
            prompt,
            ..Default::default()
        }
    }

    /// Single user turn with an optional system message in front.
    pub fn from_text(prompt: impl Into<String>, system: Option<&str>) -> Self {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(PromptMessage::system(system));
        }
        messages.push(PromptMessage::user(prompt));
        Self::new(messages)
    }

    pub fn with_temperature(mut self, t: f32) -> Self {
        self.temperature = Some(t);
        self
    }

    pub fn with_max_output_tokens(mut self, n: u32) -> Self {
        self.max_output_tokens = Some(n);
        self
    }

    /// Text of the last system message in the prompt, if any.
    pub fn system_text(&self) -> Option<String> {
        self.prompt.iter().rev().find_map(|m| match m {
            PromptMessage::System { content } => Some(content.clone()),
            _ => None,
        })
    }
}
