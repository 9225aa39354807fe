use serde::{Deserialize, Serialize};

use crate::error::BasaltError;
use crate::Result;

/// JSON text component, as carried by disconnect, chat and status packets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub extra: Vec<Chat>,
}

impl Chat {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = Some(true);
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = Some(true);
        self
    }

    pub fn append(mut self, component: Chat) -> Self {
        self.extra.push(component);
        self
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| BasaltError::Protocol(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| BasaltError::Protocol(e.to_string()))
    }

    /// Concatenated text of this component and its children.
    pub fn plain_text(&self) -> String {
        let mut text = self.text.clone();
        for component in &self.extra {
            text.push_str(&component.plain_text());
        }
        text
    }
}

impl From<&str> for Chat {
    fn from(text: &str) -> Self {
        Chat::text(text)
    }
}

impl From<String> for Chat {
    fn from(text: String) -> Self {
        Chat::text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_component_json() {
        let chat = Chat::text("Timed out");
        assert_eq!(chat.to_json().unwrap(), r#"{"text":"Timed out"}"#);
    }

    #[test]
    fn test_styled_component_json() {
        let chat = Chat::text("Steve joined the game").color("yellow").bold();
        let json = chat.to_json().unwrap();
        assert!(json.contains(r#""color":"yellow""#));
        assert!(json.contains(r#""bold":true"#));
        assert!(!json.contains("italic"));
    }

    #[test]
    fn test_from_json() {
        let chat = Chat::from_json(r#"{"text":"a","extra":[{"text":"b"}]}"#).unwrap();
        assert_eq!(chat.plain_text(), "ab");
        assert!(Chat::from_json("not json").is_err());
    }
}
