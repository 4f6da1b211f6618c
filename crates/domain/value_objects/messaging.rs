use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseMode {
    #[serde(rename = "HTML")]
    Html,
    #[serde(rename = "MarkdownV2")]
    MarkdownV2,
    Markdown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMessage {
    pub text: String,
    pub parse_mode: Option<ParseMode>,
    pub disable_preview: bool,
}

impl OutgoingMessage {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: None,
            disable_preview: false,
        }
    }
}
