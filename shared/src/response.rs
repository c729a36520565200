//! CEK response envelope and formatting.

use serde::Serialize;
use serde_json::{Map, Value};

/// How a speech value should be rendered by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpeechType {
    PlainText,
    #[serde(rename = "URL")]
    Url,
}

/// A single piece of speech: text to synthesize or an audio URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub speech_type: SpeechType,
    pub lang: String,
    pub value: String,
}

impl Message {
    pub fn text(value: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            speech_type: SpeechType::PlainText,
            lang: lang.into(),
            value: value.into(),
        }
    }

    /// Audio file played as-is. Clova expects an empty language tag here.
    pub fn url(value: impl Into<String>) -> Self {
        Self {
            speech_type: SpeechType::Url,
            lang: String::new(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum OutputSpeech {
    SimpleSpeech { values: Message },
    SpeechList { values: Vec<Message> },
}

impl OutputSpeech {
    fn from_messages(mut messages: Vec<Message>) -> Self {
        if messages.len() == 1 {
            OutputSpeech::SimpleSpeech {
                values: messages.remove(0),
            }
        } else {
            OutputSpeech::SpeechList { values: messages }
        }
    }

    fn messages(&self) -> &[Message] {
        match self {
            OutputSpeech::SimpleSpeech { values } => std::slice::from_ref(values),
            OutputSpeech::SpeechList { values } => values,
        }
    }

    fn text(&self) -> String {
        self.messages()
            .iter()
            .filter(|m| m.speech_type == SpeechType::PlainText)
            .map(|m| m.value.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    pub output_speech: OutputSpeech,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    pub output_speech: OutputSpeech,
    pub card: Map<String, Value>,
    pub directives: Vec<Value>,
    pub should_end_session: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,
}

/// Response body returned to Clova.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechResponse {
    pub version: String,
    pub session_attributes: Map<String, Value>,
    pub response: ResponseBody,
}

impl SpeechResponse {
    /// Build a response speaking `messages`. A single message is sent as
    /// `SimpleSpeech`, anything else as `SpeechList`.
    pub fn new(messages: Vec<Message>, should_end_session: bool) -> Self {
        Self {
            version: "1.0".to_string(),
            session_attributes: Map::new(),
            response: ResponseBody {
                output_speech: OutputSpeech::from_messages(messages),
                card: Map::new(),
                directives: Vec::new(),
                should_end_session,
                reprompt: None,
            },
        }
    }

    /// Shorthand for a single plain-text message.
    pub fn text(value: impl Into<String>, lang: &str, should_end_session: bool) -> Self {
        Self::new(vec![Message::text(value, lang)], should_end_session)
    }

    /// Silent response that closes the session.
    pub fn end_session() -> Self {
        Self::new(Vec::new(), true)
    }

    pub fn with_reprompt(mut self, messages: Vec<Message>) -> Self {
        self.response.reprompt = Some(Reprompt {
            output_speech: OutputSpeech::from_messages(messages),
        });
        self
    }

    pub fn with_session_attributes(mut self, attributes: Map<String, Value>) -> Self {
        self.session_attributes = attributes;
        self
    }

    /// Spoken text of the main output, plain-text values joined by spaces.
    pub fn message_text(&self) -> String {
        self.response.output_speech.text()
    }

    pub fn should_end_session(&self) -> bool {
        self.response.should_end_session
    }

    pub fn reprompt_text(&self) -> Option<String> {
        self.response
            .reprompt
            .as_ref()
            .map(|r| r.output_speech.text())
    }
}
