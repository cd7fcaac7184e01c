use serde::{Deserialize, Serialize};
use std::fmt;
use strum::Display;

/// Streaming endpoints exposed by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Endpoint {
    #[strum(serialize = "chat/completions")]
    ChatCompletions,
    #[strum(serialize = "completions")]
    Completions,
}

impl Endpoint {
    /// Path relative to the base URL
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::ChatCompletions => "chat/completions",
            Endpoint::Completions => "completions",
        }
    }
}

/// Well-known models, used to reject requests sent to an endpoint that
/// cannot serve them
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Model {
    #[serde(rename = "gpt-3.5-turbo")]
    Gpt3_5Turbo,

    #[serde(rename = "gpt-3.5-turbo-instruct")]
    Gpt3_5TurboInstruct,

    #[serde(rename = "gpt-4")]
    Gpt4,

    #[serde(rename = "gpt-4-turbo")]
    Gpt4Turbo,

    #[serde(rename = "gpt-4o")]
    Gpt4o,

    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,

    #[serde(rename = "davinci-002")]
    Davinci002,

    #[serde(rename = "babbage-002")]
    Babbage002,

    #[serde(rename = "text-davinci-003")]
    TextDavinci003,

    /// Custom model (for models not in this enum)
    #[serde(untagged)]
    Custom(String),
}

impl Model {
    /// Get the string representation of the model
    pub fn as_str(&self) -> &str {
        match self {
            Model::Gpt3_5Turbo => "gpt-3.5-turbo",
            Model::Gpt3_5TurboInstruct => "gpt-3.5-turbo-instruct",
            Model::Gpt4 => "gpt-4",
            Model::Gpt4Turbo => "gpt-4-turbo",
            Model::Gpt4o => "gpt-4o",
            Model::Gpt4oMini => "gpt-4o-mini",
            Model::Davinci002 => "davinci-002",
            Model::Babbage002 => "babbage-002",
            Model::TextDavinci003 => "text-davinci-003",
            Model::Custom(s) => s,
        }
    }

    /// Check if this model is served by the chat completions endpoint
    pub fn supports_chat(&self) -> bool {
        !matches!(
            self,
            Model::Gpt3_5TurboInstruct
                | Model::Davinci002
                | Model::Babbage002
                | Model::TextDavinci003
        )
    }

    /// Check if this model is served by the legacy completions endpoint
    pub fn supports_completions(&self) -> bool {
        !matches!(
            self,
            Model::Gpt3_5Turbo | Model::Gpt4 | Model::Gpt4Turbo | Model::Gpt4o | Model::Gpt4oMini
        )
    }

    pub fn supports(&self, endpoint: Endpoint) -> bool {
        match endpoint {
            Endpoint::ChatCompletions => self.supports_chat(),
            Endpoint::Completions => self.supports_completions(),
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Model {
    fn from(s: &str) -> Self {
        match s {
            "gpt-3.5-turbo" => Model::Gpt3_5Turbo,
            "gpt-3.5-turbo-instruct" => Model::Gpt3_5TurboInstruct,
            "gpt-4" => Model::Gpt4,
            "gpt-4-turbo" => Model::Gpt4Turbo,
            "gpt-4o" => Model::Gpt4o,
            "gpt-4o-mini" => Model::Gpt4oMini,
            "davinci-002" => Model::Davinci002,
            "babbage-002" => Model::Babbage002,
            "text-davinci-003" => Model::TextDavinci003,
            _ => Model::Custom(s.to_string()),
        }
    }
}

impl From<String> for Model {
    fn from(s: String) -> Self {
        Model::from(s.as_str())
    }
}

impl From<Model> for String {
    fn from(model: Model) -> Self {
        model.as_str().to_string()
    }
}
