use completion_ox_common::{Framing, StreamReader, Streamable};
use reqwest::header::{CONTENT_TYPE, HeaderMap};

use crate::response::{
    ChatCompletionStreamChoice, ChatCompletionStreamChoiceDelta, ChatCompletionStreamResponse,
    CompletionChoice, CompletionResponse, FinishReason,
};

/// Stream of chat completion chunks
pub type ChatCompletionStream = StreamReader<ChatCompletionStreamResponse>;

/// Stream of text completion chunks
pub type CompletionStream = StreamReader<CompletionResponse>;

impl Streamable for ChatCompletionStreamResponse {
    fn from_plain_text(text: &str) -> Self {
        Self {
            choices: vec![ChatCompletionStreamChoice {
                index: 0,
                delta: ChatCompletionStreamChoiceDelta {
                    content: Some(text.to_string()),
                    ..Default::default()
                },
                finish_reason: Some(FinishReason::PlainText),
                content_filter_results: None,
            }],
            ..Default::default()
        }
    }
}

impl Streamable for CompletionResponse {
    fn from_plain_text(text: &str) -> Self {
        Self {
            choices: vec![CompletionChoice {
                text: text.to_string(),
                index: 0,
                finish_reason: Some(FinishReason::PlainText),
                logprobs: None,
            }],
            ..Default::default()
        }
    }
}

/// Pick the framing for a response from its `Content-Type`.
///
/// Servers that stream raw text answer with `text/plain`; everything else is
/// treated as an event stream.
pub(crate) fn framing_for(headers: &HeaderMap) -> Framing {
    let is_plain_text = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim_start().starts_with("text/plain"));

    if is_plain_text {
        Framing::PlainText
    } else {
        Framing::Lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_framing_from_content_type() {
        let mut headers = HeaderMap::new();
        assert_eq!(framing_for(&headers), Framing::Lines);

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));
        assert_eq!(framing_for(&headers), Framing::Lines);

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
        assert_eq!(framing_for(&headers), Framing::PlainText);
    }

    #[test]
    fn test_plain_text_chat_chunk() {
        let chunk = ChatCompletionStreamResponse::from_plain_text("hi");
        assert_eq!(chunk.content(), Some("hi"));
        assert_eq!(chunk.finish_reason(), Some(&FinishReason::PlainText));
        assert_eq!(chunk.choices.len(), 1);
    }

    #[test]
    fn test_plain_text_completion_chunk() {
        let chunk = CompletionResponse::from_plain_text("ok");
        assert_eq!(chunk.text(), Some("ok"));
        assert_eq!(chunk.finish_reason(), Some(&FinishReason::PlainText));
    }
}
