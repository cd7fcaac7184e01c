use bon::Builder;
use completion_ox_common::{
    BufLineSource, DEFAULT_EMPTY_MESSAGES_LIMIT, StreamReader, Streamable,
};
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use serde::Serialize;
use std::collections::HashMap;

use crate::{
    ChatCompletionRequest, CompletionError, CompletionRequest,
    model::{Endpoint, Model},
    stream::{ChatCompletionStream, CompletionStream, framing_for},
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Streaming completion client
#[derive(Debug, Clone, Builder)]
pub struct Client {
    /// API key for authentication
    #[builder(into)]
    api_key: String,

    /// Base URL for the API (allows for custom endpoints)
    #[builder(default = DEFAULT_BASE_URL.to_string(), into)]
    pub base_url: String,

    /// Sent as `OpenAI-Organization` when set
    #[builder(into)]
    pub organization: Option<String>,

    /// Non-data lines tolerated per received message before giving up
    #[builder(default = DEFAULT_EMPTY_MESSAGES_LIMIT)]
    pub empty_messages_limit: usize,

    /// HTTP client for making requests.
    ///
    /// Streams can stay open for minutes; a whole-request timeout on this
    /// client also bounds how long a stream may run.
    #[builder(default)]
    http_client: reqwest::Client,
}

/// Per-request overrides for opening a stream
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Path relative to the base URL, replacing the endpoint's default path.
    /// Model/endpoint validation is skipped when set.
    pub path: Option<String>,

    /// Extra headers sent with the request
    pub extra_headers: HashMap<String, String>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(key.into(), value.into());
        self
    }
}

impl Client {
    /// Create a new client with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::builder().api_key(api_key).build()
    }

    /// Create a client from `OPENAI_API_KEY` and, optionally, `OPENAI_BASE_URL`
    pub fn from_env() -> Result<Self, CompletionError> {
        let api_key =
            std::env::var("OPENAI_API_KEY").map_err(|_| CompletionError::MissingApiKey)?;
        Ok(Self::builder()
            .api_key(api_key)
            .maybe_base_url(std::env::var("OPENAI_BASE_URL").ok())
            .build())
    }

    /// Create a chat request builder
    pub fn chat(&self) -> crate::request::ChatCompletionRequestBuilder {
        ChatCompletionRequest::builder()
    }

    /// Open a streamed chat completion.
    ///
    /// The returned stream yields chunks until `[DONE]`; see
    /// [`StreamReader::recv`].
    pub async fn create_chat_completion_stream(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionStream, CompletionError> {
        self.create_chat_completion_stream_with(request, RequestOptions::default())
            .await
    }

    /// Open a streamed chat completion with a custom path or extra headers
    pub async fn create_chat_completion_stream_with(
        &self,
        request: &ChatCompletionRequest,
        options: RequestOptions,
    ) -> Result<ChatCompletionStream, CompletionError> {
        let mut body = request.clone();
        body.stream = Some(true);
        self.open_stream(Endpoint::ChatCompletions, &body.model, &body, options)
            .await
    }

    /// Open a streamed legacy text completion
    pub async fn create_completion_stream(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionStream, CompletionError> {
        self.create_completion_stream_with(request, RequestOptions::default())
            .await
    }

    /// Open a streamed legacy text completion with a custom path or extra headers
    pub async fn create_completion_stream_with(
        &self,
        request: &CompletionRequest,
        options: RequestOptions,
    ) -> Result<CompletionStream, CompletionError> {
        let mut body = request.clone();
        body.stream = Some(true);
        self.open_stream(Endpoint::Completions, &body.model, &body, options)
            .await
    }

    async fn open_stream<T, B>(
        &self,
        endpoint: Endpoint,
        model: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<StreamReader<T>, CompletionError>
    where
        T: Streamable,
        B: Serialize + ?Sized,
    {
        let path = match options.path {
            Some(path) => path,
            None => {
                if !Model::from(model).supports(endpoint) {
                    return Err(CompletionError::InvalidModel {
                        model: model.to_string(),
                        endpoint: endpoint.to_string(),
                    });
                }
                endpoint.path().to_string()
            }
        };

        let url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );

        let mut builder = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .json(body);

        if let Some(ref organization) = self.organization {
            builder = builder.header("OpenAI-Organization", organization);
        }
        for (key, value) in &options.extra_headers {
            builder = builder.header(key, value);
        }

        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let bytes = response.bytes().await?;
            return Err(crate::error::parse_error_response(status, &bytes));
        }

        let framing = framing_for(response.headers());
        log::debug!("opened {endpoint} stream at {url} with {framing:?} framing");

        Ok(StreamReader::new(BufLineSource::from_response(response))
            .framing(framing)
            .empty_messages_limit(self.empty_messages_limit))
    }
}
