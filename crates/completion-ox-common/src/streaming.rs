use crate::{
    accumulator::{BufferAccumulator, ErrorAccumulator},
    error::{ApiError, ErrorResponse, StreamError},
    line_source::LineSource,
    unmarshal::{JsonUnmarshaler, Unmarshaler},
};
use async_stream::try_stream;
use futures_util::stream::BoxStream;
use serde::de::DeserializeOwned;
use std::{borrow::Cow, io, marker::PhantomData};

const DATA_PREFIX: &[u8] = b"data: ";
const ERROR_PREFIX: &[u8] = b"data: {\"error\":";
const DONE: &[u8] = b"[DONE]";

/// Default number of non-data lines tolerated in a single `recv` call
pub const DEFAULT_EMPTY_MESSAGES_LIMIT: usize = 300;

/// Payload shapes a [`StreamReader`] can produce.
///
/// Implemented by the chat-completion chunk and the completion chunk of the
/// client crate.
pub trait Streamable: DeserializeOwned + Send + 'static {
    /// Wrap text received in plain-text mode into a synthetic message
    fn from_plain_text(text: &str) -> Self;
}

/// How the response body is split into messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Framing {
    /// `data: <json>` lines terminated by `data: [DONE]`
    #[default]
    Lines,
    /// Raw text; every decoded character becomes its own message
    PlainText,
}

/// Pull-based decoder for a streaming completion response.
///
/// Each [`recv`](StreamReader::recv) call reads from the line source until it
/// has one message, reaches the end of the stream, or fails. `Ok(None)` is the
/// terminal signal: after `[DONE]`, end of body, or any error, every further
/// call returns `Ok(None)` without reading.
///
/// A reader is driven by one task at a time; `recv` takes `&mut self` and
/// there is no internal locking. Timeouts and cancellation belong to the
/// transport: a cancelled request shows up as a failed read.
pub struct StreamReader<T, A = BufferAccumulator, U = JsonUnmarshaler> {
    source: Box<dyn LineSource>,
    framing: Framing,
    empty_messages_limit: usize,
    accumulator: A,
    unmarshaler: U,
    finished: bool,
    _payload: PhantomData<fn() -> T>,
}

impl<T, A, U> std::fmt::Debug for StreamReader<T, A, U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamReader")
            .field("framing", &self.framing)
            .field("empty_messages_limit", &self.empty_messages_limit)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl<T: Streamable> StreamReader<T> {
    pub fn new(source: impl LineSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            framing: Framing::default(),
            empty_messages_limit: DEFAULT_EMPTY_MESSAGES_LIMIT,
            accumulator: BufferAccumulator::new(),
            unmarshaler: JsonUnmarshaler,
            finished: false,
            _payload: PhantomData,
        }
    }
}

impl<T, A, U> StreamReader<T, A, U>
where
    T: Streamable,
    A: ErrorAccumulator,
    U: Unmarshaler,
{
    #[must_use]
    pub fn framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    #[must_use]
    pub fn empty_messages_limit(mut self, limit: usize) -> Self {
        self.empty_messages_limit = limit;
        self
    }

    /// Replace the buffer used to assemble in-band error objects
    pub fn with_accumulator<B: ErrorAccumulator>(self, accumulator: B) -> StreamReader<T, B, U> {
        StreamReader {
            source: self.source,
            framing: self.framing,
            empty_messages_limit: self.empty_messages_limit,
            accumulator,
            unmarshaler: self.unmarshaler,
            finished: self.finished,
            _payload: PhantomData,
        }
    }

    /// Replace the strategy used to decode frames and error objects
    pub fn with_unmarshaler<V: Unmarshaler>(self, unmarshaler: V) -> StreamReader<T, A, V> {
        StreamReader {
            source: self.source,
            framing: self.framing,
            empty_messages_limit: self.empty_messages_limit,
            accumulator: self.accumulator,
            unmarshaler,
            finished: self.finished,
            _payload: PhantomData,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Receive the next message.
    ///
    /// Returns `Ok(None)` once the stream is over.
    pub async fn recv(&mut self) -> Result<Option<T>, StreamError> {
        if self.finished {
            return Ok(None);
        }

        let result = match self.framing {
            Framing::Lines => self.process_lines().await,
            Framing::PlainText => self.process_plain_text().await,
        };

        if !matches!(result, Ok(Some(_))) {
            log::debug!("completion stream finished");
            self.finished = true;
        }
        result
    }

    /// Release the underlying transport.
    ///
    /// Call once, after the last `recv`.
    pub async fn close(&mut self) -> Result<(), StreamError> {
        self.source.close().await.map_err(StreamError::Transport)
    }

    /// Adapt the reader into a `Stream` that ends at the terminal signal
    pub fn into_stream(mut self) -> BoxStream<'static, Result<T, StreamError>>
    where
        A: 'static,
        U: 'static,
    {
        Box::pin(try_stream! {
            while let Some(message) = self.recv().await? {
                yield message;
            }
        })
    }

    async fn process_lines(&mut self) -> Result<Option<T>, StreamError> {
        let mut empty_messages = 0usize;
        let mut has_error_prefix = false;
        let mut raw = Vec::new();

        loop {
            raw.clear();
            match self.source.read_line(&mut raw).await {
                Ok(0) => return self.read_failed(None),
                Err(err) => return self.read_failed(Some(err)),
                Ok(_) if has_error_prefix => {
                    if let Some(error) = self.upstream_error() {
                        return Err(StreamError::UpstreamReported(error));
                    }
                }
                Ok(_) => {}
            }

            let line = trim_space(&raw);
            if !has_error_prefix && line.starts_with(ERROR_PREFIX) {
                // keep-alive comments must not corrupt the error object
                self.accumulator.reset();
                has_error_prefix = true;
            }

            if has_error_prefix || !line.starts_with(DATA_PREFIX) {
                let noise = line.strip_prefix(DATA_PREFIX).unwrap_or(line);
                log::trace!("accumulating {} non-data bytes", noise.len());
                self.accumulator
                    .write(noise)
                    .map_err(StreamError::AccumulatorWrite)?;

                empty_messages += 1;
                if empty_messages > self.empty_messages_limit {
                    return Err(StreamError::TooManyEmptyMessages {
                        limit: self.empty_messages_limit,
                    });
                }
                continue;
            }

            let payload = &line[DATA_PREFIX.len()..];
            if payload == DONE {
                return Ok(None);
            }

            return self
                .unmarshaler
                .unmarshal::<T>(payload)
                .map(Some)
                .map_err(StreamError::MalformedPayload);
        }
    }

    async fn process_plain_text(&mut self) -> Result<Option<T>, StreamError> {
        let mut pending = Vec::with_capacity(4);

        loop {
            match self.source.read_byte().await {
                Ok(Some(byte)) => pending.push(byte),
                Ok(None) => return self.read_failed(None),
                Err(err) => return self.read_failed(Some(err)),
            }

            let text: Cow<'_, str> = match std::str::from_utf8(&pending) {
                Ok(text) => Cow::Borrowed(text),
                // incomplete code point
                Err(err) if err.error_len().is_none() => continue,
                Err(_) => String::from_utf8_lossy(&pending),
            };
            return Ok(Some(T::from_plain_text(&text)));
        }
    }

    /// Resolve a failed or exhausted read, preferring a buffered upstream error
    fn read_failed(&self, err: Option<io::Error>) -> Result<Option<T>, StreamError> {
        if let Some(error) = self.upstream_error() {
            return Err(StreamError::UpstreamReported(error));
        }
        match err {
            Some(err) => Err(StreamError::Transport(err)),
            None => Ok(None),
        }
    }

    fn upstream_error(&self) -> Option<ApiError> {
        let bytes = self.accumulator.bytes();
        if bytes.is_empty() {
            return None;
        }
        self.unmarshaler
            .unmarshal::<ErrorResponse>(bytes)
            .ok()
            .and_then(|response| response.error)
    }
}

/// Trim ASCII whitespace, vertical tab included, from both ends of a line
fn trim_space(line: &[u8]) -> &[u8] {
    let is_space = |byte: &u8| byte.is_ascii_whitespace() || *byte == b'\x0b';
    let start = line.iter().position(|b| !is_space(b)).unwrap_or(line.len());
    let end = line.iter().rposition(|b| !is_space(b)).map_or(start, |i| i + 1);
    &line[start..end]
}
