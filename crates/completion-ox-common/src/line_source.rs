use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{StreamExt, TryStreamExt, stream::BoxStream};
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};
use tokio_util::io::StreamReader;

/// Buffered reader over a live response body.
///
/// Implementations are owned by the transport layer; the decoder only reads
/// from them and closes them.
#[async_trait]
pub trait LineSource: Send {
    /// Append the next line, including its trailing `\n` when present, to `buf`.
    ///
    /// Returns the number of bytes appended. `Ok(0)` means the body is exhausted.
    async fn read_line(&mut self, buf: &mut Vec<u8>) -> io::Result<usize>;

    /// Read a single byte. `Ok(None)` means the body is exhausted.
    async fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Release the underlying transport resource.
    async fn close(&mut self) -> io::Result<()>;
}

/// Byte stream of a `reqwest` response body, adapted to `AsyncBufRead`
pub type ResponseBody = StreamReader<BoxStream<'static, io::Result<Bytes>>, Bytes>;

/// Line source reading directly from an HTTP response
pub type ResponseLineSource = BufLineSource<ResponseBody>;

/// [`LineSource`] over any tokio buffered reader
pub struct BufLineSource<R> {
    reader: Option<R>,
}

impl<R> BufLineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
        }
    }

    /// Whether [`LineSource::close`] has been called
    pub fn is_closed(&self) -> bool {
        self.reader.is_none()
    }

    fn reader(&mut self) -> io::Result<&mut R> {
        self.reader
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "line source is closed"))
    }
}

impl BufLineSource<ResponseBody> {
    /// Wrap the body of a streaming HTTP response
    pub fn from_response(response: reqwest::Response) -> Self {
        let body = response.bytes_stream().map_err(io::Error::other).boxed();
        Self::new(StreamReader::new(body))
    }
}

#[async_trait]
impl<R> LineSource for BufLineSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn read_line(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        self.reader()?.read_until(b'\n', buf).await
    }

    async fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.reader()?.read(&mut byte).await? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }

    async fn close(&mut self) -> io::Result<()> {
        // Dropping the reader drops the response body and its connection.
        self.reader.take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn test_read_line_keeps_terminator() {
        let mut source = BufLineSource::new(Cursor::new(b"data: a\nrest".to_vec()));
        let mut buf = Vec::new();

        assert_eq!(source.read_line(&mut buf).await.unwrap(), 8);
        assert_eq!(buf, b"data: a\n");

        buf.clear();
        assert_eq!(source.read_line(&mut buf).await.unwrap(), 4);
        assert_eq!(buf, b"rest");

        buf.clear();
        assert_eq!(source.read_line(&mut buf).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_read_byte_until_exhausted() {
        let mut source = BufLineSource::new(Cursor::new(b"ok".to_vec()));
        assert_eq!(source.read_byte().await.unwrap(), Some(b'o'));
        assert_eq!(source.read_byte().await.unwrap(), Some(b'k'));
        assert_eq!(source.read_byte().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reads_fail_after_close() {
        let mut source = BufLineSource::new(Cursor::new(b"data: a\n".to_vec()));
        source.close().await.unwrap();
        assert!(source.is_closed());

        let mut buf = Vec::new();
        let err = source.read_line(&mut buf).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
    }
}
