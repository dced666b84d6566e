//! JSON-RPC message framing for the MCP stdio transport.
//!
//! Supports two framing modes:
//!
//! - **Content-Length**: `Content-Length: N\r\n\r\n<N bytes>` (LSP-style framing)
//! - **Newline-delimited**: one JSON object per `\n`-terminated line
//!
//! [`MessageReader`] auto-detects the framing of each incoming message and
//! remembers the most recent mode, so responses can be written back in the
//! same framing the client speaks.

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Wire framing of an MCP message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    NewlineDelimited,
    ContentLength,
}

/// Reads MCP messages from an async reader, auto-detecting Content-Length vs
/// newline framing.
///
/// On each call to [`MessageReader::next_message`], the reader inspects the
/// first line: if it starts with `Content-Length:` the header block is parsed
/// and the body read exactly; otherwise the line itself is the JSON message.
pub struct MessageReader<R> {
    reader: BufReader<R>,
    buf: String,
    framing: Framing,
}

impl<R: AsyncRead + Unpin> MessageReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            buf: String::new(),
            framing: Framing::NewlineDelimited,
        }
    }

    /// Framing of the most recently read message. Newline-delimited until the
    /// first Content-Length frame arrives.
    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// Read the next JSON-RPC message, returning `None` on EOF.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if reading fails or a Content-Length header is
    /// malformed.
    pub async fn next_message(&mut self) -> io::Result<Option<String>> {
        loop {
            self.buf.clear();
            let n = self.reader.read_line(&mut self.buf).await?;
            if n == 0 {
                return Ok(None); // EOF
            }

            let trimmed = self.buf.trim();
            if trimmed.is_empty() {
                continue;
            }

            if let Some(rest) = trimmed.strip_prefix("Content-Length:") {
                let len: usize = rest
                    .trim()
                    .parse()
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

                // Consume remaining headers up to the blank separator line
                loop {
                    self.buf.clear();
                    let header_n = self.reader.read_line(&mut self.buf).await?;
                    if header_n == 0 {
                        return Err(io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            "EOF in Content-Length headers",
                        ));
                    }
                    if self.buf.trim().is_empty() {
                        break;
                    }
                    // Skip other headers (e.g. Content-Type)
                }

                let mut body = vec![0u8; len];
                self.reader.read_exact(&mut body).await?;
                let msg = String::from_utf8(body)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                self.framing = Framing::ContentLength;
                return Ok(Some(msg));
            }

            // Newline-delimited: the trimmed line IS the JSON message
            self.framing = Framing::NewlineDelimited;
            return Ok(Some(trimmed.to_string()));
        }
    }
}

/// Write a JSON message in the given framing and flush.
///
/// In newline-delimited mode the `json` string must not contain embedded
/// newlines.
///
/// # Errors
///
/// Returns an I/O error if writing or flushing fails.
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    json: &str,
    framing: Framing,
) -> io::Result<()> {
    match framing {
        Framing::NewlineDelimited => {
            writer.write_all(json.as_bytes()).await?;
            writer.write_all(b"\n").await?;
        }
        Framing::ContentLength => {
            writer.write_all(&encode_content_length(json)).await?;
        }
    }
    writer.flush().await?;
    Ok(())
}

/// Encode a JSON message in Content-Length framing format.
pub fn encode_content_length(json: &str) -> Vec<u8> {
    let header = format!("Content-Length: {}\r\n\r\n", json.len());
    let mut buf = Vec::with_capacity(header.len() + json.len());
    buf.extend_from_slice(header.as_bytes());
    buf.extend_from_slice(json.as_bytes());
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_parse_newline_delimited() {
        let input = b"{\"jsonrpc\":\"2.0\",\"id\":1}\n";
        let mut reader = MessageReader::new(&input[..]);
        let msg = reader.next_message().await.unwrap().unwrap();
        assert_eq!(msg, "{\"jsonrpc\":\"2.0\",\"id\":1}");
        assert_eq!(reader.framing(), Framing::NewlineDelimited);
    }

    #[tokio::test]
    async fn test_parse_content_length_frame() {
        let body = r#"{"jsonrpc":"2.0","id":2}"#;
        let framed = format!("Content-Length: {}\r\n\r\n{}", body.len(), body);
        let mut reader = MessageReader::new(framed.as_bytes());
        let msg = reader.next_message().await.unwrap().unwrap();
        assert_eq!(msg, body);
        assert_eq!(reader.framing(), Framing::ContentLength);
    }

    #[tokio::test]
    async fn test_parse_content_length_with_extra_header() {
        let body = r#"{"jsonrpc":"2.0","id":3}"#;
        let framed = format!(
            "Content-Length: {}\r\nContent-Type: application/json\r\n\r\n{}",
            body.len(),
            body
        );
        let mut reader = MessageReader::new(framed.as_bytes());
        let msg = reader.next_message().await.unwrap().unwrap();
        assert_eq!(msg, body);
    }

    #[tokio::test]
    async fn test_framing_follows_last_message() {
        let body = r#"{"id":1}"#;
        let mut input = encode_content_length(body);
        input.extend_from_slice(b"{\"id\":2}\n");
        let mut reader = MessageReader::new(&input[..]);

        reader.next_message().await.unwrap().unwrap();
        assert_eq!(reader.framing(), Framing::ContentLength);

        reader.next_message().await.unwrap().unwrap();
        assert_eq!(reader.framing(), Framing::NewlineDelimited);
    }

    #[tokio::test]
    async fn test_parse_multiple_newline_messages() {
        let input = b"{\"id\":1}\n{\"id\":2}\n{\"id\":3}\n";
        let mut reader = MessageReader::new(&input[..]);
        assert_eq!(reader.next_message().await.unwrap().unwrap(), "{\"id\":1}");
        assert_eq!(reader.next_message().await.unwrap().unwrap(), "{\"id\":2}");
        assert_eq!(reader.next_message().await.unwrap().unwrap(), "{\"id\":3}");
        assert!(reader.next_message().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_newline_delimited() {
        let mut buf = Vec::new();
        write_message(&mut buf, r#"{"id":1}"#, Framing::NewlineDelimited)
            .await
            .unwrap();
        assert_eq!(buf, b"{\"id\":1}\n");
    }

    #[tokio::test]
    async fn test_write_content_length() {
        let mut buf = Vec::new();
        write_message(&mut buf, r#"{"id":1}"#, Framing::ContentLength)
            .await
            .unwrap();
        assert_eq!(buf, b"Content-Length: 8\r\n\r\n{\"id\":1}");
    }

    #[tokio::test]
    async fn test_eof_returns_none() {
        let input = b"";
        let mut reader = MessageReader::new(&input[..]);
        assert!(reader.next_message().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_blank_lines_skipped() {
        let input = b"\n\n{\"id\":1}\n\n";
        let mut reader = MessageReader::new(&input[..]);
        let msg = reader.next_message().await.unwrap().unwrap();
        assert_eq!(msg, "{\"id\":1}");
    }
}
