use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// One unit read from the control connection.
#[derive(Debug, PartialEq, Eq)]
pub enum ControlLine {
    /// A complete line without its `\n`.
    Command(Vec<u8>),
    /// A line that went past the length limit. Reported once, as soon as the
    /// limit is crossed; the rest of it up to the next `\n` is discarded.
    TooLong,
}

/// Reads newline-terminated lines with a bound on how much of one line is
/// ever held in memory.
///
/// [`next_line`](Self::next_line) is cancel-safe: the only await is
/// `fill_buf`, and partial lines stay in the reader between calls.
pub struct ControlReader<R> {
    inner: R,
    limit: usize,
    pending: Vec<u8>,
    discarding: bool,
}

impl<R: AsyncBufRead + Unpin> ControlReader<R> {
    pub fn new(inner: R, limit: usize) -> Self {
        ControlReader {
            inner,
            limit,
            pending: Vec::with_capacity(limit),
            discarding: false,
        }
    }

    /// Returns the next line, or `None` at end of stream. A trailing line
    /// without `\n` is returned before `None`.
    pub async fn next_line(&mut self) -> std::io::Result<Option<ControlLine>> {
        loop {
            let available = self.inner.fill_buf().await?;
            if available.is_empty() {
                if self.discarding || self.pending.is_empty() {
                    self.discarding = false;
                    self.pending.clear();
                    return Ok(None);
                }
                return Ok(Some(ControlLine::Command(std::mem::take(&mut self.pending))));
            }

            let newline = available.iter().position(|&b| b == b'\n');
            let chunk_end = newline.unwrap_or(available.len());

            if self.discarding {
                self.inner.consume(chunk_end + newline.map_or(0, |_| 1));
                if newline.is_some() {
                    self.discarding = false;
                }
                continue;
            }

            if self.pending.len() + chunk_end > self.limit {
                // Keep nothing past the limit
                self.pending.clear();
                self.inner.consume(chunk_end + newline.map_or(0, |_| 1));
                self.discarding = newline.is_none();
                return Ok(Some(ControlLine::TooLong));
            }

            self.pending.extend_from_slice(&available[..chunk_end]);
            match newline {
                Some(_) => {
                    self.inner.consume(chunk_end + 1);
                    return Ok(Some(ControlLine::Command(std::mem::take(&mut self.pending))));
                }
                None => self.inner.consume(chunk_end),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncWriteExt, BufReader};

    fn command(text: &str) -> Option<ControlLine> {
        Some(ControlLine::Command(text.as_bytes().to_vec()))
    }

    #[tokio::test]
    async fn test_lines_across_small_reads() {
        let input: &[u8] = b"USER alice\r\nPASS secret\nNOOP";
        let mut reader = ControlReader::new(BufReader::with_capacity(4, input), 512);

        assert_eq!(reader.next_line().await.unwrap(), command("USER alice\r"));
        assert_eq!(reader.next_line().await.unwrap(), command("PASS secret"));
        assert_eq!(reader.next_line().await.unwrap(), command("NOOP"));
        assert_eq!(reader.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_line_at_limit_is_accepted() {
        let mut input = vec![b'a'; 8];
        input.push(b'\n');
        let mut reader = ControlReader::new(BufReader::new(input.as_slice()), 8);
        assert_eq!(
            reader.next_line().await.unwrap(),
            Some(ControlLine::Command(vec![b'a'; 8]))
        );
    }

    #[tokio::test]
    async fn test_overlong_line_reported_once_then_skipped() {
        let mut input = vec![b'x'; 100];
        input.extend_from_slice(b"\r\nNOOP\r\n");
        let mut reader = ControlReader::new(BufReader::with_capacity(16, input.as_slice()), 32);

        assert_eq!(reader.next_line().await.unwrap(), Some(ControlLine::TooLong));
        assert_eq!(reader.next_line().await.unwrap(), command("NOOP\r"));
        assert_eq!(reader.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_overlong_line_reported_before_newline() {
        let (mut client, server) = tokio::io::duplex(1024);
        let mut reader = ControlReader::new(BufReader::new(server), 32);

        // No newline ever arrives, yet the reader answers
        client.write_all(&[b'x'; 64]).await.unwrap();
        assert_eq!(reader.next_line().await.unwrap(), Some(ControlLine::TooLong));
        assert!(reader.pending.capacity() <= 64);

        client.write_all(&[b'x'; 200]).await.unwrap();
        client.write_all(b"\nQUIT\n").await.unwrap();
        assert_eq!(reader.next_line().await.unwrap(), command("QUIT"));
    }
}
