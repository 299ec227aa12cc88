//! Per-connection session handling.
//!
//! A session walks a fixed lifecycle: greet the client, then alternate
//! between reading one line and writing the response for it, until the
//! client sends `bye`, closes the connection, or an I/O error ends the
//! exchange.  Responses per line:
//!
//! - evaluable line → `"<stripped line> = <result>"`,
//! - evaluable line containing an unrecognised operator → the operator
//!   diagnostic, then the result of the partial evaluation,
//! - malformed token structure → the structure diagnostic alone,
//! - numeric parse failure → the generic internal-error line,
//!
//! and in every case the prompt again.  `bye` produces no output at all.
//!
//! Both halves of the stream are owned by this task and dropped when
//! [`run_session`] returns, so resource release is guaranteed on every
//! exit path without explicit close calls.

use std::net::SocketAddr;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{info, warn};

use calc_core::protocol::{
    format_response, is_termination, strip_whitespace, INSTRUCTION_LINE, INTERNAL_ERROR,
    OPERATOR_DIAGNOSTIC, PROMPT, STRUCTURE_DIAGNOSTIC, WELCOME_LINE,
};
use calc_core::{evaluate, EvalError};

/// Top-level handler for one accepted connection.
///
/// Wraps [`run_session`] and logs the outcome; this is the entry point of
/// each per-connection task spawned by the acceptor.  The outer/inner pair
/// keeps `?` available for error propagation inside `run_session` while
/// making sure every exit is logged here.
pub async fn handle_session(stream: TcpStream, peer_addr: SocketAddr) {
    let (read_half, write_half) = stream.into_split();

    match run_session(BufReader::new(read_half), write_half).await {
        Ok(()) => info!("session {peer_addr} closed"),
        Err(e) => warn!("session {peer_addr} closed with error: {e}"),
    }
}

/// Runs the complete lifecycle of one session over any line-oriented pair
/// of streams.
///
/// Generic over the stream halves so tests can drive it through an
/// in-memory duplex pipe instead of a real socket.
///
/// # Errors
///
/// Returns the first read or write error; the caller logs it and the
/// session ends.  End-of-stream is a normal return, not an error.
pub async fn run_session<R, W>(mut input: R, mut output: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    send_line(&mut output, WELCOME_LINE).await?;
    send_line(&mut output, INSTRUCTION_LINE).await?;
    send_line(&mut output, PROMPT).await?;

    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line).await? == 0 {
            // End of stream: the client went away without saying bye.
            return Ok(());
        }

        let raw = line.trim_end_matches(['\r', '\n']);
        if is_termination(raw) {
            // No further output after bye.
            return Ok(());
        }

        let stripped = strip_whitespace(raw);
        match evaluate(&stripped) {
            Ok(eval) => {
                if eval.unknown_operator {
                    send_line(&mut output, OPERATOR_DIAGNOSTIC).await?;
                }
                send_line(&mut output, &format_response(&stripped, eval.value)).await?;
            }
            Err(EvalError::Structure) => {
                send_line(&mut output, STRUCTURE_DIAGNOSTIC).await?;
            }
            Err(e @ EvalError::NumericParse { .. }) => {
                info!("evaluation failed: {e}");
                send_line(&mut output, INTERNAL_ERROR).await?;
            }
        }

        send_line(&mut output, PROMPT).await?;
    }
}

/// Writes one newline-terminated line and flushes it.
async fn send_line<W>(output: &mut W, text: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, DuplexStream, Lines, ReadHalf, WriteHalf};
    use tokio_test::io::Builder;

    /// Spawns `run_session` over an in-memory duplex pipe and returns the
    /// client-side line reader and writer.
    fn start_session() -> (
        Lines<BufReader<ReadHalf<DuplexStream>>>,
        WriteHalf<DuplexStream>,
    ) {
        let (client, server) = tokio::io::duplex(4096);
        let (server_read, server_write) = tokio::io::split(server);
        tokio::spawn(run_session(BufReader::new(server_read), server_write));

        let (client_read, client_write) = tokio::io::split(client);
        (BufReader::new(client_read).lines(), client_write)
    }

    async fn next_line(lines: &mut Lines<BufReader<ReadHalf<DuplexStream>>>) -> String {
        lines
            .next_line()
            .await
            .expect("read")
            .expect("stream must not be closed yet")
    }

    /// Reads and checks the three greeting lines every session starts with.
    async fn read_greeting(lines: &mut Lines<BufReader<ReadHalf<DuplexStream>>>) {
        assert_eq!(next_line(lines).await, WELCOME_LINE);
        assert_eq!(next_line(lines).await, INSTRUCTION_LINE);
        assert_eq!(next_line(lines).await, PROMPT);
    }

    #[tokio::test]
    async fn test_greeting_is_banner_instruction_prompt() {
        let (mut lines, _writer) = start_session();
        read_greeting(&mut lines).await;
    }

    #[tokio::test]
    async fn test_simple_sum_response() {
        // Arrange
        let (mut lines, mut writer) = start_session();
        read_greeting(&mut lines).await;

        // Act
        writer.write_all(b"1+2\n").await.unwrap();

        // Assert
        assert_eq!(next_line(&mut lines).await, "1+2 = 3.0");
        assert_eq!(next_line(&mut lines).await, PROMPT);
    }

    #[tokio::test]
    async fn test_whitespace_is_stripped_before_evaluation() {
        let (mut lines, mut writer) = start_session();
        read_greeting(&mut lines).await;

        writer.write_all(b" 1 + 2 \n").await.unwrap();

        // The response echoes the stripped line, not the raw one.
        assert_eq!(next_line(&mut lines).await, "1+2 = 3.0");
        assert_eq!(next_line(&mut lines).await, PROMPT);
    }

    #[tokio::test]
    async fn test_structure_error_writes_diagnostic_then_prompt() {
        let (mut lines, mut writer) = start_session();
        read_greeting(&mut lines).await;

        writer.write_all(b"1//2\n").await.unwrap();

        assert_eq!(next_line(&mut lines).await, STRUCTURE_DIAGNOSTIC);
        assert_eq!(next_line(&mut lines).await, PROMPT);
    }

    #[tokio::test]
    async fn test_unknown_operator_writes_diagnostic_then_partial_result() {
        let (mut lines, mut writer) = start_session();
        read_greeting(&mut lines).await;

        writer.write_all(b"1+b2\n").await.unwrap();

        assert_eq!(next_line(&mut lines).await, OPERATOR_DIAGNOSTIC);
        assert_eq!(next_line(&mut lines).await, "1+b2 = 1.0");
        assert_eq!(next_line(&mut lines).await, PROMPT);
    }

    #[tokio::test]
    async fn test_numeric_parse_failure_writes_internal_error() {
        let (mut lines, mut writer) = start_session();
        read_greeting(&mut lines).await;

        writer.write_all(b"abc\n").await.unwrap();

        assert_eq!(next_line(&mut lines).await, INTERNAL_ERROR);
        assert_eq!(next_line(&mut lines).await, PROMPT);
    }

    #[tokio::test]
    async fn test_division_by_zero_is_a_normal_response() {
        let (mut lines, mut writer) = start_session();
        read_greeting(&mut lines).await;

        writer.write_all(b"5/0\n").await.unwrap();

        assert_eq!(next_line(&mut lines).await, "5/0 = inf");
        assert_eq!(next_line(&mut lines).await, PROMPT);
    }

    #[tokio::test]
    async fn test_session_continues_after_an_error_line() {
        let (mut lines, mut writer) = start_session();
        read_greeting(&mut lines).await;

        writer.write_all(b"1//2\n").await.unwrap();
        assert_eq!(next_line(&mut lines).await, STRUCTURE_DIAGNOSTIC);
        assert_eq!(next_line(&mut lines).await, PROMPT);

        // The same session still evaluates subsequent lines.
        writer.write_all(b"2+3*4\n").await.unwrap();
        assert_eq!(next_line(&mut lines).await, "2+3*4 = 20.0");
        assert_eq!(next_line(&mut lines).await, PROMPT);
    }

    #[tokio::test]
    async fn test_bye_terminates_without_output() {
        for bye in ["bye", "BYE", "Bye"] {
            let (mut lines, mut writer) = start_session();
            read_greeting(&mut lines).await;

            writer.write_all(format!("{bye}\n").as_bytes()).await.unwrap();

            // The server writes nothing after bye; the next read sees EOF.
            let eof = lines.next_line().await.expect("read");
            assert_eq!(eof, None, "'{bye}' must close the stream silently");
        }
    }

    #[tokio::test]
    async fn test_client_disconnect_ends_session_cleanly() {
        let (mut lines, mut writer) = start_session();
        read_greeting(&mut lines).await;

        // Shutting down and dropping the writer closes the client side of
        // the pipe.  (Dropping a split WriteHalf alone keeps the shared
        // stream alive, so shut it down explicitly.)
        writer.shutdown().await.expect("shutdown");
        drop(writer);

        // Drain whatever remains; the stream must end without a panic or
        // an error from the session task.
        let mut rest = Vec::new();
        while let Some(l) = lines.next_line().await.expect("read") {
            rest.push(l);
        }
        assert!(rest.is_empty(), "no output may follow a disconnect");
    }

    #[tokio::test]
    async fn test_raw_byte_stream_matches_line_protocol() {
        // Drive the session at the byte level to pin the exact framing:
        // every server line ends in '\n' with no '\r'.
        let (client, server) = tokio::io::duplex(4096);
        let (server_read, server_write) = tokio::io::split(server);
        tokio::spawn(run_session(BufReader::new(server_read), server_write));

        let (mut client_read, mut client_write) = tokio::io::split(client);

        client_write.write_all(b"1+2\nbye\n").await.unwrap();

        let mut bytes = Vec::new();
        client_read.read_to_end(&mut bytes).await.unwrap();
        let text = String::from_utf8(bytes).unwrap();

        let expected = format!(
            "{WELCOME_LINE}\n{INSTRUCTION_LINE}\n{PROMPT}\n1+2 = 3.0\n{PROMPT}\n"
        );
        assert_eq!(text, expected);
    }

    #[tokio::test]
    async fn test_scripted_transcript_with_mock_streams() {
        // Script both halves: the reader yields the client's lines, the
        // writer rejects any byte that deviates from the expected
        // transcript.
        let input = Builder::new().read(b"1+2\nbye\n").build();
        let expected =
            format!("{WELCOME_LINE}\n{INSTRUCTION_LINE}\n{PROMPT}\n1+2 = 3.0\n{PROMPT}\n");
        let output = Builder::new().write(expected.as_bytes()).build();

        run_session(BufReader::new(input), output)
            .await
            .expect("session over mock streams");
    }

    #[tokio::test]
    async fn test_write_error_is_propagated_to_the_caller() {
        // The first greeting write fails; the input mock is never polled.
        let input = Builder::new().build();
        let output = Builder::new()
            .write_error(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "peer reset",
            ))
            .build();

        let result = run_session(BufReader::new(input), output).await;

        assert_eq!(
            result.expect_err("write failure must end the session").kind(),
            std::io::ErrorKind::BrokenPipe
        );
    }
}
