//! Server-sent-events plumbing for streamed completions.
//!
//! The response body arrives as arbitrary byte chunks. We buffer them, split
//! on blank lines, pull out `data:` payloads and hand each payload to a
//! parser closure that turns it into zero or more [`StreamEvent`]s.
//!
//! A body that closes before the provider signalled completion is reported
//! as an error item: the caller must never mistake a truncated answer for a
//! finished one.

use futures_util::StreamExt;
use wf_domain::error::{Error, Result};
use wf_domain::stream::{BoxStream, StreamEvent};

/// Extract complete `data:` payloads from an SSE buffer.
///
/// Event blocks end at an empty line. `event:`, `id:` and `retry:` lines are
/// ignored. Complete blocks are drained from the buffer; a trailing partial
/// block stays for the next call.
pub(crate) fn drain_data_lines(buffer: &mut String) -> Vec<String> {
    if buffer.contains('\r') {
        *buffer = buffer.replace("\r\n", "\n");
    }

    let mut data_lines = Vec::new();
    while let Some(pos) = buffer.find("\n\n") {
        let block: String = buffer.drain(..pos + 2).collect();
        data_lines.extend(
            block
                .lines()
                .filter_map(|line| line.trim().strip_prefix("data:"))
                .map(str::trim)
                .filter(|data| !data.is_empty())
                .map(String::from),
        );
    }
    data_lines
}

/// Turn a stream of body chunks into a [`BoxStream`] of events.
///
/// `parse_data` receives each `data:` payload. The returned stream ends after
/// the first `Done` event, after the first error, or when the body closes.
pub(crate) fn sse_event_stream<S, B, E, F>(
    chunks: S,
    mut parse_data: F,
) -> BoxStream<'static, Result<StreamEvent>>
where
    S: futures_core::Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: Into<Error> + Send,
    F: FnMut(&str) -> Vec<Result<StreamEvent>> + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut chunks = Box::pin(chunks);
        let mut buffer = String::new();

        'body: loop {
            let data_lines = match chunks.next().await {
                Some(Ok(bytes)) => {
                    buffer.push_str(&String::from_utf8_lossy(bytes.as_ref()));
                    drain_data_lines(&mut buffer)
                }
                Some(Err(e)) => {
                    yield Err(e.into());
                    break 'body;
                }
                None => {
                    // Body closed: flush a final unterminated event, if any.
                    let mut tail = Vec::new();
                    if !buffer.trim().is_empty() {
                        buffer.push_str("\n\n");
                        tail = drain_data_lines(&mut buffer);
                    }
                    for data in tail {
                        for event in parse_data(&data) {
                            let finished = matches!(&event, Ok(StreamEvent::Done { .. }) | Err(_));
                            yield event;
                            if finished {
                                break 'body;
                            }
                        }
                    }
                    yield Err(Error::Http("stream closed before completion".into()));
                    break 'body;
                }
            };

            for data in data_lines {
                for event in parse_data(&data) {
                    let finished = matches!(&event, Ok(StreamEvent::Done { .. }) | Err(_));
                    yield event;
                    if finished {
                        break 'body;
                    }
                }
            }
        }
    };

    Box::pin(stream)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    fn token_or_done(data: &str) -> Vec<Result<StreamEvent>> {
        if data == "[DONE]" {
            vec![Ok(StreamEvent::Done {
                usage: None,
                finish_reason: Some("stop".into()),
            })]
        } else {
            vec![Ok(StreamEvent::Token { text: data.to_string() })]
        }
    }

    async fn collect(chunks: Vec<std::result::Result<&'static str, Error>>) -> Vec<Result<StreamEvent>> {
        let stream = sse_event_stream(futures_util::stream::iter(chunks), token_or_done);
        stream.collect().await
    }

    #[test]
    fn drain_multiple_events() {
        let mut buf = String::from("data: first\n\ndata: second\n\n");
        assert_eq!(drain_data_lines(&mut buf), vec!["first", "second"]);
        assert!(buf.is_empty());
    }

    #[test]
    fn drain_partial_event_stays_in_buffer() {
        let mut buf = String::from("data: complete\n\ndata: partial");
        assert_eq!(drain_data_lines(&mut buf), vec!["complete"]);
        assert_eq!(buf, "data: partial");
    }

    #[test]
    fn drain_ignores_non_data_lines_and_blank_payloads() {
        let mut buf = String::from("event: ping\nid: 42\nretry: 5000\ndata: payload\n\ndata: \n\n");
        assert_eq!(drain_data_lines(&mut buf), vec!["payload"]);
        assert!(buf.is_empty());
    }

    #[test]
    fn drain_accepts_crlf_delimiters() {
        let mut buf = String::from("data: one\r\n\r\ndata: two\r\n\r\n");
        assert_eq!(drain_data_lines(&mut buf), vec!["one", "two"]);
    }

    #[tokio::test]
    async fn events_split_across_chunks_are_reassembled() {
        let events = collect(vec![Ok("data: Hel"), Ok("lo\n\nda"), Ok("ta: [DONE]\n\n")]).await;
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], Ok(StreamEvent::Token { text }) if text == "Hello"));
        assert!(matches!(&events[1], Ok(StreamEvent::Done { .. })));
    }

    #[tokio::test]
    async fn stream_stops_after_done() {
        let events = collect(vec![Ok("data: [DONE]\n\ndata: late\n\n")]).await;
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn unterminated_final_event_is_flushed() {
        let events = collect(vec![Ok("data: a\n\ndata: [DONE]")]).await;
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[1], Ok(StreamEvent::Done { .. })));
    }

    #[tokio::test]
    async fn body_closing_without_done_is_an_error() {
        let events = collect(vec![Ok("data: partial answer\n\n")]).await;
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], Ok(StreamEvent::Token { .. })));
        assert!(events[1].is_err());
    }

    #[tokio::test]
    async fn transport_error_ends_the_stream() {
        let events = collect(vec![
            Ok("data: a\n\n"),
            Err(Error::Http("connection reset".into())),
            Ok("data: b\n\n"),
        ])
        .await;
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[1], Err(Error::Http(m)) if m.contains("reset")));
    }
}
