//! Stream session use case.
//!
//! Drives one request/response cycle against a [`StreamGateway`]:
//!
//! 1. Append the user prompt and open an empty assistant turn
//! 2. Send the history and read the chunked body
//! 3. Decode each chunk and merge the fragment into the open turn
//! 4. Seal the turn and report `Completed`, `Cancelled` or `Failed`
//!
//! A session is single-use. Its [`CancelHandle`] is created with it and dies
//! with it; retrying means building a new session.
//!
//! Merges and the final seal are bound to the [`TurnToken`] the session
//! opened. If the caller clears or replaces the transcript mid-stream, the
//! session stops writing and ends as `Failed` instead of touching whatever
//! turn is open by then.

use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger, event_types,
};
use crate::ports::stream_gateway::{StreamGateway, StreamRequest};
use crate::ports::stream_observer::StreamObserver;
use crate::use_cases::cancellation::CancelHandle;
use crate::use_cases::shared::SharedTranscript;
use chatline_domain::core::string::truncate;
use chatline_domain::{
    DomainError, FailureKind, StreamFailure, StreamStatus, TurnToken, Utf8StreamDecoder,
};
use futures::StreamExt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors returned to the caller instead of a terminal status.
///
/// Both variants mean the stream never started and the transcript was not
/// touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamSessionError {
    #[error("Stream session already used (status: {0})")]
    AlreadyStarted(&'static str),

    #[error(transparent)]
    Transcript(#[from] DomainError),
}

/// Result of a finished stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOutcome {
    /// `Completed`, `Cancelled` or `Failed`.
    pub status: StreamStatus,
    /// Content of the assistant turn when it was sealed.
    pub assistant_text: String,
    /// Raw body bytes read before the stream ended.
    pub bytes_received: usize,
}

/// One streamed assistant turn.
pub struct StreamSession {
    gateway: Arc<dyn StreamGateway>,
    conversation_logger: Arc<dyn ConversationLogger>,
    cancel: CancelHandle,
    status: StreamStatus,
}

impl StreamSession {
    pub fn new(gateway: Arc<dyn StreamGateway>) -> Self {
        Self {
            gateway,
            conversation_logger: Arc::new(NoConversationLogger),
            cancel: CancelHandle::new(),
            status: StreamStatus::Idle,
        }
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn status(&self) -> &StreamStatus {
        &self.status
    }

    /// Handle for cancelling this session from another task or a callback.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Stream the assistant's reply to `prompt` into `transcript`.
    ///
    /// Returns `Err` only when the session cannot start: it was already used,
    /// the prompt is blank, or the transcript has an open turn because
    /// another session is streaming into it. Transport failures and
    /// cancellation are reported through [`StreamOutcome::status`], with
    /// whatever was merged so far kept in the sealed turn.
    pub async fn run(
        &mut self,
        transcript: &SharedTranscript,
        prompt: &str,
        observer: &dyn StreamObserver,
    ) -> Result<StreamOutcome, StreamSessionError> {
        let (request, turn) = self.begin(transcript, prompt).await?;
        observer.on_stream_start();

        let (status, bytes_received) = self.pump(transcript, turn, request, observer).await;
        Ok(self
            .finish(transcript, turn, status, bytes_received, observer)
            .await)
    }

    async fn begin(
        &mut self,
        transcript: &SharedTranscript,
        prompt: &str,
    ) -> Result<(StreamRequest, TurnToken), StreamSessionError> {
        if self.status != StreamStatus::Idle {
            return Err(StreamSessionError::AlreadyStarted(self.status.as_str()));
        }

        let (request, turn) = {
            let mut t = transcript.lock().await;
            if t.has_open_turn() {
                warn!("Rejecting stream start: transcript already has an open turn");
                return Err(DomainError::TurnAlreadyOpen.into());
            }
            t.append_user(prompt)?;
            let request = StreamRequest::new(t.messages().to_vec());
            let turn = t.begin_assistant_turn()?;
            (request, turn)
        };

        self.status = StreamStatus::Streaming;
        info!(
            "Starting stream ({} messages): {}",
            request.messages.len(),
            truncate(prompt.trim(), 80)
        );
        self.conversation_logger.log(ConversationEvent::new(
            event_types::STREAM_STARTED,
            serde_json::json!({
                "messages": request.messages.len(),
                "prompt": prompt,
            }),
        ));
        Ok((request, turn))
    }

    /// Read the body until it ends, fails or the session is cancelled.
    async fn pump(
        &self,
        transcript: &SharedTranscript,
        turn: TurnToken,
        request: StreamRequest,
        observer: &dyn StreamObserver,
    ) -> (StreamStatus, usize) {
        let cancel = &self.cancel;
        if cancel.is_cancelled() {
            debug!("Cancelled before the request was sent");
            return (StreamStatus::Cancelled, 0);
        }

        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => return (StreamStatus::Cancelled, 0),
            opened = self.gateway.open_stream(request) => opened,
        };
        let mut body = match opened {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to open stream: {}", e);
                return (StreamStatus::Failed(e.to_failure()), 0);
            }
        };

        let mut decoder = Utf8StreamDecoder::new();
        let mut bytes_received = 0;
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return (StreamStatus::Cancelled, bytes_received),
                next = body.next() => next,
            };

            // A chunk that raced with the cancel is never merged
            if cancel.is_cancelled() {
                return (StreamStatus::Cancelled, bytes_received);
            }

            let fragment = match next {
                Some(Ok(chunk)) => {
                    bytes_received += chunk.len();
                    decoder.feed(&chunk)
                }
                Some(Err(e)) => {
                    warn!("Stream failed after {} bytes: {}", bytes_received, e);
                    return (StreamStatus::Failed(e.to_failure()), bytes_received);
                }
                None => {
                    if decoder.pending_len() > 0 {
                        debug!(
                            "Discarding {} bytes of truncated UTF-8 at end of stream",
                            decoder.pending_len()
                        );
                    }
                    let tail = decoder.flush();
                    if let Err(status) = Self::merge(transcript, turn, &tail, observer).await {
                        return (status, bytes_received);
                    }
                    return (StreamStatus::Completed, bytes_received);
                }
            };

            if let Err(status) = Self::merge(transcript, turn, &fragment, observer).await {
                return (status, bytes_received);
            }
        }
    }

    async fn merge(
        transcript: &SharedTranscript,
        turn: TurnToken,
        fragment: &str,
        observer: &dyn StreamObserver,
    ) -> Result<(), StreamStatus> {
        if fragment.is_empty() {
            return Ok(());
        }
        if let Err(e) = transcript.lock().await.merge_delta_into(turn, fragment) {
            warn!("Assistant turn closed while streaming: {}", e);
            return Err(StreamStatus::Failed(turn_closed()));
        }
        observer.on_delta(fragment);
        Ok(())
    }

    async fn finish(
        &mut self,
        transcript: &SharedTranscript,
        turn: TurnToken,
        status: StreamStatus,
        bytes_received: usize,
        observer: &dyn StreamObserver,
    ) -> StreamOutcome {
        let closed = transcript
            .lock()
            .await
            .close_turn(turn)
            .map(|m| m.content.clone());
        let (status, assistant_text) = match closed {
            Ok(text) => (status, text),
            // Our turn was dropped from the transcript; nothing of it survives
            Err(_) => match status {
                StreamStatus::Completed => (StreamStatus::Failed(turn_closed()), String::new()),
                other => (other, String::new()),
            },
        };

        match &status {
            StreamStatus::Failed(failure) => {
                warn!("Stream failed ({}): {}", failure.kind, failure)
            }
            other => info!(
                "Stream {} after {} bytes ({} chars)",
                other.as_str(),
                bytes_received,
                assistant_text.chars().count()
            ),
        }
        self.conversation_logger.log(ConversationEvent::new(
            event_types::STREAM_FINISHED,
            serde_json::json!({
                "status": status.as_str(),
                "failure": status.failure(),
                "bytes": bytes_received,
                "text": assistant_text,
            }),
        ));

        self.status = status.clone();
        observer.on_stream_end(&status);
        StreamOutcome {
            status,
            assistant_text,
            bytes_received,
        }
    }
}

fn turn_closed() -> StreamFailure {
    StreamFailure::new(
        FailureKind::Body,
        "assistant turn was closed before the stream ended",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::stream_gateway::{ByteStream, GatewayError};
    use crate::ports::stream_observer::NoStreamObserver;
    use async_trait::async_trait;
    use chatline_domain::{Message, Transcript};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::mpsc;

    type Chunk = Result<Vec<u8>, GatewayError>;

    enum Script {
        Chunks(Vec<Chunk>),
        Fail(GatewayError),
        Channel(mpsc::UnboundedReceiver<Chunk>),
    }

    struct ScriptedGateway {
        script: Mutex<Option<Script>>,
        requests: Mutex<Vec<StreamRequest>>,
    }

    impl ScriptedGateway {
        fn new(script: Script) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(Some(script)),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn chunks(chunks: &[&str]) -> Arc<Self> {
            Self::new(Script::Chunks(
                chunks.iter().map(|c| Ok(c.as_bytes().to_vec())).collect(),
            ))
        }

        fn requests(&self) -> Vec<StreamRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StreamGateway for ScriptedGateway {
        async fn open_stream(&self, request: StreamRequest) -> Result<ByteStream, GatewayError> {
            self.requests.lock().unwrap().push(request);
            let script = self.script.lock().unwrap().take();
            match script.expect("stream opened more than once") {
                Script::Chunks(chunks) => Ok(Box::pin(futures::stream::iter(chunks))),
                Script::Fail(e) => Err(e),
                Script::Channel(rx) => Ok(Box::pin(futures::stream::unfold(
                    rx,
                    |mut rx| async move { rx.recv().await.map(|item| (item, rx)) },
                ))),
            }
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        starts: Mutex<usize>,
        deltas: Mutex<Vec<String>>,
        ends: Mutex<Vec<StreamStatus>>,
    }

    impl StreamObserver for RecordingObserver {
        fn on_stream_start(&self) {
            *self.starts.lock().unwrap() += 1;
        }

        fn on_delta(&self, fragment: &str) {
            self.deltas.lock().unwrap().push(fragment.to_string());
        }

        fn on_stream_end(&self, status: &StreamStatus) {
            self.ends.lock().unwrap().push(status.clone());
        }
    }

    /// Cancels the session as soon as the first fragment is merged.
    struct CancelOnFirstDelta {
        handle: CancelHandle,
        deltas: Mutex<Vec<String>>,
    }

    impl StreamObserver for CancelOnFirstDelta {
        fn on_delta(&self, fragment: &str) {
            self.deltas.lock().unwrap().push(fragment.to_string());
            self.handle.cancel();
        }
    }

    #[derive(Default)]
    struct RecordingLogger {
        events: Mutex<Vec<(&'static str, serde_json::Value)>>,
    }

    impl ConversationLogger for RecordingLogger {
        fn log(&self, event: ConversationEvent) {
            self.events
                .lock()
                .unwrap()
                .push((event.event_type, event.payload));
        }
    }

    async fn wait_for_open_turn(transcript: &SharedTranscript, content: &str) {
        for _ in 0..200 {
            let snapshot = transcript.snapshot().await;
            if snapshot.open_turn().is_some_and(|turn| turn.content == content) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("open turn never reached {:?}", content);
    }

    #[tokio::test]
    async fn test_streams_reply_into_transcript() {
        let gateway = ScriptedGateway::chunks(&["Hi", " there"]);
        let transcript = SharedTranscript::default();
        let observer = RecordingObserver::default();
        let mut session = StreamSession::new(gateway.clone());

        let outcome = session.run(&transcript, "Hello", &observer).await.unwrap();

        assert_eq!(outcome.status, StreamStatus::Completed);
        assert_eq!(outcome.assistant_text, "Hi there");
        assert_eq!(outcome.bytes_received, 8);
        assert_eq!(session.status(), &StreamStatus::Completed);

        let t = transcript.snapshot().await;
        assert_eq!(
            t.messages(),
            &[Message::user("Hello"), Message::assistant("Hi there")]
        );
        assert!(!t.has_open_turn());

        assert_eq!(*observer.starts.lock().unwrap(), 1);
        assert_eq!(*observer.deltas.lock().unwrap(), vec!["Hi", " there"]);
        assert_eq!(*observer.ends.lock().unwrap(), vec![StreamStatus::Completed]);
    }

    #[tokio::test]
    async fn test_request_carries_history_and_new_prompt_only() {
        let gateway = ScriptedGateway::chunks(&["ok"]);
        let transcript = SharedTranscript::new(Transcript::from_messages(vec![
            Message::user("first"),
            Message::assistant("reply"),
        ]));
        let mut session = StreamSession::new(gateway.clone());
        session
            .run(&transcript, "second", &NoStreamObserver)
            .await
            .unwrap();

        let requests = gateway.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].messages,
            vec![
                Message::user("first"),
                Message::assistant("reply"),
                Message::user("second"),
            ]
        );
    }

    #[tokio::test]
    async fn test_merge_order_matches_arrival_order() {
        let text = "The quick brown fox \u{2014} jumps \u{fc}ber \u{1F980} the lazy dog.";
        let bytes = text.as_bytes();
        let sizes = [1, 2, 3, 5, 7];
        let mut chunks = Vec::new();
        let mut pos = 0;
        let mut i = 0;
        while pos < bytes.len() {
            let end = (pos + sizes[i % sizes.len()]).min(bytes.len());
            chunks.push(Ok(bytes[pos..end].to_vec()));
            pos = end;
            i += 1;
        }

        let gateway = ScriptedGateway::new(Script::Chunks(chunks));
        let transcript = SharedTranscript::default();
        let observer = RecordingObserver::default();
        let mut session = StreamSession::new(gateway);
        let outcome = session.run(&transcript, "go", &observer).await.unwrap();

        assert_eq!(outcome.status, StreamStatus::Completed);
        assert_eq!(outcome.assistant_text, text);
        assert_eq!(observer.deltas.lock().unwrap().concat(), text);
        assert_eq!(transcript.snapshot().await.last().unwrap().content, text);
    }

    #[tokio::test]
    async fn test_multibyte_character_split_across_chunks() {
        let gateway = ScriptedGateway::new(Script::Chunks(vec![
            Ok(b"caf\xC3".to_vec()),
            Ok(b"\xA9".to_vec()),
        ]));
        let transcript = SharedTranscript::default();
        let observer = RecordingObserver::default();
        let mut session = StreamSession::new(gateway);
        let outcome = session.run(&transcript, "drink?", &observer).await.unwrap();

        assert_eq!(outcome.assistant_text, "caf\u{e9}");
        assert_eq!(*observer.deltas.lock().unwrap(), vec!["caf", "\u{e9}"]);
    }

    #[tokio::test]
    async fn test_cancel_before_first_chunk_leaves_empty_turn() {
        let gateway = ScriptedGateway::chunks(&["Hi", " there"]);
        let transcript = SharedTranscript::default();
        let mut session = StreamSession::new(gateway.clone());
        session.cancel_handle().cancel();

        let outcome = session
            .run(&transcript, "Hello", &NoStreamObserver)
            .await
            .unwrap();

        assert_eq!(outcome.status, StreamStatus::Cancelled);
        assert_eq!(outcome.assistant_text, "");
        assert!(gateway.requests().is_empty());
        assert_eq!(
            transcript.snapshot().await.messages(),
            &[Message::user("Hello"), Message::assistant("")]
        );
    }

    #[tokio::test]
    async fn test_cancel_after_first_chunk_keeps_partial_reply() {
        let gateway = ScriptedGateway::chunks(&["Hi", " there"]);
        let transcript = SharedTranscript::default();
        let mut session = StreamSession::new(gateway);
        let observer = CancelOnFirstDelta {
            handle: session.cancel_handle(),
            deltas: Mutex::new(Vec::new()),
        };

        let outcome = session.run(&transcript, "Hello", &observer).await.unwrap();

        assert_eq!(outcome.status, StreamStatus::Cancelled);
        assert_eq!(session.status(), &StreamStatus::Cancelled);
        assert_eq!(*observer.deltas.lock().unwrap(), vec!["Hi"]);
        let t = transcript.snapshot().await;
        assert_eq!(
            t.messages(),
            &[Message::user("Hello"), Message::assistant("Hi")]
        );
        assert!(!t.has_open_turn());
    }

    #[tokio::test]
    async fn test_cancel_interrupts_pending_read() {
        let (tx, rx) = mpsc::unbounded_channel();
        let gateway = ScriptedGateway::new(Script::Channel(rx));
        let transcript = SharedTranscript::default();
        let mut session = StreamSession::new(gateway);
        let handle = session.cancel_handle();

        tx.send(Ok(b"Hi".to_vec())).unwrap();
        let canceller = {
            let transcript = transcript.clone();
            tokio::spawn(async move {
                wait_for_open_turn(&transcript, "Hi").await;
                handle.cancel();
            })
        };

        // The sender stays open, so only the cancel can end this stream
        let outcome = session
            .run(&transcript, "Hello", &NoStreamObserver)
            .await
            .unwrap();
        canceller.await.unwrap();

        assert_eq!(outcome.status, StreamStatus::Cancelled);
        assert_eq!(outcome.assistant_text, "Hi");

        // Chunks arriving after the cancel are never merged
        let _ = tx.send(Ok(b" there".to_vec()));
        assert_eq!(transcript.snapshot().await.last().unwrap().content, "Hi");
    }

    #[tokio::test]
    async fn test_http_error_before_body_fails_with_empty_turn() {
        let gateway = ScriptedGateway::new(Script::Fail(GatewayError::Status {
            status: 500,
            body: "Internal Server Error".to_string(),
        }));
        let transcript = SharedTranscript::default();
        let observer = RecordingObserver::default();
        let mut session = StreamSession::new(gateway);

        let outcome = session.run(&transcript, "Hello", &observer).await.unwrap();

        let failure = outcome.status.failure().expect("status should be Failed");
        assert_eq!(failure.kind, FailureKind::HttpStatus(500));
        assert_eq!(
            transcript.snapshot().await.messages(),
            &[Message::user("Hello"), Message::assistant("")]
        );
        assert_eq!(observer.ends.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_mid_stream_keeps_partial_reply() {
        let gateway = ScriptedGateway::new(Script::Chunks(vec![
            Ok(b"Hi".to_vec()),
            Err(GatewayError::Body("connection reset".to_string())),
            Ok(b" never".to_vec()),
        ]));
        let transcript = SharedTranscript::default();
        let mut session = StreamSession::new(gateway);

        let outcome = session
            .run(&transcript, "Hello", &NoStreamObserver)
            .await
            .unwrap();

        assert_eq!(
            outcome.status,
            StreamStatus::Failed(StreamFailure::new(FailureKind::Body, "connection reset"))
        );
        let t = transcript.snapshot().await;
        assert_eq!(t.last().unwrap(), &Message::assistant("Hi"));
        assert!(!t.has_open_turn());
    }

    #[tokio::test]
    async fn test_blank_prompt_is_rejected_without_side_effects() {
        let gateway = ScriptedGateway::chunks(&["never"]);
        let transcript = SharedTranscript::default();
        let mut session = StreamSession::new(gateway.clone());

        let err = session
            .run(&transcript, "   ", &NoStreamObserver)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StreamSessionError::Transcript(DomainError::InvalidInput(_))
        ));
        assert_eq!(session.status(), &StreamStatus::Idle);
        assert!(transcript.snapshot().await.is_empty());
        assert!(gateway.requests().is_empty());
    }

    #[tokio::test]
    async fn test_session_cannot_be_reused() {
        let gateway = ScriptedGateway::chunks(&["Hi"]);
        let transcript = SharedTranscript::default();
        let mut session = StreamSession::new(gateway);
        session
            .run(&transcript, "Hello", &NoStreamObserver)
            .await
            .unwrap();

        let err = session
            .run(&transcript, "Again", &NoStreamObserver)
            .await
            .unwrap_err();
        assert_eq!(err, StreamSessionError::AlreadyStarted("completed"));
        assert_eq!(transcript.snapshot().await.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_start_on_same_transcript_is_rejected() {
        let (tx, rx) = mpsc::unbounded_channel();
        let transcript = SharedTranscript::default();

        let mut first = StreamSession::new(ScriptedGateway::new(Script::Channel(rx)));
        let first_task = {
            let transcript = transcript.clone();
            tokio::spawn(async move { first.run(&transcript, "Hello", &NoStreamObserver).await })
        };

        tx.send(Ok(b"Hi".to_vec())).unwrap();
        wait_for_open_turn(&transcript, "Hi").await;

        let second_gateway = ScriptedGateway::chunks(&["intruder"]);
        let mut second = StreamSession::new(second_gateway.clone());
        let err = second
            .run(&transcript, "Interrupt", &NoStreamObserver)
            .await
            .unwrap_err();
        assert_eq!(err, StreamSessionError::Transcript(DomainError::TurnAlreadyOpen));
        assert_eq!(second.status(), &StreamStatus::Idle);
        assert!(second_gateway.requests().is_empty());

        tx.send(Ok(b" there".to_vec())).unwrap();
        drop(tx);
        let outcome = first_task.await.unwrap().unwrap();

        assert_eq!(outcome.status, StreamStatus::Completed);
        assert_eq!(
            transcript.snapshot().await.messages(),
            &[Message::user("Hello"), Message::assistant("Hi there")]
        );
    }

    #[tokio::test]
    async fn test_conversation_log_records_start_and_finish() {
        let gateway = ScriptedGateway::chunks(&["Hi"]);
        let logger = Arc::new(RecordingLogger::default());
        let transcript = SharedTranscript::default();
        let mut session = StreamSession::new(gateway).with_conversation_logger(logger.clone());

        session
            .run(&transcript, "Hello", &NoStreamObserver)
            .await
            .unwrap();

        let events = logger.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, event_types::STREAM_STARTED);
        assert_eq!(events[0].1["prompt"], "Hello");
        assert_eq!(events[1].0, event_types::STREAM_FINISHED);
        assert_eq!(events[1].1["status"], "completed");
        assert_eq!(events[1].1["text"], "Hi");
        assert!(events[1].1["failure"].is_null());
    }

    #[tokio::test]
    async fn test_cleared_turn_is_not_reached_by_stale_stream() {
        let (tx, rx) = mpsc::unbounded_channel();
        let transcript = SharedTranscript::default();

        let mut first = StreamSession::new(ScriptedGateway::new(Script::Channel(rx)));
        let first_task = {
            let transcript = transcript.clone();
            tokio::spawn(async move { first.run(&transcript, "Hello", &NoStreamObserver).await })
        };

        tx.send(Ok(b"Hi".to_vec())).unwrap();
        wait_for_open_turn(&transcript, "Hi").await;

        // The active chat was deleted, so the caller starts over
        transcript.lock().await.clear();

        let (second_tx, second_rx) = mpsc::unbounded_channel();
        let mut second = StreamSession::new(ScriptedGateway::new(Script::Channel(second_rx)));
        let second_task = {
            let transcript = transcript.clone();
            tokio::spawn(async move { second.run(&transcript, "Other", &NoStreamObserver).await })
        };
        second_tx.send(Ok(b"Fresh".to_vec())).unwrap();
        wait_for_open_turn(&transcript, "Fresh").await;

        tx.send(Ok(b" STALE".to_vec())).unwrap();
        drop(tx);
        let stale = first_task.await.unwrap().unwrap();

        assert_eq!(stale.status.failure().unwrap().kind, FailureKind::Body);
        assert_eq!(stale.assistant_text, "");
        assert_eq!(
            transcript.snapshot().await.open_turn(),
            Some(&Message::assistant("Fresh"))
        );

        drop(second_tx);
        let fresh = second_task.await.unwrap().unwrap();
        assert_eq!(fresh.status, StreamStatus::Completed);
        assert_eq!(fresh.assistant_text, "Fresh");
        let t = transcript.snapshot().await;
        assert_eq!(
            t.messages(),
            &[Message::user("Other"), Message::assistant("Fresh")]
        );
        assert!(!t.has_open_turn());
    }

    #[tokio::test]
    async fn test_stream_ending_after_clear_is_not_completed() {
        let (tx, rx) = mpsc::unbounded_channel();
        let transcript = SharedTranscript::default();
        let mut session = StreamSession::new(ScriptedGateway::new(Script::Channel(rx)));
        let task = {
            let transcript = transcript.clone();
            tokio::spawn(async move { session.run(&transcript, "Hello", &NoStreamObserver).await })
        };

        tx.send(Ok(b"Hi".to_vec())).unwrap();
        wait_for_open_turn(&transcript, "Hi").await;
        transcript.replace(Transcript::new()).await;
        drop(tx);

        let outcome = task.await.unwrap().unwrap();
        assert!(matches!(outcome.status, StreamStatus::Failed(_)));
        assert_eq!(outcome.assistant_text, "");
        assert!(transcript.snapshot().await.is_empty());
    }
}
