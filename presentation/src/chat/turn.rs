//! One streamed turn with Ctrl-C wired to cancellation.

use chatline_application::{
    ConversationLogger, NoConversationLogger, SharedTranscript, StreamGateway, StreamObserver,
    StreamOutcome, StreamSession, StreamSessionError,
};
use std::sync::Arc;
use tracing::debug;

/// Builds a fresh [`StreamSession`] for every prompt.
pub struct TurnRunner {
    gateway: Arc<dyn StreamGateway>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl TurnRunner {
    pub fn new(gateway: Arc<dyn StreamGateway>) -> Self {
        Self {
            gateway,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    /// Stream the reply to `prompt`. Ctrl-C cancels this turn only.
    pub async fn run(
        &self,
        transcript: &SharedTranscript,
        prompt: &str,
        observer: &dyn StreamObserver,
    ) -> Result<StreamOutcome, StreamSessionError> {
        let ctrl_c = async {
            // Without a signal handler the turn can only end on its own
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        };
        self.run_with_interrupt(transcript, prompt, observer, ctrl_c)
            .await
    }

    /// Like [`TurnRunner::run`], cancelling when `interrupt` resolves.
    ///
    /// The interrupt is dropped with the turn, so it never reaches a later
    /// one.
    pub async fn run_with_interrupt<F>(
        &self,
        transcript: &SharedTranscript,
        prompt: &str,
        observer: &dyn StreamObserver,
        interrupt: F,
    ) -> Result<StreamOutcome, StreamSessionError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut session = StreamSession::new(self.gateway.clone())
            .with_conversation_logger(self.conversation_logger.clone());

        let handle = session.cancel_handle();
        let watcher = tokio::spawn(async move {
            interrupt.await;
            debug!("Interrupt received, cancelling stream");
            handle.cancel();
        });

        let result = session.run(transcript, prompt, observer).await;
        watcher.abort();
        result
    }
}
