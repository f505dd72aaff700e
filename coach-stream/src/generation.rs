//! Generation capability and its bridged entry point.

use std::sync::Arc;

use tracing::debug;

use crate::bridge::{FragmentStream, bridge};
use crate::errors::StreamError;
use crate::prompt::ChatMessage;

/// Blocking iterator of text fragments from one generation call.
pub type FragmentIter = Box<dyn Iterator<Item = Result<String, StreamError>> + Send>;

/// Streaming chat completion. Implementations may block (network I/O);
/// callers run them through [`generate`].
pub trait GenerationProvider: Send + Sync {
    /// Opens a completion over `messages` and returns its fragments in order.
    fn stream_chat(&self, messages: &[ChatMessage]) -> Result<FragmentIter, StreamError>;
}

/// Runs one generation call on a dedicated worker and streams its fragments.
///
/// # Errors
/// Only bridge setup errors; generation failures arrive through the stream.
pub fn generate(
    provider: Arc<dyn GenerationProvider>,
    messages: Vec<ChatMessage>,
    capacity: usize,
) -> Result<FragmentStream, StreamError> {
    debug!(messages = messages.len(), capacity, "starting generation");
    bridge(capacity, move || provider.stream_chat(&messages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    /// Echoes the last message word by word, with a space fragment between.
    struct Echo;

    impl GenerationProvider for Echo {
        fn stream_chat(&self, messages: &[ChatMessage]) -> Result<FragmentIter, StreamError> {
            let last = messages
                .last()
                .map(|m| m.content.clone())
                .ok_or_else(|| StreamError::Generation("no messages".into()))?;
            let parts: Vec<Result<String, StreamError>> = last
                .split(' ')
                .flat_map(|w| [Ok(w.to_string()), Ok(" ".to_string())])
                .collect();
            Ok(Box::new(parts.into_iter()))
        }
    }

    #[tokio::test]
    async fn concatenated_fragments_reproduce_the_reply() {
        let s = generate(Arc::new(Echo), vec![ChatMessage::user("knees out chest up")], 2).unwrap();
        let text: Vec<String> = s.map(|r| r.unwrap()).collect().await;
        assert_eq!(text.concat(), "knees out chest up ");
    }

    #[tokio::test]
    async fn start_failure_is_streamed() {
        let mut s = generate(Arc::new(Echo), Vec::new(), 4).unwrap();
        assert!(matches!(s.next().await, Some(Err(StreamError::Generation(_)))));
        assert!(s.next().await.is_none());
    }
}
