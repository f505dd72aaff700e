use std::sync::Arc;

use coach_stream::{
    ChatMessage, FragmentStream, GenerationProvider, PromptTemplate, Role, StreamConfig,
    build_rag_messages, generate, metrics_message,
};
use pose_metrics::{FrameSource, LandmarkDetector, PoseAnalyzer, PoseConfig, SquatMetrics};
use services::{ConversationStore, new_session_id};
use tip_store::{RetrievalService, ScoredTip};
use tracing::{debug, info, warn};

use crate::error_handler::{CoachError, CoachResult};

/// Metrics measured from a video plus the streamed feedback on them.
pub struct SquatFeedback {
    pub metrics: SquatMetrics,
    pub fragments: FragmentStream,
}

/// Shared coaching service. Cheap to call concurrently; build once.
pub struct Coach {
    retrieval: Arc<RetrievalService>,
    generator: Arc<dyn GenerationProvider>,
    conversations: ConversationStore,
    pose_cfg: PoseConfig,
    stream_cfg: StreamConfig,
}

impl Coach {
    pub fn new(
        retrieval: Arc<RetrievalService>,
        generator: Arc<dyn GenerationProvider>,
        pose_cfg: PoseConfig,
        stream_cfg: StreamConfig,
    ) -> Self {
        Self {
            retrieval,
            generator,
            conversations: ConversationStore::new(),
            pose_cfg,
            stream_cfg,
        }
    }

    pub fn retrieval(&self) -> &RetrievalService {
        &self.retrieval
    }

    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    /// Opens a new chat session and returns its id.
    pub fn start_session(&self) -> String {
        new_session_id()
    }

    /// Answers the latest user message of `session`.
    ///
    /// User messages from `incoming` are appended to the session first. Tips
    /// at or above the similarity threshold are injected into the prompt; when
    /// none qualify the model sees the conversation alone.
    pub async fn chat_turn(
        &self,
        session: &str,
        incoming: &[ChatMessage],
    ) -> CoachResult<FragmentStream> {
        let history = self
            .conversations
            .append_user_messages(session, incoming)
            .await;

        let query = history
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .ok_or(CoachError::EmptyConversation)?;

        let retrieval = Arc::clone(&self.retrieval);
        let tips = tokio::task::spawn_blocking(move || retrieval.relevant_tips(&query)).await??;

        info!(
            session,
            turns = history.len(),
            tips = tips.len(),
            "chat turn"
        );

        let messages = build_rag_messages(&history, &tip_texts(&tips), &PromptTemplate::chat());
        self.stream(messages)
    }

    /// Measures a squat video and streams feedback on it.
    ///
    /// Analysis runs on the blocking pool; `source` is released there on
    /// every path.
    pub async fn squat_feedback<S, D>(&self, source: S, detector: D) -> CoachResult<SquatFeedback>
    where
        S: FrameSource + Send + 'static,
        D: LandmarkDetector<S::Frame> + Send + 'static,
    {
        let cfg = self.pose_cfg.clone();
        let metrics = tokio::task::spawn_blocking(move || {
            let mut analyzer = PoseAnalyzer::new(detector, cfg)?;
            analyzer.analyze(source)
        })
        .await??;

        let Some(metrics) = metrics else {
            warn!("squat feedback: no pose found in sampled frames");
            return Err(CoachError::NoSquatDetected);
        };

        let fragments = self.metrics_feedback(metrics).await?;
        Ok(SquatFeedback { metrics, fragments })
    }

    /// Streams feedback on already measured angles.
    ///
    /// Tips come from distance ranking with no threshold.
    pub async fn metrics_feedback(&self, metrics: SquatMetrics) -> CoachResult<FragmentStream> {
        let retrieval = Arc::clone(&self.retrieval);
        let top_k = retrieval.config().top_k;
        let tips =
            tokio::task::spawn_blocking(move || retrieval.retrieve_by_metrics(&metrics, top_k))
                .await??;

        info!(
            knee = metrics.knee_angle,
            trunk = metrics.trunk_angle,
            tips = tips.len(),
            "metrics feedback"
        );

        let messages = build_rag_messages(
            &[metrics_message(metrics.knee_angle, metrics.trunk_angle)],
            &tip_texts(&tips),
            &PromptTemplate::squat_feedback(),
        );
        self.stream(messages)
    }

    fn stream(&self, messages: Vec<ChatMessage>) -> CoachResult<FragmentStream> {
        debug!(messages = messages.len(), "handing prompt to generator");
        Ok(generate(
            Arc::clone(&self.generator),
            messages,
            self.stream_cfg.buffer_capacity,
        )?)
    }
}

fn tip_texts(tips: &[ScoredTip]) -> Vec<&str> {
    tips.iter().map(ScoredTip::text).collect()
}
