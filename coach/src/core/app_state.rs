use std::sync::Arc;

use ai_llm_service::{OpenAiService, config_from_env};
use coach_stream::{GenerationProvider, StreamConfig, providers::openai::OpenAiGenerator};
use pose_metrics::PoseConfig;
use tip_store::{EmbeddingsProvider, RetrievalConfig, RetrievalService, embed::openai::OpenAiEmbedder};
use tracing::info;

use crate::coach::Coach;
use crate::error_handler::CoachResult;

/// Shared state for every coaching entry point.
#[derive(Clone)]
pub struct AppState {
    pub coach: Arc<Coach>,
}

impl AppState {
    /// Loads every config section from the environment, connects the
    /// OpenAI-compatible provider and embeds the tip corpus.
    ///
    /// The HTTP client and the corpus embedding are blocking, so the whole
    /// setup runs on the blocking pool.
    pub async fn from_env() -> CoachResult<Self> {
        let llm_cfg = config_from_env()?;
        let retrieval_cfg = RetrievalConfig::from_env()?;
        let pose_cfg = PoseConfig::from_env()?;
        let stream_cfg = StreamConfig::from_env()?;

        info!(
            provider = ?llm_cfg.provider,
            chat_model = %llm_cfg.chat_model,
            embedding_model = %llm_cfg.embedding_model,
            top_k = retrieval_cfg.top_k,
            embedding_dim = ?retrieval_cfg.embedding_dim,
            stride = pose_cfg.sample_stride,
            buffer = stream_cfg.buffer_capacity,
            "loading coach"
        );

        let coach = tokio::task::spawn_blocking(move || -> CoachResult<Coach> {
            let svc = Arc::new(OpenAiService::new(llm_cfg)?);
            let embedder: Arc<dyn EmbeddingsProvider> = Arc::new(OpenAiEmbedder::new(
                Arc::clone(&svc),
                retrieval_cfg.embedding_dim,
            ));
            let generator: Arc<dyn GenerationProvider> = Arc::new(OpenAiGenerator::new(svc));

            let retrieval = RetrievalService::bootstrap(retrieval_cfg, embedder)?;
            Ok(Coach::new(
                Arc::new(retrieval),
                generator,
                pose_cfg,
                stream_cfg,
            ))
        })
        .await??;

        Ok(Self {
            coach: Arc::new(coach),
        })
    }
}
