//! Streaming generation for the coach.
//!
//! - [`bridge`]: runs a blocking fragment producer on a dedicated worker and
//!   exposes it as an ordered, bounded, cancellable [`FragmentStream`].
//! - [`generation`]: the generation capability and [`generate`], which wraps
//!   one blocking chat call in the bridge.
//! - [`prompt`]: chat messages and the RAG prompt layout.
//! - [`providers`]: capability implementations backed by `ai-llm-service`.

pub mod bridge;
mod config;
mod errors;
pub mod generation;
pub mod prompt;
pub mod providers;

pub use bridge::{FragmentStream, bridge};
pub use config::StreamConfig;
pub use errors::StreamError;
pub use generation::{FragmentIter, GenerationProvider, generate};
pub use prompt::{ChatMessage, PromptTemplate, Role, build_rag_messages, metrics_message};
