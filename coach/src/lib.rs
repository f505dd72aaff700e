//! Coaching flows: chat with retrieved tips and feedback on squat videos.
//!
//! A [`Coach`] is built once (see [`core::app_state::AppState::from_env`]) and
//! shared behind an `Arc`. Every flow returns a [`FragmentStream`] of reply
//! text as the model produces it.

mod coach;
pub mod core;
mod error_handler;

pub use coach::{Coach, SquatFeedback};
pub use coach_stream::{ChatMessage, FragmentStream, Role};
pub use error_handler::{CoachError, CoachResult};
pub use pose_metrics::SquatMetrics;
