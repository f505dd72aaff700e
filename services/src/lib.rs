pub mod conversations;
pub mod uuid;

pub use conversations::ConversationStore;
pub use self::uuid::{new_session_id, stable_uuid};
