pub mod backend;
pub mod guest;

pub use backend::{ConversationBackend, GuestConversations, RemoteConversations, backend_for};
pub use guest::{DEFAULT_TITLE, GuestConversationStore};
