pub mod account;
pub mod chat;
pub mod policies;
pub mod shared;

pub use account::AccountView;
pub use chat::ChatView;
pub use policies::PoliciesView;
