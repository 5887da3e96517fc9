pub mod api;
pub mod config;
pub mod session;
pub mod storage;
pub mod store;
pub mod types;

#[cfg(feature = "ui")]
pub mod theme;
#[cfg(feature = "ui")]
pub mod ui;
#[cfg(feature = "ui")]
pub mod views;
