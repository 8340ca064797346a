pub mod config;
pub mod janitor;
pub mod lifecycle;
pub mod sessions;
pub mod state;
pub mod store;
