pub mod brief;
pub mod credential;
pub mod events;
pub mod image;
pub mod inflight;
pub mod models;
pub mod outline;
