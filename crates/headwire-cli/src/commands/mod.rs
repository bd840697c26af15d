pub mod cleanup;
pub mod daemon;
pub mod feeds;
pub mod fetch;
pub mod list;
