pub mod config;
pub mod diff;
pub mod error;
pub mod init;
pub mod report;
pub mod source;
pub mod store;
pub mod tracker;
