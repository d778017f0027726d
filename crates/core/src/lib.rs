pub mod application;
pub mod domain;
pub mod error;
pub mod media;
pub mod ports;
pub mod senders;
pub mod timestamp;
