//! # stats_net
//!
//! NATS transport layer for the stats engine.
//!
//! This crate provides:
//!
//! - [`subjects`]: the subject layout under a configurable prefix.
//! - [`messages`]: payloads exchanged with the game and its clients.
//! - [`codec`]: MessagePack encoding and decoding helpers.
//! - [`connection`]: NATS connection management.
//! - [`error`]: network-layer error types.

pub mod codec;
pub mod connection;
pub mod error;
pub mod messages;
pub mod subjects;

pub use codec::{decode, encode};
pub use connection::NatsConnection;
pub use error::NetError;
pub use subjects::{QueryOp, Subjects};
