//! Storage traits for clients, authorization codes and tokens.
//!
//! Each entity gets a narrow get/save/delete contract. `delete` returns the
//! removed record, which doubles as the atomic consume primitive for
//! single-use authorization codes.
//!
//! # Implementations
//!
//! - [`memory`] - in-memory reference stores, the provider default
//!
//! Durable backends implement the same traits. A backend that cannot remove
//! and return a record in one step cannot guarantee single-use codes.

pub mod client;
pub mod code;
pub mod memory;
pub mod token;

pub use client::ClientStore;
pub use code::AuthorizationCodeStore;
pub use memory::{MemoryClientStore, MemoryCodeStore, MemoryTokenStore};
pub use token::TokenStore;
