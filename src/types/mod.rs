//! 类型系统模块：定义请求指纹所依赖的核心数据类型。
//!
//! # Types Module
//!
//! This module defines the core type system for the admission gate,
//! providing strongly-typed representations of the request payload that
//! cache fingerprints are derived from.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Message`] | Chat message with role and content |
//! | [`MessageRole`] | Message role (system, user, assistant) |
//!
//! ## Example
//!
//! ```rust
//! use ai_gate::types::{Message, MessageRole};
//!
//! let system = Message::system("You are a helpful assistant");
//! let user = Message::user("What's the weather?");
//! assert!(matches!(user.role, MessageRole::User));
//! ```

pub mod message;

pub use message::{Message, MessageRole};
