//! Messaging Module
//!
//! This module handles friends, user search, conversations and messages.
//!
//! - **`db`** - SQL for friendships, conversations and messages
//! - **`handlers`** - conversation and message REST handlers
//! - **`friends`** - friend list and user search handlers

pub mod db;
pub mod friends;
pub mod handlers;

pub use friends::*;
pub use handlers::*;
