//! Authentication Module
//!
//! This module handles user registration, login, profiles and session tokens.
//!
//! # Architecture
//!
//! - **`users`** - User data model and database operations
//! - **`sessions`** - JWT token generation and validation (`TokenService`)
//! - **`password`** - bcrypt hashing on the blocking pool
//! - **`handlers`** - HTTP handlers for the auth and profile endpoints
//!
//! # Authentication Flow
//!
//! 1. **Register**: name, email and password → user created → JWT token returned
//! 2. **Login**: email and password → credentials verified → JWT token returned
//! 3. **Protected routes**: `Authorization: Bearer <token>` checked by `auth_middleware`
//! 4. **Live channel**: the same token is presented in the `join` frame
//!
//! # Security
//!
//! - Passwords are hashed using bcrypt before storage
//! - Tokens expire after the configured TTL (one day by default)
//! - Invalid credentials return 401 (no information leakage)

/// User data model and database operations
pub mod users;

/// JWT token generation and validation
pub mod sessions;

/// Password hashing
pub mod password;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use handlers::{get_profile, login, register, update_profile};
pub use sessions::{Claims, TokenService};
