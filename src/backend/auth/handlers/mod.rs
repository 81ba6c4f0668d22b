//! Authentication Handlers Module
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs       - Module exports and documentation
//! ├── types.rs     - Request and response types
//! ├── register.rs  - User registration handler
//! ├── login.rs     - User authentication handler
//! └── me.rs        - Profile read/update handlers
//! ```
//!
//! # Handlers
//!
//! - **`register`** - POST /api/register
//! - **`login`** - POST /api/login
//! - **`get_profile`** - GET /api/profile
//! - **`update_profile`** - POST /api/profile

/// Request and response types
pub mod types;

/// Register handler
pub mod register;

/// Login handler
pub mod login;

/// Profile handlers
pub mod me;

pub use types::{AuthResponse, LoginRequest, RegisterRequest};

pub use login::login;
pub use me::{get_profile, update_profile};
pub use register::register;
