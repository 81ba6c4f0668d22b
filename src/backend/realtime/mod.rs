//! Real-time Delivery Module
//!
//! Live WebSocket connections, the registry that maps users to them, and the
//! dispatcher that persists messages before fanning them out.
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs        - Module exports and documentation
//! ├── registry.rs   - ConnectionRegistry: user -> live connections
//! ├── broadcast.rs  - Fan-out of one event to a set of users
//! ├── dispatch.rs   - Dispatcher and per-conversation locks
//! ├── session.rs    - Per-connection Unjoined/Joined/Closed state machine
//! └── socket.rs     - WebSocket upgrade and connection actor
//! ```
//!
//! # Flow
//!
//! 1. Client opens `GET /ws`; the actor creates a `Session` in `Unjoined`
//! 2. `{"type":"join"}` binds the connection to a user in the registry
//! 3. `{"type":"message"}` goes through `Dispatcher::dispatch`, which stores
//!    the message and pushes it to every connection of both participants
//! 4. On any termination the session unregisters the connection
//!
//! # Delivery Guarantees
//!
//! Live delivery is best effort. History (`GET /api/messages`) and the unread
//! poll (`GET /api/unread-messages`) are the source of truth for anything a
//! client missed while offline.

/// Connection registry
pub mod registry;

/// Event fan-out
pub mod broadcast;

/// Message dispatcher
pub mod dispatch;

/// Session state machine
pub mod session;

/// WebSocket actor
pub mod socket;

pub use broadcast::deliver_to_users;
pub use dispatch::{ConversationLocks, DispatchOutcome, Dispatcher};
pub use registry::{ConnectionHandle, ConnectionId, ConnectionRegistry};
pub use session::{Session, SessionContext, SessionError, SessionState};
pub use socket::ws_upgrade;
