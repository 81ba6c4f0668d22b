/**
 * API Route Configuration
 *
 * # Routes
 *
 * ## Public
 * - `POST /api/register` - Create an account, returns a token
 * - `POST /api/login` - Exchange credentials for a token
 *
 * ## Authenticated (`Authorization: Bearer <token>`)
 * - `GET /api/users?search=` - Search users by name
 * - `GET|POST /api/friends` - List or add friends
 * - `GET|POST /api/profile` - Read or update the caller's profile
 * - `GET|POST /api/conversations` - List or start conversations
 * - `GET /api/messages?friendId=` - History with one friend
 * - `POST /api/messages` - Send a message
 * - `PATCH /api/messages/read` - Mark messages read
 * - `GET /api/unread-messages` - Unread messages addressed to the caller
 */

use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};

use crate::backend::auth::{get_profile, login, register, update_profile};
use crate::backend::messaging::{
    add_friend, get_conversations, get_friends, get_messages, get_unread_messages,
    mark_messages_read, search_users, send_message, start_conversation,
};
use crate::backend::middleware::auth_middleware;
use crate::backend::server::state::AppState;

/// Add the `/api` routes to `router`
///
/// The auth middleware is applied with `route_layer`, so it only runs for
/// matched protected routes and unknown paths still reach the fallback.
pub fn configure_api_routes(router: Router<AppState>, state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/api/users", get(search_users))
        .route("/api/friends", get(get_friends).post(add_friend))
        .route("/api/profile", get(get_profile).post(update_profile))
        .route(
            "/api/conversations",
            get(get_conversations).post(start_conversation),
        )
        .route("/api/messages", get(get_messages).post(send_message))
        .route("/api/messages/read", patch(mark_messages_read))
        .route("/api/unread-messages", get(get_unread_messages))
        .route_layer(from_fn_with_state(state, auth_middleware));

    router
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .merge(protected)
}
