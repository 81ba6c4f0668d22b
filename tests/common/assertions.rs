//! Custom assertion macros
//!
//! Every failure response carries `{"error": "...", "status": <code>}`.

/// Assert an error response: status code plus a matching JSON body
#[macro_export]
macro_rules! assert_error_response {
    ($response:expr, $status:expr) => {{
        let (status, body) = $response;
        assert_eq!(status, $status, "unexpected status, body: {}", body);
        assert_eq!(body["status"], serde_json::json!($status.as_u16()));
        assert!(body["error"].is_string(), "missing error message: {}", body);
        body
    }};
}

/// Pop the next queued event, which must be a delivered message
#[macro_export]
macro_rules! expect_message {
    ($rx:expr) => {
        match $rx.try_recv() {
            Ok(duochat::shared::ServerEvent::Message(message)) => message,
            other => panic!("expected a message event, got {:?}", other),
        }
    };
}
