use std::fmt;

/// Request id used when the host does not supply one.
pub const UNKNOWN_REQUEST: &str = "-";

/// A request-scoped logging interface.
///
/// `RequestLog` wraps the `tracing` macros so every event emitted while a
/// request is filtered carries the same `request_id` field. It borrows the
/// id from the request, so it cannot outlive it.
///
/// Messages passed here must not contain parameter values. Rule failures are
/// logged by rule, parameter and path only.
#[derive(Debug, Clone, Copy)]
pub struct RequestLog<'a> {
    request_id: &'a str,
}

impl<'a> RequestLog<'a> {
    /// Creates a log for `request_id`, falling back to [`UNKNOWN_REQUEST`].
    pub fn new(request_id: Option<&'a str>) -> Self {
        Self {
            request_id: request_id.unwrap_or(UNKNOWN_REQUEST),
        }
    }

    /// Returns the request ID associated with this logger.
    pub fn request_id(&self) -> &str {
        self.request_id
    }

    /// Logs an info-level message with request ID.
    ///
    /// Use with `format_args!`:
    /// ```
    /// # use param_guard::RequestLog;
    /// let log = RequestLog::new(Some("req-7"));
    /// log.info(format_args!("parameter `{}` rewritten by `{}`", "q", "trim"));
    /// ```
    pub fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(request_id = %self.request_id, "{}", args);
    }

    /// Logs a warning-level message with request ID.
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(request_id = %self.request_id, "{}", args);
    }

    /// Logs an error-level message with request ID.
    pub fn error(&self, args: fmt::Arguments<'_>) {
        tracing::error!(request_id = %self.request_id, "{}", args);
    }

    /// Logs a debug-level message with request ID.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(request_id = %self.request_id, "{}", args);
    }
}

impl Default for RequestLog<'_> {
    fn default() -> Self {
        Self::new(None)
    }
}
