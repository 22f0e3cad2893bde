//! Per-request processing context.

use crate::auth::Subject;

use super::matcher::PathParams;
use super::table::Operation;

/// Values the dispatcher hands to the matched operation.
///
/// Built fresh for every request and dropped with it. `subject` is only ever
/// set by the auth gate.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: String,
    operation: Operation,
    params: PathParams,
    subject: Option<Subject>,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>, operation: Operation, params: PathParams) -> Self {
        Self {
            request_id: request_id.into(),
            operation,
            params,
            subject: None,
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Captured path variables (`id`, `imageId`, ...).
    pub fn params(&self) -> &PathParams {
        &self.params
    }

    /// The authenticated caller. Always `Some` inside a private operation.
    pub fn subject(&self) -> Option<&Subject> {
        self.subject.as_ref()
    }

    pub(crate) fn bind_subject(&mut self, subject: Subject) {
        self.subject = Some(subject);
    }
}
