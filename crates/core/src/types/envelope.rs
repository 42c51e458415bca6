//! The uniform `{status, message, data}` response envelope.
//!
//! Every API endpoint, success or failure, answers with this wrapper. The
//! `status` string and the HTTP status code always agree; clients may key off
//! either.

use serde::{Deserialize, Serialize};

/// Outcome marker carried in every response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    /// The request was handled and `data` (if any) is meaningful.
    Success,
    /// The request was rejected or an internal error occurred.
    Failure,
}

/// Pagination context attached to collection responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContext {
    /// 1-based page number that was served.
    pub page: i64,
    /// `ceil(total_count / page_size)` - computed even when zero rows match.
    pub total_pages: i64,
    /// The keyword filter that was applied, empty when unfiltered.
    pub applied_filter: String,
}

/// The response wrapper every endpoint speaks.
///
/// `data` is omitted from the JSON when absent (errors without a payload),
/// as are `page_context` and `error_summary`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Success/failure marker, mirroring the HTTP status code.
    pub status: ResponseStatus,
    /// Human-readable outcome description.
    pub message: String,
    /// Response payload, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Pagination context for collection endpoints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_context: Option<PageContext>,
    /// Generic summary for unanticipated internal failures. Never carries
    /// stack traces or secrets.
    #[serde(rename = "errorSummary", skip_serializing_if = "Option::is_none")]
    pub error_summary: Option<String>,
}

impl<T> Envelope<T> {
    /// A success envelope with a payload.
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: message.into(),
            data: Some(data),
            page_context: None,
            error_summary: None,
        }
    }

    /// Attach pagination context to a success envelope.
    #[must_use]
    pub fn with_page_context(mut self, page_context: PageContext) -> Self {
        self.page_context = Some(page_context);
        self
    }
}

impl Envelope<()> {
    /// A success envelope with no payload (deletions and the like).
    pub fn success_empty(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: message.into(),
            data: None,
            page_context: None,
            error_summary: None,
        }
    }

    /// A failure envelope with no payload.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Failure,
            message: message.into(),
            data: None,
            page_context: None,
            error_summary: None,
        }
    }

    /// A failure envelope for an unanticipated internal error.
    ///
    /// The summary must already be scrubbed of internals; callers pass a
    /// generic description, never the source error's `Display` output.
    pub fn internal_failure(message: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Failure,
            message: message.into(),
            data: None,
            page_context: None,
            error_summary: Some(summary.into()),
        }
    }
}

impl PageContext {
    /// Compute the context for a page of results.
    ///
    /// `total_pages` is `ceil(total_count / page_size)`, zero when nothing
    /// matches. `page_size` must be positive.
    #[must_use]
    pub fn new(page: i64, total_count: i64, page_size: i64, applied_filter: &str) -> Self {
        // i64::div_ceil is not stable yet; both operands are non-negative.
        #[allow(clippy::manual_div_ceil)]
        let total_pages = (total_count + page_size - 1) / page_size;
        Self {
            page,
            total_pages,
            applied_filter: applied_filter.to_owned(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_shape() {
        let envelope = Envelope::success("Products Fetched Successfully", vec![1, 2, 3]);
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["message"], "Products Fetched Successfully");
        assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
        assert!(json.get("page_context").is_none());
        assert!(json.get("errorSummary").is_none());
    }

    #[test]
    fn test_success_empty_omits_data() {
        let envelope = Envelope::success_empty("Product Removed Successfully");
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["status"], "success");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_failure_envelope_omits_data() {
        let envelope = Envelope::failure("Order Not Found");
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["status"], "failure");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_internal_failure_carries_summary() {
        let envelope =
            Envelope::internal_failure("Unable to get products due to internal error", "store unavailable");
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["errorSummary"], "store unavailable");
    }

    #[test]
    fn test_page_context_rounds_up() {
        assert_eq!(PageContext::new(1, 25, 10, "").total_pages, 3);
        assert_eq!(PageContext::new(1, 30, 10, "").total_pages, 3);
        assert_eq!(PageContext::new(1, 1, 10, "").total_pages, 1);
    }

    #[test]
    fn test_page_context_zero_matches() {
        let ctx = PageContext::new(2, 0, 10, "nothing");
        assert_eq!(ctx.total_pages, 0);
        assert_eq!(ctx.applied_filter, "nothing");
    }

    #[test]
    fn test_with_page_context() {
        let envelope = Envelope::success("ok", ()).with_page_context(PageContext::new(2, 11, 10, "phone"));
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["page_context"]["page"], 2);
        assert_eq!(json["page_context"]["total_pages"], 2);
        assert_eq!(json["page_context"]["applied_filter"], "phone");
    }
}
