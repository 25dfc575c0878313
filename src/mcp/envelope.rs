//! Tool response envelopes
//!
//! Every tool call answers with the same dual-channel shape: a text block for
//! the model and `structuredContent` for the widget.

use crate::mcp::types::{CallToolResult, StructuredContent, ToolResultContent};
use crate::todo::Todo;

/// Build a tool response carrying `message` and the todo `snapshot`
///
/// The snapshot is attached whether or not `is_error` is set, so a widget
/// reading only structured content always sees the current list.
pub fn build(message: impl Into<String>, is_error: bool, snapshot: Vec<Todo>) -> CallToolResult {
    let message = message.into();

    CallToolResult {
        content: vec![ToolResultContent::Text {
            text: message.clone(),
        }],
        structured_content: Some(StructuredContent {
            tasks: snapshot,
            message,
        }),
        is_error,
    }
}

/// Error response without structured content
///
/// Used when the request never reached a known tool, so there is no state to
/// report.
pub fn bare_error(message: impl Into<String>) -> CallToolResult {
    CallToolResult {
        content: vec![ToolResultContent::Text {
            text: message.into(),
        }],
        structured_content: None,
        is_error: true,
    }
}
