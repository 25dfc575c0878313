//! Request dispatcher
//!
//! Routes `tools/call` and `resources/read` requests to their handlers,
//! validates arguments, mutates the todo store, and shapes the response.
//! Every failure is turned into a well-formed result here; nothing below
//! this boundary reaches the transport as an error.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{McpError, Result, StoreError, TodoMcpError};
use crate::mcp::catalog::{Catalog, ResourceKind, ToolDescriptor, ToolKind};
use crate::mcp::envelope;
use crate::mcp::types::{CallToolResult, ReadResourceResult, ResourceContents};
use crate::todo::{TodoList, TodoStore};

#[derive(Debug, Deserialize)]
struct AddTodoArgs {
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompleteTodoArgs {
    #[serde(default)]
    todo_id: Option<String>,
}

/// Dispatcher over a shared todo store
#[derive(Debug, Clone)]
pub struct Dispatcher {
    catalog: Arc<Catalog>,
    store: Arc<TodoStore>,
}

impl Dispatcher {
    /// Create a dispatcher over `catalog` and `store`
    pub fn new(catalog: Arc<Catalog>, store: Arc<TodoStore>) -> Self {
        Self { catalog, store }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &Arc<TodoStore> {
        &self.store
    }

    /// Call a tool by name
    pub async fn call_tool(&self, name: &str, args: Value) -> CallToolResult {
        let Some(tool) = self.catalog.tool(name) else {
            warn!(tool = name, "unknown tool requested");
            return envelope::bare_error(McpError::UnknownTool { name: name.to_string() }.to_string());
        };

        info!(tool = name, "calling tool");

        // Validation, mutation and the snapshot share one write guard, so the
        // response shows exactly the state this call left behind
        let (outcome, snapshot) = self
            .store
            .transact(|list| execute(tool, args, list))
            .await;

        match outcome {
            Ok(message) => envelope::build(message, false, snapshot),
            Err(err) => {
                let message = failure_message(tool, &err);
                debug!(tool = name, error = %err, "tool call failed");
                envelope::build(message, true, snapshot)
            }
        }
    }

    /// Read a resource by URI
    pub fn read_resource(&self, uri: &str) -> ReadResourceResult {
        let Some(resource) = self.catalog.resource(uri) else {
            warn!(uri, "unknown resource requested");
            return ReadResourceResult {
                contents: Vec::new(),
                is_error: true,
                error: Some(McpError::UnknownResource { uri: uri.to_string() }.to_string()),
            };
        };

        match resource.kind {
            ResourceKind::TodoWidget => ReadResourceResult {
                contents: vec![ResourceContents {
                    uri: resource.uri.clone(),
                    mime_type: resource.mime_type.clone(),
                    text: resource.content.to_string(),
                }],
                is_error: false,
                error: None,
            },
        }
    }
}

fn execute(tool: &ToolDescriptor, args: Value, list: &mut TodoList) -> Result<String> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };

    match tool.kind {
        ToolKind::AddTodo => {
            let args: AddTodoArgs = decode_args(args)?;
            let title = required(tool, "title", args.title)?;
            let todo = list.add(&title)?;
            Ok(format!("Added \"{}\".", todo.title))
        }
        ToolKind::CompleteTodo => {
            let args: CompleteTodoArgs = decode_args(args)?;
            let id = required(tool, "todoId", args.todo_id)?;
            let todo = list.complete(&id)?;
            Ok(format!("Completed \"{}\".", todo.title))
        }
    }
}

fn decode_args<T: for<'de> Deserialize<'de>>(args: Value) -> Result<T> {
    serde_json::from_value(args).map_err(|e| {
        TodoMcpError::Mcp(McpError::InvalidArguments {
            message: e.to_string(),
        })
    })
}

/// Trim a required string argument, rejecting it when blank
fn required(tool: &ToolDescriptor, name: &str, value: Option<String>) -> Result<String> {
    let value = value.as_deref().map(str::trim).unwrap_or_default();
    if value.is_empty() {
        let label = tool.field(name).map_or(name, |field| field.label);
        return Err(StoreError::Validation {
            field: label.to_string(),
        }
        .into());
    }
    Ok(value.to_string())
}

fn failure_message(tool: &ToolDescriptor, err: &TodoMcpError) -> String {
    match err {
        TodoMcpError::Store(err @ (StoreError::Validation { .. } | StoreError::NotFound { .. })) => {
            err.to_string()
        }
        TodoMcpError::Mcp(err @ McpError::InvalidArguments { .. }) => err.to_string(),
        other => format!("Tool {} failed: {}", tool.name, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::catalog::TODO_WIDGET_URI;
    use serde_json::json;

    const WIDGET: &str = "<div id=\"todo-root\"></div>";

    fn dispatcher_with(store: TodoStore) -> Dispatcher {
        Dispatcher::new(Arc::new(Catalog::new(Arc::from(WIDGET))), Arc::new(store))
    }

    fn dispatcher() -> Dispatcher {
        dispatcher_with(TodoStore::new())
    }

    #[tokio::test]
    async fn test_add_todo() {
        let dispatcher = dispatcher();
        let result = dispatcher
            .call_tool("add_todo", json!({"title": "  Buy milk "}))
            .await;

        assert!(!result.is_error);
        assert_eq!(result.message(), "Added \"Buy milk\".");

        let structured = result.structured_content.unwrap();
        assert_eq!(structured.message, "Added \"Buy milk\".");
        assert_eq!(structured.tasks.len(), 1);
        assert_eq!(structured.tasks[0].id, "todo-1");
        assert_eq!(structured.tasks[0].title, "Buy milk");
        assert!(!structured.tasks[0].completed);
    }

    #[tokio::test]
    async fn test_add_todo_blank_title() {
        let dispatcher = dispatcher();
        dispatcher.call_tool("add_todo", json!({"title": "Keep"})).await;

        let result = dispatcher.call_tool("add_todo", json!({"title": "   "})).await;

        assert!(result.is_error);
        assert_eq!(result.message(), "Missing title.");
        let structured = result.structured_content.unwrap();
        assert_eq!(structured.tasks, dispatcher.store().snapshot().await);
        assert_eq!(structured.tasks.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_arguments() {
        let dispatcher = dispatcher();

        let result = dispatcher.call_tool("add_todo", Value::Null).await;
        assert!(result.is_error);
        assert_eq!(result.message(), "Missing title.");

        let result = dispatcher.call_tool("complete_todo", json!({})).await;
        assert!(result.is_error);
        assert_eq!(result.message(), "Missing todo id.");
        assert!(result.structured_content.is_some());
    }

    #[tokio::test]
    async fn test_malformed_argument_type() {
        let dispatcher = dispatcher();
        let result = dispatcher.call_tool("add_todo", json!({"title": 42})).await;

        assert!(result.is_error);
        assert!(result.message().starts_with("Invalid arguments:"));
        assert!(result.structured_content.unwrap().tasks.is_empty());
        assert!(dispatcher.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_complete_todo() {
        let dispatcher = dispatcher();
        dispatcher.call_tool("add_todo", json!({"title": "  Buy milk "})).await;

        let result = dispatcher
            .call_tool("complete_todo", json!({"todoId": " todo-1 "}))
            .await;

        assert!(!result.is_error);
        assert_eq!(result.message(), "Completed \"Buy milk\".");
        assert!(result.structured_content.unwrap().tasks[0].completed);
    }

    #[tokio::test]
    async fn test_complete_unknown_todo() {
        let dispatcher = dispatcher();
        dispatcher.call_tool("add_todo", json!({"title": "Buy milk"})).await;
        let before = dispatcher.store().snapshot().await;

        let result = dispatcher
            .call_tool("complete_todo", json!({"todoId": "todo-99"}))
            .await;

        assert!(result.is_error);
        assert_eq!(result.message(), "Todo todo-99 was not found.");
        assert_eq!(result.structured_content.unwrap().tasks, before);
        assert_eq!(dispatcher.store().snapshot().await, before);
    }

    #[tokio::test]
    async fn test_unknown_tool_has_no_structured_content() {
        let dispatcher = dispatcher();
        let result = dispatcher.call_tool("delete_todo", json!({"todoId": "todo-1"})).await;

        assert!(result.is_error);
        assert_eq!(result.message(), "Unknown tool: delete_todo");
        assert!(result.structured_content.is_none());
    }

    #[tokio::test]
    async fn test_internal_failure_is_contained() {
        let dispatcher = dispatcher_with(TodoStore::starting_at(u64::MAX));
        let result = dispatcher.call_tool("add_todo", json!({"title": "One too many"})).await;

        assert!(result.is_error);
        assert!(result.message().starts_with("Tool add_todo failed:"));
        assert!(result.message().contains("identifiers exhausted"));
        assert!(result.structured_content.unwrap().tasks.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_calls_report_their_own_state() {
        let dispatcher = Arc::new(dispatcher());

        let handles: Vec<_> = (0..300)
            .map(|i| {
                let dispatcher = dispatcher.clone();
                tokio::spawn(async move {
                    let (name, args) = if i % 3 == 0 {
                        ("complete_todo", json!({"todoId": "todo-100000"}))
                    } else {
                        ("add_todo", json!({"title": format!("task {}", i)}))
                    };
                    (i, dispatcher.call_tool(name, args).await)
                })
            })
            .collect();

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }

        let final_tasks = dispatcher.store().snapshot().await;
        assert_eq!(final_tasks.len(), 200);

        for (i, result) in results {
            let tasks = &result.structured_content.as_ref().unwrap().tasks;

            // Only adds mutate here, so any state a call could observe is a
            // prefix of the final list
            assert_eq!(tasks[..], final_tasks[..tasks.len()]);

            if i % 3 == 0 {
                assert!(result.is_error);
                assert_eq!(result.message(), "Todo todo-100000 was not found.");
            } else {
                assert!(!result.is_error);
                let own = tasks.last().unwrap();
                assert_eq!(own.title, format!("task {}", i));
                let n: usize = own.id.strip_prefix("todo-").unwrap().parse().unwrap();
                assert_eq!(tasks.len(), n);
            }
        }
    }

    #[test]
    fn test_read_widget() {
        let dispatcher = dispatcher();
        let result = dispatcher.read_resource(TODO_WIDGET_URI);

        assert!(!result.is_error);
        assert_eq!(result.contents.len(), 1);
        assert_eq!(result.contents[0].uri, TODO_WIDGET_URI);
        assert_eq!(result.contents[0].mime_type, "text/html+skybridge");
        assert_eq!(result.contents[0].text, WIDGET);
    }

    #[test]
    fn test_read_unknown_resource() {
        let dispatcher = dispatcher();
        let result = dispatcher.read_resource("ui://widget/missing.html");

        assert!(result.is_error);
        assert!(result.contents.is_empty());
        assert_eq!(
            result.error.as_deref(),
            Some("Unknown resource: ui://widget/missing.html")
        );
    }
}
