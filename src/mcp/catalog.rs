//! Tool and resource catalog
//!
//! Static descriptions of everything a client can discover. Built once at
//! startup and never mutated; each descriptor carries the tagged variant the
//! dispatcher routes on.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

/// URI of the todo widget resource
pub const TODO_WIDGET_URI: &str = "ui://widget/todo.html";

/// MIME type the Apps SDK expects for widget markup
pub const WIDGET_MIME_TYPE: &str = "text/html+skybridge";

/// Dispatch tag for a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    AddTodo,
    CompleteTodo,
}

/// Dispatch tag for a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    TodoWidget,
}

/// A string argument declared in a tool's input schema
#[derive(Debug, Clone)]
pub struct ToolField {
    /// Property name on the wire
    pub name: &'static str,

    /// Name used in validation messages
    pub label: &'static str,

    pub required: bool,

    pub description: &'static str,
}

/// Tool definition
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Tool name
    pub name: String,

    /// Human-readable title
    pub title: String,

    /// Tool description
    pub description: String,

    /// Input schema (JSON Schema)
    pub input_schema: Value,

    /// Display metadata
    #[serde(rename = "_meta")]
    pub meta: Value,

    #[serde(skip)]
    pub kind: ToolKind,

    #[serde(skip)]
    pub fields: Vec<ToolField>,
}

impl ToolDescriptor {
    fn new(
        kind: ToolKind,
        name: &str,
        title: &str,
        description: &str,
        fields: Vec<ToolField>,
        invoking: &str,
        invoked: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            input_schema: input_schema(&fields),
            meta: json!({
                "openai/outputTemplate": TODO_WIDGET_URI,
                "openai/toolInvocation/invoking": invoking,
                "openai/toolInvocation/invoked": invoked,
                "openai/widgetAccessible": true,
            }),
            kind,
            fields,
        }
    }

    /// Look up a declared field by wire name
    pub fn field(&self, name: &str) -> Option<&ToolField> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Resource definition
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    /// Resource URI
    pub uri: String,

    /// Resource name
    pub name: String,

    /// Human-readable title
    pub title: String,

    /// Resource description
    pub description: String,

    /// MIME type
    pub mime_type: String,

    /// Display metadata
    #[serde(rename = "_meta")]
    pub meta: Value,

    #[serde(skip)]
    pub kind: ResourceKind,

    /// Content returned by `resources/read`
    #[serde(skip)]
    pub content: Arc<str>,
}

/// Tool and resource registry
#[derive(Debug, Clone)]
pub struct Catalog {
    tools: Vec<ToolDescriptor>,
    resources: Vec<ResourceDescriptor>,
}

impl Catalog {
    /// Build the catalog, serving `widget_html` as the todo widget
    pub fn new(widget_html: Arc<str>) -> Self {
        let tools = vec![
            ToolDescriptor::new(
                ToolKind::AddTodo,
                "add_todo",
                "Add todo",
                "Creates a todo item with the given title.",
                vec![ToolField {
                    name: "title",
                    label: "title",
                    required: true,
                    description: "The title of the todo item",
                }],
                "Adding todo",
                "Added todo",
            ),
            ToolDescriptor::new(
                ToolKind::CompleteTodo,
                "complete_todo",
                "Complete todo",
                "Marks a todo as done by id.",
                vec![ToolField {
                    name: "todoId",
                    label: "todo id",
                    required: true,
                    description: "The ID of the todo to complete",
                }],
                "Completing todo",
                "Completed todo",
            ),
        ];

        let resources = vec![ResourceDescriptor {
            uri: TODO_WIDGET_URI.to_string(),
            name: "todo-widget".to_string(),
            title: "Todo list".to_string(),
            description: "Interactive todo list widget".to_string(),
            mime_type: WIDGET_MIME_TYPE.to_string(),
            meta: json!({
                "openai/widgetDescription": "Shows the current todo list and its completion state.",
                "openai/widgetPrefersBorder": true,
            }),
            kind: ResourceKind::TodoWidget,
            content: widget_html,
        }];

        Self { tools, resources }
    }

    /// All tools, in declaration order
    pub fn list_tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// All resources, in declaration order
    pub fn list_resources(&self) -> &[ResourceDescriptor] {
        &self.resources
    }

    /// Exact-match lookup by tool name
    pub fn tool(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|tool| tool.name == name)
    }

    /// Exact-match lookup by resource URI
    pub fn resource(&self, uri: &str) -> Option<&ResourceDescriptor> {
        self.resources.iter().find(|resource| resource.uri == uri)
    }
}

fn input_schema(fields: &[ToolField]) -> Value {
    let properties: serde_json::Map<String, Value> = fields
        .iter()
        .map(|field| {
            (
                field.name.to_string(),
                json!({
                    "type": "string",
                    "description": field.description,
                }),
            )
        })
        .collect();

    let required: Vec<&str> = fields
        .iter()
        .filter(|field| field.required)
        .map(|field| field.name)
        .collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}
