//! Error types for the Todo Widget MCP Server
//!
//! This module defines the error hierarchy for all operations in the server.

use thiserror::Error;

/// Main error type for the Todo Widget MCP Server
#[derive(Error, Debug)]
pub enum TodoMcpError {
    /// Todo store errors
    #[error("Todo store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// MCP protocol errors
    #[error("MCP protocol error: {0}")]
    Mcp(#[from] McpError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Todo store errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A required field was absent or blank after trimming
    #[error("Missing {field}.")]
    Validation { field: String },

    #[error("Todo {id} was not found.")]
    NotFound { id: String },

    /// The identifier counter cannot advance without reusing an id
    #[error("todo identifiers exhausted")]
    IdsExhausted,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Widget file not found: {path}")]
    WidgetNotFound { path: String },

    #[error("Invalid port: {value}")]
    InvalidPort { value: String },

    #[error("Invalid bind address: {addr}")]
    InvalidAddress { addr: String },
}

/// MCP protocol errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum McpError {
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Unknown resource: {uri}")]
    UnknownResource { uri: String },

    #[error("Invalid arguments: {message}")]
    InvalidArguments { message: String },
}

/// Result type alias for Todo Widget MCP operations
pub type Result<T> = std::result::Result<T, TodoMcpError>;
