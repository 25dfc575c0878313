//! Todo Widget MCP Server Library
//!
//! A Model Context Protocol (MCP) server that keeps an in-memory todo list.
//! Exposes `add_todo` / `complete_todo` tools and an HTML widget resource
//! that renders the list from structured tool output.

pub mod config;
pub mod error;
pub mod mcp;
pub mod todo;

pub use config::Config;
pub use error::{Result, TodoMcpError};
