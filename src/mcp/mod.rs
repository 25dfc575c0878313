//! MCP (Model Context Protocol) module
//!
//! Implements the MCP server protocol for tool invocation and resource reads.

pub mod catalog;
pub mod dispatcher;
pub mod envelope;
pub mod http;
pub mod server;
pub mod types;
