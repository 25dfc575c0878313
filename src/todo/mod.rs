//! In-memory todo state
//!
//! The todo list mutated by the MCP tools.

pub mod store;

pub use store::{Todo, TodoList, TodoStore, TODO_ID_PREFIX};
