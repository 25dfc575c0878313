//! Configuration management for the Todo Widget MCP Server
//!
//! Handles the listening address, environment variables, and widget loading.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{ConfigError, Result, TodoMcpError};

/// Default bind host, all interfaces
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8080;

/// Default location of the widget markup, relative to the working directory
pub const DEFAULT_WIDGET_PATH: &str = "public/todo-widget.html";

/// Configuration for the Todo Widget MCP Server
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind the HTTP transport to
    pub host: String,

    /// Port to bind the HTTP transport to
    pub port: u16,

    /// Path to the HTML widget served as a resource
    pub widget_path: PathBuf,
}

impl Config {
    /// Create a configuration from the environment, falling back to defaults
    pub fn new() -> Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());

        let port = match std::env::var("PORT") {
            Ok(value) => parse_port(&value)?,
            Err(_) => DEFAULT_PORT,
        };

        let widget_path = std::env::var("TODO_WIDGET_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_WIDGET_PATH));

        Ok(Self {
            host,
            port,
            widget_path,
        })
    }

    /// Socket address for the HTTP transport
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|_| TodoMcpError::Config(ConfigError::InvalidAddress { addr }))
    }

    /// Read the widget markup from disk
    pub fn load_widget_html(&self) -> Result<Arc<str>> {
        load_widget(&self.widget_path)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            widget_path: PathBuf::from(DEFAULT_WIDGET_PATH),
        }
    }
}

fn parse_port(value: &str) -> Result<u16> {
    value.trim().parse().map_err(|_| {
        TodoMcpError::Config(ConfigError::InvalidPort {
            value: value.to_string(),
        })
    })
}

fn load_widget(path: &Path) -> Result<Arc<str>> {
    match std::fs::read_to_string(path) {
        Ok(html) => Ok(Arc::from(html)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(TodoMcpError::Config(ConfigError::WidgetNotFound {
                path: path.display().to_string(),
            }))
        }
        Err(e) => Err(TodoMcpError::Io(e)),
    }
}
