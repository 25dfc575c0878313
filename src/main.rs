//! Todo Widget MCP Server
//!
//! A Model Context Protocol server that keeps an in-memory todo list and
//! serves an HTML widget rendering it.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use todo_widget_mcp::config::Config;
use todo_widget_mcp::error::Result;
use todo_widget_mcp::mcp::catalog::Catalog;
use todo_widget_mcp::mcp::dispatcher::Dispatcher;
use todo_widget_mcp::mcp::http;
use todo_widget_mcp::mcp::server::McpServer;
use todo_widget_mcp::todo::TodoStore;

/// Todo Widget MCP Server
#[derive(Parser)]
#[command(name = "todo-widget-mcp")]
#[command(author, version, about = "Todo Widget MCP Server - an MCP server with an in-memory todo list")]
struct Cli {
    /// Host to bind the HTTP transport to
    #[arg(long, global = true)]
    host: Option<String>,

    /// Port to bind the HTTP transport to (overrides PORT)
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Path to the widget HTML (overrides TODO_WIDGET_PATH)
    #[arg(long, global = true)]
    widget: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP over stdin/stdout instead of HTTP
    Stdio,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays free for the stdio transport
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::new()?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(widget) = cli.widget {
        config.widget_path = widget;
    }

    let widget_html = config.load_widget_html()?;
    tracing::info!(path = %config.widget_path.display(), "loaded todo widget");

    let catalog = Arc::new(Catalog::new(widget_html));
    let store = Arc::new(TodoStore::new());
    let server = Arc::new(McpServer::new(Dispatcher::new(catalog, store)));

    match cli.command {
        Some(Commands::Stdio) => server.run_stdio().await?,
        None => http::serve(server, config.bind_addr()?).await?,
    }

    Ok(())
}
