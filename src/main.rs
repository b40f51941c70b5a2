use std::env;
use std::process;

use anyhow::{anyhow, Result};
use clap::{Arg, ArgMatches, Command};
use tokio::io::AsyncBufReadExt;
use tracing::{error, info};

mod agent;
mod mcp;
mod relay;
mod tools;
mod utils;

use agent::http::HttpAgent;
use mcp::server::McpServer;
use relay::render::{DownloadArtifact, TerminalRenderer};
use relay::{run_turn, SessionState};

#[tokio::main]
async fn main() {
    let matches = Command::new("research-relay")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Chat front-end and MCP tool server for a research agent")
        .long_about(
            "research-relay connects a terminal chat session to a remote research agent.\n\
            Modes:\n\
            - chat (default): relay user input to the agent and stream its replies\n\
            - tools: serve the read-pdf tool over MCP stdio for the agent to call",
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .help("Only log errors (for MCP clients and scripting)")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("chat").about("Interactive chat with the research agent").arg(
                Arg::new("agent-endpoint")
                    .long("agent-endpoint")
                    .value_name("URL")
                    .help("Agent service endpoint (falls back to AGENT_ENDPOINT)")
                    .action(clap::ArgAction::Set),
            ),
        )
        .subcommand(Command::new("tools").about("Serve the read-pdf tool over MCP stdio"))
        .get_matches();

    // Logging goes to stderr only; stdout is reserved for chat output in
    // chat mode and for JSON-RPC in tools mode.
    let log_level = if env::var("RUST_LOG").is_ok() {
        None
    } else if matches.get_flag("quiet") {
        Some("error")
    } else {
        Some("info")
    };

    if let Some(level) = log_level {
        env::set_var("RUST_LOG", level);
    }

    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let outcome = match matches.subcommand() {
        Some(("tools", _)) => run_tools().await,
        Some(("chat", sub)) => run_chat(sub).await,
        _ => run_chat(&matches).await,
    };

    if let Err(e) = outcome {
        error!("Fatal: {}", e);
        process::exit(1);
    }
}

async fn run_tools() -> Result<()> {
    info!("Starting MCP tool server...");
    let mut server = McpServer::new();
    server.start().await
}

fn agent_endpoint(matches: &ArgMatches) -> Result<String> {
    matches
        .try_get_one::<String>("agent-endpoint")
        .ok()
        .flatten()
        .cloned()
        .or_else(|| env::var("AGENT_ENDPOINT").ok())
        .ok_or_else(|| anyhow!("no agent endpoint; pass --agent-endpoint or set AGENT_ENDPOINT"))
}

async fn run_chat(matches: &ArgMatches) -> Result<()> {
    let endpoint = agent_endpoint(matches)?;
    let agent = HttpAgent::new(endpoint)?;
    let mut session = SessionState::new();
    let mut renderer = TerminalRenderer::new();

    println!("Research agent chat. What research topic would you like to explore?");
    println!("(exit to quit, :save to copy the latest generated PDF here)\n");

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        {
            use std::io::Write;
            print!("\x1b[1myou>\x1b[0m ");
            std::io::stdout().flush()?;
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }

        if input == ":save" {
            match current_artifact(&session) {
                Some(artifact) => {
                    let target = artifact.save_to(&env::current_dir()?)?;
                    println!("Saved to {}", target.display());
                }
                None => println!("No generated PDF to save yet."),
            }
            continue;
        }

        run_turn(&agent, &mut session, &mut renderer, input).await?;

        // The download control only appears while the file actually exists.
        if let Some(artifact) = current_artifact(&session) {
            renderer.render_download(&artifact);
        }
    }

    info!("Chat session ended");
    Ok(())
}

fn current_artifact(session: &SessionState) -> Option<DownloadArtifact> {
    session
        .pdf_path
        .as_deref()
        .and_then(DownloadArtifact::from_path)
}
