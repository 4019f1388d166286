use std::io::Write;
use std::sync::Arc;

use tether_agent::AgentLoop;
use tether_mcp::McpRegistry;
use tether_memory::ConversationStore;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::ollama::OllamaChatModel;

/// Assemble an agent from configuration. Nothing is connected yet.
pub fn build_agent(config: &CliConfig) -> CliResult<AgentLoop> {
    let model = OllamaChatModel::new(
        &config.ollama_base_url,
        &config.ollama_model,
        config.temperature,
    )?;
    let registry = McpRegistry::new(config.mcp_server());
    let store = ConversationStore::new(&config.state_file);

    Ok(AgentLoop::new(
        Arc::new(model),
        Box::new(registry),
        store,
        config.agent(),
    ))
}

/// What a line typed into the chat prompt asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum ChatInput<'a> {
    Exit,
    Clear,
    Skip,
    Message(&'a str),
}

impl<'a> ChatInput<'a> {
    pub fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            ChatInput::Skip
        } else if trimmed.eq_ignore_ascii_case("exit") {
            ChatInput::Exit
        } else if trimmed.eq_ignore_ascii_case("clear") {
            ChatInput::Clear
        } else {
            ChatInput::Message(trimmed)
        }
    }
}

pub async fn run_chat(config: &CliConfig, clear: bool) -> CliResult<()> {
    let mut agent = build_agent(config)?;
    agent.initialize().await?;

    let provider = format!("Using ollama ({})", config.ollama_model);
    if clear {
        agent.clear_conversation_history().await?;
        println!("Agent initialized (fresh session) - {provider}");
    } else if agent.history().is_empty() {
        println!("Agent initialized (new session) - {provider}");
    } else {
        println!(
            "Agent initialized (continued session with {} previous messages) - {provider}",
            agent.history().len()
        );
    }
    println!("Type your message or 'exit' to quit, 'clear' to reset history");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match ChatInput::parse(&line) {
            ChatInput::Exit => {
                println!("\nGoodbye!");
                break;
            }
            ChatInput::Clear => match agent.clear_conversation_history().await {
                Ok(()) => println!("Conversation history cleared\n"),
                Err(e) => eprintln!("Error: {e}\n"),
            },
            ChatInput::Skip => {}
            ChatInput::Message(text) => {
                println!("Thinking....\n");
                match agent.chat(text).await {
                    Ok(answer) => println!("Agent: {answer}\n"),
                    Err(e) => {
                        warn!(code = e.error_code(), error = %e, "Turn failed");
                        eprintln!("Error: {e}\n");
                    }
                }
            }
        }
    }

    agent.shutdown().await;
    Ok(())
}

pub async fn run_ask(config: &CliConfig, question: &str) -> CliResult<()> {
    let mut agent = build_agent(config)?;
    agent.initialize().await?;

    let timeout = config.ask_timeout();
    let result = tokio::time::timeout(timeout, agent.chat(question)).await;
    agent.shutdown().await;

    match result {
        Ok(answer) => {
            println!("{}", answer?);
            Ok(())
        }
        Err(_) => {
            info!(secs = timeout.as_secs(), "Question timed out");
            Err(CliError::Timeout {
                secs: timeout.as_secs(),
            })
        }
    }
}

pub async fn run_clear(config: &CliConfig) -> CliResult<()> {
    let mut agent = build_agent(config)?;
    agent.initialize().await?;
    let cleared = agent.clear_conversation_history().await;
    agent.shutdown().await;
    cleared?;

    println!("Conversation history cleared");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_input_parsing() {
        assert_eq!(ChatInput::parse("  exit "), ChatInput::Exit);
        assert_eq!(ChatInput::parse("EXIT"), ChatInput::Exit);
        assert_eq!(ChatInput::parse("Clear"), ChatInput::Clear);
        assert_eq!(ChatInput::parse("   "), ChatInput::Skip);
        assert_eq!(
            ChatInput::parse(" show all expenses \n"),
            ChatInput::Message("show all expenses")
        );
    }

    #[test]
    fn test_build_agent_starts_idle() {
        let dir = tempfile::tempdir().unwrap();
        let config = crate::config::CliConfigBuilder::new()
            .state_file(dir.path().join("state.json"))
            .build()
            .unwrap();

        let agent = build_agent(&config).unwrap();

        assert_eq!(agent.state(), tether_agent::AgentState::Idle);
        assert!(agent.history().is_empty());
    }
}
