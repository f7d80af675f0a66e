//! Agent command handler (single message + interactive loop).

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

use zeptosense::agent::Orchestrator;
use zeptosense::config::Config;

use super::common::read_secret;

/// Inputs that end the interactive loop.
const QUIT_WORDS: &[&str] = &["quit", "exit", "退出"];

fn is_quit(input: &str) -> bool {
    QUIT_WORDS.contains(&input.to_lowercase().as_str())
}

/// Ask for the provider key on stdin when none is configured.
fn prompt_api_key(config: &mut Config) -> Result<()> {
    let missing = config
        .provider
        .api_key
        .as_deref()
        .map(|k| k.trim().is_empty())
        .unwrap_or(true);
    if !missing {
        return Ok(());
    }

    println!("请设置OpenAI API密钥。");
    print!("请输入API密钥: ");
    io::stdout().flush()?;

    let key = read_secret()?;
    if key.is_empty() {
        anyhow::bail!(
            "No API key provided. Set OPENAI_API_KEY or provider.api_key in {}",
            Config::path().display()
        );
    }
    config.provider.api_key = Some(key);
    Ok(())
}

/// Interactive or single-message agent mode.
pub(crate) async fn cmd_agent(message: Option<String>) -> Result<()> {
    let mut config = Config::load().with_context(|| "Failed to load configuration")?;
    prompt_api_key(&mut config)?;

    let orchestrator =
        Orchestrator::from_config(&config).with_context(|| "Failed to build the agent")?;

    if let Some(msg) = message {
        println!("{}", orchestrator.process(&msg).await);
        return Ok(());
    }

    println!("物联网代理已初始化。输入'quit'退出。");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("\n输入您的查询: ");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                // EOF
                println!();
                break;
            }
            Ok(_) => {
                let input = input.trim();
                if input.is_empty() {
                    continue;
                }
                if is_quit(input) {
                    break;
                }

                let reply = orchestrator.process(input).await;
                println!("\n响应: {}", reply);
            }
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        }
    }

    Ok(())
}
