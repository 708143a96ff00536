//! Blocking user prompts, injected into the flows.

use async_trait::async_trait;
use std::io::{BufRead, Write};

/// Where alerts and confirmations go.
#[async_trait]
pub trait Prompt: Send + Sync {
    /// Show a message the user must acknowledge.
    async fn notify(&self, message: &str);

    /// Ask a yes/no question. `false` unless the user explicitly agrees.
    async fn confirm(&self, message: &str) -> bool;
}

/// Prompts on stderr, answers on stdin.
#[derive(Debug, Clone, Default)]
pub struct TerminalPrompt {
    assume_yes: bool,
}

impl TerminalPrompt {
    /// With `assume_yes`, every confirmation is answered "yes" without reading stdin.
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

/// Accepts `y`/`yes` in any case; everything else is a refusal.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[async_trait]
impl Prompt for TerminalPrompt {
    async fn notify(&self, message: &str) {
        eprintln!("{}", message);
    }

    async fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            eprintln!("{} [y/N] y (--yes)", message);
            return true;
        }

        eprint!("{} [y/N] ", message);
        let _ = std::io::stderr().flush();

        let answer = tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line).map(|_| line)
        })
        .await;

        match answer {
            Ok(Ok(line)) => is_affirmative(&line),
            _ => false,
        }
    }
}
