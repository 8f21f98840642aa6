// src/services/notifier.rs

//! Digest delivery service.
//!
//! Receives the aggregated per-run digest. Delivery failure is the
//! caller's concern only as far as logging; it never rolls back state.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;
use crate::models::{Digest, TelegramConfig, chunk_message};

/// Telegram caps sendMessage text at 4096 characters; stay under it.
const TELEGRAM_CHUNK_LIMIT: usize = 4000;

/// Sink for per-run change digests.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, digest: &Digest) -> Result<()>;
}

/// Delivers digests to a Telegram chat via the Bot API.
pub struct TelegramNotifier {
    client: Client,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(client: Client, token: String, chat_id: String) -> Self {
        Self {
            client,
            token,
            chat_id,
        }
    }

    /// Build a notifier from config if credentials resolve (file values
    /// or `TG_TOKEN` / `TG_CHAT_ID` environment overrides).
    pub fn from_config(config: &TelegramConfig, client: Client) -> Option<Self> {
        let (token, chat_id) = config.resolve()?;
        Some(Self::new(client, token, chat_id))
    }

    async fn send_message(&self, text: &str) -> Result<()> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.token);
        self.client
            .post(&url)
            .form(&[("chat_id", self.chat_id.as_str()), ("text", text)])
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, digest: &Digest) -> Result<()> {
        let text = digest.render();
        for chunk in chunk_message(&text, TELEGRAM_CHUNK_LIMIT) {
            self.send_message(&chunk).await?;
        }
        Ok(())
    }
}

/// Prints the digest to stdout. Used when Telegram is not configured.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn send(&self, digest: &Digest) -> Result<()> {
        println!("{}", digest.render());
        Ok(())
    }
}
