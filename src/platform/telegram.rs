use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::Recipient;

use crate::platform::ChatTransport;

/// Telegram rejects messages over 4096 characters; leave some headroom.
const MAX_MESSAGE_CHARS: usize = 4000;

/// Split text into chunks of at most `max_chars` characters, breaking after the
/// last newline (or else space) inside each window when there is one.
fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut rest = text;

    loop {
        let Some((limit, _)) = rest.char_indices().nth(max_chars) else {
            chunks.push(rest.to_string());
            return chunks;
        };

        let window = &rest[..limit];
        let end = window
            .rfind('\n')
            .or_else(|| window.rfind(' '))
            .map(|pos| pos + 1)
            .unwrap_or(limit);

        let (chunk, tail) = rest.split_at(end);
        chunks.push(chunk.to_string());
        rest = tail;
    }
}

/// Numeric destinations are chat ids, anything else a channel username.
fn recipient(destination: &str) -> Recipient {
    match destination.trim().parse::<i64>() {
        Ok(id) => Recipient::Id(ChatId(id)),
        Err(_) => Recipient::ChannelUsername(destination.trim().to_string()),
    }
}

pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(token: &str) -> Self {
        Self {
            bot: Bot::new(token),
        }
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn deliver(&self, destination: &str, text: &str) -> Result<()> {
        let chat = recipient(destination);
        for chunk in split_message(text, MAX_MESSAGE_CHARS) {
            self.bot
                .send_message(chat.clone(), chunk)
                .await
                .context("Telegram rejected the message")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_message_is_single_chunk() {
        assert_eq!(split_message("Новых статусов нет", 4000), vec!["Новых статусов нет"]);
    }

    #[test]
    fn test_split_prefers_whitespace() {
        let chunks = split_message("aaaa bbbb cccc", 9);
        assert_eq!(chunks, vec!["aaaa ", "bbbb cccc"]);
        assert_eq!(chunks.concat(), "aaaa bbbb cccc");
    }

    #[test]
    fn test_split_counts_characters_not_bytes() {
        // Cyrillic letters are two bytes each.
        let fits = "ж".repeat(4000);
        assert_eq!(split_message(&fits, 4000), vec![fits.clone()]);

        let text = "ж".repeat(10);
        let chunks = split_message(&text, 5);
        assert_eq!(chunks, vec!["жжжжж", "жжжжж"]);
    }

    #[test]
    fn test_split_prefers_newline_over_space() {
        let chunks = split_message("ab cd\nef gh", 8);
        assert_eq!(chunks, vec!["ab cd\n", "ef gh"]);
    }

    #[test]
    fn test_recipient_parsing() {
        assert_eq!(recipient("123456"), Recipient::Id(ChatId(123456)));
        assert_eq!(recipient("-100200300"), Recipient::Id(ChatId(-100200300)));
        assert_eq!(
            recipient("@homework_channel"),
            Recipient::ChannelUsername("@homework_channel".to_string())
        );
    }
}
