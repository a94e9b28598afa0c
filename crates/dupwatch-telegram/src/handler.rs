// SPDX-FileCopyrightText: 2026 Dupwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Update filtering and conversion.
//!
//! Determines whether an incoming Telegram message should be watched based
//! on chat type and the configured allowlist, then converts it into a
//! channel-agnostic [`InboundMessage`].

use dupwatch_core::types::{ChatId, InboundMessage, MessageId, Sender};
use teloxide::prelude::*;
use teloxide::types::{ChatKind, PublicChatKind};

/// Checks whether the message comes from a group or supergroup.
///
/// Private chats and channel posts return `false`.
pub fn is_group(msg: &Message) -> bool {
    match &msg.chat.kind {
        ChatKind::Public(public) => !matches!(public.kind, PublicChatKind::Channel(_)),
        ChatKind::Private(_) => false,
    }
}

/// Checks the chat against the allowlist. An empty allowlist allows every chat.
pub fn is_allowed_chat(msg: &Message, allowed_chats: &[i64]) -> bool {
    allowed_chats.is_empty() || allowed_chats.contains(&msg.chat.id.0)
}

/// Converts a Telegram text message into an [`InboundMessage`].
///
/// Returns `None` for messages without text or without a user sender.
/// The sender's display name is their first name.
pub fn to_inbound_message(msg: &Message) -> Option<InboundMessage> {
    let text = msg.text()?;
    let user = msg.from.as_ref()?;
    let sender_id = i64::try_from(user.id.0).ok()?;

    Some(InboundMessage {
        id: MessageId(msg.id.0.to_string()),
        channel: "telegram".to_string(),
        chat_id: ChatId(msg.chat.id.0),
        sender: Sender::new(sender_id, user.first_name.clone()),
        text: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a group chat message from JSON, matching Telegram Bot API structure.
    fn make_group_message(chat_type: &str, chat_id: i64, text: Option<&str>) -> Message {
        let mut json = serde_json::json!({
            "message_id": 77,
            "date": 1700000000i64,
            "chat": {
                "id": chat_id,
                "type": chat_type,
                "title": "Grup Kantor",
            },
            "from": {
                "id": 12345u64,
                "is_bot": false,
                "first_name": "Andre",
                "username": "andre_k",
            },
        });
        if let Some(text) = text {
            json["text"] = serde_json::json!(text);
        } else {
            json["dice"] = serde_json::json!({ "emoji": "🎲", "value": 3 });
        }

        serde_json::from_value(json).expect("failed to deserialize mock group message")
    }

    fn make_private_message(text: &str) -> Message {
        let json = serde_json::json!({
            "message_id": 1,
            "date": 1700000000i64,
            "chat": {
                "id": 12345i64,
                "type": "private",
                "first_name": "Andre",
            },
            "from": {
                "id": 12345u64,
                "is_bot": false,
                "first_name": "Andre",
            },
            "text": text,
        });

        serde_json::from_value(json).expect("failed to deserialize mock private message")
    }

    fn make_channel_post(text: &str) -> Message {
        let json = serde_json::json!({
            "message_id": 5,
            "date": 1700000000i64,
            "chat": {
                "id": -100999i64,
                "type": "channel",
                "title": "Pengumuman",
            },
            "text": text,
        });

        serde_json::from_value(json).expect("failed to deserialize mock channel post")
    }

    #[test]
    fn groups_and_supergroups_are_watched() {
        assert!(is_group(&make_group_message("group", -123, Some("halo"))));
        assert!(is_group(&make_group_message("supergroup", -100123, Some("halo"))));
    }

    #[test]
    fn private_chats_and_channels_are_not_watched() {
        assert!(!is_group(&make_private_message("halo")));
        assert!(!is_group(&make_channel_post("halo")));
    }

    #[test]
    fn empty_allowlist_allows_all() {
        let msg = make_group_message("supergroup", -100123, Some("halo"));
        assert!(is_allowed_chat(&msg, &[]));
    }

    #[test]
    fn allowlist_filters_by_chat_id() {
        let msg = make_group_message("supergroup", -100123, Some("halo"));
        assert!(is_allowed_chat(&msg, &[-100123]));
        assert!(!is_allowed_chat(&msg, &[-100999]));
    }

    #[test]
    fn to_inbound_message_maps_fields() {
        let msg = make_group_message("supergroup", -100123, Some("  Rapat jam 3 "));
        let inbound = to_inbound_message(&msg).unwrap();

        assert_eq!(inbound.id, MessageId("77".into()));
        assert_eq!(inbound.channel, "telegram");
        assert_eq!(inbound.chat_id, ChatId(-100123));
        assert_eq!(inbound.sender, Sender::new(12345, "Andre"));
        // Text is passed through untouched; normalization happens downstream.
        assert_eq!(inbound.text, "  Rapat jam 3 ");
    }

    #[test]
    fn non_text_messages_are_skipped() {
        let msg = make_group_message("group", -123, None);
        assert!(to_inbound_message(&msg).is_none());
    }

    #[test]
    fn messages_without_sender_are_skipped() {
        assert!(to_inbound_message(&make_channel_post("halo")).is_none());
    }
}
