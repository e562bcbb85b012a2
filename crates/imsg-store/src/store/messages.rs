//! Message queries and attachment enrichment.

use super::ChatStore;
use crate::types::{apple_time_to_rfc3339, Attachment, Message};
use imsg_core::error::ImsgError;
use std::collections::HashMap;

/// guid, text, sender, date, is_from_me, reply_to_guid, is_read, date_read, service
type MessageRow = (
    String,
    Option<String>,
    Option<String>,
    i64,
    i64,
    Option<String>,
    i64,
    Option<i64>,
    Option<String>,
);

/// message guid, attachment guid, filename, mime_type, total_bytes, transfer_name
type AttachmentRow = (
    String,
    String,
    Option<String>,
    Option<String>,
    Option<i64>,
    Option<String>,
);

impl ChatStore {
    /// Newest messages that have text or at least one attachment.
    pub async fn recent_messages(&self, limit: i64) -> Result<Vec<Message>, ImsgError> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT m.guid, m.text, h.id, m.date, m.is_from_me, m.reply_to_guid, \
                    m.is_read, m.date_read, m.service \
             FROM message m \
             LEFT JOIN handle h ON m.handle_id = h.ROWID \
             WHERE m.text IS NOT NULL \
                OR EXISTS (SELECT 1 FROM message_attachment_join maj WHERE maj.message_id = m.ROWID) \
             ORDER BY m.date DESC \
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ImsgError::Store(format!("recent messages query failed: {e}")))?;

        self.enrich_with_attachments(rows.into_iter().map(message_from_row).collect())
            .await
    }

    /// Messages whose text contains `text`.
    pub async fn search_messages(&self, text: &str, limit: i64) -> Result<Vec<Message>, ImsgError> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT m.guid, m.text, h.id, m.date, m.is_from_me, m.reply_to_guid, \
                    m.is_read, m.date_read, m.service \
             FROM message m \
             LEFT JOIN handle h ON m.handle_id = h.ROWID \
             WHERE m.text LIKE ? \
             ORDER BY m.date DESC \
             LIMIT ?",
        )
        .bind(format!("%{text}%"))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ImsgError::Store(format!("message search failed: {e}")))?;

        self.enrich_with_attachments(rows.into_iter().map(message_from_row).collect())
            .await
    }

    /// Conversation history with one handle (phone number or email).
    pub async fn messages_from_contact(
        &self,
        handle: &str,
        limit: i64,
    ) -> Result<Vec<Message>, ImsgError> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT m.guid, m.text, h.id, m.date, m.is_from_me, m.reply_to_guid, \
                    m.is_read, m.date_read, m.service \
             FROM message m \
             JOIN handle h ON m.handle_id = h.ROWID \
             WHERE h.id = ? \
             ORDER BY m.date DESC \
             LIMIT ?",
        )
        .bind(handle)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ImsgError::Store(format!("contact messages query failed: {e}")))?;

        self.enrich_with_attachments(rows.into_iter().map(message_from_row).collect())
            .await
    }

    /// Attach attachment metadata to each message and append a readable
    /// placeholder per attachment to its text.
    async fn enrich_with_attachments(
        &self,
        mut messages: Vec<Message>,
    ) -> Result<Vec<Message>, ImsgError> {
        if messages.is_empty() {
            return Ok(messages);
        }

        let placeholders = vec!["?"; messages.len()].join(",");
        let sql = format!(
            "SELECT m.guid, a.guid, a.filename, a.mime_type, a.total_bytes, a.transfer_name \
             FROM message m \
             JOIN message_attachment_join maj ON m.ROWID = maj.message_id \
             JOIN attachment a ON maj.attachment_id = a.ROWID \
             WHERE m.guid IN ({placeholders})"
        );

        let mut query = sqlx::query_as::<_, AttachmentRow>(&sql);
        for message in &messages {
            query = query.bind(&message.guid);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ImsgError::Store(format!("attachment query failed: {e}")))?;

        let mut by_message: HashMap<String, Vec<Attachment>> = HashMap::new();
        for (message_guid, guid, filename, mime_type, total_bytes, transfer_name) in rows {
            by_message.entry(message_guid).or_default().push(Attachment {
                guid,
                filename: filename.unwrap_or_default(),
                mime_type: mime_type.unwrap_or_default(),
                total_bytes: total_bytes.unwrap_or_default(),
                transfer_name: transfer_name.unwrap_or_default(),
            });
        }

        for message in &mut messages {
            if let Some(attachments) = by_message.remove(&message.guid) {
                message.text = with_attachment_placeholders(&message.text, &attachments);
                message.attachments = attachments;
            }
        }
        Ok(messages)
    }
}

fn message_from_row(row: MessageRow) -> Message {
    let (guid, text, sender, date, is_from_me, reply_to_guid, is_read, date_read, service) = row;
    let is_from_me = is_from_me != 0;
    let sender = sender.unwrap_or_else(|| {
        if is_from_me {
            "me".to_string()
        } else {
            "unknown".to_string()
        }
    });

    Message {
        guid,
        text: text.unwrap_or_default(),
        sender,
        date: apple_time_to_rfc3339(date),
        is_from_me,
        reply_to_guid,
        is_read: is_read != 0,
        date_read: date_read
            .filter(|d| d / 1_000_000_000 != 0)
            .map(apple_time_to_rfc3339),
        service: service.unwrap_or_default(),
        attachments: Vec::new(),
    }
}

fn with_attachment_placeholders(text: &str, attachments: &[Attachment]) -> String {
    let labels: Vec<String> = attachments
        .iter()
        .map(|a| {
            format!(
                "[Attachment: {}, name: {}]",
                non_empty_or_unknown(&a.mime_type),
                non_empty_or_unknown(&a.transfer_name)
            )
        })
        .collect();
    format!("{text} {}", labels.join(" ")).trim().to_string()
}

fn non_empty_or_unknown(value: &str) -> &str {
    if value.is_empty() {
        "unknown"
    } else {
        value
    }
}
