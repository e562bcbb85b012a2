//! Chat, contact handle and attachment lookups.

use super::ChatStore;
use crate::types::{Chat, Contact};
use imsg_core::{error::ImsgError, shellexpand};

impl ChatStore {
    /// All chats.
    pub async fn list_chats(&self) -> Result<Vec<Chat>, ImsgError> {
        let rows: Vec<(i64, String, Option<String>)> =
            sqlx::query_as("SELECT ROWID, chat_identifier, display_name FROM chat")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| ImsgError::Store(format!("chat list query failed: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|(chat_id, chat_identifier, display_name)| Chat {
                chat_id,
                chat_identifier,
                display_name: display_name.unwrap_or_default(),
            })
            .collect())
    }

    /// Handles whose id contains `query`.
    pub async fn search_contacts(&self, query: &str) -> Result<Vec<Contact>, ImsgError> {
        let rows: Vec<(i64, String, Option<String>)> =
            sqlx::query_as("SELECT ROWID, id, service FROM handle WHERE id LIKE ?")
                .bind(format!("%{query}%"))
                .fetch_all(&self.pool)
                .await
                .map_err(|e| ImsgError::Store(format!("contact search failed: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|(handle_id, id, service)| Contact {
                handle_id,
                id,
                service: service.unwrap_or_default(),
            })
            .collect())
    }

    /// Local path of an attachment, with a leading `~/` expanded.
    pub async fn attachment_path(&self, guid: &str) -> Result<Option<String>, ImsgError> {
        let row: Option<(Option<String>,)> =
            sqlx::query_as("SELECT filename FROM attachment WHERE guid = ?")
                .bind(guid)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| ImsgError::Store(format!("attachment lookup failed: {e}")))?;

        Ok(row
            .and_then(|(filename,)| filename)
            .filter(|f| !f.is_empty())
            .map(|f| shellexpand(&f)))
    }
}
