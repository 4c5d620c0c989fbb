//! Persistence collaborator interfaces
//!
//! The concrete document store is out of scope; these traits are its
//! boundary. The in-memory implementation backs tests and development.
//! `StoreProvider` is the single acquire-or-create accessor: once-semantics
//! on success, and a failed initialization is retried by later requests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use finsight_core::{ChatRole, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};
use uuid::Uuid;

/// A persisted chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Identifier unique within a user's log
    pub id: Uuid,
    /// Message role
    pub role: ChatRole,
    /// Message content
    pub content: String,
    /// When the message was appended
    pub created_at: DateTime<Utc>,
}

impl StoredMessage {
    /// Create a message stamped now
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Per-message feedback flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackFlag {
    /// User liked the reply
    Like,
    /// User disliked the reply
    Dislike,
    /// User reported the reply
    Report,
}

/// Append-only chat log keyed by user id
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Append messages to a user's log
    async fn append_messages(&self, user_id: &str, messages: &[StoredMessage]) -> Result<()>;

    /// Fetch a user's full log
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<StoredMessage>>;
}

/// Feedback flags keyed by message id within a user's log
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Set the flag for one message
    async fn set_flag(&self, user_id: &str, message_id: Uuid, flag: FeedbackFlag) -> Result<()>;
}

/// Company-info documents keyed by company name with category-scoped
/// sub-objects
#[async_trait]
pub trait CompanyInfoStore: Send + Sync {
    /// Fetch one category of a company's document
    async fn category_info(&self, company: &str, category: &str) -> Result<Option<Value>>;
}

/// Bundle of store handles injected into the request pipeline
pub struct Stores {
    /// Chat-log store
    pub chat: Arc<dyn ChatStore>,
    /// Feedback store
    pub feedback: Arc<dyn FeedbackStore>,
    /// Company-info store
    pub company_info: Arc<dyn CompanyInfoStore>,
}

impl Stores {
    /// Bundle backed entirely by one in-memory store
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::default());
        Self {
            chat: store.clone(),
            feedback: store.clone(),
            company_info: store,
        }
    }
}

/// In-memory store implementation
#[derive(Default)]
pub struct MemoryStore {
    chats: RwLock<HashMap<String, Vec<StoredMessage>>>,
    flags: RwLock<HashMap<(String, Uuid), FeedbackFlag>>,
    companies: RwLock<HashMap<String, HashMap<String, Value>>>,
}

impl MemoryStore {
    /// Seed one category of a company document (test/dev helper)
    pub async fn seed_company(&self, company: &str, category: &str, info: Value) {
        let mut companies = self.companies.write().await;
        companies
            .entry(company.to_string())
            .or_default()
            .insert(category.to_string(), info);
    }

    /// Read back a flag (test/dev helper)
    pub async fn flag(&self, user_id: &str, message_id: Uuid) -> Option<FeedbackFlag> {
        let flags = self.flags.read().await;
        flags.get(&(user_id.to_string(), message_id)).copied()
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn append_messages(&self, user_id: &str, messages: &[StoredMessage]) -> Result<()> {
        let mut chats = self.chats.write().await;
        chats
            .entry(user_id.to_string())
            .or_default()
            .extend_from_slice(messages);
        Ok(())
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<StoredMessage>> {
        let chats = self.chats.read().await;
        Ok(chats.get(user_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl FeedbackStore for MemoryStore {
    async fn set_flag(&self, user_id: &str, message_id: Uuid, flag: FeedbackFlag) -> Result<()> {
        let mut flags = self.flags.write().await;
        flags.insert((user_id.to_string(), message_id), flag);
        Ok(())
    }
}

#[async_trait]
impl CompanyInfoStore for MemoryStore {
    async fn category_info(&self, company: &str, category: &str) -> Result<Option<Value>> {
        let companies = self.companies.read().await;
        Ok(companies
            .get(company)
            .and_then(|doc| doc.get(category))
            .cloned())
    }
}

/// Acquire-or-create accessor for the store bundle
///
/// The cell fills once on first successful initialization; a failure leaves
/// it empty so the next request retries. Nothing here crashes the process.
pub struct StoreProvider {
    cell: OnceCell<Arc<Stores>>,
}

impl Default for StoreProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreProvider {
    /// Create a provider with an unfilled cell
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Get the store bundle, initializing it if needed
    pub async fn acquire(&self) -> Result<Arc<Stores>> {
        self.cell
            .get_or_try_init(|| async {
                // A real document-store client would connect here; the
                // in-memory bundle never fails.
                Ok(Arc::new(Stores::in_memory()))
            })
            .await
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_chat_log_roundtrip() {
        let store = MemoryStore::default();
        let messages = vec![
            StoredMessage::new(ChatRole::User, "price of TCS?"),
            StoredMessage::new(ChatRole::Assistant, "TCS trades at 3,900."),
        ];

        store.append_messages("user-1", &messages).await.expect("append");
        let log = store.find_by_user("user-1").await.expect("find");

        assert_eq!(log.len(), 2);
        assert_eq!(log[0].content, "price of TCS?");
        assert!(store.find_by_user("user-2").await.expect("find").is_empty());
    }

    #[tokio::test]
    async fn test_feedback_flags() {
        let store = MemoryStore::default();
        let id = Uuid::new_v4();

        store
            .set_flag("user-1", id, FeedbackFlag::Like)
            .await
            .expect("flag");
        assert_eq!(store.flag("user-1", id).await, Some(FeedbackFlag::Like));

        // A later flag replaces the earlier one.
        store
            .set_flag("user-1", id, FeedbackFlag::Report)
            .await
            .expect("flag");
        assert_eq!(store.flag("user-1", id).await, Some(FeedbackFlag::Report));
    }

    #[tokio::test]
    async fn test_company_info_categories() {
        let store = MemoryStore::default();
        store
            .seed_company("Tata Consultancy Services", "about", serde_json::json!({"founded": 1968}))
            .await;

        let info = store
            .category_info("Tata Consultancy Services", "about")
            .await
            .expect("lookup");
        assert_eq!(info.expect("present")["founded"], 1968);

        let missing = store
            .category_info("Tata Consultancy Services", "financials")
            .await
            .expect("lookup");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_provider_returns_same_bundle() {
        let provider = StoreProvider::new();
        let first = provider.acquire().await.expect("acquire");
        let second = provider.acquire().await.expect("acquire");
        assert!(Arc::ptr_eq(&first, &second));
    }
}
