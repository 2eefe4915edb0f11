use crate::models::ChatMessage;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

const APPEND_NOTIFY_CAPACITY: usize = 256;

/// Append-only, arrival-ordered message log shared by a session and its
/// chat channels.
///
/// Appends and subscriber notifications happen under one write lock, so
/// every subscriber observes the same order as `snapshot`.
#[derive(Clone)]
pub struct ChatHistory {
    messages: Arc<RwLock<Vec<ChatMessage>>>,
    appended: broadcast::Sender<ChatMessage>,
}

impl Default for ChatHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatHistory {
    pub fn new() -> Self {
        let (appended, _) = broadcast::channel(APPEND_NOTIFY_CAPACITY);
        Self {
            messages: Arc::new(RwLock::new(Vec::new())),
            appended,
        }
    }

    pub async fn push(&self, message: ChatMessage) {
        let mut messages = self.messages.write().await;
        messages.push(message.clone());
        // No subscribers is fine.
        let _ = self.appended.send(message);
    }

    pub async fn snapshot(&self) -> Vec<ChatMessage> {
        self.messages.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.messages.read().await.len()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatMessage> {
        self.appended.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_push_preserves_arrival_order() {
        let history = ChatHistory::new();
        let mut appended = history.subscribe();

        history.push(ChatMessage::user("advisor", "first")).await;
        history.push(ChatMessage::system("advisor joined")).await;
        history.push(ChatMessage::user("me", "first")).await;

        let texts: Vec<String> = history
            .snapshot()
            .await
            .into_iter()
            .map(|m| format!("{}:{}", m.sender, m.text))
            .collect();
        assert_eq!(
            texts,
            vec!["advisor:first", "system:advisor joined", "me:first"]
        );

        assert_eq!(appended.recv().await.unwrap().sender, "advisor");
        assert_eq!(appended.recv().await.unwrap().sender, "system");
        assert_eq!(appended.recv().await.unwrap().sender, "me");
    }

    #[tokio::test]
    async fn test_duplicates_are_kept() {
        let history = ChatHistory::new();
        let message = ChatMessage::user("me", "hello");
        history.push(message.clone()).await;
        history.push(message).await;
        assert_eq!(history.len().await, 2);
    }
}
