use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    #[serde(default)]
    pub sender_name: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub job_id: String,
    pub application_id: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub unread_count: u32,
}

impl Conversation {
    /// Appends unless a message with the same id is already shown.
    pub fn append(&mut self, message: Message) -> bool {
        if self.messages.iter().any(|existing| existing.id == message.id) {
            return false;
        }
        self.messages.push(message);
        true
    }
}

/// `POST .../messages` echoes the stored message.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SentMessage {
    pub message: Message,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NewMessage<'a> {
    pub body: &'a str,
}
