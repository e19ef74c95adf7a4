use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::id::{ChannelId, Id, MessageId, UserId, WebhookId};
use crate::timestamp::Timestamp;

// -- Collaborator shapes --
//
// Owned by other services. The whole object is kept as received, `uuid`
// included, so a decode/encode cycle reproduces it exactly. `uuid()` reads
// the identity key without imposing any format on it.

macro_rules! collaborator {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name {
            pub fields: Map<String, Value>,
        }

        impl $name {
            pub fn with_uuid(uuid: Id<$name>) -> Self {
                let mut fields = Map::new();
                fields.insert("uuid".to_string(), Value::String(uuid.into_inner()));
                Self { fields }
            }

            /// `None` unless `uuid` holds a non-empty string.
            pub fn uuid(&self) -> Option<Id<$name>> {
                match self.fields.get("uuid") {
                    Some(Value::String(uuid)) if !uuid.is_empty() => Some(Id::new(uuid.as_str())),
                    _ => None,
                }
            }

            pub fn field(&self, name: &str) -> Option<&Value> {
                self.fields.get(name)
            }
        }
    };
}

collaborator!(User);

collaborator!(Channel);

collaborator!(
    /// A file or media attachment on a message.
    MessageUpload
);

/// Same shape as [`MessageUpload`], used for `channel_message_upload`.
pub type ChannelMessageUpload = MessageUpload;

collaborator!(
    /// Link between a message and the webhook that posted it.
    ChannelWebhookMessage
);

collaborator!(
    /// File resource attached to a channel-level entity, e.g. a webhook icon.
    RoomFile
);

// -- Messages --

/// Value of `channel_message_type_name`. The set of names is owned by the
/// producer, so any string is kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageTypeName(String);

impl MessageTypeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MessageTypeName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for MessageTypeName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for MessageTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One message posted in a channel.
///
/// Relations are denormalized snapshots embedded by the producer. A missing
/// key and an explicit `null` both decode to `None`, and `None` is left out
/// when encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMessage {
    pub uuid: MessageId,
    pub body: String,
    pub channel_uuid: ChannelId,
    pub channel_message_type_name: MessageTypeName,
    pub user_uuid: UserId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload: Option<MessageUpload>,
    /// Set when the message was posted through a webhook.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_webhook_message: Option<ChannelWebhookMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_message_upload: Option<ChannelMessageUpload>,
}

impl ChannelMessage {
    /// Fresh message with a generated id and no embedded relations.
    pub fn new(
        channel_uuid: ChannelId,
        user_uuid: UserId,
        type_name: impl Into<MessageTypeName>,
        body: impl Into<String>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            uuid: Id::generate(),
            body: body.into(),
            channel_uuid,
            channel_message_type_name: type_name.into(),
            user_uuid,
            created_at: now.clone(),
            updated_at: now,
            user: None,
            upload: None,
            channel_webhook_message: None,
            channel_message_upload: None,
        }
    }

    pub fn is_from_webhook(&self) -> bool {
        self.channel_webhook_message.is_some()
    }

    /// Populated upload relations, `upload` first.
    pub fn uploads(&self) -> impl Iterator<Item = &MessageUpload> {
        self.upload.iter().chain(self.channel_message_upload.iter())
    }
}

// -- Webhooks --

/// A webhook integration configured on a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelWebhook {
    pub uuid: WebhookId,
    pub name: String,
    pub description: String,
    pub channel_uuid: ChannelId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<Channel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_file: Option<RoomFile>,
}

impl ChannelWebhook {
    pub fn new(channel_uuid: ChannelId, name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Timestamp::now();
        Self {
            uuid: Id::generate(),
            name: name.into(),
            description: description.into(),
            channel_uuid,
            created_at: now.clone(),
            updated_at: now,
            channel: None,
            room_file: None,
        }
    }
}
