use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::SchemaError;
use crate::models::{
    Channel, ChannelMessage, ChannelWebhook, ChannelWebhookMessage, MessageUpload, RoomFile, User,
};

/// Identifier of a record of kind `K`.
///
/// On the wire this is a bare string. The producer mostly emits UUIDs, but
/// any non-empty string is accepted. The kind parameter only exists at
/// compile time, so an `Id<Channel>` can never be passed where an `Id<User>`
/// is expected.
pub struct Id<K> {
    value: String,
    kind: PhantomData<fn() -> K>,
}

pub type MessageId = Id<ChannelMessage>;
pub type WebhookId = Id<ChannelWebhook>;
pub type ChannelId = Id<Channel>;
pub type UserId = Id<User>;
pub type UploadId = Id<MessageUpload>;
pub type WebhookMessageId = Id<ChannelWebhookMessage>;
pub type RoomFileId = Id<RoomFile>;

impl<K> Id<K> {
    /// Wraps an existing identifier string without checking it.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: PhantomData,
        }
    }

    /// Fresh random v4 UUID, hyphenated.
    pub fn generate() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_inner(self) -> String {
        self.value
    }

    /// Parses the identifier as a UUID. Returns `None` for free-form ids.
    pub fn as_uuid(&self) -> Option<Uuid> {
        self.value.parse().ok()
    }
}

impl<K> From<Uuid> for Id<K> {
    fn from(uuid: Uuid) -> Self {
        Self::new(uuid.to_string())
    }
}

impl<K> FromStr for Id<K> {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(SchemaError::EmptyId);
        }
        Ok(Self::new(s))
    }
}

// Manual impls so the bounds don't leak onto `K`.

impl<K> Clone for Id<K> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<K> PartialEq for Id<K> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<K> Eq for Id<K> {}

impl<K> PartialOrd for Id<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for Id<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl<K> Hash for Id<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<K> fmt::Debug for Id<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Id").field(&self.value).finish()
    }
}

impl<K> fmt::Display for Id<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<K> Serialize for Id<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de, K> Deserialize<'de> for Id<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}
