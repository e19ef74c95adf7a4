pub mod checks;
pub mod error;
pub mod id;
pub mod models;
pub mod timestamp;
pub mod wire;

pub use checks::{Directory, Entity};
pub use error::SchemaError;
pub use id::Id;
pub use models::{
    Channel, ChannelMessage, ChannelMessageUpload, ChannelWebhook, ChannelWebhookMessage,
    MessageTypeName, MessageUpload, RoomFile, User,
};
pub use timestamp::Timestamp;
