use thiserror::Error;

use crate::timestamp::Timestamp;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("identifier must not be empty")]
    EmptyId,

    #[error("duplicate {kind} uuid '{uuid}'")]
    DuplicateId { kind: &'static str, uuid: String },

    /// An embedded relation disagrees with the record's foreign key.
    #[error("{kind} '{uuid}': {relation}.uuid is '{found}' but {foreign_key} is '{expected}'")]
    RelationMismatch {
        kind: &'static str,
        uuid: String,
        relation: &'static str,
        foreign_key: &'static str,
        expected: String,
        found: String,
    },

    #[error("{kind} '{uuid}': updated_at {updated_at} precedes created_at {created_at}")]
    TimestampOrder {
        kind: &'static str,
        uuid: String,
        created_at: Timestamp,
        updated_at: Timestamp,
    },

    #[error("{kind} '{uuid}' references unknown {target} '{target_uuid}'")]
    DanglingReference {
        kind: &'static str,
        uuid: String,
        target: &'static str,
        target_uuid: String,
    },

    #[error("malformed payload: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode payload: {0}")]
    Encode(#[source] serde_json::Error),
}
