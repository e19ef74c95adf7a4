//! Integrity checks the record shapes can't express through types alone:
//! foreign keys agreeing with embedded relations, timestamp order, id
//! uniqueness within a collection and references to known channels/users.

use std::collections::HashSet;

use tracing::debug;

use crate::error::SchemaError;
use crate::id::{ChannelId, Id, UserId};
use crate::models::{Channel, ChannelMessage, ChannelWebhook, User};
use crate::timestamp::Timestamp;

/// A record with its own identity key.
pub trait Entity: Sized {
    /// Label used in error messages.
    const KIND: &'static str;

    fn id(&self) -> &Id<Self>;

    /// Every consistency problem of this record on its own.
    fn violations(&self) -> Vec<SchemaError>;

    fn check(&self) -> Result<(), SchemaError> {
        match self.violations().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Entity for ChannelMessage {
    const KIND: &'static str = "channel_message";

    fn id(&self) -> &Id<Self> {
        &self.uuid
    }

    fn violations(&self) -> Vec<SchemaError> {
        let mut errors = Vec::new();
        let embedded_user = self.user.as_ref().and_then(User::uuid);
        if let Some(err) =
            relation_mismatch::<Self, _>(&self.uuid, "user", "user_uuid", &self.user_uuid, embedded_user)
        {
            errors.push(err);
        }
        if let Some(err) = timestamp_order::<Self>(&self.uuid, &self.created_at, &self.updated_at) {
            errors.push(err);
        }
        errors
    }
}

impl Entity for ChannelWebhook {
    const KIND: &'static str = "channel_webhook";

    fn id(&self) -> &Id<Self> {
        &self.uuid
    }

    fn violations(&self) -> Vec<SchemaError> {
        let mut errors = Vec::new();
        let embedded_channel = self.channel.as_ref().and_then(Channel::uuid);
        if let Some(err) = relation_mismatch::<Self, _>(
            &self.uuid,
            "channel",
            "channel_uuid",
            &self.channel_uuid,
            embedded_channel,
        ) {
            errors.push(err);
        }
        if let Some(err) = timestamp_order::<Self>(&self.uuid, &self.created_at, &self.updated_at) {
            errors.push(err);
        }
        errors
    }
}

fn relation_mismatch<E: Entity, K>(
    uuid: &Id<E>,
    relation: &'static str,
    foreign_key: &'static str,
    expected: &Id<K>,
    found: Option<Id<K>>,
) -> Option<SchemaError> {
    // Only comparable when the producer embedded the relation with its uuid.
    let found = found?;
    if &found == expected {
        return None;
    }
    Some(SchemaError::RelationMismatch {
        kind: E::KIND,
        uuid: uuid.to_string(),
        relation,
        foreign_key,
        expected: expected.to_string(),
        found: found.to_string(),
    })
}

fn timestamp_order<E: Entity>(
    uuid: &Id<E>,
    created_at: &Timestamp,
    updated_at: &Timestamp,
) -> Option<SchemaError> {
    (updated_at < created_at).then(|| SchemaError::TimestampOrder {
        kind: E::KIND,
        uuid: uuid.to_string(),
        created_at: created_at.clone(),
        updated_at: updated_at.clone(),
    })
}

/// Fails on the first `uuid` that occurs twice.
pub fn ensure_unique<E: Entity>(records: &[E]) -> Result<(), SchemaError> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.id()) {
            return Err(duplicate::<E>(record.id()));
        }
    }
    Ok(())
}

/// Collects every per-record violation plus one `DuplicateId` for each
/// repeated `uuid`, in input order.
pub fn audit<E: Entity>(records: &[E]) -> Vec<SchemaError> {
    let mut seen = HashSet::with_capacity(records.len());
    let mut errors = Vec::new();

    for record in records {
        errors.extend(record.violations());
        if !seen.insert(record.id()) {
            errors.push(duplicate::<E>(record.id()));
        }
    }

    debug!("Audited {} {} record(s): {} violation(s)", records.len(), E::KIND, errors.len());
    errors
}

fn duplicate<E: Entity>(id: &Id<E>) -> SchemaError {
    SchemaError::DuplicateId {
        kind: E::KIND,
        uuid: id.to_string(),
    }
}

/// Known channels and users, used to catch foreign keys that point nowhere.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    channels: HashSet<ChannelId>,
    users: HashSet<UserId>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records without a `uuid` are skipped.
    pub fn from_records<'a>(
        channels: impl IntoIterator<Item = &'a Channel>,
        users: impl IntoIterator<Item = &'a User>,
    ) -> Self {
        Self {
            channels: channels.into_iter().filter_map(Channel::uuid).collect(),
            users: users.into_iter().filter_map(User::uuid).collect(),
        }
    }

    /// Returns false if the channel was already known.
    pub fn insert_channel(&mut self, id: ChannelId) -> bool {
        self.channels.insert(id)
    }

    /// Returns false if the user was already known.
    pub fn insert_user(&mut self, id: UserId) -> bool {
        self.users.insert(id)
    }

    pub fn knows_channel(&self, id: &ChannelId) -> bool {
        self.channels.contains(id)
    }

    pub fn knows_user(&self, id: &UserId) -> bool {
        self.users.contains(id)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn verify_message(&self, message: &ChannelMessage) -> Vec<SchemaError> {
        let mut errors = Vec::new();
        if !self.knows_channel(&message.channel_uuid) {
            errors.push(dangling(&message.uuid, "channel", &message.channel_uuid));
        }
        if !self.knows_user(&message.user_uuid) {
            errors.push(dangling(&message.uuid, "user", &message.user_uuid));
        }
        errors
    }

    pub fn verify_webhook(&self, webhook: &ChannelWebhook) -> Vec<SchemaError> {
        if self.knows_channel(&webhook.channel_uuid) {
            return Vec::new();
        }
        vec![dangling(&webhook.uuid, "channel", &webhook.channel_uuid)]
    }
}

fn dangling<E: Entity, K>(uuid: &Id<E>, target: &'static str, target_uuid: &Id<K>) -> SchemaError {
    SchemaError::DanglingReference {
        kind: E::KIND,
        uuid: uuid.to_string(),
        target,
        target_uuid: target_uuid.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(uuid: &str) -> ChannelMessage {
        let mut msg = ChannelMessage::new(Id::new("c1"), Id::new("u1"), "text", "hello");
        msg.uuid = Id::new(uuid);
        msg
    }

    fn webhook(uuid: &str) -> ChannelWebhook {
        let mut hook = ChannelWebhook::new(Id::new("c1"), "deploys", "posts deploy results");
        hook.uuid = Id::new(uuid);
        hook
    }

    #[test]
    fn consistent_message_passes() {
        let mut msg = message("m1");
        msg.user = Some(User::with_uuid(Id::new("u1")));
        assert!(msg.check().is_ok());
    }

    #[test]
    fn user_relation_must_match_foreign_key() {
        let mut msg = message("m1");
        msg.user = Some(User::with_uuid(Id::new("u2")));

        let err = msg.check().unwrap_err();
        assert!(matches!(
            &err,
            SchemaError::RelationMismatch { relation: "user", expected, found, .. }
                if expected == "u1" && found == "u2"
        ));
        assert_eq!(
            err.to_string(),
            "channel_message 'm1': user.uuid is 'u2' but user_uuid is 'u1'"
        );
    }

    #[test]
    fn relation_without_uuid_is_not_compared() {
        let mut hook = webhook("w1");
        hook.channel = Some(Channel::default());
        assert!(hook.check().is_ok());
    }

    #[test]
    fn channel_relation_must_match_foreign_key() {
        let mut hook = webhook("w1");
        hook.channel = Some(Channel::with_uuid(Id::new("c9")));
        assert!(matches!(
            hook.check(),
            Err(SchemaError::RelationMismatch { kind: "channel_webhook", relation: "channel", .. })
        ));

        hook.channel = Some(Channel::with_uuid(Id::new("c1")));
        assert!(hook.check().is_ok());
    }

    #[test]
    fn updated_before_created_is_flagged() {
        let mut msg = message("m1");
        msg.created_at = "2024-05-01T12:00:00Z".parse().unwrap();
        msg.updated_at = "2024-05-01T11:59:59Z".parse().unwrap();
        assert!(matches!(msg.check(), Err(SchemaError::TimestampOrder { .. })));
    }

    #[test]
    fn ensure_unique_reports_first_duplicate() {
        let records = vec![message("m1"), message("m2"), message("m1"), message("m2")];
        match ensure_unique(&records) {
            Err(SchemaError::DuplicateId { kind, uuid }) => {
                assert_eq!(kind, "channel_message");
                assert_eq!(uuid, "m1");
            }
            other => panic!("expected duplicate, got {:?}", other),
        }
        assert!(ensure_unique(&records[..2]).is_ok());
        assert!(ensure_unique::<ChannelWebhook>(&[]).is_ok());
    }

    #[test]
    fn audit_collects_everything() {
        let mut bad_user = message("m2");
        bad_user.user = Some(User::with_uuid(Id::new("someone-else")));
        bad_user.updated_at = "2000-01-01T00:00:00Z".parse().unwrap();

        let records = vec![message("m1"), bad_user, message("m1"), message("m1")];
        let errors = audit(&records);

        assert_eq!(errors.len(), 4);
        assert!(matches!(errors[0], SchemaError::RelationMismatch { .. }));
        assert!(matches!(errors[1], SchemaError::TimestampOrder { .. }));
        assert!(matches!(errors[2], SchemaError::DuplicateId { .. }));
        assert!(matches!(errors[3], SchemaError::DuplicateId { .. }));
    }

    #[test]
    fn directory_flags_unknown_references() {
        let channels = [Channel::with_uuid(Id::new("c1")), Channel::default()];
        let users = [User::with_uuid(Id::new("u7"))];
        let directory = Directory::from_records(&channels, &users);
        assert_eq!(directory.channel_count(), 1);
        assert_eq!(directory.user_count(), 1);

        let errors = directory.verify_message(&message("m1"));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "channel_message 'm1' references unknown user 'u1'");

        assert!(directory.verify_webhook(&webhook("w1")).is_empty());
    }

    #[test]
    fn directory_insertions() {
        let mut directory = Directory::new();
        assert!(directory.insert_channel(Id::new("c1")));
        assert!(!directory.insert_channel(Id::new("c1")));
        assert!(directory.insert_user(Id::new("u1")));
        assert!(directory.verify_message(&message("m1")).is_empty());

        let mut stray = webhook("w1");
        stray.channel_uuid = Id::new("c2");
        let errors = directory.verify_webhook(&stray);
        assert!(matches!(
            &errors[..],
            [SchemaError::DanglingReference { target: "channel", target_uuid, .. }] if target_uuid == "c2"
        ));
    }
}
