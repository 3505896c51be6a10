//! # Opaque platform handles and the message body projection.
//!
//! Handles carry platform-assigned string ids; equality is id equality.
//! They are cheap to clone (`Arc<str>` internals) because the queue core
//! copies them freely between its lists, prompts and event payloads.

use std::fmt;
use std::sync::Arc;

use super::emoji::Emoji;

/// A platform user. Identity is the platform-assigned id; `tag` is the
/// display form used in message bodies and logs.
#[derive(Clone, Debug)]
pub struct UserRef {
    id: Arc<str>,
    tag: Arc<str>,
}

impl UserRef {
    pub fn new(id: impl Into<Arc<str>>, tag: impl Into<Arc<str>>) -> Self {
        Self {
            id: id.into(),
            tag: tag.into(),
        }
    }

    /// Platform-assigned id. The only field that participates in equality.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display tag (mention form).
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Identity equality: same platform id.
    pub fn same_as(&self, other: &UserRef) -> bool {
        self.id == other.id
    }
}

impl fmt::Display for UserRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)
    }
}

/// A channel handle (public channel or direct channel).
#[derive(Clone, Debug)]
pub struct ChannelRef {
    id: Arc<str>,
}

impl ChannelRef {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn same_as(&self, other: &ChannelRef) -> bool {
        self.id == other.id
    }
}

/// A message handle: the channel it lives in plus its id.
///
/// Editing a message in place preserves this identity, which is what lets
/// a held deep link stay valid across prompt re-issues.
#[derive(Clone, Debug)]
pub struct MessageRef {
    channel: ChannelRef,
    id: Arc<str>,
}

impl MessageRef {
    pub fn new(channel: ChannelRef, id: impl Into<Arc<str>>) -> Self {
        Self {
            channel,
            id: id.into(),
        }
    }

    pub fn channel(&self) -> &ChannelRef {
        &self.channel
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn same_as(&self, other: &MessageRef) -> bool {
        self.id == other.id && self.channel.same_as(&other.channel)
    }
}

/// One live reaction on a message: the emoji and everyone reacting with it.
#[derive(Clone, Debug)]
pub struct ReactionState {
    pub emoji: Emoji,
    pub users: Vec<UserRef>,
}

/// One field of a rendered message body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BodyField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// What the core asks the platform to display.
///
/// A pure projection target: plain text (prompts) or a titled field layout
/// (the board). Exact visual formatting is the platform adapter's business.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageBody {
    pub text: Option<String>,
    pub title: Option<String>,
    pub fields: Vec<BodyField>,
}

impl MessageBody {
    /// Plain-text body (prompt messages).
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Titled field-layout body (the board message).
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Appends a field.
    pub fn with_field(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        inline: bool,
    ) -> Self {
        self.fields.push(BodyField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }
}
