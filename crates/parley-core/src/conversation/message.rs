//! Conversation turn types.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The author of a turn that is kept in a conversation.
///
/// Only these two roles survive reconstruction. Legacy logs may also carry
/// `system` entries, which readers must recognize and drop (see [`RoleTag`]).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    /// Message typed or spoken by the operator.
    User,
    /// Reply produced by the language model.
    Model,
}

/// A role name as it may appear in a stored log, before filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RoleTag {
    User,
    Model,
    System,
}

impl RoleTag {
    /// Returns the retained role, or `None` for tags that are discarded.
    pub fn retained(self) -> Option<Role> {
        match self {
            RoleTag::User => Some(Role::User),
            RoleTag::Model => Some(Role::Model),
            RoleTag::System => None,
        }
    }
}

/// One role-tagged message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, text)
    }
}
