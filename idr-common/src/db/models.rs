//! Contact row models

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Link precedence of a contact record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkPrecedence {
    /// Canonical record of an identity cluster
    Primary,
    /// Record merged into a cluster, linked to its primary
    Secondary,
}

impl LinkPrecedence {
    /// Database text representation
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkPrecedence::Primary => "primary",
            LinkPrecedence::Secondary => "secondary",
        }
    }

    /// Parse the database text representation
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "primary" => Ok(LinkPrecedence::Primary),
            "secondary" => Ok(LinkPrecedence::Secondary),
            other => Err(Error::Internal(format!(
                "Unknown link precedence in contacts table: {}",
                other
            ))),
        }
    }
}

/// One identifying record.
///
/// `id`, `email`, `phone_number`, and `created_at` are immutable after
/// insert; only `linked_id`/`link_precedence`/`updated_at` change, and only
/// when a merge demotes a primary or repairs a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub linked_id: Option<i64>,
    pub link_precedence: LinkPrecedence,
    /// Milliseconds since the Unix epoch, assigned by the store at insert
    pub created_at: i64,
    /// Milliseconds since the Unix epoch, last mutation
    pub updated_at: i64,
}

impl Contact {
    pub fn is_primary(&self) -> bool {
        self.link_precedence == LinkPrecedence::Primary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_round_trips_through_text() {
        assert_eq!(
            LinkPrecedence::parse(LinkPrecedence::Primary.as_str()).unwrap(),
            LinkPrecedence::Primary
        );
        assert_eq!(
            LinkPrecedence::parse(LinkPrecedence::Secondary.as_str()).unwrap(),
            LinkPrecedence::Secondary
        );
    }

    #[test]
    fn precedence_rejects_unknown_text() {
        assert!(LinkPrecedence::parse("tertiary").is_err());
    }
}
