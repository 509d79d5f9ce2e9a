//! Review events - request layer output, dispatcher input

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ContractError;

/// Review verdict on an album
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewType {
    Like,
    Dislike,
}

impl ReviewType {
    /// Wire form (`like` / `dislike`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Dislike => "dislike",
        }
    }
}

impl fmt::Display for ReviewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewType {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(Self::Like),
            "dislike" => Ok(Self::Dislike),
            other => Err(ContractError::invalid_review_type(other)),
        }
    }
}

/// A single review to forward to the producer service
///
/// Immutable once built. The album id is expected to reference an existing album;
/// no validation happens past the request layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEvent {
    review_type: ReviewType,
    album_id: String,
}

impl ReviewEvent {
    pub fn new(review_type: ReviewType, album_id: impl Into<String>) -> Self {
        Self {
            review_type,
            album_id: album_id.into(),
        }
    }

    pub fn review_type(&self) -> ReviewType {
        self.review_type
    }

    pub fn album_id(&self) -> &str {
        &self.album_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_type_parse() {
        assert_eq!("like".parse::<ReviewType>().unwrap(), ReviewType::Like);
        assert_eq!("dislike".parse::<ReviewType>().unwrap(), ReviewType::Dislike);

        let err = "LIKE".parse::<ReviewType>().unwrap_err();
        assert!(matches!(err, ContractError::InvalidReviewType { .. }));
        assert!("".parse::<ReviewType>().is_err());
    }

    #[test]
    fn test_review_event_wire_format() {
        let event = ReviewEvent::new(ReviewType::Dislike, "a1b2c3");
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"reviewType":"dislike","albumId":"a1b2c3"}"#);
    }
}
