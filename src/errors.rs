//! Typed error hierarchy for the Planify core.
//!
//! Three enums cover the three failure classes:
//! - `StoreError`: durable store I/O and (de)serialization failures
//! - `RepoError`: repository and view-adapter failures
//! - `MoveRejection`: the reasons a card may not move to "in use"

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the JSON document store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Document '{name}' does not match the expected shape: {source}")]
    Corrupt {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize document '{name}': {source}")]
    Serialize {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from repository operations that the caller can act on.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Card {id} not found")]
    CardNotFound { id: String },

    #[error("Lane {id} not found")]
    LaneNotFound { id: String },

    #[error("Floor {id} not found")]
    FloorNotFound { id: String },

    #[error("Table {id} not found")]
    TableNotFound { id: String },

    #[error("Table {id} already exists on this floor")]
    DuplicateTable { id: String },

    #[error("User '{username}' not found")]
    UserNotFound { username: String },

    #[error("Invalid locater id '{value}': expected level.room.spot")]
    InvalidLocater { value: String },

    #[error("Unable to {action} the signed-in user")]
    SelfModification { action: &'static str },

    #[error("No floor is selected")]
    NoActiveFloor,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// First failed precondition for moving a card to the in-use state.
///
/// The `Display` text is the reason shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveRejection {
    #[error("Locater id is missing")]
    MissingLocater,

    #[error("Locater id does not exist on this level")]
    UnknownLocater,

    #[error("Asset tag is missing")]
    MissingAssetTag,

    #[error("Serial number is missing")]
    MissingSerial,

    #[error("Machine must be wiped first")]
    NeedsWipe,

    #[error("Setup deadline is missing")]
    MissingDeadline,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_io_carries_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = StoreError::Io {
            path: PathBuf::from("/data/cards.json"),
            source: io_err,
        };
        match &err {
            StoreError::Io { path, source } => {
                assert_eq!(path, &PathBuf::from("/data/cards.json"));
                assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
            }
            _ => panic!("Expected Io variant"),
        }
        assert!(err.to_string().contains("cards.json"));
    }

    #[test]
    fn repo_error_converts_from_store_error() {
        let parse_err = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let store_err = StoreError::Corrupt {
            name: "lanes".to_string(),
            source: parse_err,
        };
        let repo_err: RepoError = store_err.into();
        assert!(matches!(
            repo_err,
            RepoError::Store(StoreError::Corrupt { ref name, .. }) if name == "lanes"
        ));
    }

    #[test]
    fn self_modification_names_the_action() {
        let err = RepoError::SelfModification { action: "remove" };
        assert_eq!(err.to_string(), "Unable to remove the signed-in user");
    }

    #[test]
    fn move_rejection_reasons_are_distinct() {
        let reasons = [
            MoveRejection::MissingLocater,
            MoveRejection::UnknownLocater,
            MoveRejection::MissingAssetTag,
            MoveRejection::MissingSerial,
            MoveRejection::NeedsWipe,
            MoveRejection::MissingDeadline,
        ];
        let texts: std::collections::HashSet<String> =
            reasons.iter().map(|r| r.to_string()).collect();
        assert_eq!(texts.len(), reasons.len());
    }

    #[test]
    fn all_error_types_implement_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&RepoError::NoActiveFloor);
        assert_std_error(&MoveRejection::NeedsWipe);
        let parse_err = serde_json::from_str::<Vec<u8>>("x").unwrap_err();
        assert_std_error(&StoreError::Serialize {
            name: "cards".into(),
            source: parse_err,
        });
    }
}
