//! meta-diff-json-equal - Deep equality comparison for metadata documents.
//!
//! Provides [`deep_equal`] for recursively comparing two [`serde_json::Value`]
//! instances, and [`is_truthy`] which decides whether a value counts as
//! "present" when picking array identities or walking a change shape.

mod deep_equal;

pub use deep_equal::{deep_equal, is_truthy};
