//! meta-diff - Structural diffs for federated-identity metadata documents.
//!
//! Metadata records (service providers, identity providers, relying parties
//! and the like) are nested JSON documents. This crate provides the pure data
//! transformations a revision and change-request review flow needs:
//!
//! - [`Differ`] computes a [`Delta`] between two documents, pairing array
//!   elements by identity rather than position.
//! - [`extract_subset`] cuts a document down to the fields a change touches.
//! - [`ChangeRequest`] collapses dotted path updates and applies them.
//! - [`render`] turns a [`Delta`] into HTML or text.
//!
//! Dotted path handling lives in [`meta_diff_path_keys`] and deep equality in
//! [`meta_diff_json_equal`]; both are re-exported.

pub mod change_request;
pub mod config;
pub mod delta;
pub mod differ;
pub mod error;
pub mod identity;
pub mod json_pretty;
pub mod normalize;
pub mod render;
pub mod subset;

pub use change_request::{ChangeRequest, PathUpdateType};
pub use config::DiffConfig;
pub use delta::{ArrayEntry, Change, ChangeKind, Delta, PathSegment};
pub use differ::{diff, Differ};
pub use error::{DiffError, Result};
pub use identity::{ElementIdentity, IdentityPolicy, DEFAULT_IDENTITY_FIELDS};
pub use normalize::{canonicalize, prepare, IgnoreKeys, DEFAULT_IGNORE_KEYS};
pub use subset::extract_subset;

pub use meta_diff_json_equal as json_equal;
pub use meta_diff_path_keys as path_keys;
