//! Shared types for the langconv variant converter.
//!
//! - [`dom`] -- A minimal arena document: text nodes, elements with
//!   ordered attributes, fragments, and the handful of mutations the
//!   replacement machines need.
//! - [`variant`] -- Round-trip metadata carried on converted spans and
//!   its JSON attribute encoding.

pub mod dom;
pub mod variant;

pub use dom::{Document, DomError, Fragment, NodeId};
pub use variant::{TwoWay, VariantInfo};
