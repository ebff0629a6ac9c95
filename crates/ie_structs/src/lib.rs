//! This library handles reading from and writing the structured resource
//! files used by *Infinity Engine* games.
//!
//! Every supported format follows one shape: a header carrying a four
//! byte signature, a four byte version and a set of count/offset pairs,
//! followed by runs of fixed size records at the declared offsets, and
//! optionally a trailing region of variable length script text the
//! records point into.
//!
//! | Format | Signature | Versions | Contents                          |
//! |--------|-----------|----------|-----------------------------------|
//! | DLG    | `DLG `    | V1.0     | Dialogue states, responses, scripts |
//! | ITM    | `ITM `    | V1       | Items, abilities, effects          |
//! | SPL    | `SPL `    | V1       | Spells, abilities, effects         |
//! | CRE    | `CRE `    | V1.0     | Creatures, spells, items, effects  |
//!
//! Parsing yields a [`ResourceTree`]: an arena of named, offset
//! addressed fields under one root, queryable by name or absolute
//! offset, editable in place, and linearizable back to bytes. Section
//! members can be inserted and removed; counts, offsets and index
//! references across sections are kept consistent automatically, and
//! every change is reported through the tree's drained event feed.
//!
//! Layout knowledge lives in plan tables under [`formats`], keyed by the
//! parsed version and an [`EngineProfile`] selecting game variant
//! specific fields. The parser itself is format agnostic.
//!
//! # Example
//!
//! ```
//! use ie_structs::{read_resource, to_bytes, EngineProfile, ResourceType};
//!
//! # fn main() -> ie_structs::Result<()> {
//! #[rustfmt::skip]
//! let input = [
//!     0x44, 0x4C, 0x47, 0x20, 0x56, 0x31, 0x2E, 0x30, // DLG V1.0
//!     0x00, 0x00, 0x00, 0x00, 0x30, 0x00, 0x00, 0x00, // no states
//!     0x00, 0x00, 0x00, 0x00, 0x30, 0x00, 0x00, 0x00, // no responses
//!     0x30, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // no state triggers
//!     0x30, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // no response triggers
//!     0x30, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // no actions
//! ];
//!
//! let mut tree = read_resource(&input, ResourceType::Dlg, EngineProfile::default())?;
//! let states = tree.attribute(tree.root(), "# states").unwrap();
//! assert_eq!(tree.as_field(states).unwrap().int(), 0);
//!
//! assert_eq!(to_bytes(&mut tree)?, input);
//! # Ok(())
//! # }
//! ```

mod edit;
pub mod error;
pub mod field;
pub mod formats;
pub mod read;
pub mod schema;
pub mod symbols;
pub mod tree;
pub mod types;
pub mod write;

pub use error::{Error, Result};
pub use field::{Field, FieldKind, PackedPart, RefGate, RefPolicy};
pub use read::read_resource;
pub use symbols::{SymbolRegistry, SymbolTable};
pub use tree::{FlatList, Payload, ResourceTree};
pub use types::{
    Capability, EngineProfile, Mutation, MutationKind, NodeId, ResourceType, StructKind,
};
pub use write::{recompute_offsets, to_bytes, write_resource};
