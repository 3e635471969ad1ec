//! Place-name aliases and normalization.
//!
//! Riders type "CX" for Charing Cross and TfL writes "High Barnet
//! Underground Station". Everything that compares place names goes
//! through [`AliasTable::canonical_key`] so these spellings agree.

mod normalize;
mod table;

pub use normalize::{compact_destination, normalize_name, split_via};
pub use table::AliasTable;
