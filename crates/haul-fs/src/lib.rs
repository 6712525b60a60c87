//! Filesystem primitives for promoting staged artifacts into place.
//!
//! - `place` - parent creation, entry removal, rename-or-copy replacement and
//!   overwrite-merge of directory trees
//! - `attributes` - mode and ownership application

mod attributes;
mod error;
mod place;

pub use attributes::{DEFAULT_FILE_MODE, FileAttributes, apply_attributes, parse_mode};
pub use error::{Error, Result};
pub use place::{ensure_parent, merge_dir, remove_entry, replace_with};
