//! Archive and compressed-stream extraction with path sanitization.
//!
//! # Architecture
//!
//! - `format.rs` - Format enums and tar codec sniffing
//! - `detect.rs` - Name-based format inference
//! - `sanitize.rs` - Path sanitization (zip-slip prevention)
//! - `extract/` - Per-format implementations
//!
//! Container formats (zip, tar) either expand every entry into a directory or
//! write only their first entry to a file. Single-stream formats (gz, bz2, xz)
//! always decompress to one file.

pub use detect::{infer_from_name, payload_name, resolve_format};
pub use error::{Error, Result};
pub use extract::{ArchiveReport, Extractor, Target};
pub use format::{ArchiveFormat, FormatHint, ParseFormatHintError, TarCompress};
pub use sanitize::{sanitize_path, sanitize_symlink_target};

mod detect;
mod error;
mod extract;
mod format;
mod sanitize;
