use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Resolve an archive entry path under `base`, rejecting anything that escapes it.
pub fn sanitize_path<P: AsRef<Path>, B: AsRef<Path>>(entry_path: P, base: B) -> Result<PathBuf> {
    let entry_path = entry_path.as_ref();
    let base = base.as_ref();

    if entry_path.as_os_str().is_empty() || entry_path.to_string_lossy().contains('\0') {
        return Err(Error::InvalidPath);
    }

    let relative = normalize_relative(entry_path).ok_or_else(|| Error::ZipSlip {
        entry:    entry_path.to_path_buf(),
        resolved: base.join(entry_path),
    })?;

    Ok(base.join(relative))
}

/// Resolve a symlink target relative to the link's location, rejecting escapes from `base`.
pub fn sanitize_symlink_target<P: AsRef<Path>, L: AsRef<Path>, B: AsRef<Path>>(
    target: P,
    symlink_location: L,
    base: B,
) -> Result<PathBuf> {
    let target = target.as_ref();
    let symlink_location = symlink_location.as_ref();
    let base = base.as_ref();

    if target.is_absolute() || target.has_root() {
        return Err(Error::AbsoluteSymlinkTarget {
            target:  target.to_path_buf(),
            symlink: symlink_location.to_path_buf(),
        });
    }

    let link_dir = symlink_location
        .parent()
        .and_then(|p| p.strip_prefix(base).ok())
        .unwrap_or(Path::new(""));

    match normalize_relative(&link_dir.join(target)) {
        Some(_) => Ok(target.to_path_buf()),
        None => Err(Error::SymlinkEscape {
            target:   target.to_path_buf(),
            resolved: symlink_location
                .parent()
                .map(|p| p.join(target))
                .unwrap_or_else(|| target.to_path_buf()),
        }),
    }
}

/// Collapse `.` and `..` in a relative path. `None` if it is absolute or climbs above its start.
fn normalize_relative(path: &Path) -> Option<PathBuf> {
    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();

    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    Some(parts.iter().collect())
}
