use std::path::Path;

use crate::error::{Error, Result};

/// Mode bits applied when a caller asks for the default.
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Desired ownership and permission state of a placed entry.
///
/// Every field is optional; `None` leaves that aspect of the entry untouched.
/// `owner` and `group` accept either a name or a numeric id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileAttributes {
    pub mode:  Option<u32>,
    pub owner: Option<String>,
    pub group: Option<String>,
}

impl FileAttributes {
    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.mode.is_none() && self.owner.is_none() && self.group.is_none()
    }
}

/// Parse an octal mode string such as `"0644"`, `"755"` or `"0o750"`.
///
/// # Errors
/// [`Error::InvalidMode`] for anything that is not octal or exceeds `0o7777`.
pub fn parse_mode(raw: &str) -> Result<u32> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix("0o").unwrap_or(trimmed);
    if digits.is_empty() || digits.len() > 5 {
        return Err(Error::InvalidMode(raw.to_string()));
    }
    match u32::from_str_radix(digits, 8) {
        Ok(mode) if mode <= 0o7777 => Ok(mode),
        _ => Err(Error::InvalidMode(raw.to_string())),
    }
}

/// Bring `path` to the state described by `attrs`.
///
/// Applies to `path` itself, never recursively. Ownership is changed before
/// the mode so set-id bits survive. Returns whether anything was modified.
#[cfg(unix)]
pub fn apply_attributes(path: &Path, attrs: &FileAttributes) -> Result<bool> {
    use std::os::unix::fs::{MetadataExt, PermissionsExt};

    use nix::unistd::chown;

    let meta = std::fs::metadata(path).map_err(|e| Error::Metadata {
        path:   path.to_path_buf(),
        source: e,
    })?;
    let mut changed = false;

    let uid = attrs
        .owner
        .as_deref()
        .map(resolve_user)
        .transpose()?
        .filter(|uid| uid.as_raw() != meta.uid());
    let gid = attrs
        .group
        .as_deref()
        .map(resolve_group)
        .transpose()?
        .filter(|gid| gid.as_raw() != meta.gid());

    if uid.is_some() || gid.is_some() {
        chown(path, uid, gid).map_err(|e| Error::Chown {
            path:   path.to_path_buf(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), ?uid, ?gid, "ownership changed");
        changed = true;
    }

    if let Some(mode) = attrs.mode
        && meta.mode() & 0o7777 != mode
    {
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).map_err(|e| {
            Error::SetMode {
                path: path.to_path_buf(),
                mode,
                source: e,
            }
        })?;
        tracing::debug!(path = %path.display(), mode = format_args!("{mode:04o}"), "mode changed");
        changed = true;
    }

    Ok(changed)
}

#[cfg(not(unix))]
pub fn apply_attributes(path: &Path, attrs: &FileAttributes) -> Result<bool> {
    if !attrs.is_empty() {
        tracing::warn!(
            path = %path.display(),
            "file attributes are not supported on this platform; skipping"
        );
    }
    Ok(false)
}

#[cfg(unix)]
fn resolve_user(name: &str) -> Result<nix::unistd::Uid> {
    use nix::unistd::{Uid, User};

    if let Ok(raw) = name.parse::<u32>() {
        return Ok(Uid::from_raw(raw));
    }
    User::from_name(name)
        .map_err(|e| Error::Lookup {
            name:   name.to_string(),
            source: e,
        })?
        .map(|user| user.uid)
        .ok_or_else(|| Error::UnknownUser(name.to_string()))
}

#[cfg(unix)]
fn resolve_group(name: &str) -> Result<nix::unistd::Gid> {
    use nix::unistd::{Gid, Group};

    if let Ok(raw) = name.parse::<u32>() {
        return Ok(Gid::from_raw(raw));
    }
    Group::from_name(name)
        .map_err(|e| Error::Lookup {
            name:   name.to_string(),
            source: e,
        })?
        .map(|group| group.gid)
        .ok_or_else(|| Error::UnknownGroup(name.to_string()))
}
