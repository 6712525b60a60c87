use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Create every missing ancestor of `path`.
pub fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| Error::CreateDir {
            path:   parent.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

/// Remove whatever lives at `path`: a file, a symlink or a whole directory tree.
///
/// Returns `false` if nothing was there.
pub fn remove_entry(path: &Path) -> Result<bool> {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => {
            return Err(Error::Metadata {
                path:   path.to_path_buf(),
                source: e,
            });
        }
    };

    let removed = if meta.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    removed.map_err(|e| Error::Remove {
        path:   path.to_path_buf(),
        source: e,
    })?;
    Ok(true)
}

/// Move `staged` to `dest`, replacing whatever is there.
///
/// A file replacing a file is a single rename. Any other existing entry is
/// removed first. When the rename crosses filesystems the content is copied
/// into a sibling temporary and renamed from there, so `dest` still appears in
/// one step; `staged` is left for its owner to clean up in that case.
pub fn replace_with(staged: &Path, dest: &Path) -> Result<()> {
    ensure_parent(dest)?;

    let staged_is_dir = staged.is_dir();
    if let Ok(meta) = std::fs::symlink_metadata(dest)
        && (meta.is_dir() || staged_is_dir)
    {
        remove_entry(dest)?;
    }

    match std::fs::rename(staged, dest) {
        Ok(()) => {
            tracing::trace!(from = %staged.display(), to = %dest.display(), "renamed");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            tracing::debug!(
                from = %staged.display(),
                to = %dest.display(),
                "rename crosses filesystems; copying"
            );
            if staged_is_dir {
                copy_dir_across(staged, dest)
            } else {
                copy_file_across(staged, dest)
            }
        }
        Err(e) => Err(Error::Move {
            from:   staged.to_path_buf(),
            to:     dest.to_path_buf(),
            source: e,
        }),
    }
}

/// Overwrite-merge the tree under `staged` into the directory `dest`.
///
/// Entries only present in `dest` survive. Where both sides hold a directory
/// the merge descends into it; any other collision replaces the old entry.
/// Returns the top-level paths written under `dest`.
pub fn merge_dir(staged: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    if !dest.is_dir() {
        remove_entry(dest)?;
        std::fs::create_dir_all(dest).map_err(|e| Error::CreateDir {
            path:   dest.to_path_buf(),
            source: e,
        })?;
    }

    let mut placed = Vec::new();
    for entry in read_dir(staged)? {
        let from = entry.path();
        let to = dest.join(entry.file_name());
        let from_is_dir = entry
            .file_type()
            .map_err(|e| Error::Metadata {
                path:   from.clone(),
                source: e,
            })?
            .is_dir();

        if from_is_dir && to.is_dir() && !to.is_symlink() {
            merge_dir(&from, &to)?;
        } else {
            replace_with(&from, &to)?;
        }
        placed.push(to);
    }
    Ok(placed)
}

fn read_dir(path: &Path) -> Result<Vec<std::fs::DirEntry>> {
    let read_err = |e| Error::Metadata {
        path:   path.to_path_buf(),
        source: e,
    };
    std::fs::read_dir(path)
        .map_err(read_err)?
        .collect::<io::Result<Vec<_>>>()
        .map_err(read_err)
}

fn sibling_dir(dest: &Path) -> &Path {
    match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn copy_file_across(staged: &Path, dest: &Path) -> Result<()> {
    let copy_err = |e| Error::Copy {
        from:   staged.to_path_buf(),
        to:     dest.to_path_buf(),
        source: e,
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".haul-")
        .tempfile_in(sibling_dir(dest))
        .map_err(copy_err)?;
    let mut src = std::fs::File::open(staged).map_err(copy_err)?;
    io::copy(&mut src, tmp.as_file_mut()).map_err(copy_err)?;
    // The sibling temp starts at 0600; carry the staged mode across.
    let permissions = src.metadata().map_err(copy_err)?.permissions();
    tmp.as_file().set_permissions(permissions).map_err(copy_err)?;
    tmp.as_file().sync_all().map_err(copy_err)?;
    tmp.persist(dest).map_err(|e| Error::Move {
        from:   e.file.path().to_path_buf(),
        to:     dest.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

fn copy_dir_across(staged: &Path, dest: &Path) -> Result<()> {
    let copy_err = |e| Error::Copy {
        from:   staged.to_path_buf(),
        to:     dest.to_path_buf(),
        source: e,
    };
    let tmp = tempfile::Builder::new()
        .prefix(".haul-")
        .tempdir_in(sibling_dir(dest))
        .map_err(copy_err)?;
    copy_tree(staged, tmp.path())?;
    copy_permissions(staged, tmp.path())?;
    std::fs::rename(tmp.path(), dest).map_err(|e| Error::Move {
        from:   tmp.path().to_path_buf(),
        to:     dest.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

fn copy_tree(src: &Path, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest).map_err(|e| Error::CreateDir {
        path:   dest.to_path_buf(),
        source: e,
    })?;

    for entry in read_dir(src)? {
        let from = entry.path();
        let to = dest.join(entry.file_name());
        let ty = entry.file_type().map_err(|e| Error::Metadata {
            path:   from.clone(),
            source: e,
        })?;

        if ty.is_dir() {
            copy_tree(&from, &to)?;
            copy_permissions(&from, &to)?;
        } else if ty.is_symlink() {
            copy_symlink(&from, &to)?;
        } else {
            std::fs::copy(&from, &to).map_err(|e| Error::Copy {
                from:   from.clone(),
                to:     to.clone(),
                source: e,
            })?;
        }
    }
    Ok(())
}

fn copy_permissions(from: &Path, to: &Path) -> Result<()> {
    let permissions = std::fs::metadata(from)
        .map_err(|e| Error::Metadata {
            path:   from.to_path_buf(),
            source: e,
        })?
        .permissions();
    std::fs::set_permissions(to, permissions).map_err(|e| Error::Copy {
        from:   from.to_path_buf(),
        to:     to.to_path_buf(),
        source: e,
    })
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> Result<()> {
    let copy_err = |e| Error::Copy {
        from:   from.to_path_buf(),
        to:     to.to_path_buf(),
        source: e,
    };
    let target = std::fs::read_link(from).map_err(copy_err)?;
    std::os::unix::fs::symlink(target, to).map_err(copy_err)
}

#[cfg(not(unix))]
fn copy_symlink(from: &Path, to: &Path) -> Result<()> {
    std::fs::copy(from, to).map_err(|e| Error::Copy {
        from:   from.to_path_buf(),
        to:     to.to_path_buf(),
        source: e,
    })?;
    Ok(())
}
