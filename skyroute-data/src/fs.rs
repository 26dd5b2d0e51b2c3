//! Capability-based file access helpers built on `cap-std` and `camino`.

use std::io;

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8};

/// Open a UTF-8 file path using ambient authority.
///
/// # Errors
/// Propagates the underlying I/O error.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Open the parent directory of `path` and return it with the file name.
///
/// A bare file name resolves against the current directory.
///
/// # Errors
/// Fails when `path` has no file name or the directory cannot be opened.
pub fn open_parent_dir(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other("path should include a file name"))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Whether `path` exists and is a regular file.
///
/// # Errors
/// Propagates I/O errors other than the entry being absent.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_parent_dir(path)?;
    match dir.metadata(name.as_str()) {
        Ok(meta) => Ok(meta.is_file()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    fn distinguishes_files_directories_and_missing_entries() {
        let dir = TempDir::new().expect("create temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir");
        let file = root.join("instance.json");
        std::fs::write(&file, "{}").expect("write file");

        assert!(file_is_file(&file).expect("metadata"));
        assert!(!file_is_file(&root.join("missing.json")).expect("metadata"));
        std::fs::create_dir(root.join("nested")).expect("create dir");
        assert!(!file_is_file(&root.join("nested")).expect("metadata"));
    }

    #[rstest]
    fn open_reports_missing_file() {
        let err = open_utf8_file(Utf8Path::new("definitely/not/here.json")).expect_err("missing");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
