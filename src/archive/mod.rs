// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A directory of reported errors, one file per error.
//!
//! Every archived error is written to `<dir>/<id>.ser`, where `<id>` is a random [`ErrorId`]. The
//! identifier is handed back to the caller (and attached to the log record) so the full error can
//! be looked up later, for example from a support ticket.
//!
//! ```
//! use logkeep::archive::ArchivedError;
//! use logkeep::archive::ErrorArchive;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let archive = ErrorArchive::new(dir.path());
//!
//! let id = archive.write(&ArchivedError::from_message("app", "disk full")).unwrap();
//! assert_eq!(archive.read(id).unwrap().message(), "disk full");
//! assert_eq!(archive.list().unwrap(), vec![id]);
//!
//! archive.delete(id).unwrap();
//! assert!(archive.is_empty().unwrap());
//! ```

use std::fs;
use std::fs::File;
use std::io;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;

pub use self::id::ErrorId;
pub use self::record::ArchivedError;
pub use self::record::ErrorKind;
pub(crate) use self::record::panic_message;
use crate::Error;

mod id;
mod record;

/// The suffix of every archive file.
pub const SUFFIX: &str = ".ser";

/// A keyed file store of [`ArchivedError`]s.
#[derive(Debug, Clone)]
pub struct ErrorArchive {
    dir: PathBuf,
}

impl ErrorArchive {
    /// Create an archive rooted at `dir`.
    ///
    /// The directory is created on the first [`write`](ErrorArchive::write).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory archive files are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save an error under a freshly generated id and return the id.
    ///
    /// A write that fails part way leaves no entry behind.
    pub fn write(&self, error: &ArchivedError) -> Result<ErrorId, Error> {
        self.write_entry(error)
    }

    fn write_entry<T: Serialize + ?Sized>(&self, value: &T) -> Result<ErrorId, Error> {
        fs::create_dir_all(&self.dir).map_err(|err| Error::io(&self.dir, err))?;

        let id = ErrorId::new_v4();
        let path = self.path_of(id);
        let file = File::create_new(&path).map_err(|err| Error::io(&path, err))?;
        let mut writer = BufWriter::new(file);
        let written = serde_json::to_writer_pretty(&mut writer, value)
            .map_err(|err| {
                if err.is_io() {
                    Error::io(&path, err.into())
                } else {
                    Error::Encode(err)
                }
            })
            .and_then(|()| writer.flush().map_err(|err| Error::io(&path, err)));

        if let Err(err) = written {
            drop(writer);
            let _ = fs::remove_file(&path);
            return Err(err);
        }
        Ok(id)
    }

    /// Load the error saved under `id`.
    ///
    /// # Errors
    ///
    /// Return [`Error::NotFound`] if nothing is archived under `id`.
    pub fn read(&self, id: ErrorId) -> Result<ArchivedError, Error> {
        let path = self.path_of(id);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Err(Error::NotFound(id)),
            Err(err) => return Err(Error::io(&path, err)),
        };
        serde_json::from_reader(BufReader::new(file)).map_err(|source| Error::Decode { id, source })
    }

    /// Remove the error saved under `id`.
    ///
    /// # Errors
    ///
    /// Return [`Error::NotFound`] if nothing is archived under `id`.
    pub fn delete(&self, id: ErrorId) -> Result<(), Error> {
        let path = self.path_of(id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(Error::NotFound(id)),
            Err(err) => Err(Error::io(&path, err)),
        }
    }

    /// List the ids of all archived errors, in ascending order.
    ///
    /// Directories and files that are not archive entries are skipped. A missing archive directory
    /// is treated as empty.
    pub fn list(&self) -> Result<Vec<ErrorId>, Error> {
        let mut ids = self.entries()?.into_iter().map(|(id, _)| id).collect::<Vec<_>>();
        ids.sort();
        Ok(ids)
    }

    /// Delete every archived error.
    ///
    /// Stop at the first entry that cannot be removed.
    pub fn clear(&self) -> Result<(), Error> {
        for (_, path) in self.entries()? {
            fs::remove_file(&path).map_err(|err| Error::io(&path, err))?;
        }
        Ok(())
    }

    /// The number of archived errors.
    pub fn len(&self) -> Result<usize, Error> {
        self.entries().map(|entries| entries.len())
    }

    pub fn is_empty(&self) -> Result<bool, Error> {
        self.len().map(|len| len == 0)
    }

    fn path_of(&self, id: ErrorId) -> PathBuf {
        self.dir.join(format!("{id}{SUFFIX}"))
    }

    fn entries(&self) -> Result<Vec<(ErrorId, PathBuf)>, Error> {
        let read_dir = match fs::read_dir(&self.dir) {
            Ok(read_dir) => read_dir,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
            Err(err) => return Err(Error::io(&self.dir, err)),
        };

        let mut entries = vec![];
        for entry in read_dir {
            let entry = entry.map_err(|err| Error::io(&self.dir, err))?;
            let file_type = entry.file_type().map_err(|err| Error::io(entry.path(), err))?;
            if file_type.is_dir() {
                continue;
            }
            if let Some(id) = entry.file_name().to_str().and_then(parse_file_name) {
                entries.push((id, entry.path()));
            }
        }
        Ok(entries)
    }
}

// only canonical `<hyphenated uuid>.ser` names belong to the archive
fn parse_file_name(name: &str) -> Option<ErrorId> {
    let stem = name.strip_suffix(SUFFIX)?;
    let id = stem.parse::<ErrorId>().ok()?;
    (id.to_string() == stem).then_some(id)
}

#[cfg(test)]
mod tests {
    use std::io;

    use tempfile::TempDir;

    use super::*;

    fn archive() -> (TempDir, ErrorArchive) {
        let dir = TempDir::new().expect("failed to create a temporary directory");
        let archive = ErrorArchive::new(dir.path().join("errors"));
        (dir, archive)
    }

    #[test]
    fn test_write_then_read() {
        let (_dir, archive) = archive();

        let err = io::Error::new(io::ErrorKind::PermissionDenied, "config is read-only");
        let archived = ArchivedError::from_error("app::config", &err).with_context("saving");
        let id = archive.write(&archived).unwrap();

        let path = archive.dir().join(format!("{id}.ser"));
        assert!(path.is_file());
        assert_eq!(archive.read(id).unwrap(), archived);
    }

    #[test]
    fn test_ids_are_unique() {
        let (_dir, archive) = archive();
        let archived = ArchivedError::from_message("app", "same error");
        let first = archive.write(&archived).unwrap();
        let second = archive.write(&archived).unwrap();
        assert_ne!(first, second);
        assert_eq!(archive.len().unwrap(), 2);
    }

    #[test]
    fn test_missing_entries() {
        let (_dir, archive) = archive();
        let id = ErrorId::new_v4();

        assert!(matches!(archive.read(id), Err(Error::NotFound(missing)) if missing == id));
        assert!(matches!(archive.delete(id), Err(Error::NotFound(missing)) if missing == id));
        assert!(archive.list().unwrap().is_empty());
        archive.clear().unwrap();
    }

    #[test]
    fn test_delete() {
        let (_dir, archive) = archive();
        let keep = archive.write(&ArchivedError::from_message("app", "keep")).unwrap();
        let gone = archive.write(&ArchivedError::from_message("app", "drop")).unwrap();

        archive.delete(gone).unwrap();
        assert_eq!(archive.list().unwrap(), vec![keep]);
        assert!(matches!(archive.read(gone), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_list_skips_foreign_files() {
        let (_dir, archive) = archive();
        let mut ids = vec![
            archive.write(&ArchivedError::from_message("app", "one")).unwrap(),
            archive.write(&ArchivedError::from_message("app", "two")).unwrap(),
            archive.write(&ArchivedError::from_message("app", "three")).unwrap(),
        ];
        ids.sort();

        fs::write(archive.dir().join("notes.txt"), "not an error").unwrap();
        fs::write(archive.dir().join("garbage.ser"), "{}").unwrap();
        fs::create_dir(archive.dir().join(format!("{}.ser", ErrorId::new_v4()))).unwrap();

        assert_eq!(archive.list().unwrap(), ids);

        archive.clear().unwrap();
        assert!(archive.is_empty().unwrap());
        assert!(archive.dir().join("notes.txt").exists());
        assert!(archive.dir().join("garbage.ser").exists());
    }

    #[test]
    fn test_corrupt_entry() {
        let (_dir, archive) = archive();
        let id = archive.write(&ArchivedError::from_message("app", "fine")).unwrap();
        fs::write(archive.dir().join(format!("{id}.ser")), "not json").unwrap();

        assert!(matches!(archive.read(id), Err(Error::Decode { id: bad, .. }) if bad == id));
    }

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("cannot encode"))
        }
    }

    #[test]
    fn test_failed_write_leaves_no_entry() {
        let (_dir, archive) = archive();
        let kept = archive.write(&ArchivedError::from_message("app", "kept")).unwrap();

        let err = archive.write_entry(&Unencodable).unwrap_err();
        assert!(matches!(err, Error::Encode(_)));

        assert_eq!(archive.list().unwrap(), vec![kept]);
        assert_eq!(fs::read_dir(archive.dir()).unwrap().count(), 1);
    }

    #[test]
    fn test_invalid_id() {
        let err = "../secrets".parse::<ErrorId>().unwrap_err();
        assert!(matches!(err, Error::InvalidId { ref input, .. } if input == "../secrets"));
    }
}
