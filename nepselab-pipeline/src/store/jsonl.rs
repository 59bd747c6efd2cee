//! Typed newline-delimited JSON files.
//!
//! One record per line. Appends open the file in append mode; replacements
//! write `<file>.tmp` and rename it into place so a reader never sees a
//! half-written store.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::StoreError;

#[derive(Debug, Clone)]
pub struct JsonlStore<T> {
    path: PathBuf,
    _record: PhantomData<fn() -> T>,
}

impl<T> JsonlStore<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read every record. A missing file is an empty store; blank lines are
    /// ignored; any other line that fails to parse is an error.
    pub fn read_all(&self) -> Result<Vec<T>, StoreError> {
        if !self.exists() {
            return Ok(Vec::new());
        }
        let file = File::open(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        let mut records = Vec::new();

        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| StoreError::io(&self.path, e))?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).map_err(|source| StoreError::Malformed {
                path: self.path.clone(),
                line: idx + 1,
                source,
            })?;
            records.push(record);
        }
        Ok(records)
    }

    /// Append records, creating the file and its parents if needed.
    pub fn append(&self, records: &[T]) -> Result<(), StoreError> {
        self.ensure_parent()?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::io(&self.path, e))?;
        self.write_lines(file, records, &self.path)
    }

    /// Atomically replace the whole file with `records`.
    pub fn replace(&self, records: &[T]) -> Result<(), StoreError> {
        self.ensure_parent()?;
        let tmp_path = self.path.with_extension("jsonl.tmp");
        let file = File::create(&tmp_path).map_err(|e| StoreError::io(&tmp_path, e))?;
        if let Err(e) = self.write_lines(file, records, &tmp_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            StoreError::io(&self.path, e)
        })
    }

    fn ensure_parent(&self) -> Result<(), StoreError> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))
            }
            _ => Ok(()),
        }
    }

    fn write_lines(&self, file: File, records: &[T], path: &Path) -> Result<(), StoreError> {
        let mut writer = BufWriter::new(file);
        for record in records {
            let json = serde_json::to_string(record)?;
            writeln!(writer, "{json}").map_err(|e| StoreError::io(path, e))?;
        }
        writer.flush().map_err(|e| StoreError::io(path, e))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| StoreError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: u32,
        name: String,
    }

    fn row(id: u32) -> Row {
        Row {
            id,
            name: format!("row{id}"),
        }
    }

    #[test]
    fn missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store: JsonlStore<Row> = JsonlStore::new(dir.path().join("none.jsonl"));
        assert!(!store.exists());
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn append_creates_parents_and_accumulates() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::new(dir.path().join("a/b/rows.jsonl"));
        store.append(&[row(1), row(2)]).unwrap();
        store.append(&[row(3)]).unwrap();
        assert_eq!(store.read_all().unwrap(), vec![row(1), row(2), row(3)]);
    }

    #[test]
    fn replace_overwrites_and_leaves_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::new(dir.path().join("rows.jsonl"));
        store.append(&[row(1), row(2)]).unwrap();
        store.replace(&[row(9)]).unwrap();
        assert_eq!(store.read_all().unwrap(), vec![row(9)]);
        assert!(!dir.path().join("rows.jsonl.tmp").exists());
    }

    #[test]
    fn blank_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.jsonl");
        fs::write(&path, "{\"id\":1,\"name\":\"row1\"}\n\n   \n").unwrap();
        let store: JsonlStore<Row> = JsonlStore::new(path);
        assert_eq!(store.read_all().unwrap(), vec![row(1)]);
    }

    #[test]
    fn malformed_line_is_a_hard_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.jsonl");
        fs::write(&path, "{\"id\":1,\"name\":\"row1\"}\n{not json\n").unwrap();
        let store: JsonlStore<Row> = JsonlStore::new(path);
        match store.read_all() {
            Err(StoreError::Malformed { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected malformed error, got {other:?}"),
        }
    }
}
