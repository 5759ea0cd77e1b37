//! Line-delimited JSON codec with atomic replacement.

use super::{StoreError, StoreResult};
use log::{error, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, File};
use std::hash::Hash;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Reads every record of a JSONL file.
///
/// Blank lines are skipped. A missing file reads as an empty collection.
///
/// # Errors
/// - `StoreError::Corruption` with the 1-based line number of the first
///   undecodable line.
/// - `StoreError::Io` for any other filesystem failure.
pub fn read_all<T: DeserializeOwned>(path: &Path) -> StoreResult<Vec<T>> {
    let content = read_content(path)?;
    parse_lines(path, &content)
}

/// Like [`read_all`], pairing each record with its trimmed source line.
pub fn read_all_with_lines<T: DeserializeOwned>(path: &Path) -> StoreResult<Vec<(T, String)>> {
    let content = read_content(path)?;
    let mut records = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        records.push((decode_line(path, index, trimmed)?, trimmed.to_string()));
    }
    Ok(records)
}

/// Decodes JSONL content already loaded in memory.
///
/// `path` is only used for diagnostics.
pub fn parse_lines<T: DeserializeOwned>(path: &Path, content: &str) -> StoreResult<Vec<T>> {
    let mut records = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        records.push(decode_line(path, index, trimmed)?);
    }
    Ok(records)
}

fn read_content(path: &Path) -> StoreResult<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(StoreError::io(path, err)),
    }
}

fn decode_line<T: DeserializeOwned>(path: &Path, index: usize, line: &str) -> StoreResult<T> {
    serde_json::from_str(line).map_err(|err| StoreError::Corruption {
        path: path.to_path_buf(),
        line: index + 1,
        message: err.to_string(),
    })
}

/// Encodes one record as a compact JSON line, without the terminator.
pub fn encode_record<T: Serialize>(path: &Path, record: &T) -> StoreResult<String> {
    serde_json::to_string(record).map_err(|err| StoreError::Serialize {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

/// Encodes records as compact JSON, one per `\n`-terminated line.
pub fn encode_lines<T: Serialize>(path: &Path, records: &[T]) -> StoreResult<String> {
    let mut out = String::new();
    for record in records {
        out.push_str(&encode_record(path, record)?);
        out.push('\n');
    }
    Ok(out)
}

/// Replaces `path` with the encoded records.
///
/// Encoding happens before any file is touched, so a serialization failure
/// never produces a temp file.
pub fn write_all<T: Serialize>(path: &Path, records: &[T]) -> StoreResult<()> {
    let content = encode_lines(path, records)?;
    atomic_write(path, content.as_bytes())?;
    info!(
        "event=jsonl_write module=store status=ok records={} path={}",
        records.len(),
        path.display()
    );
    Ok(())
}

/// Replaces `path` with `records`, reusing the stored line of every record
/// that still decodes equal to the stored record with the same key.
///
/// Records the caller did not change keep their exact bytes, including key
/// order, explicit `null`s and empty arrays. Changed and new records are
/// re-encoded.
pub fn write_all_preserving<T, K, F>(path: &Path, records: &[T], key: F) -> StoreResult<()>
where
    T: Serialize + DeserializeOwned + PartialEq,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let stored: Vec<(T, String)> = read_all_with_lines(path)?;
    let mut by_key: HashMap<K, (&T, &str)> = HashMap::with_capacity(stored.len());
    for (record, line) in &stored {
        by_key.entry(key(record)).or_insert((record, line.as_str()));
    }

    let mut content = String::new();
    let mut reused = 0usize;
    for record in records {
        match by_key.get(&key(record)) {
            Some((previous, line)) if *previous == record => {
                content.push_str(line);
                reused += 1;
            }
            _ => content.push_str(&encode_record(path, record)?),
        }
        content.push('\n');
    }
    atomic_write(path, content.as_bytes())?;
    info!(
        "event=jsonl_write module=store status=ok records={} reused_lines={} path={}",
        records.len(),
        reused,
        path.display()
    );
    Ok(())
}

/// Writes bytes to a sibling temp file, syncs it, then renames it over `path`.
///
/// The temp file lives in the target directory so the rename stays on one
/// filesystem. It is removed on every failure path.
pub fn atomic_write(path: &Path, data: &[u8]) -> StoreResult<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|err| StoreError::io(&parent, err))?;

    let tmp_path = temp_path_for(&parent, path);
    if let Err(err) = write_and_sync(&tmp_path, data) {
        let _ = fs::remove_file(&tmp_path);
        error!(
            "event=atomic_write module=store status=error error_code=temp_write_failed path={} error={}",
            path.display(),
            err
        );
        return Err(StoreError::io(&tmp_path, err));
    }

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        error!(
            "event=atomic_write module=store status=error error_code=rename_failed path={} error={}",
            path.display(),
            err
        );
        return Err(StoreError::io(path, err));
    }

    sync_dir(&parent);
    Ok(())
}

fn write_and_sync(tmp_path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(tmp_path)?;
    file.write_all(data)?;
    file.sync_all()
}

fn temp_path_for(parent: &Path, target: &Path) -> PathBuf {
    let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "records".to_string());
    parent.join(format!(".{name}.tmp-{}-{seq}", std::process::id()))
}

#[cfg(unix)]
fn sync_dir(dir: &Path) {
    // Rename durability; failure here does not invalidate the committed rename.
    if let Ok(handle) = File::open(dir) {
        let _ = handle.sync_all();
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}

#[cfg(test)]
mod tests {
    use super::{atomic_write, parse_lines, read_all, write_all, write_all_preserving};
    use crate::store::StoreError;
    use serde_json::{json, Value};
    use std::fs;
    use std::path::Path;

    fn leftover_temp_files(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.contains(".tmp-"))
            .collect()
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let records: Vec<Value> = read_all(&dir.path().join("absent.jsonl")).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn blank_lines_are_skipped() {
        let records: Vec<Value> =
            parse_lines(Path::new("mem.jsonl"), "{\"a\":1}\n\n   \n{\"a\":2}\n").unwrap();
        assert_eq!(records, vec![json!({"a": 1}), json!({"a": 2})]);
    }

    #[test]
    fn malformed_line_fails_with_line_number() {
        let err = parse_lines::<Value>(Path::new("mem.jsonl"), "{\"a\":1}\n\n{oops\n")
            .unwrap_err();
        match err {
            StoreError::Corruption { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn write_then_read_is_byte_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.jsonl");
        let records = vec![
            json!({"id": "b", "title": "second", "tags": ["x", "y"]}),
            json!({"id": "a", "title": "first"}),
        ];
        write_all(&path, &records).unwrap();
        let first = fs::read(&path).unwrap();

        let reread: Vec<Value> = read_all(&path).unwrap();
        write_all(&path, &reread).unwrap();
        assert_eq!(fs::read(&path).unwrap(), first);
        assert!(leftover_temp_files(dir.path()).is_empty());
    }

    #[test]
    fn preserving_write_keeps_untouched_lines_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.jsonl");
        let foreign = r#"{"title":"kept","id":"a","body":null,"tags":[]}"#;
        fs::write(&path, format!("{foreign}\n{{\"id\":\"b\",\"title\":\"old\"}}\n")).unwrap();

        let mut records: Vec<Value> = read_all(&path).unwrap();
        records[1]["title"] = json!("new");
        records.insert(0, json!({"id": "c", "title": "added"}));
        write_all_preserving(&path, &records, |record| record["id"].clone().to_string()).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], r#"{"id":"c","title":"added"}"#);
        assert_eq!(lines[1], foreign);
        assert_eq!(lines[2], r#"{"id":"b","title":"new"}"#);
        assert!(leftover_temp_files(dir.path()).is_empty());
    }

    #[test]
    fn failed_rename_keeps_target_and_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("occupied");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep.txt"), "kept").unwrap();

        let err = atomic_write(&target, b"payload").unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert_eq!(fs::read_to_string(target.join("keep.txt")).unwrap(), "kept");
        assert!(leftover_temp_files(dir.path()).is_empty());
    }
}
