use crate::error::AppError;
use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tracing::debug;

pub(crate) type SlotMap = BTreeMap<String, String>;

/// Reads a slot file. A missing file is an empty store.
pub(crate) fn load_slots(path: &Path) -> Result<SlotMap, AppError> {
    match fs::read_to_string(path) {
        Ok(text) if text.trim().is_empty() => Ok(SlotMap::new()),
        Ok(text) => serde_json::from_str(&text).map_err(|e| {
            AppError::Storage(format!("corrupt slot file {}: {e}", path.display()))
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Slot file {} not found, starting empty", path.display());
            Ok(SlotMap::new())
        }
        Err(e) => Err(AppError::Io(e)),
    }
}

/// Writes the whole map next to `path` and renames it into place.
pub(crate) fn persist_slots(path: &Path, slots: &SlotMap) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    let body = serde_json::to_vec_pretty(slots)?;
    {
        let mut file = fs::File::create(tmp_path)?;
        file.write_all(&body)?;
        file.sync_all()?;
    }
    fs::rename(tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests_slot_files {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let slots = load_slots(&dir.path().join("absent.json")).unwrap();
        assert!(slots.is_empty());
    }

    #[test]
    fn test_persist_creates_parent_and_leaves_no_tmp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let mut slots = SlotMap::new();
        slots.insert("access_token".to_string(), "abc".to_string());

        persist_slots(&path, &slots).unwrap();

        assert_eq!(load_slots(&path).unwrap(), slots);
        assert!(!dir.path().join("nested").join("session.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_storage_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let err = load_slots(&path).unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
    }
}
