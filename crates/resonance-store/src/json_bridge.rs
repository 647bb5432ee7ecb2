use std::fs;
use std::path::Path;

use resonance_core::{Snapshot, import_json};

use crate::error::{Result, StoreError};
use crate::store::Store;

impl Store {
    /// Replace the stored engine with the one in a snapshot file.
    pub fn import_json_file(&self, path: &Path) -> Result<()> {
        let json = fs::read_to_string(path)?;
        self.import_json_str(&json)
    }

    /// Replace the stored engine with the one in a snapshot string. The
    /// snapshot's event log becomes the stored log.
    pub fn import_json_str(&self, json: &str) -> Result<()> {
        let engine = import_json(json)?;
        self.replace_engine(&engine)
    }

    /// Export the stored engine, including its full persisted event log, to a
    /// snapshot file.
    pub fn export_json_file(&self, path: &Path) -> Result<()> {
        let json = self.export_json_string()?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn export_json_string(&self) -> Result<String> {
        let engine = self
            .load_engine()?
            .ok_or_else(|| StoreError::InvalidData("no engine has been initialized".to_string()))?;
        let mut snapshot = Snapshot::capture(&engine);
        snapshot.events = self.all_events()?;
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitive_types::U256;
    use resonance_core::{Address, CallContext, ResonanceEngine};

    fn u(v: u64) -> U256 {
        U256::from(v)
    }

    fn make_engine() -> ResonanceEngine {
        let keeper = Address::from_low_u64(3);
        let mut engine = ResonanceEngine::new(
            Address::from_low_u64(1),
            Address::from_low_u64(2),
            keeper,
            369,
        )
        .unwrap();
        let ctx = CallContext::new(keeper, 7, 400);
        engine.store_harmonic(&ctx, u(1), u(11)).unwrap();
        engine.record_resonant_point(&ctx, u(963)).unwrap();
        engine
    }

    #[test]
    fn test_import_export_roundtrip() {
        let store = Store::open_in_memory().unwrap();
        store.save_engine(&make_engine()).unwrap();
        let json = store.export_json_string().unwrap();

        let other = Store::open_in_memory().unwrap();
        other.import_json_str(&json).unwrap();

        let a = store.load_engine().unwrap().unwrap();
        let b = other.load_engine().unwrap().unwrap();
        assert_eq!(a.state(), b.state());
        assert_eq!(store.all_events().unwrap(), other.all_events().unwrap());
    }

    #[test]
    fn test_export_carries_persisted_log() {
        let store = Store::open_in_memory().unwrap();
        store.save_engine(&make_engine()).unwrap();
        // a reloaded engine has an empty in-memory log
        let reloaded = store.load_engine().unwrap().unwrap();
        store.save_engine(&reloaded).unwrap();

        let json = store.export_json_string().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], "1");
        assert_eq!(value["events"].as_array().unwrap().len(), 2);
        assert_eq!(value["events"][1]["event"]["kind"], "ResonantPointRecorded");
    }

    #[test]
    fn test_export_without_engine_fails() {
        let store = Store::open_in_memory().unwrap();
        assert!(matches!(
            store.export_json_string(),
            Err(StoreError::InvalidData(_))
        ));
    }

    #[test]
    fn test_import_export_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");

        let store = Store::open_in_memory().unwrap();
        store.save_engine(&make_engine()).unwrap();
        store.export_json_file(&path).unwrap();

        let other = Store::open_in_memory().unwrap();
        other.import_json_file(&path).unwrap();
        assert_eq!(other.harmonic(1).unwrap(), u(11));
        assert_eq!(other.harmonic(2).unwrap(), u(963));
    }

    #[test]
    fn test_import_invalid_json() {
        let store = Store::open_in_memory().unwrap();
        assert!(matches!(
            store.import_json_str("not json"),
            Err(StoreError::Json(_))
        ));
    }

    #[test]
    fn test_import_wrong_version() {
        let store = Store::open_in_memory().unwrap();
        store.save_engine(&make_engine()).unwrap();
        let json = store.export_json_string().unwrap();
        let json = json.replace("\"version\": \"1\"", "\"version\": \"9\"");
        assert!(matches!(
            store.import_json_str(&json),
            Err(StoreError::InvalidData(_))
        ));
    }

    #[test]
    fn test_import_missing_file() {
        let store = Store::open_in_memory().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let err = store
            .import_json_file(&dir.path().join("absent.json"))
            .unwrap_err();
        assert!(
            matches!(&err, StoreError::Io(e) if e.kind() == std::io::ErrorKind::NotFound),
            "{err}"
        );
    }

    #[test]
    fn test_export_to_missing_directory_is_io_error() {
        let store = Store::open_in_memory().unwrap();
        store.save_engine(&make_engine()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("snapshot.json");
        assert!(matches!(
            store.export_json_file(&path),
            Err(StoreError::Io(_))
        ));
    }
}
