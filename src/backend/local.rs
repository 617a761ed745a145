// Directory-backed object store with a JSON catalog.
//
// Stands in for the S3/REST collaborators in the CLI and in tests; the
// pipeline only ever sees the StoreBackend trait.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::common::error::{Error, Result};
use crate::common::types::Outcome;
use crate::pipeline::StoreBackend;
use crate::remote::{Connector, StoreKeys};

/// One catalog entry per stored object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub key: String,
    pub size: u64,
    pub checksum: String,
    pub delivered: bool,
}

/// Object store rooted at a local directory.
///
/// Objects live under `<root>/objects`; the catalog is a JSON file at
/// `<root>/catalog.json`, rewritten on every registration/finalization.
#[derive(Debug)]
pub struct LocalStore {
    root: PathBuf,
    catalog_path: PathBuf,
    catalog: BTreeMap<String, CatalogEntry>,
}

impl LocalStore {
    /// Open (or initialize) a store rooted at `root`
    pub fn open(root: &Path) -> Result<Self> {
        fs::create_dir_all(root.join("objects"))?;

        let catalog_path = root.join("catalog.json");
        let catalog = if catalog_path.exists() {
            let data = fs::read_to_string(&catalog_path)?;
            serde_json::from_str(&data)
                .map_err(|err| Error::Catalog(format!("Could not decode catalog: {}", err)))?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            root: root.to_path_buf(),
            catalog_path,
            catalog,
        })
    }

    /// Catalog entry for `key`, if registered
    pub fn entry(&self, key: &str) -> Option<&CatalogEntry> {
        self.catalog.get(key)
    }

    /// Filesystem path holding the object for `key`.
    ///
    /// Keys may contain '/'; they are flattened so every object is a
    /// direct child of the objects directory.
    pub fn object_path(&self, key: &str) -> PathBuf {
        self.root.join("objects").join(key.replace('/', "__"))
    }

    fn save_catalog(&self) -> Result<()> {
        let data = serde_json::to_string_pretty(&self.catalog)
            .map_err(|err| Error::Catalog(format!("Could not encode catalog: {}", err)))?;
        fs::write(&self.catalog_path, data)?;
        Ok(())
    }
}

impl StoreBackend for LocalStore {
    fn put_object(&mut self, local: &Path, key: &str) -> Outcome {
        match fs::copy(local, self.object_path(key)) {
            Ok(_) => Outcome::ok(),
            Err(err) => Outcome::fail(format!("Failed to store '{}': {}", key, err)),
        }
    }

    fn register_file(&mut self, key: &str, checksum: &str) -> Outcome {
        let size = match fs::metadata(self.object_path(key)) {
            Ok(meta) => meta.len(),
            Err(err) => return Outcome::fail(format!("Stored object '{}' missing: {}", key, err)),
        };

        self.catalog.insert(
            key.to_string(),
            CatalogEntry {
                key: key.to_string(),
                size,
                checksum: checksum.to_string(),
                delivered: false,
            },
        );

        match self.save_catalog() {
            Ok(()) => Outcome::ok(),
            Err(err) => Outcome::fail(err.to_string()),
        }
    }

    fn fetch_object(&mut self, key: &str, dest: &Path) -> Outcome {
        let source = self.object_path(key);
        if !source.exists() {
            return Outcome::fail(format!("Object '{}' not found in store", key));
        }
        match fs::copy(&source, dest) {
            Ok(_) => Outcome::ok(),
            Err(err) => Outcome::fail(format!("Failed to fetch '{}': {}", key, err)),
        }
    }

    fn finalize_record(&mut self, key: &str) -> Outcome {
        match self.catalog.get_mut(key) {
            Some(entry) => {
                entry.delivered = true;
                match self.save_catalog() {
                    Ok(()) => Outcome::ok(),
                    Err(err) => Outcome::fail(err.to_string()),
                }
            }
            None => Outcome::fail(format!("No catalog record for '{}'", key)),
        }
    }

    fn recorded_checksum(&self, key: &str) -> Option<String> {
        self.catalog.get(key).map(|entry| entry.checksum.clone())
    }
}

/// Connector for the directory-backed store.
///
/// The endpoint URL is the store's root path; the keys stand in for
/// real credentials and must both be non-empty.
#[derive(Debug, Default)]
pub struct LocalConnector;

impl Connector for LocalConnector {
    type Session = LocalStore;

    fn connect(&self, endpoint_url: &str, keys: &StoreKeys) -> Result<LocalStore> {
        if keys.access_key.is_empty() || keys.secret_key.is_empty() {
            return Err(Error::Connection(
                "missing access or secret key".to_string(),
            ));
        }
        LocalStore::open(Path::new(endpoint_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_put_register_fetch_finalize() {
        let root = tempdir().unwrap();
        let scratch = tempdir().unwrap();
        let mut store = LocalStore::open(root.path()).unwrap();

        let source = scratch.path().join("data.bin");
        let mut f = fs::File::create(&source).unwrap();
        f.write_all(b"payload").unwrap();

        assert!(store.put_object(&source, "proj/data.bin").ok);
        assert!(store.register_file("proj/data.bin", "deadbeef").ok);

        let entry = store.entry("proj/data.bin").unwrap();
        assert_eq!(entry.size, 7);
        assert!(!entry.delivered);
        assert_eq!(
            store.recorded_checksum("proj/data.bin"),
            Some("deadbeef".to_string())
        );

        let dest = scratch.path().join("fetched.bin");
        assert!(store.fetch_object("proj/data.bin", &dest).ok);
        assert_eq!(fs::read(&dest).unwrap(), b"payload");

        assert!(store.finalize_record("proj/data.bin").ok);
        assert!(store.entry("proj/data.bin").unwrap().delivered);
    }

    #[test]
    fn test_catalog_persists_across_reopen() {
        let root = tempdir().unwrap();
        let scratch = tempdir().unwrap();

        let source = scratch.path().join("a.txt");
        fs::write(&source, b"abc").unwrap();

        {
            let mut store = LocalStore::open(root.path()).unwrap();
            store.put_object(&source, "a.txt");
            store.register_file("a.txt", "cafe");
        }

        let store = LocalStore::open(root.path()).unwrap();
        assert_eq!(store.recorded_checksum("a.txt"), Some("cafe".to_string()));
    }

    #[test]
    fn test_fetch_missing_object_fails() {
        let root = tempdir().unwrap();
        let scratch = tempdir().unwrap();
        let mut store = LocalStore::open(root.path()).unwrap();

        let outcome = store.fetch_object("ghost", &scratch.path().join("out"));
        assert!(!outcome.ok);
        assert!(outcome.message.contains("not found"));
    }

    #[test]
    fn test_connector_rejects_empty_keys() {
        let root = tempdir().unwrap();
        let connector = LocalConnector;

        let bad = StoreKeys {
            access_key: String::new(),
            secret_key: "sk".to_string(),
        };
        assert!(connector
            .connect(root.path().to_str().unwrap(), &bad)
            .is_err());

        let good = StoreKeys {
            access_key: "ak".to_string(),
            secret_key: "sk".to_string(),
        };
        assert!(connector
            .connect(root.path().to_str().unwrap(), &good)
            .is_ok());
    }
}
