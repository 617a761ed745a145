// Transfer orchestration: composes the status guards per file

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::common::config::TransferConfig;
use crate::common::types::{Outcome, SubOperation};
use crate::fsops::ensure_subpath;
use crate::status::guard::proceed_guarded;
use crate::status::subop::guard_sub_operation;
use crate::status::FileStatusStore;
use crate::verify::{compute_file_digest, file_chunks, verify_checksum};

/// External collaborator boundary for the object store and the delivery
/// catalog. REST and S3 details live behind this trait.
pub trait StoreBackend {
    /// Upload a local file under `key`
    fn put_object(&mut self, local: &Path, key: &str) -> Outcome;

    /// Record the uploaded file in the delivery catalog
    fn register_file(&mut self, key: &str, checksum: &str) -> Outcome;

    /// Download the object at `key` to `dest`
    fn fetch_object(&mut self, key: &str, dest: &Path) -> Outcome;

    /// Mark the catalog record for `key` as delivered
    fn finalize_record(&mut self, key: &str) -> Outcome;

    /// Digest recorded in the catalog for `key`, if any
    fn recorded_checksum(&self, key: &str) -> Option<String>;
}

/// One file scheduled for transfer
#[derive(Debug, Clone)]
pub struct FileSpec {
    /// Catalog key identifying the object remotely
    pub key: String,
    /// Local source path for uploads; target file name for downloads
    pub local_path: PathBuf,
    /// Directory below the destination root the file belongs in
    pub subpath: PathBuf,
}

impl FileSpec {
    pub fn new(key: &str, local_path: PathBuf) -> Self {
        Self {
            key: key.to_string(),
            local_path,
            subpath: PathBuf::new(),
        }
    }

    pub fn with_subpath(mut self, subpath: PathBuf) -> Self {
        self.subpath = subpath;
        self
    }
}

/// Per-file summary for the end-of-run report
#[derive(Debug, Clone)]
pub struct FileReport {
    pub key: String,
    pub ok: bool,
    pub message: String,
    pub failed_op: Option<SubOperation>,
}

/// Aggregated results of one upload/download session
#[derive(Debug, Clone, Default)]
pub struct SessionReport {
    pub files: Vec<FileReport>,
}

impl SessionReport {
    pub fn all_ok(&self) -> bool {
        self.files.iter().all(|f| f.ok)
    }

    pub fn delivered(&self) -> usize {
        self.files.iter().filter(|f| f.ok).count()
    }

    pub fn failed(&self) -> Vec<&FileReport> {
        self.files.iter().filter(|f| !f.ok).collect()
    }
}

/// Drives a set of files through the guarded upload/download flows.
///
/// Owns the per-session status table and the cooperative stop flag; the
/// store backend is passed in by the caller so connection management
/// stays outside the core.
pub struct TransferPipeline {
    status: FileStatusStore,
    stop: Arc<AtomicBool>,
    config: TransferConfig,
}

impl TransferPipeline {
    pub fn new(config: TransferConfig) -> Self {
        Self {
            status: FileStatusStore::new(),
            stop: Arc::new(AtomicBool::new(false)),
            config,
        }
    }

    /// Shared flag for cooperative interrupt; checked at the start of
    /// every guarded per-file operation.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn status(&self) -> &FileStatusStore {
        &self.status
    }

    /// Register the whole upload set before any guarded operation runs
    pub fn register_uploads(&self, files: &[FileSpec]) {
        for spec in files {
            self.status.register(&spec.key, &SubOperation::UPLOAD);
        }
    }

    /// Register the whole download set before any guarded operation runs
    pub fn register_downloads(&self, files: &[FileSpec]) {
        for spec in files {
            self.status.register(&spec.key, &SubOperation::DOWNLOAD);
        }
    }

    /// Upload one registered file: transfer to the store, then register
    /// it in the catalog with its SHA-256 digest.
    pub fn upload_one(&self, backend: &mut dyn StoreBackend, spec: &FileSpec) -> bool {
        let status = &self.status;
        let chunk_size = self.config.chunk_size;

        proceed_guarded(
            status,
            &spec.key,
            self.config.break_on_fail,
            &self.stop,
            || {
                let digest = match compute_file_digest(&spec.local_path, chunk_size) {
                    Ok(digest) => digest,
                    Err(err) => {
                        return Outcome::fail(format!(
                            "Failed to read '{}': {}",
                            spec.local_path.display(),
                            err
                        ))
                    }
                };

                let (outcome, _) = guard_sub_operation(
                    status,
                    &spec.key,
                    SubOperation::TransferToStore.as_str(),
                    || (backend.put_object(&spec.local_path, &spec.key), ()),
                );
                if !outcome.ok {
                    return outcome;
                }

                let (outcome, _) = guard_sub_operation(
                    status,
                    &spec.key,
                    SubOperation::RegisterInCatalog.as_str(),
                    || (backend.register_file(&spec.key, &digest), ()),
                );
                outcome
            },
        )
    }

    /// Download one registered file into `destination/subpath`, with
    /// optional checksum verification against the catalog digest, then
    /// finalize its catalog record.
    pub fn download_one(&self, backend: &mut dyn StoreBackend, spec: &FileSpec) -> bool {
        let status = &self.status;
        let chunk_size = self.config.chunk_size;
        let do_verify = self.config.verify_checksum;

        proceed_guarded(
            status,
            &spec.key,
            self.config.break_on_fail,
            &self.stop,
            || {
                ensure_subpath(&self.config.destination, &spec.subpath, |dir| {
                    let dest = dir.join(&spec.local_path);

                    let expected = backend.recorded_checksum(&spec.key);
                    if do_verify && expected.is_none() {
                        return Outcome::fail(format!(
                            "No recorded checksum for '{}' in catalog",
                            spec.key
                        ));
                    }
                    let expected = expected.unwrap_or_default();

                    let (outcome, _) = guard_sub_operation(
                        status,
                        &spec.key,
                        SubOperation::FetchFromStore.as_str(),
                        || {
                            let fetched = backend.fetch_object(&spec.key, &dest);
                            if !fetched.ok {
                                // Verification is skipped when the fetch
                                // itself fails.
                                return (fetched, ());
                            }
                            let verified = verify_checksum(&expected, do_verify, || {
                                file_chunks(&dest, chunk_size)
                            });
                            (verified, ())
                        },
                    );
                    if !outcome.ok {
                        return outcome;
                    }

                    let (outcome, _) = guard_sub_operation(
                        status,
                        &spec.key,
                        SubOperation::FinalizeRecord.as_str(),
                        || (backend.finalize_record(&spec.key), ()),
                    );
                    outcome
                })
            },
        )
    }

    /// Register and upload a whole file set
    pub fn upload_all(&self, backend: &mut dyn StoreBackend, files: &[FileSpec]) -> SessionReport {
        self.register_uploads(files);
        for spec in files {
            self.upload_one(backend, spec);
        }
        self.report(files)
    }

    /// Register and download a whole file set
    pub fn download_all(
        &self,
        backend: &mut dyn StoreBackend,
        files: &[FileSpec],
    ) -> SessionReport {
        self.register_downloads(files);
        for spec in files {
            self.download_one(backend, spec);
        }
        self.report(files)
    }

    /// Aggregate per-file results, in the order the files were given
    pub fn report(&self, files: &[FileSpec]) -> SessionReport {
        let mut report = SessionReport::default();
        for spec in files {
            if let Some(record) = self.status.record(&spec.key) {
                let ok = !record.cancel
                    && !record.operations.is_empty()
                    && record.operations.values().all(|s| s.done);
                report.files.push(FileReport {
                    key: spec.key.clone(),
                    ok,
                    message: record.message.clone(),
                    failed_op: record.failed_op,
                });
            }
        }
        report
    }
}
