//! Shared-library executor.

use std::path::PathBuf;

use libloading::{Library, Symbol};
use serde::Serialize;

use crate::artifact::ArtifactName;
use crate::config::ExecuteConfig;
use crate::error::{Error, Result};
use crate::paths::EngineDirs;
use crate::template::BRIDGE_ABI_VERSION;

use super::Executor;

/// Host view of `querygen_module` as emitted by the bridge template.
#[repr(C)]
struct ModuleTable {
    abi_version: u32,
    run: unsafe extern "C" fn() -> *mut libc::c_void,
    num_rows: unsafe extern "C" fn(*mut libc::c_void) -> libc::c_long,
    fetch_data: unsafe extern "C" fn(*mut libc::c_void) -> libc::c_long,
    release: unsafe extern "C" fn(*mut libc::c_void),
}

/// `querygen_init_<name>`.
type InitFn = unsafe extern "C" fn() -> *const ModuleTable;

/// Releases the native query when dropped, including on early return.
struct QueryHandle<'a> {
    table: &'a ModuleTable,
    ptr: *mut libc::c_void,
}

impl Drop for QueryHandle<'_> {
    fn drop(&mut self) {
        // Safety: ptr came from this table's run() and is released once.
        unsafe { (self.table.release)(self.ptr) }
    }
}

/// What a run of a compiled query reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    pub rows: i64,
    pub fetched: i64,
}

/// Loads `<artifact_dir>/<prefix><name>.<ext>` and drives its module table.
pub struct DylibExecutor {
    dirs: EngineDirs,
    config: ExecuteConfig,
    last_report: Option<ExecutionReport>,
}

impl DylibExecutor {
    pub fn new(dirs: EngineDirs, config: ExecuteConfig) -> Self {
        Self {
            dirs,
            config,
            last_report: None,
        }
    }

    /// Path the library for `name` is expected at.
    pub fn library_path(&self, name: &ArtifactName) -> PathBuf {
        self.dirs
            .library_path(name.as_str(), &self.config.library_prefix)
    }

    /// Report of the most recent successful run.
    pub fn last_report(&self) -> Option<ExecutionReport> {
        self.last_report
    }

    /// Load the artifact, run its query and read back the results.
    pub fn run(&self, name: &ArtifactName) -> Result<ExecutionReport> {
        let path = self.library_path(name);
        if !path.exists() {
            return Err(Error::Execution(format!(
                "compiled artifact for '{}' not found at {}",
                name,
                path.display()
            )));
        }

        tracing::info!("Loading {}", path.display());

        // Safety: loading runs the library's static initializers; the
        // library is one our own build produced.
        let library = unsafe { Library::new(&path)? };

        let symbol_name = format!("{}{}", self.config.init_symbol_prefix, name);
        let table_ptr = {
            // Safety: the bridge template declares this symbol with InitFn's signature.
            let init: Symbol<InitFn> = unsafe { library.get(symbol_name.as_bytes()) }
                .map_err(|e| {
                    Error::Execution(format!("Failed to get symbol {}: {}", symbol_name, e))
                })?;
            unsafe { init() }
        };

        // Safety: the table is a static inside the library, which stays
        // loaded until after the handle is released below.
        let table = unsafe { table_ptr.as_ref() }
            .ok_or_else(|| Error::Execution(format!("{} returned no module table", symbol_name)))?;

        if table.abi_version != BRIDGE_ABI_VERSION {
            return Err(Error::Execution(format!(
                "module '{}' has bridge ABI version {}, expected {}",
                name, table.abi_version, BRIDGE_ABI_VERSION
            )));
        }

        // Safety: calling generated bridge code through its declared signatures.
        let ptr = unsafe { (table.run)() };
        if ptr.is_null() {
            return Err(Error::Execution(format!("query '{}' failed to run", name)));
        }
        let handle = QueryHandle { table, ptr };

        let report = unsafe {
            ExecutionReport {
                rows: (table.num_rows)(handle.ptr) as i64,
                fetched: (table.fetch_data)(handle.ptr) as i64,
            }
        };

        drop(handle);
        drop(library);

        tracing::info!(
            "Query '{}' returned {} rows (fetch: {})",
            name,
            report.rows,
            report.fetched
        );
        Ok(report)
    }
}

impl Executor for DylibExecutor {
    fn execute(&mut self, name: &ArtifactName) -> Result<()> {
        let report = self.run(name)?;
        self.last_report = Some(report);
        Ok(())
    }
}
