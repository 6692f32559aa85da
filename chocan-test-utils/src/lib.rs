use std::path::{Path, PathBuf};
use std::sync::Once;

use tempfile::TempDir;

static INIT: Once = Once::new();

/// Initialize tracing for test binaries. Safe to call multiple times.
pub fn init_tracing_for_tests() {
    INIT.call_once(|| {
        use tracing_subscriber::filter::EnvFilter;
        use tracing_subscriber::fmt;
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        // Another harness may already own the global subscriber.
        let _ = fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_test_writer()
            .try_init();
    });
}

/// Throwaway storage and report directories under one temp root.
///
/// Both directories exist on creation and are removed on drop.
pub struct TestDirs {
    root: TempDir,
    storage: PathBuf,
    reports: PathBuf,
}

impl TestDirs {
    pub fn new() -> std::io::Result<Self> {
        let root = tempfile::tempdir()?;
        let storage = root.path().join("storage");
        let reports = root.path().join("reports");
        std::fs::create_dir(&storage)?;
        std::fs::create_dir(&reports)?;
        Ok(Self {
            root,
            storage,
            reports,
        })
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage
    }

    pub fn report_dir(&self) -> &Path {
        &self.reports
    }
}

#[cfg(feature = "auto-init")]
mod auto {
    // Runs at binary init so individual tests need not call it.
    use ctor::ctor;

    #[ctor]
    fn init() {
        super::init_tracing_for_tests();
    }
}
