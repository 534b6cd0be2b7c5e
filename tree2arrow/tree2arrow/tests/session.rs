use std::sync::{Arc, Mutex};

use tree2arrow::{
    Compression, FieldTreeReader, ImportError, ImportProgress, Importer, SessionState,
    WriteOptions,
};
use tree2arrow_core::{BranchDef, LeafShape, LeafType, RawEntry, RowSource, SourceError};

/// In-memory source producing `count` entries of one i32 branch; reads of
/// `fail_at` report a corrupt entry.
struct MemorySource {
    branches: Vec<BranchDef>,
    count: u64,
    fail_at: Option<u64>,
}

impl MemorySource {
    fn new(count: u64) -> Self {
        Self {
            branches: vec![BranchDef::single("x", LeafType::Int, LeafShape::Scalar)],
            count,
            fail_at: None,
        }
    }
}

impl RowSource for MemorySource {
    fn tree_name(&self) -> &str {
        "memory"
    }

    fn branches(&self) -> &[BranchDef] {
        &self.branches
    }

    fn entry_count(&self) -> u64 {
        self.count
    }

    fn read_entry(&mut self, index: u64, entry: &mut RawEntry) -> Result<(), SourceError> {
        if self.fail_at == Some(index) {
            return Err(SourceError::Corrupt {
                tree: "memory".to_string(),
                index,
                detail: "injected".to_string(),
            });
        }
        entry
            .branch_mut(0)
            .extend_from_slice(&(index as i32).to_le_bytes());
        Ok(())
    }
}

#[test]
fn failed_import_is_terminal_and_leaves_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = MemorySource::new(3000);
    source.fail_at = Some(2000);
    let mut importer = Importer::from_source(Box::new(source), dir.path());
    importer.set_quiet(true).unwrap();
    importer.set_field_tree_name("broken").unwrap();

    let err = importer.import().unwrap_err();
    assert!(matches!(err, ImportError::Source { entry: 2000, .. }));
    assert_eq!(importer.state(), SessionState::Failed);

    assert!(!dir.path().join("broken.parquet").exists());
    assert!(!dir.path().join("broken.parquet.tmp").exists());
    assert!(matches!(
        FieldTreeReader::open(dir.path(), "broken"),
        Err(ImportError::FieldTreeNotFound { .. })
    ));

    assert!(matches!(
        importer.import(),
        Err(ImportError::AlreadyAttempted)
    ));
    assert!(matches!(
        importer.set_field_tree_name("retry"),
        Err(ImportError::AlreadyAttempted)
    ));
    assert_eq!(importer.field_tree_name(), Some("broken"));
}

#[test]
fn setters_are_rejected_after_success() {
    let dir = tempfile::tempdir().unwrap();
    let mut importer = Importer::from_source(Box::new(MemorySource::new(2)), dir.path());
    importer.set_field_tree_name("done").unwrap();
    importer.set_quiet(true).unwrap();
    assert_eq!(importer.import().unwrap(), 2);

    let expect_imported = |result: Result<(), ImportError>| {
        assert!(matches!(
            result,
            Err(ImportError::AlreadyImported { entries: 2 })
        ));
    };
    expect_imported(importer.set_quiet(false));
    expect_imported(importer.set_write_options(WriteOptions::default()));
    expect_imported(importer.set_max_entries(None));
    expect_imported(importer.set_convert_dots_in_branch_names(true));
    expect_imported(importer.set_progress_callback(|_| {}));
    expect_imported(importer.set_field_tree_name("other"));
    assert_eq!(importer.state(), SessionState::Imported { entries: 2 });
}

#[test]
fn field_tree_name_is_validated() {
    let dir = tempfile::tempdir().unwrap();
    let mut importer = Importer::from_source(Box::new(MemorySource::new(0)), dir.path());

    assert!(matches!(
        importer.set_field_tree_name(""),
        Err(ImportError::DestinationNameMissing)
    ));
    assert!(matches!(
        importer.set_field_tree_name("a/b"),
        Err(ImportError::InvalidFieldTreeName { .. })
    ));
    assert_eq!(importer.state(), SessionState::Unconfigured);
}

#[test]
fn progress_is_reported_per_batch() {
    let dir = tempfile::tempdir().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let mut importer = Importer::from_source(Box::new(MemorySource::new(25)), dir.path());
    importer.set_field_tree_name("progress").unwrap();
    importer.set_quiet(true).unwrap();
    importer
        .set_write_options(WriteOptions {
            compression: Compression::Snappy,
            batch_size: 10,
            ..WriteOptions::default()
        })
        .unwrap();
    importer
        .set_progress_callback(move |p: ImportProgress| sink.lock().unwrap().push(p.entries_done))
        .unwrap();
    assert_eq!(importer.import().unwrap(), 25);

    assert_eq!(*seen.lock().unwrap(), vec![10, 20, 25]);
    let reader = FieldTreeReader::open(dir.path(), "progress").unwrap();
    assert_eq!(reader.value("x", 24).unwrap().try_i32().unwrap(), 24);
}

#[test]
fn conflicting_source_schema_is_reported() {
    struct Duplicated(Vec<BranchDef>);

    impl RowSource for Duplicated {
        fn tree_name(&self) -> &str {
            "dup"
        }
        fn branches(&self) -> &[BranchDef] {
            &self.0
        }
        fn entry_count(&self) -> u64 {
            0
        }
        fn read_entry(&mut self, _: u64, _: &mut RawEntry) -> Result<(), SourceError> {
            Ok(())
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let branch = BranchDef::single("x", LeafType::Int, LeafShape::Scalar);
    let source = Duplicated(vec![branch.clone(), branch]);
    let mut importer = Importer::from_source(Box::new(source), dir.path());
    importer.set_field_tree_name("dup").unwrap();

    let err = importer.import().unwrap_err();
    assert!(matches!(err, ImportError::Schema(ref e) if e.has_conflicts()));
    assert_eq!(importer.state(), SessionState::Failed);
}

#[test]
fn importer_is_send() {
    fn assert_send<T: Send>() {}
    assert_send::<Importer>();
}
