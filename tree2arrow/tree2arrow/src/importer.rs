//! One-shot import of a row-store tree into a columnar field-tree.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use tree2arrow_arrow::{EntryCopier, TranslateOptions, TranslatedSchema, translate_branches};
use tree2arrow_core::{RawEntry, RowSource};
use tree2arrow_rowstore::RowStoreFile;

use crate::{error::ImportError, options::WriteOptions, store::FieldTreeWriter};

/// Lifecycle of an [`Importer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No destination field-tree name yet.
    Unconfigured,
    /// Ready to import.
    Configured,
    /// Terminal: the field-tree was committed with `entries` entries.
    Imported { entries: u64 },
    /// Terminal: the import failed and nothing was committed.
    Failed,
}

/// Snapshot handed to the progress callback after every flushed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportProgress {
    pub entries_done: u64,
    pub entries_total: u64,
}

pub type ProgressCallback = Box<dyn FnMut(ImportProgress) + Send>;

/// Converts one source tree into one named field-tree of a destination
/// container.
///
/// An importer is single-shot: once [`import`](Self::import) has succeeded or
/// failed, every further call to it or to a setter is rejected.
pub struct Importer {
    source: Box<dyn RowSource + Send>,
    destination: PathBuf,
    field_tree_name: Option<String>,
    quiet: bool,
    write_options: WriteOptions,
    translate_options: TranslateOptions,
    max_entries: Option<u64>,
    progress: Option<ProgressCallback>,
    state: SessionState,
}

impl Importer {
    /// Open tree `tree_name` of the row-store container at `source_path`.
    pub fn create(
        source_path: impl AsRef<Path>,
        tree_name: &str,
        destination: impl Into<PathBuf>,
    ) -> Result<Self, ImportError> {
        let source_path = source_path.as_ref();
        let open_source_error = |source| ImportError::OpenSource {
            path: source_path.to_path_buf(),
            tree: tree_name.to_string(),
            source,
        };
        let file = RowStoreFile::open(source_path).map_err(open_source_error)?;
        let tree = file.open_tree(tree_name).map_err(open_source_error)?;
        Ok(Self::from_source(Box::new(tree), destination))
    }

    pub fn from_source(source: Box<dyn RowSource + Send>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source,
            destination: destination.into(),
            field_tree_name: None,
            quiet: false,
            write_options: WriteOptions::default(),
            translate_options: TranslateOptions::default(),
            max_entries: None,
            progress: None,
            state: SessionState::Unconfigured,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn field_tree_name(&self) -> Option<&str> {
        self.field_tree_name.as_deref()
    }

    fn ensure_not_terminal(&self) -> Result<(), ImportError> {
        match self.state {
            SessionState::Imported { entries } => Err(ImportError::AlreadyImported { entries }),
            SessionState::Failed => Err(ImportError::AlreadyAttempted),
            SessionState::Unconfigured | SessionState::Configured => Ok(()),
        }
    }

    /// Name of the field-tree created in the destination container.
    pub fn set_field_tree_name(&mut self, name: impl Into<String>) -> Result<(), ImportError> {
        self.ensure_not_terminal()?;
        let name = name.into();
        if name.is_empty() {
            return Err(ImportError::DestinationNameMissing);
        }
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(ImportError::InvalidFieldTreeName { name });
        }
        self.field_tree_name = Some(name);
        self.state = SessionState::Configured;
        Ok(())
    }

    /// Suppress progress logging.
    pub fn set_quiet(&mut self, quiet: bool) -> Result<(), ImportError> {
        self.ensure_not_terminal()?;
        self.quiet = quiet;
        Ok(())
    }

    pub fn set_write_options(&mut self, options: WriteOptions) -> Result<(), ImportError> {
        self.ensure_not_terminal()?;
        self.write_options = options;
        Ok(())
    }

    /// Import only the first `max` entries; `None` imports all of them.
    pub fn set_max_entries(&mut self, max: Option<u64>) -> Result<(), ImportError> {
        self.ensure_not_terminal()?;
        self.max_entries = max;
        Ok(())
    }

    /// Replace `.` in branch names with `_` instead of rejecting them.
    pub fn set_convert_dots_in_branch_names(&mut self, convert: bool) -> Result<(), ImportError> {
        self.ensure_not_terminal()?;
        self.translate_options.convert_dots = convert;
        Ok(())
    }

    pub fn set_progress_callback(
        &mut self,
        callback: impl FnMut(ImportProgress) + Send + 'static,
    ) -> Result<(), ImportError> {
        self.ensure_not_terminal()?;
        self.progress = Some(Box::new(callback));
        Ok(())
    }

    /// Run the import. Returns the number of entries copied.
    pub fn import(&mut self) -> Result<u64, ImportError> {
        self.ensure_not_terminal()?;
        let Some(name) = self.field_tree_name.clone() else {
            return Err(ImportError::DestinationNameMissing);
        };

        match self.run(&name) {
            Ok(entries) => {
                self.state = SessionState::Imported { entries };
                Ok(entries)
            }
            Err(err) => {
                tracing::debug!(field_tree = %name, error = %err, "import failed");
                self.state = SessionState::Failed;
                Err(err)
            }
        }
    }

    fn run(&mut self, name: &str) -> Result<u64, ImportError> {
        let schema = translate_branches(self.source.branches(), &self.translate_options)?;
        let total = match self.max_entries {
            Some(max) => max.min(self.source.entry_count()),
            None => self.source.entry_count(),
        };
        if !self.quiet {
            tracing::info!(
                tree = self.source.tree_name(),
                field_tree = name,
                fields = schema.fields().len(),
                entries = total,
                "importing"
            );
        }

        let session = ImportSession::begin(schema, &self.destination, name, &self.write_options)?;
        let entries = session.run(
            self.source.as_mut(),
            total,
            self.write_options.batch_size.max(1),
            self.progress.as_mut(),
            self.quiet,
        )?;

        if !self.quiet {
            tracing::info!(field_tree = name, entries, "import finished");
        }
        Ok(entries)
    }
}

impl fmt::Debug for Importer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Importer")
            .field("tree", &self.source.tree_name())
            .field("destination", &self.destination)
            .field("field_tree_name", &self.field_tree_name)
            .field("quiet", &self.quiet)
            .field("write_options", &self.write_options)
            .field("max_entries", &self.max_entries)
            .field("state", &self.state)
            .finish()
    }
}

/// Resources of one running import. Consumed by [`ImportSession::run`], so
/// the writer is either committed or dropped (and cleaned up) exactly once.
struct ImportSession {
    schema: TranslatedSchema,
    writer: FieldTreeWriter,
    copier: EntryCopier,
    entry: RawEntry,
    cursor: u64,
}

impl ImportSession {
    fn begin(
        schema: TranslatedSchema,
        destination: &Path,
        name: &str,
        options: &WriteOptions,
    ) -> Result<Self, ImportError> {
        let copier = if options.entry_column || schema.fields().is_empty() {
            EntryCopier::with_entry_column(&schema)
        } else {
            EntryCopier::new(&schema)
        }
        .map_err(|source| ImportError::Copy { entry: 0, source })?;
        let writer = FieldTreeWriter::create(destination, name, copier.schema().clone(), options)?;
        let entry = RawEntry::with_branches(schema.fields().len());
        Ok(Self {
            schema,
            writer,
            copier,
            entry,
            cursor: 0,
        })
    }

    fn run(
        mut self,
        source: &mut (dyn RowSource + Send),
        total: u64,
        batch_size: usize,
        mut progress: Option<&mut ProgressCallback>,
        quiet: bool,
    ) -> Result<u64, ImportError> {
        while self.cursor < total {
            let index = self.cursor;
            source
                .read_entry(index, &mut self.entry)
                .map_err(|source| ImportError::Source {
                    entry: index,
                    source,
                })?;
            self.copier
                .append_entry(index, &self.entry)
                .map_err(|source| ImportError::Copy {
                    entry: index,
                    source,
                })?;
            self.cursor += 1;

            if self.copier.len() >= batch_size {
                self.flush()?;
                let snapshot = ImportProgress {
                    entries_done: self.cursor,
                    entries_total: total,
                };
                if let Some(callback) = progress.as_deref_mut() {
                    callback(snapshot);
                }
                if !quiet {
                    tracing::info!(
                        done = snapshot.entries_done,
                        total = snapshot.entries_total,
                        "progress"
                    );
                }
            }
        }

        if !self.copier.is_empty() {
            self.flush()?;
        }
        if let Some(callback) = progress.as_deref_mut() {
            callback(ImportProgress {
                entries_done: self.cursor,
                entries_total: total,
            });
        }

        tracing::debug!(fields = self.schema.fields().len(), "committing field-tree");
        self.writer.commit()
    }

    fn flush(&mut self) -> Result<(), ImportError> {
        let batch = self.copier.finish_batch()?;
        self.writer.write(&batch)
    }
}
