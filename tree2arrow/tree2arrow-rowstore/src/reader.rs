//! Memory-mapped row-store container reader.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use memmap2::Mmap;
use tree2arrow_core::{BranchDef, RawEntry, RowSource, SourceError};

use crate::{
    error::{RowStoreError, into_source_error},
    format::{MAGIC, get_bytes, get_str, get_u32, get_u64, skip_entry},
    title::parse_title,
};

#[derive(Debug, Clone)]
struct TreeHeader {
    name: String,
    branches: Vec<BranchDef>,
    entry_count: u64,
    data_start: usize,
    data_len: usize,
}

/// An opened row-store container. Tree headers are parsed eagerly; entry
/// data is read lazily through the shared memory map.
pub struct RowStoreFile {
    path: PathBuf,
    mmap: Arc<Mmap>,
    trees: Vec<TreeHeader>,
}

impl RowStoreFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RowStoreError> {
        let path = path.as_ref();
        let file = fs::File::open(path)?;
        let mmap = unsafe { Mmap::map(&file) }?;

        let trees = read_headers(&mmap).map_err(|e| match e {
            RowStoreError::Corrupt { .. } if !mmap.starts_with(MAGIC) => RowStoreError::BadMagic {
                path: path.display().to_string(),
            },
            other => other,
        })?;
        tracing::debug!(
            path = %path.display(),
            trees = trees.len(),
            "opened row-store container"
        );

        Ok(Self {
            path: path.to_path_buf(),
            mmap: Arc::new(mmap),
            trees,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of all trees in the container, in file order.
    pub fn tree_names(&self) -> impl Iterator<Item = &str> {
        self.trees.iter().map(|t| t.name.as_str())
    }

    /// Open a tree for entry-wise reading.
    pub fn open_tree(&self, name: &str) -> Result<TreeReader, RowStoreError> {
        let header = self
            .trees
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| RowStoreError::TreeNotFound {
                tree: name.to_string(),
                path: self.path.display().to_string(),
            })?;

        // Entries of a tree without branches occupy no bytes.
        let mut offsets = Vec::new();
        if !header.branches.is_empty() {
            let data = &self.mmap[header.data_start..header.data_start + header.data_len];
            let mut cursor = data;
            offsets.reserve(header.entry_count as usize);
            for index in 0..header.entry_count {
                offsets.push(header.data_start + (data.len() - cursor.len()));
                skip_entry(&mut cursor, header.branches.len(), index)?;
            }
            if !cursor.is_empty() {
                return Err(RowStoreError::corrupt(format!(
                    "{} trailing bytes after the last entry of tree '{name}'",
                    cursor.len()
                )));
            }
        }

        Ok(TreeReader {
            name: header.name.clone(),
            branches: header.branches.clone(),
            mmap: Arc::clone(&self.mmap),
            entry_count: header.entry_count,
            offsets,
        })
    }
}

fn read_headers(bytes: &[u8]) -> Result<Vec<TreeHeader>, RowStoreError> {
    let mut cursor = bytes;
    let magic = get_bytes(&mut cursor, MAGIC.len(), "magic")?;
    if magic != MAGIC {
        return Err(RowStoreError::corrupt("bad magic"));
    }

    // Counts come from the file, so nothing is presized from them.
    let tree_count = get_u32(&mut cursor, "tree count")?;
    let mut trees = Vec::new();
    for _ in 0..tree_count {
        let name = get_str(&mut cursor, "tree name")?;
        let branch_count = get_u32(&mut cursor, "branch count")?;
        let mut branches = Vec::new();
        for _ in 0..branch_count {
            let branch_name = get_str(&mut cursor, "branch name")?;
            let title = get_str(&mut cursor, "branch title")?;
            branches.push(BranchDef::new(branch_name, parse_title(&title)?));
        }
        let entry_count = get_u64(&mut cursor, "entry count")?;
        let data_len = usize::try_from(get_u64(&mut cursor, "data length")?)
            .map_err(|_| RowStoreError::corrupt(format!("data of tree '{name}' is too large")))?;
        check_entry_count(&name, branches.len(), entry_count, data_len)?;
        let data_start = bytes.len() - cursor.len();
        get_bytes(&mut cursor, data_len, "tree data")?;

        trees.push(TreeHeader {
            name,
            branches,
            entry_count,
            data_start,
            data_len,
        });
    }
    Ok(trees)
}

/// Every entry stores a `u32` length per branch, so `data_len` bounds the
/// number of entries a tree with branches can hold.
fn check_entry_count(
    tree: &str,
    branch_count: usize,
    entry_count: u64,
    data_len: usize,
) -> Result<(), RowStoreError> {
    if branch_count == 0 {
        return if data_len == 0 {
            Ok(())
        } else {
            Err(RowStoreError::corrupt(format!(
                "tree '{tree}' has no branches but {data_len} data bytes"
            )))
        };
    }
    let min_entry_len = (branch_count as u64).saturating_mul(4);
    if entry_count > data_len as u64 / min_entry_len {
        return Err(RowStoreError::corrupt(format!(
            "tree '{tree}' claims {entry_count} entries in {data_len} data bytes"
        )));
    }
    Ok(())
}

/// Entry-wise reader of one tree; implements [`RowSource`].
pub struct TreeReader {
    name: String,
    branches: Vec<BranchDef>,
    mmap: Arc<Mmap>,
    entry_count: u64,
    offsets: Vec<usize>,
}

impl TreeReader {
    fn load(&self, index: u64, entry: &mut RawEntry) -> Result<(), RowStoreError> {
        if self.branches.is_empty() {
            return Ok(());
        }
        let offset = self.offsets[index as usize];
        let mut cursor = &self.mmap[offset..];
        for b in 0..self.branches.len() {
            let len = get_u32(&mut cursor, "branch length")? as usize;
            let bytes = get_bytes(&mut cursor, len, &self.branches[b].name)?;
            entry.branch_mut(b).extend_from_slice(bytes);
        }
        Ok(())
    }
}

impl RowSource for TreeReader {
    fn tree_name(&self) -> &str {
        &self.name
    }

    fn branches(&self) -> &[BranchDef] {
        &self.branches
    }

    fn entry_count(&self) -> u64 {
        self.entry_count
    }

    fn read_entry(&mut self, index: u64, entry: &mut RawEntry) -> Result<(), SourceError> {
        if index >= self.entry_count() {
            return Err(SourceError::EntryOutOfRange {
                tree: self.name.clone(),
                index,
                count: self.entry_count(),
            });
        }
        self.load(index, entry)
            .map_err(|e| into_source_error(&self.name, index, e))
    }
}
