//! Row-store container writer.

use std::{
    fs,
    io::{BufWriter, Write},
    path::Path,
};

use bytes::BufMut;
use tree2arrow_core::{BranchDef, LeafShape, LeafType};

use crate::{
    error::RowStoreError,
    format::{MAGIC, put_str},
    title::parse_title,
};

/// Accumulates the branches and entries of one tree.
///
/// Entries are filled the way a row-oriented writer reads branch addresses:
/// every fill takes one raw buffer per branch and stores exactly the bytes the
/// branch layout describes.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    name: String,
    branches: Vec<BranchDef>,
    data: Vec<u8>,
    entry_count: u64,
}

impl TreeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            branches: Vec::new(),
            data: Vec::new(),
            entry_count: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn branches(&self) -> &[BranchDef] {
        &self.branches
    }

    pub fn entry_count(&self) -> u64 {
        self.entry_count
    }

    /// Declare a branch described by a leaf-list title (`a/I:b/I`,
    /// `c[4]/C`, `myString/C`). Returns the branch index.
    pub fn add_branch(&mut self, name: &str, title: &str) -> Result<usize, RowStoreError> {
        if self.entry_count > 0 {
            return Err(RowStoreError::UnsupportedLayout {
                branch: name.to_string(),
                detail: "branches must be declared before the first fill".to_string(),
            });
        }
        if self.branches.iter().any(|b| b.name == name) {
            return Err(RowStoreError::DuplicateBranch {
                tree: self.name.clone(),
                branch: name.to_string(),
            });
        }

        let leaves = parse_title(title)?;
        if leaves.len() > 1
            && let Some(leaf) = leaves.iter().find(|l| l.fixed_size().is_none())
        {
            return Err(RowStoreError::UnsupportedLayout {
                branch: name.to_string(),
                detail: format!("leaf '{leaf}' has no fixed size inside a leaf-list"),
            });
        }

        self.branches.push(BranchDef::new(name, leaves));
        Ok(self.branches.len() - 1)
    }

    /// Declare a single-leaf scalar branch of the given type.
    pub fn add_scalar_branch(
        &mut self,
        name: &str,
        leaf_type: LeafType,
    ) -> Result<usize, RowStoreError> {
        self.add_branch(name, &format!("{name}/{}", leaf_type.code()))
    }

    /// Append one entry. `buffers` holds one raw little-endian buffer per
    /// branch in declaration order.
    ///
    /// Fixed-size branches read exactly their declared size from the front of
    /// the buffer. C-string branches read up to and including the first NUL.
    pub fn fill(&mut self, buffers: &[&[u8]]) -> Result<(), RowStoreError> {
        if buffers.len() != self.branches.len() {
            return Err(RowStoreError::EntryShape {
                tree: self.name.clone(),
                branch: String::new(),
                detail: format!(
                    "expected {} buffers, got {}",
                    self.branches.len(),
                    buffers.len()
                ),
            });
        }

        let mut entry = Vec::new();
        for (branch, buf) in self.branches.iter().zip(buffers) {
            let stored = self.stored_bytes(branch, buf)?;
            entry.put_u32_le(stored.len() as u32);
            entry.put_slice(&stored);
        }

        self.data.extend_from_slice(&entry);
        self.entry_count += 1;
        Ok(())
    }

    fn stored_bytes(&self, branch: &BranchDef, buf: &[u8]) -> Result<Vec<u8>, RowStoreError> {
        let shape_err = |detail: String| RowStoreError::EntryShape {
            tree: self.name.clone(),
            branch: branch.name.clone(),
            detail,
        };

        if let [leaf] = branch.leaves.as_slice() {
            if leaf.leaf_type == LeafType::CString && leaf.shape == LeafShape::Scalar {
                let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
                let mut stored = Vec::with_capacity(len + 1);
                stored.extend_from_slice(&buf[..len]);
                stored.push(0);
                return Ok(stored);
            }
            if let LeafShape::Variable(_) = leaf.shape {
                let size = leaf.leaf_type.size();
                if buf.len() % size != 0 {
                    return Err(shape_err(format!(
                        "{} bytes is not a multiple of the element size {size}",
                        buf.len()
                    )));
                }
                return Ok(buf.to_vec());
            }
        }

        let expected: usize = branch.leaves.iter().filter_map(|l| l.fixed_size()).sum();
        if buf.len() < expected {
            return Err(shape_err(format!(
                "need {expected} bytes, got {}",
                buf.len()
            )));
        }
        Ok(buf[..expected].to_vec())
    }

    fn encode(&self, out: &mut Vec<u8>) {
        put_str(out, &self.name);
        out.put_u32_le(self.branches.len() as u32);
        for branch in &self.branches {
            put_str(out, &branch.name);
            put_str(out, &branch.title());
        }
        out.put_u64_le(self.entry_count);
        out.put_u64_le(self.data.len() as u64);
        out.put_slice(&self.data);
    }
}

/// Writes a row-store container holding one or more named trees.
#[derive(Debug, Default)]
pub struct RowStoreWriter {
    trees: Vec<TreeBuilder>,
}

impl RowStoreWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tree(&mut self, tree: TreeBuilder) -> Result<(), RowStoreError> {
        if self.trees.iter().any(|t| t.name == tree.name) {
            return Err(RowStoreError::DuplicateTree { tree: tree.name });
        }
        self.trees.push(tree);
        Ok(())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.put_slice(MAGIC);
        out.put_u32_le(self.trees.len() as u32);
        for tree in &self.trees {
            tree.encode(&mut out);
        }
        out
    }

    /// Write the container to `path`, replacing any existing file.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), RowStoreError> {
        let path = path.as_ref();
        let mut file = BufWriter::new(fs::File::create(path)?);
        file.write_all(&self.to_bytes())?;
        file.flush()?;
        tracing::debug!(
            path = %path.display(),
            trees = self.trees.len(),
            "wrote row-store container"
        );
        Ok(())
    }
}
