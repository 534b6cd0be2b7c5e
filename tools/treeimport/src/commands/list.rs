use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tree2arrow::{core::RowSource, list_field_trees, rowstore::RowStoreFile};

#[derive(Args)]
pub struct ListArgs {
    /// Row-store file or destination directory
    path: PathBuf,
}

impl ListArgs {
    pub fn run(self) -> Result<()> {
        if self.path.is_dir() {
            for name in list_field_trees(&self.path)? {
                println!("{name}");
            }
            return Ok(());
        }

        let file = RowStoreFile::open(&self.path)?;
        for name in file.tree_names() {
            let tree = file.open_tree(name)?;
            println!("{name}\t{} entries\t{} branches", tree.entry_count(), tree.branches().len());
        }
        Ok(())
    }
}
