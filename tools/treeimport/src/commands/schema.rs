use std::{fs, path::PathBuf};

use anyhow::Result;
use clap::Args;
use tree2arrow::{
    arrow::{TranslateOptions, translate_branches},
    core::{RowSource, format_field_defs},
    rowstore::RowStoreFile,
};

#[derive(Args)]
pub struct SchemaArgs {
    /// Path to the row-store file
    input: PathBuf,

    /// Name of the tree
    #[arg(short, long)]
    tree: String,

    /// Replace '.' in branch names with '_'
    #[arg(long)]
    convert_dots: bool,

    /// Output file path (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl SchemaArgs {
    pub fn run(self) -> Result<()> {
        let file = RowStoreFile::open(&self.input)?;
        let tree = file.open_tree(&self.tree)?;
        let options = TranslateOptions {
            convert_dots: self.convert_dots,
        };

        let schema = match translate_branches(tree.branches(), &options) {
            Ok(schema) => schema,
            Err(err) => {
                for issue in &err.issues {
                    eprintln!("error: {issue}");
                }
                anyhow::bail!("tree '{}' cannot be imported", self.tree);
            }
        };
        let text = format_field_defs(schema.fields())?;

        match self.output {
            Some(path) => fs::write(path, format!("{text}\n"))?,
            None => println!("{text}"),
        }
        Ok(())
    }
}
