use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tree2arrow::{Compression, Importer, WriteOptions};

#[derive(Clone, Copy, Debug, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum CompressionArg {
    None,
    Snappy,
    Zstd,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Path to the row-store file
    input: PathBuf,

    /// Name of the tree to import
    #[arg(short, long)]
    tree: String,

    /// Destination directory
    #[arg(short, long)]
    output: PathBuf,

    /// Field-tree name (defaults to the tree name)
    #[arg(short, long)]
    name: Option<String>,

    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,

    /// Page compression
    #[arg(long, value_enum, default_value_t = CompressionArg::Zstd)]
    compression: CompressionArg,

    /// Zstandard level used with --compression zstd
    #[arg(long, default_value_t = 3)]
    zstd_level: i32,

    /// Import only the first N entries
    #[arg(long)]
    max_entries: Option<u64>,

    /// Replace '.' in branch names with '_'
    #[arg(long)]
    convert_dots: bool,

    /// Maximum number of entries per row group
    #[arg(long)]
    row_group_size: Option<usize>,

    /// Also store each row's source entry index in an '@entry' column
    #[arg(long)]
    entry_column: bool,
}

impl ImportArgs {
    pub fn run(self) -> Result<()> {
        let mut importer = Importer::create(&self.input, &self.tree, &self.output)?;
        importer.set_field_tree_name(self.name.as_deref().unwrap_or(&self.tree))?;
        importer.set_quiet(self.quiet)?;
        importer.set_write_options(self.write_options())?;
        importer.set_max_entries(self.max_entries)?;
        importer.set_convert_dots_in_branch_names(self.convert_dots)?;

        let pb = if self.quiet {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new(0);
            pb.set_style(
                ProgressStyle::with_template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}, ETA: {eta})",
                )?
                .progress_chars("=>-"),
            );
            pb
        };
        let sink = pb.clone();
        importer.set_progress_callback(move |progress| {
            sink.set_length(progress.entries_total);
            sink.set_position(progress.entries_done);
        })?;

        let entries = importer.import()?;
        pb.finish_with_message("done");
        if !self.quiet {
            eprintln!(
                "Imported {entries} entries into {}",
                self.output.display()
            );
        }
        Ok(())
    }

    fn write_options(&self) -> WriteOptions {
        let mut options = WriteOptions {
            compression: match self.compression {
                CompressionArg::None => Compression::Uncompressed,
                CompressionArg::Snappy => Compression::Snappy,
                CompressionArg::Zstd => Compression::Zstd(self.zstd_level),
            },
            entry_column: self.entry_column,
            ..WriteOptions::default()
        };
        if let Some(size) = self.row_group_size {
            options.max_row_group_size = size;
        }
        options
    }
}
