//! Output settings for committed field-trees.

use parquet::{
    basic::{Compression as ParquetCompression, ZstdLevel},
    errors::ParquetError,
    file::properties::WriterProperties,
};

/// Page compression of a field-tree file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Uncompressed,
    Snappy,
    /// Zstandard at the given level (1..=22).
    Zstd(i32),
}

impl Default for Compression {
    fn default() -> Self {
        Self::Zstd(3)
    }
}

/// How an import lays out and compresses its field-tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    pub compression: Compression,
    /// Maximum number of entries per row group.
    pub max_row_group_size: usize,
    /// Best-effort limit on the encoded size of a data page, in bytes.
    pub data_page_size_limit: usize,
    /// Entries accumulated before a batch is handed to the writer.
    pub batch_size: usize,
    /// Store the source entry index of every row in an extra `@entry`
    /// column. Field-trees without fields always carry it, so that their
    /// entry count survives in the file.
    pub entry_column: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compression: Compression::default(),
            max_row_group_size: 1024 * 1024,
            data_page_size_limit: 1024 * 1024,
            batch_size: 1024,
            entry_column: false,
        }
    }
}

impl WriteOptions {
    pub(crate) fn writer_properties(&self) -> Result<WriterProperties, ParquetError> {
        let compression = match self.compression {
            Compression::Uncompressed => ParquetCompression::UNCOMPRESSED,
            Compression::Snappy => ParquetCompression::SNAPPY,
            Compression::Zstd(level) => ParquetCompression::ZSTD(ZstdLevel::try_new(level)?),
        };
        Ok(WriterProperties::builder()
            .set_compression(compression)
            .set_max_row_group_size(self.max_row_group_size.max(1))
            .set_data_page_size_limit(self.data_page_size_limit)
            .build())
    }
}
