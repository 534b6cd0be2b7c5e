//! On-disk layout of a row-store container.
//!
//! All integers are little-endian; strings are `u32` length-prefixed UTF-8.
//!
//! ```text
//! container := MAGIC u32:tree_count tree*
//! tree      := str:name u32:branch_count (str:branch_name str:title)*
//!              u64:entry_count u64:data_len data
//! data      := entry*            (entry_count times)
//! entry     := (u32:len bytes)*  (branch_count times, declaration order)
//! ```

use bytes::{Buf, BufMut};

use crate::error::RowStoreError;

pub(crate) const MAGIC: &[u8; 8] = b"T2AROWS\x01";

pub(crate) fn put_str(buf: &mut Vec<u8>, s: &str) {
    buf.put_u32_le(s.len() as u32);
    buf.put_slice(s.as_bytes());
}

pub(crate) fn get_u32(buf: &mut &[u8], what: &str) -> Result<u32, RowStoreError> {
    buf.try_get_u32_le()
        .map_err(|_| RowStoreError::corrupt(format!("unexpected EOF reading {what}")))
}

pub(crate) fn get_u64(buf: &mut &[u8], what: &str) -> Result<u64, RowStoreError> {
    buf.try_get_u64_le()
        .map_err(|_| RowStoreError::corrupt(format!("unexpected EOF reading {what}")))
}

pub(crate) fn get_bytes<'a>(
    buf: &mut &'a [u8],
    len: usize,
    what: &str,
) -> Result<&'a [u8], RowStoreError> {
    if buf.len() < len {
        return Err(RowStoreError::corrupt(format!(
            "unexpected EOF reading {what}: need {len} bytes, {} left",
            buf.len()
        )));
    }
    let (head, tail) = buf.split_at(len);
    *buf = tail;
    Ok(head)
}

pub(crate) fn get_str(buf: &mut &[u8], what: &str) -> Result<String, RowStoreError> {
    let len = get_u32(buf, what)? as usize;
    let bytes = get_bytes(buf, len, what)?;
    String::from_utf8(bytes.to_vec())
        .map_err(|_| RowStoreError::corrupt(format!("{what} is not valid UTF-8")))
}

/// Skip the `branch_count` length-prefixed blobs of one entry.
pub(crate) fn skip_entry(
    buf: &mut &[u8],
    branch_count: usize,
    index: u64,
) -> Result<(), RowStoreError> {
    for _ in 0..branch_count {
        let len = get_u32(buf, "branch length")? as usize;
        get_bytes(buf, len, &format!("entry {index}"))?;
    }
    Ok(())
}
