//! CSV result tables. The header is always written, so an empty table is
//! still a one-line file; rows follow in the order given.

use std::path::Path;

use serde::Serialize;

use crate::canonical_json::write_atomic;
use crate::{IoError, IoResult};

/// `header` must list the serialized field names of `T` in order.
pub fn csv_bytes<T: Serialize>(header: &[&str], rows: &[T]) -> IoResult<Vec<u8>> {
    let mut w = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    w.write_record(header)?;
    for row in rows {
        w.serialize(row)?;
    }
    w.into_inner().map_err(|e| IoError::Write { path: "<csv buffer>".into(), source: e.into_error() })
}

pub fn write_csv<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> IoResult<()> {
    let bytes = csv_bytes(header, rows)?;
    write_atomic(path, &bytes).map_err(|source| IoError::Write { path: path.display().to_string(), source })
}
