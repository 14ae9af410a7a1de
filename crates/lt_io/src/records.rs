//! CSV readers for the three tabular inputs. Each reader takes the raw file
//! bytes, so the same bytes feed both parsing and the input digest.
//!
//! - applicants: `id,<rank 1>,<rank 2>,…` (header row; names are free)
//! - shows:      `id,slot,play,capacity`
//! - vacancy:    `id` (optional file; absent ⇒ `None`)
//!
//! Cells are trimmed and rows may be ragged. Blank preference cells mean
//! "no preference at this rank".

use std::collections::BTreeSet;
use std::fs;
use std::io::Read;
use std::path::Path;

use lt_core::{Applicant, ApplicantId, Show, ShowId};
use serde::Deserialize;
use tracing::warn;

use crate::hasher::sha256_hex;
use crate::{IoError, IoResult};

/// Parsed value plus the SHA-256 of the bytes it came from.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub value: T,
    pub sha256: String,
}

/// A non-empty preference cell beyond `max_orders`, dropped on read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedPreference {
    pub applicant: ApplicantId,
    pub line: u64,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct ApplicantsRead {
    pub applicants: Vec<Applicant>,
    pub dropped: Vec<DroppedPreference>,
}

// ----------------------------- file entry points -----------------------------

pub fn read_applicants(path: &Path, max_orders: u32) -> IoResult<Loaded<ApplicantsRead>> {
    let bytes = read_bytes(path)?;
    let value = parse_applicants(bytes.as_slice(), max_orders, &label(path))?;
    Ok(Loaded { value, sha256: sha256_hex(&bytes) })
}

pub fn read_shows(path: &Path) -> IoResult<Loaded<Vec<Show>>> {
    let bytes = read_bytes(path)?;
    let value = parse_shows(bytes.as_slice(), &label(path))?;
    Ok(Loaded { value, sha256: sha256_hex(&bytes) })
}

/// `Ok(None)` when the file does not exist; the caller decides how loud to be.
pub fn read_vacancy(path: &Path) -> IoResult<Option<Loaded<BTreeSet<ApplicantId>>>> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = read_bytes(path)?;
    let value = parse_vacancy(bytes.as_slice(), &label(path))?;
    Ok(Some(Loaded { value, sha256: sha256_hex(&bytes) }))
}

// ----------------------------- parsers -----------------------------

pub fn parse_applicants<R: Read>(reader: R, max_orders: u32, file: &str) -> IoResult<ApplicantsRead> {
    let mut rdr = reader_builder().from_reader(reader);
    let mut applicants = Vec::new();
    let mut dropped = Vec::new();
    let max = max_orders as usize;

    for row in rdr.records() {
        let row = row?;
        let line = line_of(&row);
        let id: ApplicantId = parse_token(row.get(0).unwrap_or(""), file, line, "applicant id")?;

        let mut prefs = Vec::new();
        for rank in 0..max {
            let cell = row.get(rank + 1).unwrap_or("");
            if cell.is_empty() {
                prefs.push(None);
            } else {
                prefs.push(Some(parse_token::<ShowId>(cell, file, line, "show id")?));
            }
        }
        for extra in row.iter().skip(max + 1).filter(|c| !c.is_empty()) {
            warn!(applicant = %id, line, value = extra, "preference beyond max_orders dropped");
            dropped.push(DroppedPreference { applicant: id.clone(), line, value: extra.to_string() });
        }
        applicants.push(Applicant::new(id, prefs));
    }

    Ok(ApplicantsRead { applicants, dropped })
}

pub fn parse_shows<R: Read>(reader: R, file: &str) -> IoResult<Vec<Show>> {
    #[derive(Deserialize)]
    struct RawShow {
        id: String,
        slot: String,
        play: String,
        capacity: String,
    }

    let mut rdr = reader_builder().from_reader(reader);
    let headers = rdr.headers()?.clone();
    let mut shows = Vec::new();
    for row in rdr.records() {
        let row = row?;
        let line = line_of(&row);
        let raw: RawShow = row.deserialize(Some(&headers))?;
        let id: ShowId = parse_token(&raw.id, file, line, "show id")?;
        let capacity: u32 = raw.capacity.parse().map_err(|_| IoError::Record {
            file: file.to_string(),
            line,
            msg: format!("capacity must be a non-negative integer, got {:?}", raw.capacity),
        })?;
        shows.push(Show::new(id, raw.slot, raw.play, capacity));
    }
    Ok(shows)
}

pub fn parse_vacancy<R: Read>(reader: R, file: &str) -> IoResult<BTreeSet<ApplicantId>> {
    let mut rdr = reader_builder().from_reader(reader);
    let mut ids = BTreeSet::new();
    for row in rdr.records() {
        let row = row?;
        let cell = row.get(0).unwrap_or("");
        if cell.is_empty() {
            continue;
        }
        ids.insert(parse_token(cell, file, line_of(&row), "applicant id")?);
    }
    Ok(ids)
}

// ----------------------------- helpers -----------------------------

fn reader_builder() -> csv::ReaderBuilder {
    let mut b = csv::ReaderBuilder::new();
    b.has_headers(true).trim(csv::Trim::All).flexible(true);
    b
}

fn read_bytes(path: &Path) -> IoResult<Vec<u8>> {
    fs::read(path).map_err(|source| IoError::Read { path: label(path), source })
}

fn label(path: &Path) -> String {
    path.display().to_string()
}

fn line_of(row: &csv::StringRecord) -> u64 {
    row.position().map(|p| p.line()).unwrap_or(0)
}

fn parse_token<T>(cell: &str, file: &str, line: u64, what: &str) -> IoResult<T>
where
    T: std::str::FromStr<Err = lt_core::IdError>,
{
    cell.parse::<T>().map_err(|e| IoError::Record {
        file: file.to_string(),
        line,
        msg: format!("bad {what} {cell:?}: {e}"),
    })
}
