//! Catalog ingestion from IMDb-style tab-separated dumps
//! (`title.basics.tsv[.gz]` and `title.ratings.tsv[.gz]`).

use crate::catalog::{Catalog, Entry};
use crate::tokenizer::tokenize_genres;
use anyhow::{anyhow, Context, Result};
use flate2::read::GzDecoder;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Marker for a missing value in the source dumps.
pub const NULL_MARKER: &str = "\\N";
/// Only rows of this `titleType` become catalog entries.
pub const MOVIE_TYPE: &str = "movie";

/// Open a file for line reading, decompressing it when the name ends in `.gz`.
pub fn open_source(path: &Path) -> Result<Box<dyn BufRead>> {
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        Ok(Box::new(BufReader::new(GzDecoder::new(f))))
    } else {
        Ok(Box::new(BufReader::new(f)))
    }
}

fn column(header: &[&str], name: &str) -> Result<usize> {
    header.iter().position(|h| *h == name).ok_or_else(|| anyhow!("missing column {name}"))
}

fn field<'a>(fields: &[&'a str], idx: usize) -> Option<&'a str> {
    fields.get(idx).copied().filter(|v| !v.is_empty() && *v != NULL_MARKER)
}

fn header_line<R: BufRead>(lines: &mut std::io::Lines<R>) -> Result<String> {
    lines.next().ok_or_else(|| anyhow!("empty input"))?.map_err(Into::into)
}

/// Read `tconst -> averageRating`. Unparsable or non-finite ratings are skipped.
pub fn read_ratings<R: BufRead>(reader: R) -> Result<HashMap<String, f32>> {
    let mut lines = reader.lines();
    let header = header_line(&mut lines)?;
    let cols: Vec<&str> = header.split('\t').collect();
    let (id_col, rating_col) = (column(&cols, "tconst")?, column(&cols, "averageRating")?);

    let mut ratings = HashMap::new();
    let mut skipped = 0usize;
    for line in lines {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let fields: Vec<&str> = line.split('\t').collect();
        let parsed = field(&fields, id_col)
            .zip(field(&fields, rating_col).and_then(|r| r.parse::<f32>().ok()).filter(|r| r.is_finite()));
        match parsed {
            Some((id, rating)) => { ratings.entry(id.to_string()).or_insert(rating); }
            None => skipped += 1,
        }
    }
    tracing::info!(ratings = ratings.len(), skipped, "read ratings");
    Ok(ratings)
}

/// Read movie rows from the basics dump and join them with `ratings`.
/// Rows without a title, genres, or rating are dropped; so are repeated ids.
pub fn read_basics<R: BufRead>(reader: R, ratings: &HashMap<String, f32>) -> Result<Vec<Entry>> {
    let mut lines = reader.lines();
    let header = header_line(&mut lines)?;
    let cols: Vec<&str> = header.split('\t').collect();
    let id_col = column(&cols, "tconst")?;
    let type_col = column(&cols, "titleType")?;
    let title_col = column(&cols, "primaryTitle")?;
    let genres_col = column(&cols, "genres")?;

    let mut entries = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut dropped = 0usize;
    for line in lines {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let fields: Vec<&str> = line.split('\t').collect();
        if field(&fields, type_col) != Some(MOVIE_TYPE) { continue; }
        let (Some(id), Some(title), Some(genres)) =
            (field(&fields, id_col), field(&fields, title_col), field(&fields, genres_col))
        else {
            dropped += 1;
            continue;
        };
        let genres = tokenize_genres(genres);
        let Some(&rating) = ratings.get(id) else {
            dropped += 1;
            continue;
        };
        if genres.is_empty() || !seen.insert(id.to_string()) {
            dropped += 1;
            continue;
        }
        entries.push(Entry { id: id.to_string(), title: title.to_string(), genres, rating });
    }
    tracing::info!(entries = entries.len(), dropped, "read movie basics");
    Ok(entries)
}

pub fn catalog_from_readers<B: BufRead, R: BufRead>(basics: B, ratings: R) -> Result<Catalog> {
    let ratings = read_ratings(ratings)?;
    let entries = read_basics(basics, &ratings)?;
    Ok(Catalog::new(entries)?)
}

/// Build a catalog from the basics and ratings dumps on disk.
pub fn catalog_from_files(basics: &Path, ratings: &Path) -> Result<Catalog> {
    catalog_from_readers(open_source(basics)?, open_source(ratings)?)
}
