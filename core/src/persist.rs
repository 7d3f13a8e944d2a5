use crate::catalog::Catalog;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_entries: u32,
    pub created_at: String,
    pub version: u32,
}

pub struct CatalogPaths {
    pub root: PathBuf,
}

impl CatalogPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn catalog(&self) -> PathBuf { self.root.join("catalog.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

pub fn save_catalog(paths: &CatalogPaths, catalog: &Catalog) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.catalog())?;
    let bytes = bincode::serialize(catalog)?;
    f.write_all(&bytes)?;
    Ok(())
}

/// Load the catalog snapshot. Entries are re-validated while decoding.
pub fn load_catalog(paths: &CatalogPaths) -> Result<Catalog> {
    let mut f = File::open(paths.catalog()).with_context(|| format!("opening {}", paths.catalog().display()))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let catalog = bincode::deserialize(&buf)?;
    Ok(catalog)
}

pub fn save_meta(paths: &CatalogPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &CatalogPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

/// Load catalog and meta together, checking they agree.
pub fn load_snapshot(paths: &CatalogPaths) -> Result<(Catalog, MetaFile)> {
    let catalog = load_catalog(paths)?;
    let meta = load_meta(paths)?;
    anyhow::ensure!(
        meta.num_entries as usize == catalog.len(),
        "meta.json lists {} entries but catalog.bin holds {}",
        meta.num_entries,
        catalog.len()
    );
    Ok((catalog, meta))
}
