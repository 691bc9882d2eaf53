//! ZIP bundle ingestion: one tabular member plus an optional images folder.
//!
//! Bundles are extracted into an isolated scratch directory
//! ([`tempfile::TempDir`], removed on every exit path including timeout), the
//! single tabular member is parsed with the same readers as top-level
//! ingestion, and bundled images are persisted through the caller's
//! [`ImageStore`].
//!
//! Image reconciliation here is *name-keyed*, not positional: bundle authors
//! reference images by filename in a photo column, so each row's resolved
//! photo value (trimmed, case-folded) is matched against the images' original
//! filenames.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use walkdir::WalkDir;

use crate::error::{IngestError, IngestResult};
use crate::resolve::{LogicalField, resolve};
use crate::storage::ImageStore;
use crate::types::{ImageRowMap, RawRecord};

use super::images;
use super::{delimited, spreadsheet};

/// Conventional image subfolder names, checked before falling back to any
/// directory that actually contains image files.
const IMAGE_DIR_NAMES: &[&str] = &["images", "image", "photos", "photo", "img", "pictures"];

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xls", "xlsm", "ods"];

/// Options for bundle extraction.
#[derive(Debug, Clone)]
pub struct BundleOptions {
    /// Wall-clock limit for extracting archive members. The archive path is
    /// the only one touching arbitrarily many small entries, so it is the one
    /// place a maliciously large archive could stall the system.
    pub extraction_timeout: Duration,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            extraction_timeout: Duration::from_secs(30),
        }
    }
}

/// Everything recovered from one bundle.
#[derive(Debug)]
pub struct BundleContents {
    pub records: Vec<RawRecord>,
    pub image_map: ImageRowMap,
    /// Degraded-but-successful events (skipped members, unusable images).
    pub warnings: Vec<String>,
}

/// Extract a bundle, parse its tabular member, and reconcile bundled images.
///
/// Tolerates a missing images folder and individual corrupt members; fails
/// hard only when the archive itself is unreadable, empty, has no tabular
/// member, or extraction times out.
pub fn ingest_bundle(
    path: impl AsRef<Path>,
    store: &dyn ImageStore,
    options: &BundleOptions,
) -> IngestResult<BundleContents> {
    // Scratch space is scoped to this call; Drop removes it on every path.
    let scratch = tempfile::tempdir()?;
    let mut warnings = Vec::new();

    extract_members(path.as_ref(), scratch.path(), options, &mut warnings)?;

    let data_file = find_data_file(scratch.path()).ok_or(IngestError::NoDataFile)?;
    let records = if is_spreadsheet(&data_file) {
        spreadsheet::read_spreadsheet_records(&data_file)?
    } else {
        delimited::read_delimited_records(&data_file)?
    };

    let image_map = match find_images_dir(scratch.path()) {
        Some(dir) => build_name_keyed_map(&records, &dir, store, &mut warnings),
        None => ImageRowMap::new(),
    };

    Ok(BundleContents {
        records,
        image_map,
        warnings,
    })
}

fn extract_members(
    archive_path: &Path,
    dest: &Path,
    options: &BundleOptions,
    warnings: &mut Vec<String>,
) -> IngestResult<()> {
    let file = File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    if archive.len() == 0 {
        return Err(IngestError::EmptyArchive);
    }

    let deadline = Instant::now() + options.extraction_timeout;
    for i in 0..archive.len() {
        if Instant::now() > deadline {
            return Err(IngestError::ExtractionTimeout {
                limit_secs: options.extraction_timeout.as_secs(),
            });
        }

        let mut entry = match archive.by_index(i) {
            Ok(entry) => entry,
            Err(err) => {
                warnings.push(format!("skipping corrupt archive member #{i}: {err}"));
                continue;
            }
        };
        // Reject members that would escape the scratch directory.
        let Some(rel) = entry.enclosed_name() else {
            warnings.push(format!(
                "skipping archive member with unsafe path '{}'",
                entry.name()
            ));
            continue;
        };

        let out = dest.join(rel);
        if entry.is_dir() {
            std::fs::create_dir_all(&out)?;
            continue;
        }
        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = File::create(&out)?;
        if let Err(err) = io::copy(&mut entry, &mut writer) {
            warnings.push(format!(
                "skipping unreadable archive member '{}': {err}",
                entry.name()
            ));
            let _ = std::fs::remove_file(&out);
        }
    }
    Ok(())
}

fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| {
            SPREADSHEET_EXTENSIONS
                .iter()
                .any(|e| ext.eq_ignore_ascii_case(e))
        })
}

/// Locate the single tabular member: spreadsheets win over delimited text,
/// lock/metadata files are excluded, first match by extension otherwise.
fn find_data_file(root: &Path) -> Option<PathBuf> {
    let mut spreadsheet = None;
    let mut csv = None;
    for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with("~$") || name.starts_with('.') {
            continue;
        }
        if spreadsheet.is_none() && is_spreadsheet(entry.path()) {
            spreadsheet = Some(entry.into_path());
        } else if csv.is_none()
            && entry
                .path()
                .extension()
                .and_then(|s| s.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        {
            csv = Some(entry.into_path());
        }
    }
    spreadsheet.or(csv)
}

/// Locate the images directory: conventional names first, then any directory
/// that actually holds image files (including the bundle root).
fn find_images_dir(root: &Path) -> Option<PathBuf> {
    let mut fallback = None;
    for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_ascii_lowercase();
        if IMAGE_DIR_NAMES.contains(&name.as_str()) {
            return Some(entry.into_path());
        }
        if fallback.is_none() && dir_has_images(entry.path()) {
            fallback = Some(entry.into_path());
        }
    }
    fallback
}

fn dir_has_images(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries.filter_map(Result::ok).any(|e| {
                e.file_type().map(|t| t.is_file()).unwrap_or(false)
                    && images::is_image_file(&e.file_name().to_string_lossy())
            })
        })
        .unwrap_or(false)
}

fn build_name_keyed_map(
    records: &[RawRecord],
    dir: &Path,
    store: &dyn ImageStore,
    warnings: &mut Vec<String>,
) -> ImageRowMap {
    let stored = images::extract_directory_images(dir, store);
    if stored.is_empty() {
        warnings.push(format!(
            "images folder '{}' contained no storable images",
            dir.display()
        ));
        return ImageRowMap::new();
    }

    let mut map = ImageRowMap::new();
    for (idx0, record) in records.iter().enumerate() {
        let row = idx0 + 1;
        let Some(wanted) = resolve(record, LogicalField::Photo) else {
            continue;
        };
        let wanted = wanted.trim().to_lowercase();
        if wanted.is_empty() {
            continue;
        }
        for image in &stored {
            let name = image.original_name.to_lowercase();
            let stem = Path::new(&name)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(name.as_str())
                .to_string();
            if name == wanted || stem == wanted {
                map.insert(row, image.reference.clone());
                break;
            }
        }
    }
    map
}
