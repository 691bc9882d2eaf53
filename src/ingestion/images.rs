//! Image extraction and image-to-row mapping.
//!
//! Spreadsheet files are ZIP containers; embedded pictures live under
//! `xl/media/`. Embedded images are emitted as inline `data:` URLs so they can
//! travel with the record through memory and the database; extraction may run
//! on a host with no durable shared filesystem.
//!
//! Row mapping relies on the sequence number spreadsheet tooling embeds in
//! media filenames (`image3.png` -> row 3). An image that deviates from that
//! convention is silently unmapped; photos are optional.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use walkdir::WalkDir;

use crate::error::IngestResult;
use crate::storage::ImageStore;
use crate::types::{ExtractedImage, ImageRowMap};

const MEDIA_DIR: &str = "xl/media/";

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "tiff"];

/// Build an inline data URL for an image, with MIME inferred from extension.
pub fn to_data_url(name: &str, bytes: &[u8]) -> String {
    let mime = mime_guess::from_path(name).first_or_octet_stream();
    format!("data:{mime};base64,{}", BASE64.encode(bytes))
}

/// Whether a filename looks like an image by extension.
pub fn is_image_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|e| ext.eq_ignore_ascii_case(e))
        })
}

/// Trailing digits in the file stem, e.g. `image3.png` -> `3`.
pub fn sequence_number(name: &str) -> Option<usize> {
    let stem = Path::new(name).file_stem()?.to_str()?;
    let digits: String = stem
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    digits.parse().ok()
}

/// Pull embedded images out of a spreadsheet's internal archive structure.
///
/// Unreadable members are skipped; only opening the container itself can fail.
pub fn extract_embedded_images(path: impl AsRef<Path>) -> IngestResult<Vec<ExtractedImage>> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    let mut images = Vec::new();
    for i in 0..archive.len() {
        let Ok(mut entry) = archive.by_index(i) else {
            continue;
        };
        let name = entry.name().to_string();
        if entry.is_dir() || !name.starts_with(MEDIA_DIR) || !is_image_file(&name) {
            continue;
        }
        let mut bytes = Vec::new();
        if entry.read_to_end(&mut bytes).is_err() {
            continue;
        }
        let original_name = name.rsplit('/').next().unwrap_or(&name).to_string();
        images.push(ExtractedImage {
            reference: to_data_url(&original_name, &bytes),
            sequence: sequence_number(&original_name),
            original_name,
        });
    }
    Ok(images)
}

/// Read every image file under a directory (an unpacked bundle folder),
/// persisting each through `store`. Files that cannot be read or stored are
/// skipped.
pub fn extract_directory_images(dir: impl AsRef<Path>, store: &dyn ImageStore) -> Vec<ExtractedImage> {
    let mut images = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if !is_image_file(&name) {
            continue;
        }
        let Ok(bytes) = std::fs::read(entry.path()) else {
            continue;
        };
        let Ok(reference) = store.store(&name, &bytes) else {
            continue;
        };
        images.push(ExtractedImage {
            reference,
            sequence: sequence_number(&name),
            original_name: name,
        });
    }
    images
}

/// Positional mapping: image *N* goes to row *N* (1-based).
///
/// Images without a sequence number, or whose number exceeds the row count,
/// are dropped without error.
pub fn map_images_to_rows(images: &[ExtractedImage], total_rows: usize) -> ImageRowMap {
    let mut ordered: Vec<&ExtractedImage> =
        images.iter().filter(|i| i.sequence.is_some()).collect();
    ordered.sort_by_key(|i| i.sequence);

    let mut map = ImageRowMap::new();
    for image in ordered {
        let n = image.sequence.unwrap_or(0);
        if (1..=total_rows).contains(&n) {
            map.insert(n, image.reference.clone());
        }
    }
    map
}

/// Fallback heuristic: match material names against image filenames by mutual
/// substring containment over alphanumeric-only lowercase forms.
pub fn map_images_by_material_name(
    images: &[ExtractedImage],
    materials: &[(usize, String)],
) -> ImageRowMap {
    let mut map = ImageRowMap::new();
    for (row, material) in materials {
        let mat = alphanumeric_lower(material);
        if mat.is_empty() {
            continue;
        }
        for image in images {
            let stem = Path::new(&image.original_name)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(&image.original_name);
            let img = alphanumeric_lower(stem);
            if img.is_empty() {
                continue;
            }
            if mat.contains(&img) || img.contains(&mat) {
                map.entry(*row).or_insert_with(|| image.reference.clone());
                break;
            }
        }
    }
    map
}

fn alphanumeric_lower(s: &str) -> String {
    s.chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::{
        is_image_file, map_images_by_material_name, map_images_to_rows, sequence_number,
        to_data_url,
    };
    use crate::types::ExtractedImage;

    fn image(name: &str) -> ExtractedImage {
        ExtractedImage {
            original_name: name.to_string(),
            reference: format!("data:image/png;base64,{name}"),
            sequence: sequence_number(name),
        }
    }

    #[test]
    fn sequence_numbers_come_from_trailing_digits() {
        assert_eq!(sequence_number("image3.png"), Some(3));
        assert_eq!(sequence_number("photo_12.jpeg"), Some(12));
        assert_eq!(sequence_number("cover.png"), None);
        assert_eq!(sequence_number("3sides.png"), None);
    }

    #[test]
    fn image_extension_detection_is_case_insensitive() {
        assert!(is_image_file("a.PNG"));
        assert!(is_image_file("b.jpeg"));
        assert!(!is_image_file("notes.txt"));
        assert!(!is_image_file("noext"));
    }

    #[test]
    fn data_urls_carry_the_inferred_mime() {
        let url = to_data_url("x.jpg", &[0xFF]);
        assert!(url.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn images_past_the_row_count_are_dropped() {
        let images: Vec<_> = (1..=5).map(|i| image(&format!("image{i}.jpg"))).collect();
        let map = map_images_to_rows(&images, 3);

        assert_eq!(map.len(), 3);
        for row in 1..=3 {
            assert!(map.contains_key(&row));
        }
        assert!(!map.contains_key(&4));
        assert!(!map.contains_key(&5));
    }

    #[test]
    fn unnumbered_images_are_silently_unmapped() {
        let images = vec![image("cover.jpg"), image("image2.jpg")];
        let map = map_images_to_rows(&images, 5);
        assert_eq!(map.len(), 1);
        assert!(map.contains_key(&2));
    }

    #[test]
    fn material_name_mapping_uses_mutual_containment() {
        let images = vec![image("teak-door.jpg"), image("whitebasin.png")];
        let materials = vec![
            (1, "Teak Door".to_string()),
            (2, "White Basin Large".to_string()),
            (3, "Unrelated".to_string()),
        ];

        let map = map_images_by_material_name(&images, &materials);
        assert!(map.contains_key(&1));
        assert!(map.contains_key(&2));
        assert!(!map.contains_key(&3));
    }
}
