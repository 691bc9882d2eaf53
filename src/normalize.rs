//! Value normalization: raw cell text into numbers, and raw category strings
//! into the fixed taxonomy.
//!
//! Numeric parsing never fails: currency symbols and thousands separators are
//! stripped, range forms like `"100-200"` or `"665/735"` collapse to their
//! arithmetic mean, and anything unparseable yields `0`. The range-as-average
//! rule mirrors how ambiguous price ranges appear in real seller spreadsheets;
//! it is a documented policy, not a guarantee of correctness.

/// Fallback label every unrecognized category terminates in.
pub const OTHER_CATEGORY: &str = "Other";

/// The fixed, closed set of canonical category labels.
pub const CATEGORIES: &[&str] = &[
    "Doors",
    "Tiles",
    "Handles & Hardware",
    "Toilets & Sanitary",
    "Windows",
    "Flooring",
    "Lighting",
    "Paint & Finishes",
    "Plumbing",
    "Electrical",
    "Furniture",
    "Marbles",
    OTHER_CATEGORY,
];

/// Uppercased alias -> canonical label (singular/plural and common synonyms).
const CATEGORY_ALIASES: &[(&str, &str)] = &[
    ("TILE", "Tiles"),
    ("DOOR", "Doors"),
    ("WINDOW", "Windows"),
    ("HANDLE", "Handles & Hardware"),
    ("HANDLES", "Handles & Hardware"),
    ("HARDWARE", "Handles & Hardware"),
    ("TOILET", "Toilets & Sanitary"),
    ("TOILETS", "Toilets & Sanitary"),
    ("SANITARY", "Toilets & Sanitary"),
    ("SANITARYWARE", "Toilets & Sanitary"),
    ("WC", "Toilets & Sanitary"),
    ("FLOOR", "Flooring"),
    ("FLOORINGS", "Flooring"),
    ("LIGHT", "Lighting"),
    ("LIGHTS", "Lighting"),
    ("PAINT", "Paint & Finishes"),
    ("PAINTS", "Paint & Finishes"),
    ("FINISHES", "Paint & Finishes"),
    ("PLUMBINGS", "Plumbing"),
    ("ELECTRIC", "Electrical"),
    ("ELECTRICALS", "Electrical"),
    ("FURNITURES", "Furniture"),
    ("MARBLE", "Marbles"),
    ("STONE", "Marbles"),
    ("MISC", OTHER_CATEGORY),
    ("OTHERS", OTHER_CATEGORY),
];

/// Ordered substring rules, most specific first. Order matters: a
/// "Bathroom Tile" must resolve to Tiles via the earlier `TILE` rule before the
/// sanitary rules get a chance to claim it.
const CATEGORY_SUBSTRINGS: &[(&str, &str)] = &[
    ("TILE", "Tiles"),
    ("MARBLE", "Marbles"),
    ("GRANITE", "Marbles"),
    ("DOOR", "Doors"),
    ("WINDOW", "Windows"),
    ("HANDLE", "Handles & Hardware"),
    ("HINGE", "Handles & Hardware"),
    ("KNOB", "Handles & Hardware"),
    ("LOCK", "Handles & Hardware"),
    ("TOILET", "Toilets & Sanitary"),
    ("SANITARY", "Toilets & Sanitary"),
    ("BASIN", "Toilets & Sanitary"),
    ("COMMODE", "Toilets & Sanitary"),
    ("LAMINATE", "Flooring"),
    ("FLOOR", "Flooring"),
    ("CHANDELIER", "Lighting"),
    ("LIGHT", "Lighting"),
    ("LAMP", "Lighting"),
    ("PAINT", "Paint & Finishes"),
    ("VARNISH", "Paint & Finishes"),
    ("POLISH", "Paint & Finishes"),
    ("PIPE", "Plumbing"),
    ("TAP", "Plumbing"),
    ("FAUCET", "Plumbing"),
    ("PLUMB", "Plumbing"),
    ("VALVE", "Plumbing"),
    ("WIRE", "Electrical"),
    ("SWITCH", "Electrical"),
    ("SOCKET", "Electrical"),
    ("ELECTRIC", "Electrical"),
    ("MCB", "Electrical"),
    ("SOFA", "Furniture"),
    ("CHAIR", "Furniture"),
    ("TABLE", "Furniture"),
    ("WARDROBE", "Furniture"),
    ("CABINET", "Furniture"),
];

/// Inventory-type short code -> canonical category.
const TYPE_CODES: &[(&str, &str)] = &[
    ("DR", "Doors"),
    ("TL", "Tiles"),
    ("HW", "Handles & Hardware"),
    ("SN", "Toilets & Sanitary"),
    ("WN", "Windows"),
    ("FL", "Flooring"),
    ("LT", "Lighting"),
    ("PT", "Paint & Finishes"),
    ("PL", "Plumbing"),
    ("EL", "Electrical"),
    ("FR", "Furniture"),
    ("MB", "Marbles"),
];

/// Parse a raw cell into a number, tolerating currency noise and ranges.
///
/// - Currency symbols (`₹`, `$`, `€`, `£`, `Rs`, `INR`) and thousands
///   separators are stripped.
/// - `"a/b"` and `"a-b"` (where `-` is not a leading sign) with exactly two
///   numeric parts return their arithmetic mean.
/// - Anything else that fails to parse yields `0`, never an error.
pub fn parse_number(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '₹' | '$' | '€' | '£' | ','))
        .collect();
    let cleaned = strip_currency_words(cleaned.trim());

    if cleaned.is_empty() {
        return 0.0;
    }
    if let Some(mean) = range_mean(cleaned) {
        return mean;
    }
    // `f64::parse` accepts "inf"/"nan"; those are garbage cells, not numbers.
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

fn strip_currency_words(s: &str) -> &str {
    let lower = s.to_ascii_lowercase();
    for prefix in ["rs.", "rs ", "inr "] {
        if lower.starts_with(prefix) {
            return s[prefix.len()..].trim_start();
        }
    }
    s
}

fn range_mean(s: &str) -> Option<f64> {
    if let Some((a, b)) = split_pair(s, '/') {
        return Some((a + b) / 2.0);
    }
    // A leading '-' is a sign, not a range separator.
    if !s.starts_with('-') && !s.starts_with('+') {
        if let Some((a, b)) = split_pair(s, '-') {
            return Some((a + b) / 2.0);
        }
    }
    None
}

fn split_pair(s: &str, sep: char) -> Option<(f64, f64)> {
    let mut parts = s.splitn(2, sep);
    let left = parts.next()?;
    let right = parts.next()?;
    if right.contains(sep) {
        return None;
    }
    let a = left.trim().parse::<f64>().ok().filter(|n| n.is_finite())?;
    let b = right.trim().parse::<f64>().ok().filter(|n| n.is_finite())?;
    Some((a, b))
}

/// Normalize a raw category string into the canonical taxonomy.
///
/// Trims and uppercases, then tries: exact canonical match, the alias table,
/// the ordered substring rules, and finally [`OTHER_CATEGORY`]. Idempotent for
/// already-canonical labels.
pub fn normalize_category(raw: &str) -> &'static str {
    let upper = raw.trim().to_uppercase();
    if upper.is_empty() {
        return OTHER_CATEGORY;
    }
    for canonical in CATEGORIES {
        if canonical.to_uppercase() == upper {
            return canonical;
        }
    }
    for (alias, canonical) in CATEGORY_ALIASES {
        if *alias == upper {
            return canonical;
        }
    }
    category_by_substring(&upper).unwrap_or(OTHER_CATEGORY)
}

/// Map an inventory-type short code (e.g. `TL`) to its category.
pub fn category_for_type_code(code: &str) -> Option<&'static str> {
    let upper = code.trim().to_uppercase();
    TYPE_CODES
        .iter()
        .find(|(c, _)| *c == upper)
        .map(|(_, canonical)| *canonical)
}

/// Infer a category from keywords in a material name, e.g.
/// `"Steel Pipe 2in"` -> `Plumbing`. The first matching rule in
/// [`CATEGORY_SUBSTRINGS`] wins; the rule order is the contract.
pub fn category_from_keywords(material: &str) -> Option<&'static str> {
    category_by_substring(&material.trim().to_uppercase())
}

fn category_by_substring(upper: &str) -> Option<&'static str> {
    CATEGORY_SUBSTRINGS
        .iter()
        .find(|(needle, _)| upper.contains(needle))
        .map(|(_, canonical)| *canonical)
}
