//! Column resolution: mapping logical fields onto arbitrary raw headers.
//!
//! Uploaded files have no fixed schema (header spelling, casing, and
//! punctuation vary across sellers), so resolution has to be forgiving without
//! silently matching the wrong column. Lookup runs three tiers in priority
//! order:
//!
//! 1. Exact key match against each synonym (case-sensitive), first match wins.
//! 2. Case-insensitive match on trimmed, whitespace-collapsed keys.
//! 3. Token-subset match: every word of the synonym must appear as a substring
//!    of some raw key (case-insensitive).
//!
//! A match is accepted only if the value is non-empty after trimming.

use crate::types::RawRecord;

/// A normalized field concept that may appear under many raw header spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalField {
    Material,
    Quantity,
    Unit,
    Brand,
    Condition,
    PriceToday,
    Mrp,
    PricePurchased,
    InventoryType,
    Specs,
    Photo,
    SpecsPhoto,
    Category,
    Dimensions,
    Weight,
}

impl LogicalField {
    /// Accepted raw header spellings, in match-priority order.
    pub const fn synonyms(self) -> &'static [&'static str] {
        match self {
            Self::Material => &[
                "Material",
                "Material Name",
                "Item Name",
                "Item",
                "Name",
                "Product",
                "Product Name",
                "Description",
                "Particulars",
            ],
            Self::Quantity => &[
                "Qty",
                "Quantity",
                "Qty.",
                "No of Units",
                "Nos",
                "Count",
                "Stock",
            ],
            Self::Unit => &["Unit", "UOM", "Units", "Measure"],
            Self::Brand => &["Brand", "Make", "Company", "Manufacturer"],
            Self::Condition => &["Condition", "State", "Quality"],
            Self::PriceToday => &[
                "Price",
                "Selling Price",
                "Rate",
                "Price Today",
                "Current Price",
                "Sale Price",
                "Amount",
            ],
            Self::Mrp => &["MRP", "M.R.P", "Max Retail Price", "List Price"],
            Self::PricePurchased => &[
                "Purchase Price",
                "Cost",
                "Cost Price",
                "Bought At",
                "Purchase Rate",
            ],
            Self::InventoryType => &["Type", "Inventory Type", "Item Type"],
            Self::Specs => &[
                "Specs",
                "Specification",
                "Specifications",
                "Details",
                "Remarks",
            ],
            Self::Photo => &["Photo", "Image", "Picture", "Photo URL", "Image URL", "Img"],
            Self::SpecsPhoto => &["Specs Photo", "Specification Image", "Spec Image"],
            Self::Category => &["Category", "Cat", "Segment", "Section"],
            Self::Dimensions => &["Dimensions", "Size", "Dimension", "Measurement"],
            Self::Weight => &["Weight", "Wt", "Weight (kg)"],
        }
    }
}

/// Find the best-matching raw column for `field` and return its trimmed value.
///
/// Returns `None` when no synonym yields a non-empty value.
pub fn resolve(record: &RawRecord, field: LogicalField) -> Option<String> {
    let synonyms = field.synonyms();

    // Tier 1: exact key match.
    for syn in synonyms {
        if let Some(value) = record.get(syn).and_then(non_empty_text) {
            return Some(value);
        }
    }

    // Tier 2: case-insensitive on whitespace-collapsed keys.
    for syn in synonyms {
        let want = collapse_whitespace(syn);
        for (key, value) in record.iter() {
            if collapse_whitespace(key).eq_ignore_ascii_case(&want) {
                if let Some(value) = non_empty_text(value) {
                    return Some(value);
                }
            }
        }
    }

    // Tier 3: every synonym word must be a substring of the raw key.
    for syn in synonyms {
        let tokens: Vec<String> = syn
            .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect();
        if tokens.is_empty() {
            continue;
        }
        for (key, value) in record.iter() {
            let key_lower = key.to_lowercase();
            if tokens.iter().all(|t| key_lower.contains(t.as_str())) {
                if let Some(value) = non_empty_text(value) {
                    return Some(value);
                }
            }
        }
    }

    None
}

fn non_empty_text(value: &crate::types::CellValue) -> Option<String> {
    let text = value.as_text()?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
