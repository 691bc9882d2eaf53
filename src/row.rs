//! Row processing: one raw record in, one normalized inventory record out.

use chrono::Utc;
use uuid::Uuid;

use crate::normalize::{
    OTHER_CATEGORY, category_for_type_code, category_from_keywords, normalize_category,
    parse_number,
};
use crate::resolve::{LogicalField, resolve};
use crate::types::{
    DEFAULT_LISTING_TYPE, DEFAULT_UNIT, InventoryRecord, RawRecord, SENTINEL_PRICE,
};

/// Per-row processing result.
///
/// The distinction between the two rejection variants is part of the pipeline
/// contract: a missing material name is reported to the caller, while a
/// zero-quantity row is a routine occurrence that is counted but never produces
/// an error message.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    /// The row produced a valid record.
    Record(Box<InventoryRecord>),
    /// No material name could be resolved; reported as a row error.
    MissingMaterial,
    /// Quantity missing or non-positive; silently skipped.
    NoQuantity,
}

/// Build one [`InventoryRecord`] from a raw record.
///
/// Price resolution cascades selling price -> MRP -> purchase price ->
/// [`SENTINEL_PRICE`]; `inventory_value` is only computed from a real price.
/// Category resolution cascades explicit column -> inventory-type code ->
/// material-name keywords -> `Other`.
pub fn process_row(record: &RawRecord, owner_id: &str, project_id: &str) -> RowOutcome {
    let Some(material) = resolve(record, LogicalField::Material) else {
        return RowOutcome::MissingMaterial;
    };

    let quantity = resolve(record, LogicalField::Quantity)
        .map(|raw| parse_number(&raw))
        .unwrap_or(0.0)
        .round() as i64;
    if quantity <= 0 {
        return RowOutcome::NoQuantity;
    }

    let price_today = resolved_number(record, LogicalField::PriceToday);
    let mrp = resolved_number(record, LogicalField::Mrp);
    let price_purchased = resolved_number(record, LogicalField::PricePurchased);

    let (price, is_real_price) = if price_today > 0.0 {
        (price_today, true)
    } else if mrp > 0.0 {
        (mrp, true)
    } else if price_purchased > 0.0 {
        (price_purchased, true)
    } else {
        (SENTINEL_PRICE, false)
    };
    let inventory_value = if is_real_price {
        price * quantity as f64
    } else {
        0.0
    };

    let inventory_type = resolve(record, LogicalField::InventoryType).unwrap_or_default();
    let category = resolve(record, LogicalField::Category)
        .map(|raw| normalize_category(&raw))
        .filter(|c| *c != OTHER_CATEGORY)
        .or_else(|| category_for_type_code(&inventory_type))
        .or_else(|| category_from_keywords(&material))
        .unwrap_or(OTHER_CATEGORY);

    let photo = resolve(record, LogicalField::Photo)
        .filter(|v| is_external_reference(v))
        .unwrap_or_default();
    let specs_photo = resolve(record, LogicalField::SpecsPhoto)
        .filter(|v| is_external_reference(v))
        .unwrap_or_default();

    RowOutcome::Record(Box::new(InventoryRecord {
        id: Uuid::new_v4().to_string(),
        owner_id: owner_id.to_string(),
        project_id: project_id.to_string(),
        material,
        brand: resolve(record, LogicalField::Brand).unwrap_or_default(),
        category: category.to_string(),
        condition: resolve(record, LogicalField::Condition).unwrap_or_default(),
        quantity,
        unit: resolve(record, LogicalField::Unit).unwrap_or_else(|| DEFAULT_UNIT.to_string()),
        price_today: price,
        mrp,
        price_purchased,
        inventory_value,
        inventory_type,
        listing_type: DEFAULT_LISTING_TYPE.to_string(),
        specs: resolve(record, LogicalField::Specs).unwrap_or_default(),
        photo,
        specs_photo,
        dimensions: resolve(record, LogicalField::Dimensions).unwrap_or_default(),
        weight: resolve(record, LogicalField::Weight).unwrap_or_default(),
        created_at: Utc::now(),
    }))
}

fn resolved_number(record: &RawRecord, field: LogicalField) -> f64 {
    resolve(record, field)
        .map(|raw| parse_number(&raw))
        .unwrap_or(0.0)
}

/// Whether a raw photo value already points somewhere usable: a URL, an
/// inline data URL, or an absolute path. Bare filenames are rejected here;
/// they only become references through bundle reconciliation.
pub fn is_external_reference(value: &str) -> bool {
    let v = value.trim();
    v.starts_with("http://")
        || v.starts_with("https://")
        || v.starts_with("data:")
        || v.starts_with('/')
        || v.contains("://")
}
