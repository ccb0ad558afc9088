//! Reshaping of the raw upstream payload into [`StockReport`].

use serde_json::{Map, Value};

mod data;
pub mod seen;

pub use data::{LastSeen, Sighting, StockItem, StockReport};
pub use seen::SeenAt;

/// Where the category map lives inside the upstream batch response.
const PAYLOAD_POINTER: &str = "/0/result/data/json";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormatError {
    #[error("Unexpected data structure: missing result payload")]
    MissingPayload,
    #[error("Unexpected data structure: empty payload")]
    EmptyPayload,
}

impl FormatError {
    pub fn code(&self) -> u16 {
        500
    }
}

#[tracing::instrument(skip(raw))]
pub fn normalize(raw: &Value) -> Result<StockReport, FormatError> {
    let payload = match raw.pointer(PAYLOAD_POINTER) {
        Some(Value::Object(payload)) => payload,
        Some(other) if is_empty(other) => return Err(FormatError::EmptyPayload),
        _ => return Err(FormatError::MissingPayload),
    };
    if payload.is_empty() {
        return Err(FormatError::EmptyPayload);
    }

    let last_seen = payload.get("lastSeen");
    let sightings_of = |category: &str| sightings(last_seen.and_then(|l| l.get(category)));

    Ok(StockReport {
        success: true,
        gear_stock: stock_items(payload.get("gear")),
        egg_stock: stock_items(payload.get("egg")),
        seeds_stock: stock_items(payload.get("seeds")),
        night_stock: stock_items(payload.get("night")),
        blood_stock: stock_items(payload.get("blood")),
        cosmetics_stock: stock_items(payload.get("cosmetics")),
        honey_stock: stock_items(payload.get("honey")),
        last_seen: LastSeen {
            seeds: sightings_of("Seeds"),
            gears: sightings_of("Gears"),
            weather: sightings_of("Weather"),
            eggs: sightings_of("Eggs"),
        },
        fetched_at: None,
    })
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(a) => a.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Object entries of a category list. Anything that is not a list counts as empty.
fn records(category: Option<&Value>) -> impl Iterator<Item = &Map<String, Value>> {
    category
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

fn text(record: &Map<String, Value>, key: &str) -> Option<String> {
    record.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn stock_items(category: Option<&Value>) -> Vec<StockItem> {
    records(category)
        .map(|record| StockItem {
            name: text(record, "name"),
            value: record.get("value").and_then(Value::as_number).cloned(),
            image: text(record, "image"),
            emoji: text(record, "emoji"),
        })
        .collect()
}

fn sightings(category: Option<&Value>) -> Vec<Sighting> {
    records(category)
        .map(|record| {
            let seen = SeenAt::from_value(record.get("seen"));
            if let SeenAt::Invalid(raw) = &seen {
                tracing::warn!(name = ?record.get("name"), %raw, "Invalid seen timestamp");
            }

            Sighting {
                name: text(record, "name"),
                image: text(record, "image"),
                emoji: text(record, "emoji"),
                seen,
            }
        })
        .collect()
}
