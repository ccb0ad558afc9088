use serde::Serialize;

use super::seen::SeenAt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockItem {
    pub name: Option<String>,
    pub value: Option<serde_json::Number>,
    pub image: Option<String>,
    pub emoji: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sighting {
    pub name: Option<String>,
    pub image: Option<String>,
    pub emoji: Option<String>,
    pub seen: SeenAt,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LastSeen {
    pub seeds: Vec<Sighting>,
    pub gears: Vec<Sighting>,
    pub weather: Vec<Sighting>,
    pub eggs: Vec<Sighting>,
}

/// The client facing shape. Key names are part of the public contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StockReport {
    #[serde(rename = "success")]
    pub success: bool,
    pub gear_stock: Vec<StockItem>,
    pub egg_stock: Vec<StockItem>,
    pub seeds_stock: Vec<StockItem>,
    pub night_stock: Vec<StockItem>,
    pub blood_stock: Vec<StockItem>,
    pub cosmetics_stock: Vec<StockItem>,
    pub honey_stock: Vec<StockItem>,
    pub last_seen: LastSeen,
    /// When the data was pulled from upstream, set by the cache.
    #[serde(rename = "fetchedAt", skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<String>,
}
