use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One shop as the remote directory reports it. The upstream API is loose
/// about shapes (numbers arrive as strings, list elements sometimes as
/// JSON-encoded strings), so decoding goes through `from_value` instead of
/// a plain serde derive on the wire shape.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ShopRecord {
    pub id: u64,
    #[serde(default)]
    pub shop_name: String,
    #[serde(default)]
    pub shop_number: u32,
    #[serde(default)]
    pub shop_source: String,
    #[serde(default)]
    pub shop_address: String,
    #[serde(default)]
    pub city_id: Option<u64>,
}

impl ShopRecord {
    /// Decode a shop object, tolerating string-encoded numeric fields.
    /// Returns `None` for anything without a usable `id`, which also
    /// covers `{"error": ...}` bodies.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        if obj.contains_key("error") {
            return None;
        }
        Some(Self {
            id: loose_u64(obj.get("id")?)?,
            shop_name: loose_string(obj.get("shop_name")),
            shop_number: loose_u64(obj.get("shop_number").unwrap_or(&Value::Null))
                .unwrap_or(0) as u32,
            shop_source: loose_string(obj.get("shop_source")),
            shop_address: loose_string(obj.get("shop_address")),
            city_id: obj.get("city_id").and_then(loose_u64),
        })
    }

    /// Decode one element of a shop list, which may itself be a
    /// JSON-encoded string.
    pub fn from_entry(value: &Value) -> Option<Self> {
        match value {
            Value::Object(_) => Self::from_value(value),
            Value::String(raw) => {
                let inner: Value = serde_json::from_str(raw).ok()?;
                Self::from_value(&inner)
            }
            _ => None,
        }
    }
}

/// Pull the city id out of a `queryCity.php` response: the first element
/// (dict or JSON-encoded string) supplies `city_id` or `id`.
pub fn extract_city_id(list: &[Value]) -> Option<u64> {
    let first = list.first()?;
    let obj = match first {
        Value::Object(map) => map.clone(),
        Value::String(raw) => serde_json::from_str::<Value>(raw)
            .ok()?
            .as_object()?
            .clone(),
        _ => return None,
    };
    obj.get("city_id")
        .and_then(loose_u64)
        .or_else(|| obj.get("id").and_then(loose_u64))
}

fn loose_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn loose_string(value: Option<&Value>) -> String {
    value.and_then(Value::as_str).unwrap_or_default().to_string()
}
