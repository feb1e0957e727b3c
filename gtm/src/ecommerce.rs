//! Enhanced ecommerce product data.
//!
//! See https://developers.google.com/analytics/devguides/collection/analyticsjs/enhanced-ecommerce#product-data

use serde_json::{Map, Number, Value};

use crate::event::{is_truthy, Track};

pub const PRODUCT_CLICKED: &str = "Product Clicked";
pub const PRODUCT_CLICK_EVENT: &str = "productClick";

/// Product fields of a track call, in the shape the tag manager expects.
/// `None` fields are left out of the payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductProjection {
    pub id: Option<Value>,
    pub name: Option<Value>,
    pub category: Option<Value>,
    pub quantity: Value,
    pub price: Option<Value>,
    pub brand: Option<Value>,
    pub variant: Option<Value>,
    pub currency: String,
    pub position: Option<Number>,
    pub coupon: Option<Value>,
}

impl ProductProjection {
    pub fn from_track(track: &impl Track) -> Self {
        let props = track.properties();

        let id = [track.product_id(), track.id(), track.sku()]
            .into_iter()
            .flatten()
            .find(|value| is_truthy(value))
            .cloned();

        ProductProjection {
            id,
            name: track.name().cloned(),
            category: track.category().cloned(),
            quantity: track.quantity(),
            price: track.price().cloned(),
            brand: props.get("brand").cloned(),
            variant: props.get("variant").cloned(),
            currency: track.currency(),
            // The tag manager requires an integer, but callers may send a float.
            position: props
                .get("position")
                .filter(|value| !value.is_null())
                .and_then(round_position),
            coupon: track
                .proxy("properties.coupon")
                .filter(|value| is_truthy(value))
                .cloned(),
        }
    }

    pub fn into_payload(self) -> Map<String, Value> {
        let mut product = Map::new();
        let mut set = |key: &str, value: Option<Value>| {
            if let Some(value) = value {
                product.insert(String::from(key), value);
            }
        };

        set("id", self.id);
        set("name", self.name);
        set("category", self.category);
        set("quantity", Some(self.quantity));
        set("price", self.price);
        set("brand", self.brand);
        set("variant", self.variant);
        set("currency", Some(Value::String(self.currency)));
        set("position", self.position.map(Value::Number));
        set("coupon", self.coupon);

        product
    }
}

/// Rounds half away from zero. Integers are kept as they are, numeric
/// strings are accepted, anything else that is not a finite number is dropped.
/// A rounded value outside the integer range stays a float.
pub fn round_position(value: &Value) -> Option<Number> {
    let position = match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => return Some(n.clone()),
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    let rounded = position.round();
    if !rounded.is_finite() {
        return None;
    }

    let digits = format!("{rounded:.0}");
    if let Ok(integer) = digits.parse::<i64>() {
        Some(Number::from(integer))
    } else if let Ok(integer) = digits.parse::<u64>() {
        Some(Number::from(integer))
    } else {
        Number::from_f64(rounded)
    }
}
