use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Event name used by `Page::track` when no label is given.
pub const LOADED_A_PAGE: &str = "Loaded a Page";

/// Read access to a track call. Implementors only provide the raw event name
/// and properties, every other accessor is derived from them.
pub trait Track {
    fn event(&self) -> &str;
    fn properties(&self) -> &Map<String, Value>;

    /// Looks up a dotted path such as `properties.coupon`. Only the
    /// `properties` root is addressable. Keys match exactly first, then
    /// ignoring case and separators, so `product_id` finds `productId`.
    fn proxy(&self, path: &str) -> Option<&Value> {
        match path.split_once('.') {
            Some(("properties", rest)) => lookup(self.properties(), rest),
            _ => None,
        }
    }

    fn product_id(&self) -> Option<&Value> {
        self.proxy("properties.product_id")
    }

    fn id(&self) -> Option<&Value> {
        self.proxy("properties.id")
    }

    fn sku(&self) -> Option<&Value> {
        self.proxy("properties.sku")
    }

    fn name(&self) -> Option<&Value> {
        self.proxy("properties.name")
    }

    fn category(&self) -> Option<&Value> {
        self.proxy("properties.category")
    }

    fn price(&self) -> Option<&Value> {
        self.proxy("properties.price")
    }

    fn quantity(&self) -> Value {
        self.proxy("properties.quantity")
            .filter(|value| is_truthy(value))
            .cloned()
            .unwrap_or_else(|| Value::from(1))
    }

    fn currency(&self) -> String {
        self.proxy("properties.currency")
            .and_then(Value::as_str)
            .filter(|currency| !currency.is_empty())
            .map_or_else(|| String::from("USD"), str::to_uppercase)
    }
}

/// Read access to a page call.
pub trait Page {
    fn name(&self) -> Option<&str>;
    fn category(&self) -> Option<&str>;
    fn properties(&self) -> &Map<String, Value>;

    /// `"<category> <name>"` when both are set, otherwise just the name.
    fn full_name(&self) -> Option<String> {
        match (self.category(), self.name()) {
            (Some(category), Some(name)) => Some(format!("{} {}", category, name)),
            (_, name) => name.map(String::from),
        }
    }

    /// Projects the page view into a track call, named after `label` when given.
    fn track(&self, label: Option<&str>) -> TrackEvent {
        let event = match label {
            Some(label) => format!("Viewed {} Page", label),
            None => String::from(LOADED_A_PAGE),
        };

        let mut properties = self.properties().clone();
        if let Some(category) = self.category() {
            properties.insert(String::from("category"), Value::from(category));
        }
        if let Some(name) = self.name() {
            properties.insert(String::from("name"), Value::from(name));
        }

        TrackEvent { event, properties }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct PageEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Page for PageEvent {
    fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref().filter(|category| !category.is_empty())
    }

    fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct TrackEvent {
    pub event: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl TrackEvent {
    pub fn new(event: impl Into<String>, properties: Map<String, Value>) -> Self {
        TrackEvent {
            event: event.into(),
            properties,
        }
    }
}

impl Track for TrackEvent {
    fn event(&self) -> &str {
        &self.event
    }

    fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }
}

/// An analytics message as it arrives from the tracking library.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    Page(PageEvent),
    Track(TrackEvent),
}

/// Javascript truthiness of a JSON value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn lookup<'a>(map: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut current = map;
    let mut segments = path.split('.').peekable();
    while let Some(key) = segments.next() {
        let value = find_key(current, key)?;
        if segments.peek().is_none() {
            return Some(value);
        }
        current = value.as_object()?;
    }
    None
}

fn find_key<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    if let Some(value) = map.get(key) {
        return Some(value);
    }

    let wanted = normalize(key);
    map.iter()
        .find(|(candidate, _)| normalize(candidate) == wanted)
        .map(|(_, value)| value)
}

fn normalize(key: &str) -> String {
    key.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
