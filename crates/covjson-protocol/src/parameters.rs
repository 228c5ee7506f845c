//! Parameter metadata.
//!
//! A parameter names one range variable: what it measures, its unit, and
//! for categorical data the categories and the numeric codes they map to.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Metadata for one range variable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Parameter {
    /// `"Parameter"` when present.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<I18nString>,

    #[serde(rename = "observedProperty")]
    pub observed_property: ObservedProperty,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,

    /// Category key to numeric code, in declaration order.
    #[serde(
        rename = "categoryEncoding",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub category_encoding: Option<IndexMap<String, f64>>,
}

impl Parameter {
    /// Parameter whose observed property carries an English `label`.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            type_: Some("Parameter".to_string()),
            description: None,
            observed_property: ObservedProperty {
                id: None,
                label: Some(I18nString::english(label)),
                description: None,
                categories: None,
            },
            unit: None,
            category_encoding: None,
        }
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.observed_property.categories = Some(categories);
        self
    }

    /// Append one `key -> code` pair after any existing ones.
    pub fn with_encoding(mut self, key: impl Into<String>, code: f64) -> Self {
        self.category_encoding
            .get_or_insert_with(IndexMap::new)
            .insert(key.into(), code);
        self
    }

    pub fn unit_label(&self) -> Option<&str> {
        self.unit.as_ref().and_then(Unit::display_label)
    }
}

/// Text that is either a bare string or a language-tagged map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum I18nString {
    Simple(String),
    /// Language tag to text, in document order.
    Localized(IndexMap<String, String>),
}

impl I18nString {
    pub fn english(text: impl Into<String>) -> Self {
        I18nString::Localized(IndexMap::from([("en".to_string(), text.into())]))
    }

    /// The `en` entry when present, else the first entry.
    pub fn text(&self) -> &str {
        match self {
            I18nString::Simple(s) => s,
            I18nString::Localized(map) => match map.get("en") {
                Some(s) => s,
                None => self.first(),
            },
        }
    }

    /// The first entry in document order; empty for an empty map.
    pub fn first(&self) -> &str {
        match self {
            I18nString::Simple(s) => s,
            I18nString::Localized(map) => map.values().next().map_or("", String::as_str),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObservedProperty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<I18nString>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<I18nString>,

    /// Present only for categorical parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,
}

/// One class of a categorical parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<I18nString>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<I18nString>,

    /// CSS-style hex color such as `#228b22`.
    #[serde(
        rename = "preferredColor",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub preferred_color: Option<String>,
}

impl Category {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: Some(I18nString::english(label)),
            description: None,
            preferred_color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.preferred_color = Some(color.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Unit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<I18nString>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<UnitSymbol>,
}

impl Unit {
    pub fn from_symbol(symbol: impl Into<String>) -> Self {
        Self {
            label: None,
            symbol: Some(UnitSymbol::Simple(symbol.into())),
        }
    }

    pub fn kelvin() -> Self {
        Self {
            label: Some(I18nString::english("Kelvin")),
            symbol: Some(UnitSymbol::Simple("K".to_string())),
        }
    }

    /// Label used to qualify field names: the unit label, else its symbol.
    pub fn display_label(&self) -> Option<&str> {
        self.label
            .as_ref()
            .map(I18nString::text)
            .or_else(|| self.symbol.as_ref().map(UnitSymbol::value))
            .filter(|s| !s.is_empty())
    }
}

/// Either `"K"` or `{"value": "K", "type": "<UCUM uri>"}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum UnitSymbol {
    Simple(String),
    Structured {
        value: String,
        #[serde(rename = "type")]
        type_: Option<String>,
    },
}

impl UnitSymbol {
    pub fn value(&self) -> &str {
        match self {
            UnitSymbol::Simple(s) | UnitSymbol::Structured { value: s, .. } => s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_label_prefers_label_over_symbol() {
        let param = Parameter::new("Temperature").with_unit(Unit::kelvin());
        assert_eq!(param.unit_label(), Some("Kelvin"));
        assert_eq!(Parameter::new("Count").unit_label(), None);
    }

    #[test]
    fn test_category_encoding_keeps_declaration_order() {
        let json = r##"{
            "type": "Parameter",
            "observedProperty": { "label": { "en": "Land cover" } },
            "categoryEncoding": { "#ff0000": 30, "#00ff00": 1, "#0000ff": 15 }
        }"##;
        let param: Parameter = serde_json::from_str(json).unwrap();
        let encoding = param.category_encoding.unwrap();
        let keys: Vec<&str> = encoding.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["#ff0000", "#00ff00", "#0000ff"]);
        assert_eq!(encoding["#0000ff"], 15.0);
    }

    #[test]
    fn test_localized_text_prefers_english() {
        let json = r#"{ "de": "Gebäude", "en": "Building" }"#;
        let s: I18nString = serde_json::from_str(json).unwrap();
        assert_eq!(s.text(), "Building");
        assert_eq!(s.first(), "Gebäude");

        let plain = I18nString::Simple("Temperature".to_string());
        assert_eq!(plain.text(), "Temperature");
        assert_eq!(plain.first(), "Temperature");
    }

    #[test]
    fn test_category_deserialization() {
        let json = r##"{ "id": "residential", "label": { "en": "Residential" }, "preferredColor": "#ff0000" }"##;
        let category: Category = serde_json::from_str(json).unwrap();
        assert_eq!(category.id, "residential");
        assert_eq!(category.preferred_color.as_deref(), Some("#ff0000"));
    }

    #[test]
    fn test_unit_display_label_falls_back_to_symbol() {
        let json = r#"{"symbol":{"value":"K","type":"http://www.opengis.net/def/uom/UCUM/"}}"#;
        let unit: Unit = serde_json::from_str(json).unwrap();
        assert_eq!(unit.display_label(), Some("K"));
        assert_eq!(Unit::from_symbol("m/s").display_label(), Some("m/s"));
    }
}
