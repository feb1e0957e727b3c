use std::collections::BTreeSet;
use std::convert::Infallible;
use std::str::FromStr;

use envconfig::Envconfig;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::GtmError;

#[derive(Envconfig, Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    #[envconfig(from = "GTM_CONTAINER_ID", default = "")]
    pub container_id: String,

    /// Preview environment, switches the loader to the `with-env` template when set.
    #[envconfig(from = "GTM_ENVIRONMENT", default = "")]
    pub environment: String,

    /// Trait keys forwarded as custom dimensions.
    #[envconfig(from = "GTM_DIMENSIONS", default = "")]
    pub dimensions: Dimensions,

    /// Replaces `dimensions` when present.
    #[envconfig(from = "GTM_EXTRA_DIMENSIONS")]
    pub extra_dimensions: Option<Dimensions>,

    #[envconfig(from = "GTM_TRACK_NAMED_PAGES", default = "true")]
    pub track_named_pages: bool,

    #[envconfig(from = "GTM_TRACK_CATEGORIZED_PAGES", default = "true")]
    pub track_categorized_pages: bool,

    #[envconfig(from = "GTM_TRACK_ALL_PAGES", default = "false")]
    pub track_all_pages: bool,

    /// Marks the integration ready on `initialize` without loading the container.
    #[envconfig(from = "GTM_READINESS_OVERRIDE", default = "false")]
    pub readiness_override: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            container_id: String::new(),
            environment: String::new(),
            dimensions: Dimensions::default(),
            extra_dimensions: None,
            track_named_pages: true,
            track_categorized_pages: true,
            track_all_pages: false,
            readiness_override: false,
        }
    }
}

impl Config {
    pub fn init_with_defaults() -> Result<Self, GtmError> {
        Ok(Self::init_from_env()?)
    }

    /// Trait keys picked from the user traits, `extraDimensions` first.
    pub fn forwarded_dimensions(&self) -> &Dimensions {
        self.extra_dimensions.as_ref().unwrap_or(&self.dimensions)
    }

    /// Parses integration settings as delivered by the analytics backend,
    /// e.g. `{"containerId": "GTM-XXXX", "trackAllPages": true}`.
    pub fn from_json(settings: &str) -> Result<Self, GtmError> {
        Ok(serde_json::from_str(settings)?)
    }
}

/// Set of trait keys to forward. Parses from a comma separated list in the
/// environment, and from a list, a comma separated string, an object (keys
/// are used) or null in JSON settings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dimensions(BTreeSet<String>);

impl Dimensions {
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }
}

impl<S: Into<String>> FromIterator<S> for Dimensions {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Dimensions(
            iter.into_iter()
                .map(Into::into)
                .filter(|key: &String| !key.is_empty())
                .collect(),
        )
    }
}

impl FromStr for Dimensions {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.split(',').map(str::trim).collect())
    }
}

impl<'de> Deserialize<'de> for Dimensions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            List(Vec<String>),
            Csv(String),
            Mapping(Map<String, Value>),
            Null(()),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::List(keys) => keys.into_iter().collect(),
            Repr::Csv(keys) => keys.split(',').map(str::trim).collect(),
            Repr::Mapping(mapping) => mapping.into_iter().map(|(key, _)| key).collect(),
            Repr::Null(()) => Dimensions::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, Dimensions};

    #[test]
    fn defaults_match_the_integration_options() {
        let config = Config::default();

        assert!(config.track_named_pages);
        assert!(config.track_categorized_pages);
        assert!(!config.track_all_pages);
        assert!(!config.readiness_override);
        assert!(config.dimensions.is_empty());
    }

    #[test]
    fn dimensions_from_csv() {
        let dimensions: Dimensions = " plan, company,,plan ".parse().unwrap();

        assert_eq!(
            dimensions.iter().cloned().collect::<Vec<_>>(),
            vec![String::from("company"), String::from("plan")]
        );
    }

    #[test]
    fn settings_from_json() {
        let config = Config::from_json(
            r#"{
                "containerId": "GTM-ABC123",
                "environment": "env-5",
                "extraDimensions": ["plan"],
                "trackNamedPages": false
            }"#,
        )
        .unwrap();

        assert_eq!(config.container_id, "GTM-ABC123");
        assert_eq!(config.environment, "env-5");
        assert!(config.forwarded_dimensions().contains("plan"));
        assert!(!config.track_named_pages);
        assert!(config.track_categorized_pages);
    }

    #[test]
    fn dimensions_accept_a_mapping() {
        let config = Config::from_json(r#"{"dimensions": {"plan": "dimension1"}}"#).unwrap();
        assert!(config.dimensions.contains("plan"));
    }

    #[test]
    fn extra_dimensions_win_over_dimensions() {
        let config = Config::from_json(
            r#"{
                "containerId": "GTM-1",
                "dimensions": {"plan": "dimension1"},
                "extraDimensions": ["company"]
            }"#,
        )
        .unwrap();

        assert!(config.dimensions.contains("plan"));
        let forwarded = config.forwarded_dimensions();
        assert!(forwarded.contains("company"));
        assert!(!forwarded.contains("plan"));
    }

    #[test]
    fn dimensions_fall_back_without_extra_dimensions() {
        let config = Config::from_json(r#"{"dimensions": ["plan"]}"#).unwrap();

        assert_eq!(config.extra_dimensions, None);
        assert!(config.forwarded_dimensions().contains("plan"));
    }

    #[test]
    fn null_dimensions_are_empty() {
        let config =
            Config::from_json(r#"{"dimensions": null, "extraDimensions": null}"#).unwrap();

        assert!(config.dimensions.is_empty());
        assert_eq!(config.extra_dimensions, None);
        assert!(config.forwarded_dimensions().is_empty());
    }

    #[test]
    fn invalid_settings_are_rejected() {
        assert!(Config::from_json(r#"{"trackAllPages": "sometimes"}"#).is_err());
    }
}
