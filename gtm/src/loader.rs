use url::form_urlencoded;

use crate::config::Config;
use crate::error::GtmError;

pub const GTM_SCRIPT_URL: &str = "//www.googletagmanager.com/gtm.js";
pub const DATA_LAYER_NAME: &str = "dataLayer";

/// Container script templates. `WithEnv` adds the preview environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoaderTemplate {
    NoEnv,
    WithEnv,
}

impl LoaderTemplate {
    pub fn for_config(config: &Config) -> Self {
        if config.environment.is_empty() {
            LoaderTemplate::NoEnv
        } else {
            LoaderTemplate::WithEnv
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LoaderTemplate::NoEnv => "no-env",
            LoaderTemplate::WithEnv => "with-env",
        }
    }

    /// Script `src` for the container in `config`.
    pub fn render(&self, config: &Config) -> Result<String, GtmError> {
        if config.container_id.is_empty() {
            return Err(GtmError::MissingContainerId);
        }

        let mut query = form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("id", &config.container_id)
            .append_pair("l", DATA_LAYER_NAME);
        if *self == LoaderTemplate::WithEnv {
            query.append_pair("gtm_preview", &config.environment);
        }

        Ok(format!("{}?{}", GTM_SCRIPT_URL, query.finish()))
    }
}
