use envconfig::Envconfig;

#[derive(Envconfig, Clone, Debug, Default)]
pub struct ErrorTrackingConfig {
    #[envconfig(from = "ERROR_TRACKING_ENVIRONMENT", default = "development")]
    pub environment: String,

    #[envconfig(from = "ERROR_TRACKING_RELEASE", default = "")]
    pub release: String,

    /// Reports are only sent when a DSN is configured.
    #[envconfig(from = "SENTRY_DSN")]
    pub sentry_dsn: Option<String>,

    #[envconfig(from = "ERROR_TRACKING_DEBUG", default = "false")]
    pub debug: bool,
}

impl ErrorTrackingConfig {
    pub fn init_with_defaults() -> Result<Self, envconfig::Error> {
        let res = Self::init_from_env()?;
        Ok(res)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
