use std::sync::Arc;

use anyhow::Context;
use envconfig::Envconfig;
use error_tracking::config::ErrorTrackingConfig;
use error_tracking::sink::LogReportSink;
use error_tracking::tracker::ErrorTracker;
use gtm::config::Config;
use gtm::datalayer::{ChannelDataLayer, PrintDataLayer};
use gtm::identity::CurrentUser;
use gtm::integration::EnhancedGtm;
use tracing_subscriber::EnvFilter;

mod message;
mod replay;

use replay::{drain, replay};

#[derive(Envconfig)]
struct ReplayConfig {
    /// Log pushes instead of writing them to stdout.
    #[envconfig(from = "REPLAY_PRINT_SINK", default = "false")]
    print_sink: bool,

    /// Push the `gtm.js` bootstrap entry before replaying.
    #[envconfig(from = "REPLAY_BOOTSTRAP", default = "true")]
    bootstrap: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the data layer, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let replay_config = ReplayConfig::init_from_env().context("invalid replay configuration")?;
    let config = Config::init_with_defaults()?;
    let errors = ErrorTracker::init(
        ErrorTrackingConfig::init_with_defaults().context("invalid error tracking configuration")?,
        LogReportSink {},
    );

    let user = Arc::new(CurrentUser::default());
    let (integration, consumer) = if replay_config.print_sink {
        (EnhancedGtm::new(config, PrintDataLayer {}, user.clone()), None)
    } else {
        let (data_layer, receiver) = ChannelDataLayer::new();
        (
            EnhancedGtm::new(config, data_layer, user.clone()),
            Some(tokio::spawn(drain(receiver, tokio::io::stdout()))),
        )
    };

    if replay_config.bootstrap {
        if let Some(src) = integration
            .initialize()
            .context("failed to initialize the tag manager")?
        {
            tracing::info!(src = %src, "container script");
        }
    }
    integration.mark_loaded();

    let stats = replay(tokio::io::stdin(), &integration, &user, &errors).await?;

    // dropping the integration closes the channel and lets the consumer finish
    drop(integration);
    if let Some(consumer) = consumer {
        consumer.await??;
    }

    tracing::info!(
        replayed = stats.replayed,
        skipped = stats.skipped,
        "replay finished"
    );
    Ok(())
}
