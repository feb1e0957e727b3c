use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use metrics::counter;
use serde_json::{json, Map, Value};
use tracing::instrument;

use crate::config::Config;
use crate::datalayer::DataLayer;
use crate::ecommerce::{ProductProjection, PRODUCT_CLICKED, PRODUCT_CLICK_EVENT};
use crate::error::GtmError;
use crate::event::{Event, Page, Track};
use crate::identity::{enhanced_user_info, User};
use crate::loader::LoaderTemplate;
use crate::time::{SystemTime, TimeSource};

/// Translates analytics calls into tag manager data layer pushes.
///
/// https://developers.google.com/tag-manager
pub struct EnhancedGtm {
    config: Config,
    data_layer: Arc<dyn DataLayer + Send + Sync>,
    user: Arc<dyn User + Send + Sync>,
    timesource: Arc<dyn TimeSource + Send + Sync>,
    loaded: AtomicBool,
}

impl EnhancedGtm {
    pub fn new(
        config: Config,
        data_layer: impl DataLayer + Send + Sync + 'static,
        user: Arc<dyn User + Send + Sync>,
    ) -> Self {
        EnhancedGtm {
            config,
            data_layer: Arc::new(data_layer),
            user,
            timesource: Arc::new(SystemTime {}),
            loaded: AtomicBool::new(false),
        }
    }

    pub fn with_timesource(mut self, timesource: impl TimeSource + Send + Sync + 'static) -> Self {
        self.timesource = Arc::new(timesource);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Pushes the `gtm.js` bootstrap entry and returns the container script
    /// the host has to load. With the readiness override nothing is pushed
    /// and the integration is ready right away.
    pub fn initialize(&self) -> Result<Option<String>, GtmError> {
        if self.config.readiness_override {
            self.loaded.store(true, Ordering::SeqCst);
            return Ok(None);
        }

        let template = LoaderTemplate::for_config(&self.config);
        let src = template.render(&self.config)?;

        let mut bootstrap = Map::new();
        bootstrap.insert(
            String::from("gtm.start"),
            Value::from(self.timesource.current_millis()),
        );
        bootstrap.insert(String::from("event"), Value::from("gtm.js"));
        self.data_layer.push(bootstrap);

        tracing::info!(template = template.name(), src = %src, "initialized tag manager");
        Ok(Some(src))
    }

    /// Called by the host once the container script has taken over the data layer.
    pub fn mark_loaded(&self) {
        self.loaded.store(true, Ordering::SeqCst);
    }

    /// Diagnostic only, pushes do not wait for it.
    pub fn loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    /// Routes a message to `page`, `product_clicked` or `track`.
    pub fn handle(&self, event: &Event) {
        match event {
            Event::Page(page) => {
                self.page(page);
            }
            Event::Track(track) if track.event().eq_ignore_ascii_case(PRODUCT_CLICKED) => {
                self.product_clicked(track)
            }
            Event::Track(track) => self.track(track),
        }
    }

    /// Returns the number of pushes, zero when no page option applies.
    pub fn page(&self, page: &impl Page) -> usize {
        let category = page.category();
        let name = page.full_name();
        let mut pushed = 0;

        // all
        if self.config.track_all_pages {
            self.track(&page.track(None));
            pushed += 1;
        }

        // categorized
        if let Some(category) = category.filter(|_| self.config.track_categorized_pages) {
            self.track(&page.track(Some(category)));
            pushed += 1;
        }

        // named
        if let Some(name) = name.filter(|_| self.config.track_named_pages) {
            self.track(&page.track(Some(name.as_str())));
            pushed += 1;
        }

        if pushed > 0 {
            counter!("gtm_events_translated_total", "kind" => "page").increment(1);
        }
        pushed
    }

    /// https://developers.google.com/tag-manager/devguide#events
    #[instrument(skip_all, fields(event = track.event()))]
    pub fn track(&self, track: &impl Track) {
        let mut payload =
            enhanced_user_info(self.user.as_ref(), self.config.forwarded_dimensions());
        payload.extend(track.properties().clone());
        payload.insert(String::from("event"), Value::from(track.event()));

        tracing::debug!(keys = payload.len(), "pushing track");
        counter!("gtm_events_translated_total", "kind" => "track").increment(1);
        self.data_layer.push(payload);
    }

    #[instrument(skip_all, fields(event = track.event()))]
    pub fn product_clicked(&self, track: &impl Track) {
        let mut payload =
            enhanced_user_info(self.user.as_ref(), self.config.forwarded_dimensions());
        let click = ProductProjection::from_track(track).into_payload();

        payload.insert(String::from("event"), Value::from(PRODUCT_CLICK_EVENT));
        payload.insert(String::from("ecommerce"), json!({ "click": click }));

        tracing::debug!("pushing product click");
        counter!("gtm_events_translated_total", "kind" => "product_click").increment(1);
        self.data_layer.push(payload);
    }
}
