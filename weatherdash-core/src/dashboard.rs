//! Acquisition of a (current conditions, forecast) pair and the state the
//! rendering layer displays.
//!
//! [`Acquirer`] performs the network work for one attempt and reports
//! progress over a channel. [`Dashboard`] is the single owner of what is on
//! screen: it numbers attempts as they are triggered and ignores every event
//! that does not belong to the newest one, so a slow, superseded attempt can
//! never overwrite a newer result.

use std::sync::Arc;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, instrument};

use crate::{
    error::WeatherError,
    geolocation::Geolocator,
    model::{Coordinates, WeatherView},
    preferences::PreferencesStore,
    provider::WeatherProvider,
};

pub type AttemptId = u64;

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Use the device position, falling back to the default city.
    Locate,
    Search(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Locating,
    Fetching,
    FallbackFetching,
    Ready,
    Failed,
}

impl Phase {
    pub fn is_loading(self) -> bool {
        matches!(self, Phase::Locating | Phase::Fetching | Phase::FallbackFetching)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub id: AttemptId,
    pub trigger: Trigger,
}

/// Outcome of one attempt.
#[derive(Debug)]
pub struct Completion {
    pub attempt: Attempt,
    pub result: Result<WeatherView, WeatherError>,
}

#[derive(Debug)]
pub enum AcquisitionEvent {
    Progress { attempt: AttemptId, phase: Phase },
    Finished(Completion),
}

pub type EventSender = mpsc::UnboundedSender<AcquisitionEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<AcquisitionEvent>;

/// Runs acquisition attempts. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Acquirer {
    provider: Arc<dyn WeatherProvider>,
    geolocator: Arc<dyn Geolocator>,
    default_city: String,
}

impl Acquirer {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        geolocator: Arc<dyn Geolocator>,
        default_city: impl Into<String>,
    ) -> Self {
        Self { provider, geolocator, default_city: default_city.into() }
    }

    pub fn default_city(&self) -> &str {
        &self.default_city
    }

    /// Run one attempt to completion. Phase changes are sent on `progress`;
    /// the outcome is returned rather than sent.
    #[instrument(skip_all, fields(attempt = attempt.id))]
    pub async fn acquire(&self, attempt: Attempt, progress: &EventSender) -> Completion {
        let report = |phase| {
            // A closed channel only means nobody is watching any more.
            let _ = progress.send(AcquisitionEvent::Progress { attempt: attempt.id, phase });
        };

        let result = match &attempt.trigger {
            Trigger::Locate => match self.geolocator.current_position().await {
                Ok(coordinates) => {
                    report(Phase::Fetching);
                    self.fetch_by_coordinates(coordinates).await
                }
                Err(reason) => {
                    info!(%reason, city = %self.default_city, "no position, using default city");
                    report(Phase::FallbackFetching);
                    self.fetch_by_city(&self.default_city).await
                }
            },
            Trigger::Search(city) => self.fetch_by_city(city).await,
        };

        if let Err(e) = &result {
            debug!(error = %e, "attempt failed");
        }

        Completion { attempt, result }
    }

    /// Run an attempt on the tokio runtime, delivering its completion on
    /// `events` as [`AcquisitionEvent::Finished`].
    pub fn spawn(&self, attempt: Attempt, events: EventSender) -> JoinHandle<()> {
        let acquirer = self.clone();
        tokio::spawn(async move {
            let completion = acquirer.acquire(attempt, &events).await;
            let _ = events.send(AcquisitionEvent::Finished(completion));
        })
    }

    async fn fetch_by_coordinates(
        &self,
        coordinates: Coordinates,
    ) -> Result<WeatherView, WeatherError> {
        let current = self.provider.fetch_current_by_coordinates(coordinates).await?;
        let forecast = self.provider.fetch_forecast(coordinates).await?;
        Ok(WeatherView { current, forecast })
    }

    async fn fetch_by_city(&self, city: &str) -> Result<WeatherView, WeatherError> {
        let current = self.provider.fetch_current_by_city(city).await?;
        let forecast = self.provider.fetch_forecast(current.coordinates).await?;
        Ok(WeatherView { current, forecast })
    }
}

/// Displayed state for one view session.
#[derive(Debug, Default)]
pub struct Dashboard {
    phase: Phase,
    latest: AttemptId,
    view: Option<WeatherView>,
    error: Option<String>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn view(&self) -> Option<&WeatherView> {
        self.view.as_ref()
    }

    /// User-facing message of the last failed attempt.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn latest_attempt(&self) -> AttemptId {
        self.latest
    }

    /// Start a new attempt. Any attempt still in flight becomes stale.
    pub fn begin(&mut self, trigger: Trigger) -> Attempt {
        let trigger = match trigger {
            Trigger::Search(city) => Trigger::Search(city.trim().to_string()),
            Trigger::Locate => Trigger::Locate,
        };

        self.latest += 1;
        self.error = None;
        self.phase = match trigger {
            Trigger::Locate => Phase::Locating,
            Trigger::Search(_) => Phase::Fetching,
        };

        Attempt { id: self.latest, trigger }
    }

    /// Apply an event. Returns `false` when it belonged to a superseded
    /// attempt and was discarded.
    pub fn apply(&mut self, event: AcquisitionEvent, prefs: &mut PreferencesStore) -> bool {
        match event {
            AcquisitionEvent::Progress { attempt, phase } => {
                if attempt != self.latest || !self.phase.is_loading() {
                    debug!(attempt, latest = self.latest, "discarding stale progress");
                    return false;
                }
                self.phase = phase;
                true
            }
            AcquisitionEvent::Finished(completion) => self.finish(completion, prefs),
        }
    }

    fn finish(&mut self, completion: Completion, prefs: &mut PreferencesStore) -> bool {
        let Completion { attempt, result } = completion;
        if attempt.id != self.latest {
            debug!(attempt = attempt.id, latest = self.latest, "discarding stale result");
            return false;
        }

        match result {
            Ok(view) => {
                if let Trigger::Search(city) = &attempt.trigger {
                    prefs.add_recent_search(city);
                }
                self.view = Some(view);
                self.error = None;
                self.phase = Phase::Ready;
            }
            Err(e) => {
                self.view = None;
                self.error = Some(e.user_message());
                self.phase = Phase::Failed;
            }
        }
        true
    }

    /// Run a single attempt end to end and return the phase it settled in.
    pub async fn run(
        &mut self,
        acquirer: &Acquirer,
        trigger: Trigger,
        prefs: &mut PreferencesStore,
    ) -> Phase {
        let attempt = self.begin(trigger);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let completion = acquirer.acquire(attempt, &tx).await;
        drop(tx);

        while let Ok(event) = rx.try_recv() {
            self.apply(event, prefs);
        }
        self.apply(AcquisitionEvent::Finished(completion), prefs);

        self.phase
    }

    pub async fn search(
        &mut self,
        acquirer: &Acquirer,
        city: &str,
        prefs: &mut PreferencesStore,
    ) -> Phase {
        self.run(acquirer, Trigger::Search(city.to_string()), prefs).await
    }

    pub async fn locate(&mut self, acquirer: &Acquirer, prefs: &mut PreferencesStore) -> Phase {
        self.run(acquirer, Trigger::Locate, prefs).await
    }
}
