use std::{str::FromStr, sync::Arc};

use anyhow::{Context, anyhow};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing::warn;
use weatherdash_core::{
    Acquirer, Config, ConfiguredLocation, Coordinates, Dashboard, FileStorage, MemoryStorage,
    Phase, PreferencesStore, TemperatureUnit, ThemeMode, provider_from_config,
};

use crate::{configure, render, repl};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherdash", version, about = "Current weather and 7-day forecast in the terminal")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively store the API key, default city and home location.
    Configure,

    /// Show weather for a city, or for your location when no city is given.
    Show {
        /// City name, e.g. "Paris" or "Paris,FR".
        city: Option<String>,

        #[command(flatten)]
        position: PositionArgs,

        /// Print the raw view as JSON instead of formatted text.
        #[arg(long)]
        json: bool,
    },

    /// Interactive dashboard: type a city to search, empty line to locate.
    Repl {
        #[command(flatten)]
        position: PositionArgs,
    },

    /// Set the temperature unit used for display.
    Units {
        /// c, f, celsius or fahrenheit.
        unit: TemperatureUnit,
    },

    /// Set or toggle the theme preference.
    Theme {
        /// light, dark or toggle.
        mode: ThemeChoice,
    },

    /// List recent searches.
    History {
        /// Forget all recent searches.
        #[arg(long)]
        clear: bool,
    },

    /// Show stored preferences.
    Prefs,
}

/// Position to report for "use my location". Falls back to `[location]` in
/// the config file.
#[derive(Debug, Clone, Copy, Default, Args)]
pub struct PositionArgs {
    /// Latitude in degrees.
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude in degrees.
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,
}

impl PositionArgs {
    fn resolve(self, config: &Config) -> anyhow::Result<Option<Coordinates>> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Ok(Some(Coordinates::new(lat, lon)?)),
            _ => Ok(config.location),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeChoice {
    Set(ThemeMode),
    Toggle,
}

impl FromStr for ThemeChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("toggle") {
            return Ok(ThemeChoice::Toggle);
        }
        s.parse()
            .map(ThemeChoice::Set)
            .map_err(|_| format!("Unknown theme '{s}'. Expected light, dark or toggle."))
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure::run()?,
            Command::Show { city, position, json } => {
                let config = Config::load()?;
                let acquirer = build_acquirer(&config, position)?;
                let mut prefs = open_preferences();
                let mut dash = Dashboard::new();

                let phase = match city {
                    Some(city) => dash.search(&acquirer, &city, &mut prefs).await,
                    None => dash.locate(&acquirer, &mut prefs).await,
                };

                match (phase, dash.view()) {
                    (Phase::Ready, Some(view)) if json => {
                        let out = serde_json::to_string_pretty(view)
                            .context("Failed to serialize weather view")?;
                        println!("{out}");
                    }
                    (Phase::Ready, Some(view)) => {
                        print!("{}", render::render_view(view, prefs.get(), Utc::now()));
                    }
                    _ => {
                        let message = dash.error().unwrap_or("Failed to fetch weather");
                        return Err(anyhow!("{message}"));
                    }
                }
            }
            Command::Repl { position } => {
                let config = Config::load()?;
                let acquirer = build_acquirer(&config, position)?;
                repl::run(acquirer, open_preferences()).await?;
            }
            Command::Units { unit } => {
                let mut prefs = open_preferences();
                prefs.set_unit(unit);
                println!("Temperature unit set to {}", render::unit_name(unit));
            }
            Command::Theme { mode } => {
                let mut prefs = open_preferences();
                let theme = match mode {
                    ThemeChoice::Set(theme) => {
                        prefs.set_theme(theme);
                        theme
                    }
                    ThemeChoice::Toggle => prefs.toggle_theme(),
                };
                println!("Theme set to {theme}");
            }
            Command::History { clear } => {
                let mut prefs = open_preferences();
                if clear {
                    prefs.clear_recent_searches();
                    println!("Recent searches cleared");
                } else {
                    print!("{}", render::render_history(&prefs.get().recent_searches));
                }
            }
            Command::Prefs => {
                let prefs = open_preferences();
                print!("{}", render::render_preferences(prefs.get()));
            }
        }

        Ok(())
    }
}

fn build_acquirer(config: &Config, position: PositionArgs) -> anyhow::Result<Acquirer> {
    let provider = provider_from_config(config)?;
    let location = ConfiguredLocation::new(position.resolve(config)?);

    Ok(Acquirer::new(provider, Arc::new(location), config.default_city.clone()))
}

/// Preferences backed by the data directory, or kept in memory when no
/// home directory can be determined.
fn open_preferences() -> PreferencesStore {
    match FileStorage::open_default() {
        Ok(storage) => PreferencesStore::load(Box::new(storage)),
        Err(e) => {
            warn!(error = %e, "no data directory; preferences will not be saved");
            PreferencesStore::load(Box::new(MemoryStorage::new()))
        }
    }
}
