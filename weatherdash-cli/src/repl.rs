//! Interactive dashboard.
//!
//! Each trigger runs as its own task and reports back over a channel; the
//! loop below is the only place that touches the dashboard and preferences.
//! A new trigger does not cancel the previous one, its late result is simply
//! dropped by the dashboard.

use anyhow::Context;
use chrono::Utc;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use weatherdash_core::{
    Acquirer, Dashboard, Phase, PreferencesStore, TemperatureUnit, Trigger,
    dashboard::EventSender,
};

use crate::render;

const HELP: &str = "\
Type a city name to search, or:
  (empty line)  use my location
  :locate       use my location
  :retry        try again after an error
  :1 .. :5      repeat a recent search
  :units c|f    change the temperature unit
  :history      list recent searches
  :clear        forget recent searches
  :help         show this help
  :q            quit
";

#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplCommand {
    Trigger(Trigger),
    Recent(usize),
    Units(TemperatureUnit),
    History,
    ClearHistory,
    Help,
    Quit,
    Invalid(String),
}

fn parse_command(line: &str) -> ReplCommand {
    let line = line.trim();
    let Some(rest) = line.strip_prefix(':') else {
        return if line.is_empty() {
            ReplCommand::Trigger(Trigger::Locate)
        } else {
            ReplCommand::Trigger(Trigger::Search(line.to_string()))
        };
    };

    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("q" | "quit"), None) => ReplCommand::Quit,
        (Some("locate" | "retry"), None) => ReplCommand::Trigger(Trigger::Locate),
        (Some("history"), None) => ReplCommand::History,
        (Some("clear"), None) => ReplCommand::ClearHistory,
        (Some("help"), None) => ReplCommand::Help,
        (Some("units"), Some(unit)) => match unit.parse() {
            Ok(unit) => ReplCommand::Units(unit),
            Err(e) => ReplCommand::Invalid(e),
        },
        (Some(n), None) if n.bytes().all(|b| b.is_ascii_digit()) => match n.parse() {
            Ok(n) if n >= 1 => ReplCommand::Recent(n),
            _ => ReplCommand::Invalid(format!("No recent search #{n}")),
        },
        _ => ReplCommand::Invalid(format!("Unknown command ':{rest}'. Type :help for help.")),
    }
}

pub async fn run(acquirer: Acquirer, mut prefs: PreferencesStore) -> anyhow::Result<()> {
    let mut dash = Dashboard::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print!("{HELP}");
    start(&mut dash, &acquirer, Trigger::Locate, &tx, &prefs);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };

                match parse_command(&line) {
                    ReplCommand::Quit => break,
                    ReplCommand::Trigger(trigger) => start(&mut dash, &acquirer, trigger, &tx, &prefs),
                    ReplCommand::Recent(n) => match prefs.get().recent_searches.get(n - 1) {
                        Some(city) => {
                            let trigger = Trigger::Search(city.clone());
                            start(&mut dash, &acquirer, trigger, &tx, &prefs);
                        }
                        None => println!("No recent search #{n}"),
                    },
                    ReplCommand::Units(unit) => {
                        prefs.set_unit(unit);
                        println!("Temperature unit set to {}", render::unit_name(unit));
                        show(&dash, &prefs);
                    }
                    ReplCommand::History => {
                        print!("{}", render::render_history(&prefs.get().recent_searches));
                    }
                    ReplCommand::ClearHistory => {
                        prefs.clear_recent_searches();
                        println!("Recent searches cleared");
                    }
                    ReplCommand::Help => print!("{HELP}"),
                    ReplCommand::Invalid(message) => println!("{message}"),
                }
            }
            Some(event) = rx.recv() => {
                if dash.apply(event, &mut prefs) {
                    show(&dash, &prefs);
                }
            }
        }
    }

    Ok(())
}

fn start(
    dash: &mut Dashboard,
    acquirer: &Acquirer,
    trigger: Trigger,
    events: &EventSender,
    prefs: &PreferencesStore,
) {
    let attempt = dash.begin(trigger);
    acquirer.spawn(attempt, events.clone());
    show(dash, prefs);
}

fn show(dash: &Dashboard, prefs: &PreferencesStore) {
    match dash.phase() {
        Phase::Idle => {}
        Phase::Locating => println!("Locating..."),
        Phase::Fetching => println!("Fetching weather..."),
        Phase::FallbackFetching => {
            println!("Location unavailable, fetching weather for the default city...");
        }
        Phase::Ready => {
            if let Some(view) = dash.view() {
                print!("\n{}\n", render::render_view(view, prefs.get(), Utc::now()));
            }
        }
        Phase::Failed => {
            let message = dash.error().unwrap_or("Failed to fetch weather");
            println!("Error: {message}\nType :retry to try again.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_search() {
        assert_eq!(
            parse_command("  New York "),
            ReplCommand::Trigger(Trigger::Search("New York".into()))
        );
    }

    #[test]
    fn empty_line_and_retry_locate() {
        assert_eq!(parse_command(""), ReplCommand::Trigger(Trigger::Locate));
        assert_eq!(parse_command(":retry"), ReplCommand::Trigger(Trigger::Locate));
        assert_eq!(parse_command(":locate"), ReplCommand::Trigger(Trigger::Locate));
    }

    #[test]
    fn recent_index_is_one_based() {
        assert_eq!(parse_command(":2"), ReplCommand::Recent(2));
        assert!(matches!(parse_command(":0"), ReplCommand::Invalid(_)));
    }

    #[test]
    fn units_command_parses_unit() {
        assert_eq!(parse_command(":units f"), ReplCommand::Units(TemperatureUnit::Fahrenheit));
        assert!(matches!(parse_command(":units k"), ReplCommand::Invalid(_)));
        assert!(matches!(parse_command(":units"), ReplCommand::Invalid(_)));
    }

    #[test]
    fn quit_and_unknown_commands() {
        assert_eq!(parse_command(":q"), ReplCommand::Quit);
        assert!(matches!(parse_command(":nope"), ReplCommand::Invalid(_)));
    }
}
