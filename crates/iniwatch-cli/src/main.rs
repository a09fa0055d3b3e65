//! iniwatch: print the key-level changes of an INI file as it is edited.
//!
//! Loads the file, reports every key as added, then streams added,
//! updated and deleted keys for each settled modification until Ctrl-C.

mod cli;

use iniwatch_common::{ChangeEvent, ConfigError, Key};
use iniwatch_config::{
    settings, watch_scope, Backend, IniBackend, IniSource, WatchHandle, WatchSession,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = cli::parse();

    // Logs go to stderr so stdout carries only events
    let filter = match args.log_level.as_deref() {
        Some(level) => EnvFilter::new(format!("iniwatch={level}")),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| "iniwatch=info".into()),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args).await {
        eprintln!("iniwatch: {e}");
        std::process::exit(1);
    }
}

async fn run(args: cli::Args) -> Result<(), ConfigError> {
    let mut watch_settings = match &args.settings {
        Some(path) => settings::load_from_path(path)?,
        None => settings::load_default()?,
    };
    if let Some(ms) = args.tick_ms {
        watch_settings.tick_interval_ms = ms;
    }
    settings::validate(&watch_settings)?;

    let (backend, mut changes) = open(&args, watch_settings)?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, stopping watch");
                break;
            }
            event = changes.recv() => match event {
                Some(event) => println!("{}", render(&event, args.json)),
                None => break,
            },
        }
    }

    if let Some(backend) = backend {
        backend.close();
    }
    changes.stop().await;
    Ok(())
}

/// Open the backend and start watching. A file that does not exist yet is
/// still watched; the session keeps retrying until it appears.
fn open(
    args: &cli::Args,
    watch_settings: settings::WatchSettings,
) -> Result<(Option<IniBackend>, WatchHandle), ConfigError> {
    let group = Key::new(args.group.as_str(), "");
    match IniBackend::from_file(&args.file, args.section.as_str()) {
        Ok(backend) => {
            let backend = backend.with_settings(watch_settings);
            let changes = backend.watch(&group);
            Ok((Some(backend), changes))
        }
        Err(ConfigError::Io(msg)) => {
            warn!("{msg}; waiting for the file to appear");
            let changes = WatchSession::new(IniSource::file(&args.file), watch_settings)
                .spawn(CancellationToken::new())
                .with_scope(watch_scope(&args.section, &group));
            Ok((None, changes))
        }
        Err(e) => Err(e),
    }
}

fn render(event: &ChangeEvent, json: bool) -> String {
    if !json {
        return event.to_string();
    }
    serde_json::to_string(event)
        .unwrap_or_else(|e| format!("{{\"type\":\"Error\",\"data\":\"failed to serialize event: {e}\"}}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_plain() {
        let event = ChangeEvent::Updated {
            key: Key::new("database", "host"),
            value: "db.local".into(),
        };
        assert_eq!(render(&event, false), "updated [database] host = db.local");
    }

    #[test]
    fn render_json() {
        let event = ChangeEvent::Added {
            key: Key::root("one"),
            value: "1".into(),
        };
        let line = render(&event, true);
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["type"], "Added");
        assert_eq!(value["data"]["key"]["name"], "one");
        assert_eq!(value["data"]["value"], "1");
    }

    #[test]
    fn render_error_json() {
        let event = ChangeEvent::Error(ConfigError::WatchLost("/tmp/app.ini".into()));
        let line = render(&event, true);
        assert!(line.contains("watched file disappeared"));
    }

    #[tokio::test]
    async fn missing_file_watch_uses_backend_scope() {
        use clap::Parser;

        let missing = "/tmp/nonexistent_iniwatch_cli.ini";
        let args = cli::Args::parse_from(["iniwatch", missing, "--group", "database"]);
        let (backend, changes) = open(&args, settings::WatchSettings::default()).unwrap();
        assert!(backend.is_none());
        assert_eq!(changes.scope(), "database");
        changes.stop().await;

        let args = cli::Args::parse_from([
            "iniwatch", missing, "--section", "app", "--group", "database",
        ]);
        let (_, changes) = open(&args, settings::WatchSettings::default()).unwrap();
        assert_eq!(changes.scope(), "app");
        changes.stop().await;
    }
}
