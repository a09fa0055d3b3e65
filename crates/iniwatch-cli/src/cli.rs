use clap::Parser;
use std::path::PathBuf;

/// iniwatch: stream key-level changes of an INI file as it is edited.
#[derive(Parser, Debug)]
#[command(name = "iniwatch", version, about)]
pub struct Args {
    /// INI file to watch.
    pub file: PathBuf,

    /// Read every key from this section (keys are joined as group/name).
    #[arg(short, long, default_value = "")]
    pub section: String,

    /// Only report changes in this group.
    #[arg(short, long, default_value = "")]
    pub group: String,

    /// Watch settings file override (TOML).
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Debounce tick in milliseconds; overrides the settings file.
    #[arg(long)]
    pub tick_ms: Option<u64>,

    /// Print one JSON object per event.
    #[arg(long)]
    pub json: bool,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_args() {
        let args = Args::try_parse_from(["iniwatch", "/etc/app.ini"]).unwrap();
        assert_eq!(args.file, PathBuf::from("/etc/app.ini"));
        assert_eq!(args.section, "");
        assert!(args.tick_ms.is_none());
        assert!(!args.json);
    }

    #[test]
    fn parses_all_flags() {
        let args = Args::try_parse_from([
            "iniwatch",
            "app.ini",
            "--section",
            "app",
            "--group",
            "database",
            "--settings",
            "settings.toml",
            "--tick-ms",
            "250",
            "--json",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.section, "app");
        assert_eq!(args.group, "database");
        assert_eq!(args.settings, Some(PathBuf::from("settings.toml")));
        assert_eq!(args.tick_ms, Some(250));
        assert!(args.json);
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn file_is_required() {
        assert!(Args::try_parse_from(["iniwatch"]).is_err());
    }
}
