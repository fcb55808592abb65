//! Command-line arguments

use std::path::PathBuf;

/// Text printed for `--help`
pub const USAGE: &str = "\
Usage: pinking [OPTIONS]

Options:
  -G, --fake-gpio      Use a simulated board instead of real GPIO
  -r, --rev <REV>      Board revision code (default: detected)
  -c, --config <PATH>  Configuration file (default: ./pinking.toml)
      --poll-ms <MS>   Input poll interval in milliseconds, 0 to disable
      --exercise       Cycle every pin once without the interactive UI
  -h, --help           Print this help";

/// Argument errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CliError {
    #[error("unknown option {0}")]
    UnknownOption(String),
    #[error("option {0} needs a value")]
    MissingValue(&'static str),
    #[error("invalid value {value:?} for {option}")]
    InvalidValue { option: &'static str, value: String },
}

/// Parsed arguments
///
/// `None` means "not given"; the configuration file decides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    pub fake_gpio: bool,
    pub revision: Option<String>,
    pub config: Option<PathBuf>,
    pub poll_ms: Option<u64>,
    pub exercise: bool,
    pub help: bool,
}

impl Args {
    /// Parse arguments (without the program name)
    pub fn parse<I>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = Args::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            // Accept --flag=value as well as --flag value
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) if flag.starts_with("--") => {
                    (flag.to_string(), Some(value.to_string()))
                }
                _ => (arg.clone(), None),
            };
            let mut value = |option: &'static str| {
                inline
                    .clone()
                    .or_else(|| args.next())
                    .ok_or(CliError::MissingValue(option))
            };

            match flag.as_str() {
                "-G" | "--fake-gpio" => parsed.fake_gpio = true,
                "-r" | "--rev" => parsed.revision = Some(value("--rev")?),
                "-c" | "--config" => parsed.config = Some(PathBuf::from(value("--config")?)),
                "--poll-ms" => {
                    let raw = value("--poll-ms")?;
                    let ms = raw.parse().map_err(|_| CliError::InvalidValue {
                        option: "--poll-ms",
                        value: raw.clone(),
                    })?;
                    parsed.poll_ms = Some(ms);
                }
                "--exercise" => parsed.exercise = true,
                "-h" | "--help" => parsed.help = true,
                _ => return Err(CliError::UnknownOption(flag.clone())),
            }
        }

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, CliError> {
        Args::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_no_args() {
        assert_eq!(parse(&[]).unwrap(), Args::default());
    }

    #[test]
    fn test_short_flags() {
        let args = parse(&["-G", "-r", "a21041", "-c", "/etc/pinking.toml"]).unwrap();
        assert!(args.fake_gpio);
        assert_eq!(args.revision.as_deref(), Some("a21041"));
        assert_eq!(args.config, Some(PathBuf::from("/etc/pinking.toml")));
    }

    #[test]
    fn test_long_flags() {
        let args = parse(&[
            "--fake-gpio",
            "--rev=a01041",
            "--poll-ms",
            "250",
            "--exercise",
        ])
        .unwrap();
        assert!(args.fake_gpio);
        assert!(args.exercise);
        assert_eq!(args.revision.as_deref(), Some("a01041"));
        assert_eq!(args.poll_ms, Some(250));
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            parse(&["--bogus"]),
            Err(CliError::UnknownOption("--bogus".into()))
        );
        assert_eq!(parse(&["-r"]), Err(CliError::MissingValue("--rev")));
        assert_eq!(
            parse(&["--poll-ms", "soon"]),
            Err(CliError::InvalidValue {
                option: "--poll-ms",
                value: "soon".into()
            })
        );
    }

    #[test]
    fn test_help() {
        assert!(parse(&["--help"]).unwrap().help);
        assert!(USAGE.contains("--fake-gpio"));
    }
}
