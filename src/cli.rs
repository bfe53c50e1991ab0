//! Command-line surface.

use crate::config::{ConfigError, FileConfig, OutputFormat, RequestArgs, RunConfig, MAX_BYTES};
use clap::Parser;
use std::path::PathBuf;

/// Parsed command line.
#[derive(Parser, Debug)]
#[command(
    name = "seeded-rand",
    version,
    about = "Print random bytes from a generator seeded by a persistent seed file"
)]
pub struct Cli {
    /// Requested byte count.
    #[arg(
        value_parser = clap::value_parser!(u16).range(1..=MAX_BYTES as i64),
        help = "Number of random bytes to print (1-1024)"
    )]
    pub bytes: u16,
    /// Hex output.
    #[arg(short = 'x', long, help = "Print lowercase hex followed by a newline")]
    pub hex: bool,
    /// Progress diagnostics.
    #[arg(short, long, help = "Report seeding progress on stderr")]
    pub verbose: bool,
    /// Config file.
    #[arg(long, value_name = "FILE", help = "TOML configuration file")]
    pub config: Option<PathBuf>,
    /// Seed file override.
    #[arg(long, value_name = "PATH", help = "Seed file (default: $HOME/.rand.seed)")]
    pub seed_file: Option<PathBuf>,
    /// Entropy device override.
    #[arg(long, value_name = "PATH", help = "Fallback entropy device (default: /dev/random)")]
    pub entropy_device: Option<PathBuf>,
}

impl Cli {
    /// Builds the immutable request from parsed arguments.
    pub fn request(&self) -> Result<RequestArgs, ConfigError> {
        let format = if self.hex {
            OutputFormat::Hex
        } else {
            OutputFormat::Raw
        };
        RequestArgs::new(usize::from(self.bytes), format, self.verbose)
    }

    /// Loads the config file, if any, and applies command-line overrides.
    pub fn resolve(self) -> Result<RunConfig, ConfigError> {
        let request = self.request()?;
        let file = match &self.config {
            Some(path) => FileConfig::from_file(path)?,
            None => FileConfig::default(),
        };
        RunConfig::resolve(request, file, self.seed_file, self.entropy_device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("seeded-rand").chain(args.iter().copied()))
    }

    #[test]
    fn test_zero_bytes_rejected() {
        let err = parse(&["0"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_over_cap_rejected() {
        let err = parse(&["2000"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_non_numeric_rejected() {
        assert!(parse(&["lots"]).is_err());
        assert!(parse(&["-5"]).is_err());
    }

    #[test]
    fn test_missing_count_rejected() {
        let err = parse(&["--hex"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_flags_map_to_request() {
        let cli = parse(&["--hex", "-v", "1024"]).unwrap();
        let request = cli.request().unwrap();

        assert_eq!(request.byte_count(), 1024);
        assert_eq!(request.format(), OutputFormat::Hex);
        assert!(request.verbose());
    }

    #[test]
    fn test_short_hex_flag() {
        let cli = parse(&["-x", "16"]).unwrap();
        assert_eq!(cli.request().unwrap().format(), OutputFormat::Hex);
    }

    #[test]
    fn test_raw_is_default() {
        let cli = parse(&["1"]).unwrap();
        let request = cli.request().unwrap();
        assert_eq!(request.format(), OutputFormat::Raw);
        assert!(!request.verbose());
    }

    #[test]
    fn test_resolve_with_overrides() {
        let cli = parse(&["--seed-file", "/tmp/s", "--entropy-device", "/dev/urandom", "4"]).unwrap();
        let run = cli.resolve().unwrap();

        assert_eq!(run.seed_path, PathBuf::from("/tmp/s"));
        assert_eq!(run.entropy_device, PathBuf::from("/dev/urandom"));
        assert_eq!(run.request.byte_count(), 4);
    }
}
