//! Seeded Random Byte CLI
//!
//! Prints `bytes` random bytes, raw or as hex, from a generator seeded by
//! `$HOME/.rand.seed` (or the entropy device when the seed is unusable).

use clap::Parser;
use seeded_rand::{
    cli::Cli,
    generator::ChaChaGenerator,
    lifecycle::SeedLifecycle,
    output::write_output,
    seed::SeedStore,
};
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use tracing::{error, info};

fn main() -> ExitCode {
    let resolved = Cli::parse().resolve();

    // Diagnostics go to stderr; anomalies always, progress only with -v.
    let verbose = resolved
        .as_ref()
        .is_ok_and(|config| config.request.verbose());
    let level = if verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();

    let config = match resolved {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("seeded-rand v{}", seeded_rand::VERSION);

    let store = SeedStore::new(&config.seed_path, &config.entropy_device);
    let generator = ChaChaGenerator::from_os_entropy(config.hash);
    let mut lifecycle = SeedLifecycle::new(store, generator);
    let format = config.request.format();

    let result = lifecycle.run(&config.request, |bytes| {
        let mut stdout = io::stdout().lock();
        write_output(&mut stdout, bytes, format)
    });

    match result {
        Ok(report) => {
            info!(
                bytes = report.bytes_delivered,
                fallback = report.selection.is_fallback(),
                persisted = report.persisted.is_some(),
                "Done"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
