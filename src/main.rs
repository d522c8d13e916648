use dtsx_inspect::cli::CliArgs;
use dtsx_inspect::{extract, report, VERSION};

use anyhow::Context;
use clap::Parser;
use std::env;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("dtsx-inspect v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    std::process::exit(run(&args));
}

fn run(args: &CliArgs) -> i32 {
    match inspect(args) {
        Ok(()) => 0,
        Err(err) => {
            // Document load failure is the one fatal condition. The legacy
            // tool reported it on stdout with a full trace; keep that surface
            // and add a nonzero exit code.
            println!("Error: {:#}", err);
            println!("{:?}", err);
            1
        }
    }
}

fn inspect(args: &CliArgs) -> anyhow::Result<()> {
    let package = extract::inspect_file(&args.package_file)
        .with_context(|| format!("failed to inspect {}", args.package_file.display()))?;
    print!("{}", report::render(&package));
    Ok(())
}

fn init_logging_from_args(args: &CliArgs) {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let level = if let Some(level_str) = &args.log_level {
            parse_level(level_str)
        } else if args.verbose {
            Level::DEBUG
        } else if args.quiet {
            Level::ERROR
        } else {
            let level_str =
                env::var("DTSX_INSPECT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
            parse_level(&level_str)
        };

        let mut filter = EnvFilter::from_default_env();

        if env::var("RUST_LOG").is_err() {
            filter = filter.add_directive(format!("dtsx_inspect={}", level).parse().unwrap());
        }

        // The report owns stdout; all diagnostics go to stderr.
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    });
}

fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}
