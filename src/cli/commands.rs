use clap::Parser;
use std::path::PathBuf;

/// Inventory reporter for legacy SSIS/DTSX package definitions
#[derive(Parser, Debug)]
#[command(
    name = "dtsx-inspect",
    about = "Print a structural inventory of a DTSX package definition",
    version,
    long_about = "dtsx-inspect parses a package-definition XML file produced by the legacy \
                  ETL design tool and prints a formatted inventory of its connections, \
                  variables, tasks, and precedence constraints. Both the older \
                  Property-element schema and the newer attribute-based schema are \
                  supported.\n\n\
                  Examples:\n  \
                  dtsx-inspect nightly_load.dtsx\n  \
                  dtsx-inspect --log-level debug nightly_load.dtsx"
)]
pub struct CliArgs {
    #[arg(value_name = "FILE", help = "Path to the package definition file")]
    pub package_file: PathBuf,

    #[arg(long, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, help = "Increase verbosity")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}
