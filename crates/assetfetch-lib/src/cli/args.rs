use clap::{ArgAction, Parser};
use tracing::Level;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Config file to load; the built-in asset sets are used without one.
    pub config_path: Option<String>,
    /// Asset set ids to restrict the run to; empty means all of them.
    pub asset_sets: Vec<String>,
}

pub struct Args {
    pub command: Command,
    pub log_level: Level,
}

#[derive(Debug, Parser)]
#[command(
    name = "assetfetch",
    version,
    about = "Fetch pre-trained model bundles into a local cache directory, skipping those already present"
)]
struct Cli {
    #[arg(
        short = 'v',
        long = "verbose",
        help = "Sets the level of verbosity",
        action = ArgAction::Count
    )]
    verbose: u8,

    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Loads asset sets from a config file instead of the built-in ones"
    )]
    config: Option<String>,

    #[arg(
        short = 's',
        long = "asset-set",
        value_name = "ID",
        help = "Only ensures the named asset sets (repeat or use comma-separated values)",
        action = ArgAction::Append,
        value_delimiter = ','
    )]
    asset_sets: Vec<String>,
}

fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

pub fn init_tracing(log_level: Level) {
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy()
                .add_directive("opendal=warn".parse().unwrap())
                .add_directive("hyper_util=warn".parse().unwrap()),
        )
        .init();
}

impl From<Cli> for Args {
    fn from(cli: Cli) -> Self {
        Args {
            command: Command {
                config_path: cli.config,
                asset_sets: cli.asset_sets,
            },
            log_level: log_level(cli.verbose),
        }
    }
}

pub fn parse_args() -> Args {
    let args = Args::from(Cli::parse());
    init_tracing(args.log_level);
    args
}
