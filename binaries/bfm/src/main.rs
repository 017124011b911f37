use {
    bfm::cmd::{self, Error as ExecutionError, Workload},
    clap::{arg, value_parser, ArgMatches, Command},
    snafu::prelude::*,
    std::{env, path::PathBuf, process},
    storage::buffer::{BufferConfig, PoolConfig},
};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("the `BFM_DATADIR` environment variable is unset, you can pass a argument with `-d` to config"))]
    NoDataDirectory,

    #[snafu(display("{}", source))]
    ExecuteCommand {
        #[snafu(backtrace)]
        source: ExecutionError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

const BFM_DATADIR: &str = "BFM_DATADIR";

const SIMULATE: &str = "simulate";
const INSPECT: &str = "inspect";

fn workload_command(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(arg!(-d --data_dir <PATH> "data directory"))
        .arg(arg!(--requests <N> "number of page requests").value_parser(value_parser!(u64)))
        .arg(arg!(--pages <N> "number of distinct pages").value_parser(value_parser!(u32)))
        .arg(
            arg!(--dirty <PERCENT> "share of requests that modify the page")
                .value_parser(value_parser!(u32).range(0..=100)),
        )
        .arg(arg!(--capacity <N> "slots in the page pool").value_parser(value_parser!(usize)))
        .arg(arg!(--buckets <N> "hash buckets of the page pool").value_parser(value_parser!(usize)))
        .arg(arg!(--seed <N> "random seed").value_parser(value_parser!(u64)))
}

fn cli() -> Command {
    let pkg_name = env!("CARGO_PKG_NAME");

    Command::new(pkg_name)
        .bin_name(pkg_name)
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .subcommand_required(true)
        .subcommand(workload_command(
            SIMULATE,
            "run a random workload and print the pool counters",
        ))
        .subcommand(workload_command(
            INSPECT,
            "run a random workload and print the page pool slots",
        ))
}

fn main() {
    tracing_subscriber::fmt::init();

    if let Err(err) = try_main() {
        eprintln!("{}", err);
        process::exit(2);
    }
}

fn try_main() -> Result<()> {
    let matches = cli().get_matches();
    match matches.subcommand() {
        Some((SIMULATE, sub_matches)) => {
            let (data_dir, config, workload) = parse_workload(sub_matches)?;

            let stats =
                cmd::simulate(&data_dir, config, &workload).context(ExecuteCommandSnafu)?;

            println!("hits:      {}", stats.hits);
            println!("misses:    {}", stats.misses);
            println!("evictions: {}", stats.evictions);
            println!("flushes:   {}", stats.flushes);
        }
        Some((INSPECT, sub_matches)) => {
            let (data_dir, config, workload) = parse_workload(sub_matches)?;

            for slot in cmd::inspect(&data_dir, config, &workload).context(ExecuteCommandSnafu)? {
                println!("{}", slot);
            }
        }
        _ => unreachable!(),
    }

    Ok(())
}

fn parse_workload(matches: &ArgMatches) -> Result<(PathBuf, BufferConfig, Workload)> {
    let data_dir = match matches.get_one::<String>("data_dir") {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from(env::var(BFM_DATADIR).map_err(|_| Error::NoDataDirectory)?),
    };

    let defaults = BufferConfig::default();
    let config = BufferConfig {
        page_pool: PoolConfig::new(
            get_or(matches, "capacity", defaults.page_pool.capacity),
            get_or(matches, "buckets", defaults.page_pool.buckets),
        ),
        ..defaults
    };

    let defaults = Workload::default();
    let workload = Workload {
        requests: get_or(matches, "requests", defaults.requests),
        pages: get_or(matches, "pages", defaults.pages),
        dirty_percent: get_or(matches, "dirty", defaults.dirty_percent),
        seed: matches.get_one::<u64>("seed").copied(),
    };

    Ok((data_dir, config, workload))
}

fn get_or<T>(matches: &ArgMatches, id: &str, default: T) -> T
where
    T: Clone + Send + Sync + 'static,
{
    matches.get_one::<T>(id).cloned().unwrap_or(default)
}
