use super::*;
use std::path::PathBuf;
use structopt::{clap::AppSettings::*, StructOpt};

pub fn parse() -> Result<Options> {
    Ok(Options::from_args())
}

#[derive(StructOpt, Debug)]
#[structopt(
    name = "haier-agent",
    rename_all = "kebab_case",
    about,
    settings = &[DeriveDisplayOrder, DisableHelpSubcommand, UnifiedHelpMessage]
)]
pub struct Options {
    /// Agent configuration file
    #[structopt(short = "c", long, parse(from_os_str), default_value = "haier-agent.toml")]
    pub config: PathBuf,

    /// Write a configuration with one virtual device and exit
    #[structopt(short, long)]
    pub generate: bool,

    /// Directory of virtual device snapshots, overrides `agent.fixture_dir`
    #[structopt(short = "f", long, parse(from_os_str))]
    pub fixture_dir: Option<PathBuf>,

    /// Classify every configured spec, print the entities and exit
    #[structopt(long)]
    pub check: bool,

    /// Verbosity level of output (-v debug, -vv trace)
    #[structopt(short = "v", long, parse(from_occurrences))]
    pub verbosity: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_dir_and_check_flags() {
        let opts = Options::from_iter(&["haier-agent", "-f", "snapshots", "--check", "-vv"]);
        assert_eq!(opts.fixture_dir, Some(PathBuf::from("snapshots")));
        assert!(opts.check);
        assert_eq!(opts.verbosity, 2);
        assert_eq!(opts.config, PathBuf::from("haier-agent.toml"));
    }
}
