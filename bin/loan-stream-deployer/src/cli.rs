use std::path::PathBuf;

use clap::Parser;

/// Deploy a precompiled contract and print its address.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// TOML config file, the environment is used if omitted
    #[arg(long)]
    pub(crate) config_path: Option<PathBuf>,

    /// Contract to deploy, bare or fully qualified name
    #[arg(long)]
    pub(crate) contract: Option<String>,
}
