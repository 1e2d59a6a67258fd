#![deny(unused_crate_dependencies)]
#![warn(missing_docs)]
#![warn(unused_extern_crates)]
#![warn(unused_imports)]

//! Deploys the `LoanStreamChain` contract and prints its address.

use std::{io::Write, process::ExitCode, sync::Arc};

use clap::Parser;
use envconfig::Envconfig;
use ethers::{
    providers::{Http, Provider},
    types::U256,
};
use eyre::Result;

use cli::Args;
use config::Config;
use deployer::{runner, ArtifactStore, EthersToolchain, Outcome};

mod cli;
mod config;
mod error;

fn load_config(args: &Args) -> Result<Config> {
    let config = match &args.config_path {
        Some(path) => Config::from_file(path)?,
        None => {
            dotenvy::dotenv().ok();
            Config::init_from_env()?
        }
    };

    Ok(config)
}

fn build_toolchain(config: &Config) -> Result<EthersToolchain<Http>> {
    // No requests are made here, the node is first contacted when the deployment is sent.
    let provider = Provider::<Http>::try_from(config.rpc_url.as_str())?;

    let mut toolchain =
        EthersToolchain::new(Arc::new(provider), ArtifactStore::new(&config.artifacts_dir))
            .confirmations(config.confirmations)
            .poll_interval(config.poll_interval())
            .confirmation_timeout(config.confirmation_timeout())
            .gas_limit(config.gas_limit.map(U256::from));

    if let Some(wallet) = config.wallet()? {
        toolchain = toolchain.with_wallet(wallet);
    }

    Ok(toolchain)
}

// `--contract` wins over the configured name.
fn contract_name<'a>(args: &'a Args, config: &'a Config) -> &'a str {
    args.contract.as_deref().unwrap_or(&config.contract_name)
}

fn setup_failed<E: Write>(report: eyre::Report, err: &mut E) -> Outcome {
    let _ = writeln!(err, "{report:?}");
    Outcome::Failure
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = color_eyre::install() {
        return setup_failed(e, &mut std::io::stderr()).into();
    }

    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => return setup_failed(e, &mut std::io::stderr()).into(),
    };

    let _sentry_guard = vlog::init(config.network_name.as_deref());

    vlog::debug!("loaded config {config:?}");

    let toolchain = match build_toolchain(&config) {
        Ok(toolchain) => toolchain,
        Err(e) => return setup_failed(e, &mut std::io::stderr()).into(),
    };

    runner::run(
        &toolchain,
        contract_name(&args, &config),
        &mut std::io::stdout(),
        &mut std::io::stderr(),
    )
    .await
    .into()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use clap::Parser;
    use envconfig::Envconfig;
    use pretty_assertions::assert_eq;

    use super::{build_toolchain, contract_name, load_config, setup_failed, Args, Config};
    use deployer::Outcome;

    fn config(env: &[(&str, &str)]) -> Config {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Config::init_from_hashmap(&env).unwrap()
    }

    #[test]
    fn no_arguments_are_required() {
        let args = Args::try_parse_from(["loan-stream-deployer"]).unwrap();

        assert_eq!(args.config_path, None);
        assert_eq!(args.contract, None);
        assert_eq!(contract_name(&args, &config(&[])), "LoanStreamChain");
    }

    #[test]
    fn contract_flag_overrides_configured_name() {
        let args = Args::try_parse_from([
            "loan-stream-deployer",
            "--contract",
            "contracts/Loans.sol:LoanVault",
        ])
        .unwrap();
        let config = config(&[("DEPLOYER_CONTRACT_NAME", "LoanStreamV2")]);

        assert_eq!(contract_name(&args, &config), "contracts/Loans.sol:LoanVault");

        let args = Args::try_parse_from(["loan-stream-deployer"]).unwrap();
        assert_eq!(contract_name(&args, &config), "LoanStreamV2");
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(Args::try_parse_from(["loan-stream-deployer", "--network", "sepolia"]).is_err());
    }

    #[test]
    fn unreadable_config_path_fails_with_exit_code_one() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let args = Args::try_parse_from([
            "loan-stream-deployer",
            "--config-path",
            missing.to_str().unwrap(),
        ])
        .unwrap();

        let report = load_config(&args).err().unwrap();

        let mut err = vec![];
        let outcome = setup_failed(report, &mut err);

        assert_eq!(outcome, Outcome::Failure);
        assert_eq!(outcome.code(), 1);
        assert!(!err.is_empty());
    }

    #[test]
    fn bad_private_key_fails_with_exit_code_one() {
        let config = config(&[("DEPLOYER_PRIVATE_KEY", "0xdeadbeef")]);

        let report = build_toolchain(&config).err().unwrap();

        let mut err = vec![];
        let outcome = setup_failed(report, &mut err);

        assert_eq!(outcome.code(), 1);
        assert!(String::from_utf8(err)
            .unwrap()
            .contains("invalid deployer private key"));
    }

    #[test]
    fn valid_config_builds_without_network_access() {
        let config = config(&[
            ("DEPLOYER_RPC_URL", "http://127.0.0.1:1"),
            ("DEPLOYER_GAS_LIMIT", "5000000"),
        ]);

        assert!(build_toolchain(&config).is_ok());
    }
}
