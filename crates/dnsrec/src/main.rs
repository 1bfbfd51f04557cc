// # dnsrec - record reconciler CLI
//
// Thin integration layer: reads a manifest, wires the provider client and
// state store together, and runs one lifecycle command. All reconciliation
// logic lives in dnsrec-core.
//
// ## Manifest
//
// ```json
// {
//   "provider": { "type": "dnsimple", "account": "1010" },
//   "state_store": { "type": "file", "path": "/var/lib/dnsrec/state.json" },
//   "records": [
//     { "address": "dnsimple_record.www", "domain": "example.com", "name": "www",
//       "type": "A", "value": "192.0.2.1", "regions": ["global"] }
//   ]
// }
// ```
//
// ## Environment
//
// - `DNSREC_MANIFEST`: Manifest path (default `dnsrec.json`)
// - `DNSIMPLE_TOKEN`: API token, overrides the manifest
// - `DNSIMPLE_ACCOUNT`: Account ID, overrides the manifest
// - `DNSREC_LOG_LEVEL`: trace, debug, info, warn, error
//
// ## Example
//
// ```bash
// export DNSIMPLE_TOKEN=your_token
// dnsrec apply
// dnsrec import dnsimple_record.api example.com_1234
// dnsrec destroy dnsimple_record.www
// ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dnsrec_core::{
    ApplyOutcome, Manifest, ProviderRegistry, ReadOutcome, RecordLifecycle, StoredResource,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
#[derive(Debug, Clone, Copy)]
enum DnsrecExitCode {
    /// Command completed
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// An API or state store operation failed
    RuntimeError = 2,
}

impl From<DnsrecExitCode> for ExitCode {
    fn from(code: DnsrecExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Reconcile declared DNS records against the provider API
#[derive(Debug, Parser)]
#[command(name = "dnsrec", version, about)]
struct Cli {
    /// Manifest declaring the provider, state store and records
    #[arg(long, short, env = "DNSREC_MANIFEST", default_value = "dnsrec.json")]
    manifest: PathBuf,

    /// API token (overrides the manifest)
    #[arg(long, env = "DNSIMPLE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Account ID (overrides the manifest)
    #[arg(long, env = "DNSIMPLE_ACCOUNT")]
    account: Option<String>,

    /// Log level
    #[arg(long, env = "DNSREC_LOG_LEVEL", default_value = "info")]
    log_level: Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create, update or replace declared records (all when none given)
    Apply { addresses: Vec<String> },
    /// Re-read tracked records, dropping those deleted remotely
    Refresh { addresses: Vec<String> },
    /// Delete tracked records (all when none given)
    Destroy { addresses: Vec<String> },
    /// Adopt an existing record from a DOMAIN_RECORDID key
    Import { address: String, key: String },
    /// Print tracked state as JSON
    Show,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DnsrecExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DnsrecExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        let (manifest, lifecycle) = match setup(&cli).await {
            Ok(setup) => setup,
            Err(e) => {
                error!("Configuration error: {:#}", e);
                return DnsrecExitCode::ConfigError;
            }
        };

        match run(&cli.command, &manifest, &lifecycle).await {
            Ok(()) => DnsrecExitCode::Success,
            Err(e) => {
                error!("{:#}", e);
                DnsrecExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Load the manifest and build the lifecycle driver
async fn setup(cli: &Cli) -> Result<(Manifest, RecordLifecycle)> {
    let mut manifest = Manifest::load(&cli.manifest)
        .await
        .with_context(|| format!("loading {}", cli.manifest.display()))?;
    manifest.provider = manifest
        .provider
        .with_credentials(cli.token.clone(), cli.account.clone());
    manifest.validate()?;

    let registry = ProviderRegistry::with_builtin_state_stores();

    #[cfg(feature = "dnsimple")]
    dnsrec_provider_dnsimple::register(&registry);

    let api = registry.create_api_client(&manifest.provider)?;
    let store = registry.create_state_store(&manifest.state_store).await?;
    info!(
        "Using {} provider, {} state store, {} declared record(s)",
        api.provider_name(),
        manifest.state_store.type_name(),
        manifest.records.len()
    );

    let account = manifest.provider.account().to_string();
    Ok((manifest, RecordLifecycle::new(api, account, store)))
}

/// Pick the addresses a command acts on
///
/// Explicit addresses win; otherwise `all` is used.
fn select_addresses(requested: &[String], all: Vec<String>) -> Vec<String> {
    if requested.is_empty() {
        all
    } else {
        requested.to_vec()
    }
}

async fn run(command: &Command, manifest: &Manifest, lifecycle: &RecordLifecycle) -> Result<()> {
    match command {
        Command::Apply { addresses } => {
            let declared = manifest.records.iter().map(|r| r.address.clone()).collect();
            for address in select_addresses(addresses, declared) {
                let resource = manifest
                    .record(&address)
                    .with_context(|| format!("{} is not declared in the manifest", address))?;

                match lifecycle.apply(&address, &resource.spec).await? {
                    ApplyOutcome::Created(state) => {
                        info!("{}: created {} ({})", address, state.hostname, state.id)
                    }
                    ApplyOutcome::Updated { state, changed } => {
                        info!("{}: updated {} ({})", address, state.id, changed.join(", "))
                    }
                    ApplyOutcome::Replaced { state, reason } => {
                        info!("{}: replaced by {} ({} changed)", address, state.id, reason)
                    }
                    ApplyOutcome::Unchanged(state) => {
                        info!("{}: up to date ({})", address, state.id)
                    }
                    ApplyOutcome::Vanished => warn!("{}: record vanished after write", address),
                }
            }
        }
        Command::Refresh { addresses } => {
            let tracked = lifecycle.state_store().list().await?;
            for address in select_addresses(addresses, tracked) {
                match lifecycle.refresh(&address).await? {
                    ReadOutcome::Present(state) => {
                        info!("{}: {} {} {}", address, state.hostname, state.record_type, state.value)
                    }
                    ReadOutcome::Absent => info!("{}: not present", address),
                }
            }
        }
        Command::Destroy { addresses } => {
            let tracked = lifecycle.state_store().list().await?;
            for address in select_addresses(addresses, tracked) {
                if lifecycle.destroy(&address).await? {
                    info!("{}: destroyed", address);
                } else {
                    warn!("{}: not tracked, nothing to destroy", address);
                }
            }
        }
        Command::Import { address, key } => match lifecycle.import(address, key).await? {
            ReadOutcome::Present(state) => info!("{}: imported {}", address, state.hostname),
            ReadOutcome::Absent => anyhow::bail!("record {} does not exist", key),
        },
        Command::Show => {
            let store = lifecycle.state_store();
            let mut tracked: BTreeMap<String, StoredResource> = BTreeMap::new();
            for address in store.list().await? {
                if let Some(entry) = store.get(&address).await? {
                    tracked.insert(address, entry);
                }
            }
            println!("{}", serde_json::to_string_pretty(&tracked)?);
        }
    }

    lifecycle.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_import() {
        let cli = Cli::try_parse_from([
            "dnsrec",
            "--manifest",
            "records.json",
            "--log-level",
            "debug",
            "import",
            "dnsimple_record.api",
            "example.com_1234",
        ])
        .unwrap();

        assert_eq!(cli.manifest, PathBuf::from("records.json"));
        assert_eq!(cli.log_level, Level::DEBUG);
        match cli.command {
            Command::Import { address, key } => {
                assert_eq!(address, "dnsimple_record.api");
                assert_eq!(key, "example.com_1234");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        assert!(Cli::try_parse_from(["dnsrec", "--log-level", "loud", "show"]).is_err());
    }

    #[test]
    fn test_select_addresses() {
        let all = vec!["a".to_string(), "b".to_string()];
        assert_eq!(select_addresses(&[], all.clone()), all);
        assert_eq!(
            select_addresses(&["b".to_string()], all),
            vec!["b".to_string()]
        );
    }

    #[tokio::test]
    async fn test_setup_rejects_missing_token() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("dnsrec.json");
        std::fs::write(
            &manifest,
            r#"{ "provider": { "type": "dnsimple", "account": "1010" } }"#,
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "dnsrec",
            "--manifest",
            manifest.to_str().unwrap(),
            "show",
        ])
        .unwrap();
        // ignore credentials inherited from the environment
        let cli = Cli {
            token: None,
            account: None,
            ..cli
        };

        assert!(setup(&cli).await.is_err());
    }

    #[tokio::test]
    async fn test_setup_with_memory_store() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("dnsrec.json");
        std::fs::write(
            &manifest,
            r#"{
                "provider": { "type": "dnsimple", "token": "t", "account": "1010", "sandbox": true },
                "records": [
                    { "address": "dnsimple_record.www", "domain": "example.com", "name": "www",
                      "type": "A", "value": "192.0.2.1", "regions": ["global"] }
                ]
            }"#,
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "dnsrec",
            "--manifest",
            manifest.to_str().unwrap(),
            "show",
        ])
        .unwrap();
        let cli = Cli {
            token: None,
            account: None,
            ..cli
        };

        let (manifest, lifecycle) = setup(&cli).await.unwrap();
        assert_eq!(manifest.records.len(), 1);
        assert!(lifecycle.state_store().list().await.unwrap().is_empty());
    }
}
