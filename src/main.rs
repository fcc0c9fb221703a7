mod clap_parser;

use adi::group_repository::group_repository::{
    GroupRepository, MATCH_ALL, Selection, collect_inventory, find_host,
};
use adi::group_repository::postgres_group_repository::PostgresGroupRepository;
use adi::inventory::inventory_data::InventoryData;
use adi::inventory::inventory_manager::InventoryManager;
use adi::secrets::secrets_manager::SecretsManager;
use adi::settings::settings_manager::SettingsManager;
use adi::{generate, generate_host, normalize};
use anyhow::{Context, Result};
use clap::Parser;
use clap_parser::{Args, Commands};
use colored::Colorize;
use prettytable::{Table, row};
use std::io::Write;
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args).await {
        eprintln!("{}", format!("{e:#}").red());
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(args: Args) -> Result<()> {
    match &args.command {
        Some(Commands::Normalize { identifiers }) => {
            let key = normalize(identifiers)?;
            if args.json {
                print_bytes(&serde_json::to_vec(&key)?)
            } else {
                print_bytes(key.as_bytes())
            }
        }
        Some(Commands::Hosts { group, datacenter }) => {
            let repository = open_repository(&args).await?;
            let hosts = repository
                .hosts_for_group_in_datacenter(group, datacenter)
                .await?;
            if args.json {
                print_bytes(&serde_json::to_vec_pretty(&hosts)?)
            } else {
                print_bytes(hosts.join("\n").as_bytes())
            }
        }
        Some(Commands::Groups) => {
            let repository = open_repository(&args).await?;
            let groups = repository.all_groups().await?;
            if args.json {
                return print_bytes(&serde_json::to_vec_pretty(&groups)?);
            }
            let mut table = Table::new();
            table.set_titles(row!["NAME", "DATACENTER", "HOSTS", "CHILDREN", "VARS"]);
            for group in &groups {
                table.add_row(row![
                    group.name,
                    group.datacenter,
                    group.hosts.len(),
                    group.children.join(","),
                    group.vars.len()
                ]);
            }
            table.printstd();
            Ok(())
        }
        Some(Commands::Snapshot { output }) => {
            let repository = open_repository(&args).await?;
            let inventory = InventoryData::new(
                repository.all_groups().await?,
                repository.find_hosts(MATCH_ALL).await?,
            );
            InventoryManager::save_inventory_to_file(&inventory, output).await?;
            tracing::info!(
                output = %output,
                groups = inventory.groups.len(),
                hosts = inventory.hosts.len(),
                "snapshot written"
            );
            Ok(())
        }
        None => {
            let repository = open_repository(&args).await?;
            if let Some(host) = &args.host {
                let host_vars = find_host(repository.as_ref(), host).await?;
                return print_bytes(&generate_host(host_vars.as_ref())?);
            }
            let selection = selection(&args);
            let inventory = collect_inventory(repository.as_ref(), &selection).await?;
            print_bytes(&generate(&inventory)?)
        }
    }
}

fn selection(args: &Args) -> Selection {
    match (&args.group, &args.match_host) {
        (Some(group), _) => Selection::Group(group.clone()),
        (None, Some(pattern)) => Selection::HostPattern(pattern.clone()),
        (None, None) => Selection::All,
    }
}

async fn open_repository(args: &Args) -> Result<Box<dyn GroupRepository>> {
    if let Some(inventory_file) = &args.inventory_file {
        let mut manager = InventoryManager::new(inventory_file);
        manager.load_inventory_from_file().await?;
        return Ok(Box::new(manager));
    }

    let settings = SettingsManager::load_or_default(args.settings.as_deref()).await?;
    let password = SecretsManager::new(args.secrets.as_deref()).password().await?;
    let repository = PostgresGroupRepository::connect(&settings, password.as_deref())
        .await
        .context("Failed to open document store")?;
    Ok(Box::new(repository))
}

/// Output is written in one piece so a failure never leaves a partial document.
fn print_bytes(bytes: &[u8]) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(bytes)
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
        .context("Failed to write output")
}
