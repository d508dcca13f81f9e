//! `objects` and `kinds` command handlers

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::config::Config;
use crate::graph::{ChildFetchWarning, Discovery, DiscoveryError};
use crate::models::{AutomationKind, AutomationRef, DiscoveredObject, GroupVersionKind};
use crate::services::{DiscoverySettings, DiscoveryTicket, ReconciledView, ResourceService};
use crate::table::{TableSort, column_index, reconciled_object_fields, render_table};

/// Identifies the automation a command works on
#[derive(Args, Debug, Clone)]
pub struct AutomationArgs {
    /// Automation kind: Kustomization (ks) or HelmRelease (hr)
    pub kind: AutomationKind,

    /// Automation name
    pub name: String,

    /// Automation namespace (defaults to the configured defaultNamespace)
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,
}

impl AutomationArgs {
    pub fn automation(&self, config: &Config) -> AutomationRef {
        let namespace = self
            .namespace
            .as_deref()
            .unwrap_or(&config.default_namespace);
        AutomationRef::new(self.kind, namespace, &self.name)
    }
}

/// Output formats of the objects command
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

#[derive(Args, Debug, Clone)]
pub struct ObjectsArgs {
    #[command(flatten)]
    pub automation: AutomationArgs,

    /// Declared kinds (e.g. apps/v1/Deployment,v1/Service); read from the cluster when omitted
    #[arg(long, value_delimiter = ',')]
    pub kinds: Vec<GroupVersionKind>,

    /// Column to sort by (name, type, namespace, status)
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long)]
    pub reverse: bool,

    /// Refresh every SECS seconds until interrupted
    #[arg(long, value_name = "SECS")]
    pub watch: Option<u64>,

    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}

/// Print the objects reconciled by an automation
pub async fn handle_objects_command(
    args: ObjectsArgs,
    config: &Config,
    context: Option<&str>,
) -> Result<()> {
    let automation = args.automation.automation(config);
    let sort = table_sort(args.sort.as_deref(), args.reverse, config)?;

    let client = crate::kube::create_client(context).await?;
    let service = ResourceService::new(
        client,
        DiscoverySettings {
            max_levels: config.discovery.max_levels,
            owner_chain_depth: config.discovery.owner_chain_depth,
        },
    );
    let kinds = service.resolve_kinds(&automation, &args.kinds).await?;
    tracing::debug!("Discovering {} with {} declared kinds", automation, kinds.len());

    let Some(secs) = args.watch else {
        let discovery = service
            .discover(&automation, &kinds)
            .await
            .context("Discovery failed")?;
        print_warnings(&discovery.warnings);
        return print_objects(&discovery.objects, &sort, args.output, config);
    };

    let period = Duration::from_secs(secs.max(1));
    let discover = move |automation: AutomationRef, kinds: Vec<GroupVersionKind>| {
        let service = service.clone();
        async move { service.discover(&automation, &kinds).await }
    };
    let interrupted = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for interrupt: {}", e);
            std::future::pending::<()>().await;
        }
    };

    watch(
        discover,
        automation.clone(),
        kinds,
        period,
        interrupted,
        |ticket, view| {
            println!(
                "\n{} (refresh {}, every {}s)",
                automation,
                ticket.generation(),
                period.as_secs()
            );
            if let Some(error) = view.error() {
                eprintln!("error: {}", error);
                return Ok(());
            }
            print_warnings(view.warnings());
            print_objects(view.objects(), &sort, args.output, config)
        },
    )
    .await
}

/// Print the declared kinds of an automation
pub async fn handle_kinds_command(
    args: AutomationArgs,
    config: &Config,
    context: Option<&str>,
) -> Result<()> {
    let automation = args.automation(config);
    let client = crate::kube::create_client(context).await?;
    let service = ResourceService::new(client, DiscoverySettings::default());

    let kinds = service.resolve_kinds(&automation, &[]).await?;
    if kinds.is_empty() {
        println!("{} declares no kinds", automation);
    }
    for gvk in kinds {
        println!("{}", gvk);
    }
    Ok(())
}

/// Sort state from the command line, falling back to the configured defaults
pub fn table_sort(column: Option<&str>, reverse: bool, config: &Config) -> Result<TableSort> {
    let fields = reconciled_object_fields();
    let label = column.unwrap_or(&config.table.default_sort);
    let index = column_index(&fields, label)
        .filter(|&i| fields[i].is_sortable())
        .ok_or_else(|| anyhow::anyhow!("Cannot sort by '{}'", label))?;

    let mut sort = TableSort::new(index);
    sort.set_reversed(reverse || config.table.reverse);
    Ok(sort)
}

fn print_objects(
    objects: &[DiscoveredObject],
    sort: &TableSort,
    output: OutputFormat,
    config: &Config,
) -> Result<()> {
    let fields = reconciled_object_fields();
    let rows = sort.apply(objects, &fields);

    match output {
        OutputFormat::Table => {
            println!(
                "{}",
                render_table(&fields, &rows, sort, config.table.max_column_width)
            );
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&rows).context("Failed to serialize objects")?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(&rows).context("Failed to serialize objects")?;
            print!("{}", yaml);
        }
    }
    Ok(())
}

fn print_warnings(warnings: &[ChildFetchWarning]) {
    for warning in warnings {
        eprintln!("warning: {}", warning);
    }
}

type Outcome = (DiscoveryTicket, Result<Discovery, DiscoveryError>);

/// Re-run discovery on an interval until `shutdown` resolves
///
/// Ticks that arrive while the previous discovery is still running are
/// skipped. `print` sees every result that is still current.
pub async fn watch<D, Fut, S, P>(
    discover: D,
    automation: AutomationRef,
    kinds: Vec<GroupVersionKind>,
    period: Duration,
    shutdown: S,
    mut print: P,
) -> Result<()>
where
    D: Fn(AutomationRef, Vec<GroupVersionKind>) -> Fut,
    Fut: Future<Output = Result<Discovery, DiscoveryError>> + Send + 'static,
    S: Future<Output = ()>,
    P: FnMut(&DiscoveryTicket, &ReconciledView) -> Result<()>,
{
    let mut view = ReconciledView::new();
    let (tx, mut rx) = mpsc::channel::<Outcome>(4);
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(ticket) = view.refresh(&automation, &kinds) {
                    let pending = discover(automation.clone(), kinds.clone());
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let outcome = pending.await;
                        // Receiver is gone once the watch ends
                        let _ = tx.send((ticket, outcome)).await;
                    });
                }
            }
            Some((ticket, outcome)) = rx.recv() => {
                if view.complete(&ticket, outcome) {
                    print(&ticket, &view)?;
                }
            }
            _ = &mut shutdown => {
                tracing::debug!("Watch interrupted");
                return Ok(());
            }
        }
    }
}
