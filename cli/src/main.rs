// Copyright 2023 System76 <info@system76.com>
// SPDX-License-Identifier: MPL-2.0

mod i3;
mod layout;
mod list;

use clap::{ArgAction, Parser};
use randr_dock_shell::{List, Randr};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

/// Arrange the laptop panel and docked monitors with xrandr
#[derive(clap::Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Only log the xrandr command instead of running it. Use `--dry-run=false` to apply.
    #[arg(
        long,
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    dry_run: bool,
    /// Show debug information.
    #[arg(short, long)]
    verbose: bool,
    /// X display to configure.
    #[arg(long, default_value = ":0")]
    display: String,
    /// Name or path of the xrandr program.
    #[arg(long, default_value = "xrandr")]
    xrandr: String,
    /// Search path for xrandr and i3-msg.
    #[arg(long, default_value = "/usr/bin")]
    path: String,
    /// File that log lines are appended to.
    #[arg(long, default_value = "/tmp/randr-dock.log")]
    log_file: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Arrange outputs for the detected setup. This is the default.
    Arrange,

    /// List detected outputs and modes.
    List {
        /// Display in KDL format.
        #[arg(long)]
        kdl: bool,
    },
}

fn setup_logs(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cli.log_file)
        .map_err(|why| format!("failed to log to {}: {why}", cli.log_file.display()))?;

    let filter_layer = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));

    let fmt_layer = fmt::layer().with_target(false);

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(file_layer)
        .init();

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logs(&cli)?;

    let randr = Randr {
        program: cli.xrandr.clone(),
        display: cli.display.clone(),
        search_path: cli.path.clone(),
    };

    let list = randr
        .list()
        .await
        .inspect_err(|why| tracing::error!("could not list outputs: {why}"))?;

    tracing::debug!("deduced displays:\n{}", list::kdl(&list));

    match cli.command {
        Some(Commands::List { kdl }) => {
            let text = if kdl { list::kdl(&list) } else { list::human(&list) };
            let mut stdout = std::io::stdout().lock();
            let _res = stdout.write_all(text.as_bytes());
            let _res = stdout.flush();
        }

        Some(Commands::Arrange) | None => {
            let _outcome = arrange(&randr, &list, cli.dry_run).await;

            if !cli.dry_run {
                if let Err(why) = i3::restart(&cli.display, &cli.path).await {
                    tracing::warn!("error encountered while restarting i3: {why}");
                }
            }
        }
    }

    Ok(())
}

/// What [`arrange`] ended up doing.
#[derive(Debug, PartialEq)]
enum Outcome {
    /// The chosen layout was applied with these arguments.
    Arranged(Vec<String>),
    /// The chosen layout failed and the fallback was applied with these arguments.
    FellBack(Vec<String>),
    /// Neither the layout nor a fallback could be applied.
    Failed,
}

/// Applies the layout chosen for `list`, retrying with the laptop panel alone
/// if that fails.
async fn arrange(randr: &Randr, list: &List, dry_run: bool) -> Outcome {
    let plan = layout::plan(list);

    tracing::info!("{}", plan.scenario);

    let why = match randr.apply(&plan.screens, dry_run).await {
        Ok(args) => return Outcome::Arranged(args),
        Err(why) => why,
    };

    tracing::error!("could not arrange outputs: {why}");

    if plan.fallback.is_empty() {
        return Outcome::Failed;
    }

    tracing::info!("falling back to the laptop panel only");

    match randr.apply(&plan.fallback, dry_run).await {
        Ok(args) => Outcome::FellBack(args),
        Err(why) => {
            tracing::error!("could not enable the laptop panel: {why}");
            Outcome::Failed
        }
    }
}
