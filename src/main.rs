//! tab-autoreload command-line driver.
//!
//! Runs the reload engine against a logging host and reads commands from
//! stdin. Type `help` for the list.

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use tab_autoreload::cli::{Cli, ShellCommand, HELP};
use tab_autoreload::popup::{tabs_label, PopupView};
use tab_autoreload::{
    AutoreloadResult, BrowserHost, Config, ReloadScheduler, SettingsStore, TabEvent, TracingHost,
};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    init_logging(&config.logging.level);

    if cli.write_config {
        let path = cli.config.clone().unwrap_or_else(Config::config_path);
        match config.save_to(&path) {
            Ok(()) => println!("Wrote {}", path.display()),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to write config");
                std::process::exit(1);
            }
        }
        return;
    }

    if let Err(e) = run(cli, config).await {
        tracing::error!(error = %e, "tab-autoreload failed");
        std::process::exit(1);
    }
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli, config: Config) -> AutoreloadResult<()> {
    let mut settings = SettingsStore::open(&config.storage.settings_dir);
    if let Some(countdown) = cli.countdown_override() {
        settings.set_countdown_enabled(countdown)?;
    }

    let host = Arc::new(TracingHost::new());
    let engine_host: Arc<dyn BrowserHost> = host.clone();
    let mut scheduler = ReloadScheduler::new(engine_host, settings, &config);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match ShellCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        if command == ShellCommand::Quit {
            break;
        }
        execute(command, &scheduler, &host, &config).await?;
    }

    scheduler.shutdown().await
}

async fn execute(
    command: ShellCommand,
    scheduler: &ReloadScheduler,
    host: &TracingHost,
    config: &Config,
) -> AutoreloadResult<()> {
    match command {
        ShellCommand::Set { tab_id, seconds } => scheduler.set_reload(tab_id, seconds).await?,
        ShellCommand::Clear { tab_id } => scheduler.clear_reload(tab_id).await?,
        ShellCommand::ClearAll => scheduler.clear_all_reloads().await?,
        ShellCommand::Get { tab_id } => {
            println!("{}", scheduler.get_reload(tab_id).await?);
        }
        ShellCommand::Count => {
            let count = scheduler.get_how_many_reloads_are_active().await?;
            println!("{}", tabs_label(count));
        }
        ShellCommand::Toggle => {
            let mode = scheduler.toggle_countdown().await?;
            println!("{:?}", mode);
        }
        ShellCommand::Navigate { tab_id } => scheduler.tab_event(TabEvent::loading(tab_id)).await?,
        ShellCommand::Close { tab_id } => {
            scheduler.tab_event(TabEvent::Removed { tab_id }).await?
        }
        ShellCommand::Focus { tab_id } => host.focus(tab_id),
        ShellCommand::Popup => {
            match PopupView::load(scheduler, host, &config.popup.presets).await? {
                Some(view) => print_popup(&view),
                None => println!("No active tab (use `focus <tab>`)"),
            }
        }
        ShellCommand::Action(action) => action.apply(scheduler, host).await?,
        ShellCommand::Help => println!("{}", HELP),
        ShellCommand::Quit => {}
    }
    Ok(())
}

fn print_popup(view: &PopupView) {
    println!("Reloading: {}", view.tabs_label);
    let presets: Vec<String> = view
        .presets
        .iter()
        .map(|p| {
            if p.active {
                format!("[{}]", p.label)
            } else {
                p.label.clone()
            }
        })
        .collect();
    println!("Presets: {}", presets.join(" "));
    let c = view.custom;
    println!(
        "Custom: {}d {}h {}m {}s",
        c.days, c.hours, c.minutes, c.seconds
    );
    if view.show_this_tab {
        println!("[stop this tab]");
    }
    if view.show_other_tabs {
        println!("[stop all tabs]");
    }
}
