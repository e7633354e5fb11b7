mod cli;
mod output;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use jobsite::config::{default_data_dir, load_config_or_default};
use jobsite::{AppConfig, ConfigError, JobsiteApp, JobsiteError, SessionContext};
use log::debug;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

use cli::{
    Cli, Command, GlobalArgs, ItemCommand, ManualCommand, NotesCommand, PhotoCommand, SiteCommand,
};
use output::Printer;

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Jobsite(#[from] JobsiteError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to read '{path}': {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        );

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: could not install tracing subscriber: {}", e);
        return;
    }
    // Library code logs through `log`; forward it into the subscriber.
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("warning: library log output disabled: {}", e);
    }
}

fn resolve_config(global: &GlobalArgs) -> Result<AppConfig, CliError> {
    let data_dir = global.data_dir.clone().unwrap_or_else(default_data_dir);
    let config_path = global
        .config
        .clone()
        .unwrap_or_else(|| data_dir.join("config.json"));

    let mut config = load_config_or_default(&config_path, &data_dir)?;
    if global.data_dir.is_some() {
        config.data_dir = data_dir;
    }
    debug!("Using data directory {}", config.data_dir.display());
    Ok(config)
}

fn read_file(path: &Path) -> Result<Vec<u8>, CliError> {
    std::fs::read(path).map_err(|e| CliError::ReadInput {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Runs one command. Returns whether the handler reported success.
fn run(cli: Cli) -> Result<bool, CliError> {
    let config = resolve_config(&cli.global)?;
    let mut app = JobsiteApp::open(config)?;
    let mut session = SessionContext::new();
    let printer = Printer::new(cli.global.json);

    if let Some(notice) = app.startup_notice() {
        printer.notice(&notice);
    }

    // Every site-scoped command starts by selecting its site.
    macro_rules! select {
        ($site:expr) => {{
            let selected = app.select_site(&mut session, $site);
            if !selected.success {
                return Ok(printer.response(&selected, |_| String::new()));
            }
        }};
    }

    let ok = match cli.command {
        Command::Site { command } => match command {
            SiteCommand::Create { name } => {
                printer.response(&app.create_site(&mut session, &name), |name| name.clone())
            }
            SiteCommand::List => {
                printer.response(&app.list_sites(&mut session), |data| output::site_list(data))
            }
            SiteCommand::Show { name, query } => {
                select!(&name);
                printer.response(&app.show_site(&mut session, &query), output::site_view)
            }
        },
        Command::Item { command } => match command {
            ItemCommand::Add {
                site,
                list,
                text,
                priority,
                link,
            } => {
                select!(&site);
                let response = app.add_item(&mut session, list, &text, priority, link.as_deref());
                printer.response(&response, output::item_ref)
            }
            ItemCommand::Done { site, list, id } => {
                select!(&site);
                printer.response(&app.toggle_item(&mut session, list, &id), output::item_ref)
            }
            ItemCommand::Priority {
                site,
                list,
                id,
                priority,
            } => {
                select!(&site);
                let response = app.set_item_priority(&mut session, list, &id, priority);
                printer.response(&response, output::item_ref)
            }
            ItemCommand::Remove { site, list, id } => {
                select!(&site);
                printer.response(&app.remove_item(&mut session, list, &id), output::item_ref)
            }
        },
        Command::Notes { command } => match command {
            NotesCommand::Set { site, text } => {
                select!(&site);
                printer.response(&app.set_notes(&mut session, &text), |notes| notes.clone())
            }
            NotesCommand::Append { site, text } => {
                select!(&site);
                printer.response(&app.append_notes(&mut session, &text), |notes| notes.clone())
            }
        },
        Command::Photo { command } => match command {
            PhotoCommand::Add {
                site,
                file,
                section,
            } => {
                select!(&site);
                let content = read_file(&file)?;
                let original_name = file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let response = app.add_photo(&mut session, section, &content, &original_name);
                printer.response(&response, |path| path.clone())
            }
            PhotoCommand::Remove {
                site,
                section,
                index,
            } => {
                select!(&site);
                let response = app.remove_photo(&mut session, section, index);
                printer.response(&response, |path| format!("Removed reference to {}", path))
            }
            PhotoCommand::List { site, section } => {
                select!(&site);
                let response = app.list_photos(&mut session, section);
                printer.response(&response, |data| output::numbered(data))
            }
            PhotoCommand::Preview { site, section } => {
                select!(&site);
                let response = app.preview_photos(&mut session, section);
                printer.response(&response, |data| output::previews(data))
            }
        },
        Command::Manual { command } => match command {
            ManualCommand::Search { query } => {
                let response = app.search_manuals(&mut session, &query.join(" "));
                printer.response(&response, |data| output::search_hits(data))
            }
            ManualCommand::Download { url } => {
                let response = app.download_manual(&mut session, &url);
                printer.response(&response, |path| path.clone().unwrap_or_default())
            }
        },
        Command::Price { url } => {
            printer.response(&app.sniff_price(&mut session, &url), |price| price.clone())
        }
        Command::Ocr { file } => {
            printer.response(&app.extract_text(&mut session, &file), |text| text.clone())
        }
        Command::Export { output: dest } => match dest {
            Some(dest) => {
                printer.response(&app.export_to(&mut session, &dest), |path| path.clone())
            }
            None => {
                let response = app.export(&mut session);
                if let Some(bytes) = &response.data {
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(bytes)?;
                    stdout.write_all(b"\n")?;
                    true
                } else {
                    printer.response(&response, |_| String::new())
                }
            }
        },
        Command::Reset { yes } => {
            if !yes {
                eprintln!("Refusing to reset without --yes");
                false
            } else {
                printer.response(&app.reset(&mut session), |_| "Database cleared".to_string())
            }
        }
    };

    Ok(ok)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    debug!("Starting jobsite v{}", env!("CARGO_PKG_VERSION"));

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}
