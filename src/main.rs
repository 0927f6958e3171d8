use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::IsTerminal;
use std::path::PathBuf;

use plan_report::report::{self, ExportFormat, OutputNames, RenderOptions};
use plan_report::session::{FileSessionStore, SessionContext, User};
use plan_report::utils::config::Config;
use plan_report::view::{terminal, DetailTab, StatusFilter, ViewState};

#[derive(Parser)]
#[command(name = "plan-report")]
#[command(author = "NL Team")]
#[command(version)]
#[command(about = "Standalone HTML reports for test plan runs", long_about = None)]
struct Cli {
    /// Show debug logs (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export plan run payload(s) as reports
    Generate {
        /// Payload JSON file(s) or glob patterns
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output format (html, json, junit)
        #[arg(short, long, default_value = "html")]
        format: ExportFormat,

        /// Output file path (single input only; stdout if omitted)
        #[arg(short, long, conflicts_with = "out_dir")]
        output: Option<PathBuf>,

        /// Write one report per input into this directory
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// YAML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Browse a plan run payload in the terminal
    View {
        /// Payload JSON file
        input: PathBuf,

        /// Status filter (all, success, failed)
        #[arg(long, default_value = "all")]
        filter: StatusFilter,

        /// Case name or URL substring
        #[arg(short, long, default_value = "")]
        search: String,

        /// Index of the case to open
        #[arg(long)]
        select: Option<usize>,

        /// Detail tab (steps, body, header, cookie, console, request)
        #[arg(long)]
        tab: Option<DetailTab>,

        /// Show bodies as received instead of pretty-printed
        #[arg(long, default_value = "false")]
        raw: bool,
    },

    /// Manage the signed-in user stamped into exported reports
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },
}

#[derive(Subcommand)]
enum SessionCommands {
    /// Sign in as a user
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        role: Option<String>,

        #[arg(short, long)]
        token: Option<String>,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    // Reports can still be generated without a home directory; only the
    // session commands need the store.
    let mut session = match FileSessionStore::default_location() {
        Ok(store) => Some(SessionContext::initialize(store)),
        Err(e) => {
            log::warn!("Session storage unavailable: {}", e);
            None
        }
    };

    match cli.command {
        Commands::Generate {
            inputs,
            format,
            output,
            out_dir,
            config,
        } => {
            let config = Config::load(config.as_deref())?;
            let paths = report::resolve_inputs(&inputs)?;
            let options = RenderOptions {
                cdn: config.cdn.clone(),
                generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
                exported_by: session
                    .as_ref()
                    .and_then(|s| s.username())
                    .map(str::to_string),
            };

            if paths.len() == 1 && out_dir.is_none() {
                let path = &paths[0];
                eprintln!(
                    "{} Generating {} report from: {}",
                    "📊".blue(),
                    format.to_string().cyan(),
                    path.display()
                );
                report::generate_report(
                    path,
                    format,
                    output.as_deref(),
                    &options,
                    config.pretty_json,
                )
                .await?;
                return Ok(());
            }

            if output.is_some() {
                anyhow::bail!(
                    "--output takes a single input; use --out-dir for {} inputs",
                    paths.len()
                );
            }
            let dir = out_dir.unwrap_or_else(|| config.output_dir.clone());
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;

            let pb = if std::io::stderr().is_terminal() {
                ProgressBar::new(paths.len() as u64)
            } else {
                ProgressBar::with_draw_target(
                    Some(paths.len() as u64),
                    ProgressDrawTarget::hidden(),
                )
            };
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")?
                    .progress_chars("=> "),
            );

            let mut names = OutputNames::new();
            let mut failed = 0;
            for path in &paths {
                pb.set_message(path.display().to_string());
                let result = match report::load_payload(path) {
                    Ok(payload) => {
                        let target = dir.join(names.claim(&payload, path, format));
                        report::export_payload(
                            &payload,
                            format,
                            Some(&target),
                            &options,
                            config.pretty_json,
                        )
                        .await
                    }
                    Err(e) => Err(e),
                };
                if let Err(e) = result {
                    failed += 1;
                    pb.println(format!("{} {}: {}", "✗".red(), path.display(), e));
                }
                pb.inc(1);
            }
            pb.finish_and_clear();

            println!(
                "\n{} {} report(s) written to {}",
                if failed == 0 { "✅".green() } else { "⚠️ ".yellow() },
                paths.len() - failed,
                dir.display().to_string().cyan()
            );
            if failed > 0 {
                anyhow::bail!("{} of {} payload(s) failed", failed, paths.len());
            }
        }

        Commands::View {
            input,
            filter,
            search,
            select,
            tab,
            raw,
        } => {
            let payload = report::load_payload(&input)?;
            let mut view = ViewState::new(&payload);
            view.set_filter(filter);
            view.set_search(search);
            if let Some(index) = select {
                if !view.select_item(index) {
                    anyhow::bail!(
                        "No test case at index {} ({} in report)",
                        index,
                        payload.plan_items.len()
                    );
                }
            }
            if let Some(tab) = tab {
                view.set_tab(tab);
            }
            if raw {
                view.toggle_format_json();
            }

            let stdout = std::io::stdout();
            terminal::render(&view, &mut stdout.lock())?;
        }

        Commands::Session { command } => {
            let session = session
                .as_mut()
                .context("Could not locate session storage (no home directory)")?;
            match command {
                SessionCommands::Login {
                    username,
                    role,
                    token,
                } => {
                    session.set_user(User {
                        username: username.clone(),
                        role,
                        token,
                    })?;
                    println!("{} Signed in as {}", "✓".green(), username.cyan());
                }
                SessionCommands::Logout => {
                    session.clear_user()?;
                    println!("{} Signed out", "✓".green());
                }
                SessionCommands::Whoami => match session.user() {
                    Some(user) => match &user.role {
                        Some(role) => println!("{} ({})", user.username.cyan(), role),
                        None => println!("{}", user.username.cyan()),
                    },
                    None => println!("{}", "Not signed in".dimmed()),
                },
            }
        }
    }

    Ok(())
}
