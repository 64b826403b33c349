//! Connprep CLI - meeting prep briefs from profile text
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments and handling top-level errors.

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use connprep::config::Backend;
use connprep::{input, logging, pipeline, render, Config, InputBundle, PipelineOptions};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "connprep")]
#[command(author, version, about = "Meeting prep briefs from pasted profile text", long_about = None)]
struct Cli {
    /// Path to a connprep.toml (defaults to ./connprep.toml, then ~/.config/connprep/)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a connection prep brief
    Brief(BriefArgs),
    /// Print the resolved configuration (secrets masked)
    Config,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(clap::Args)]
struct BriefArgs {
    /// Profile text (About / Headline / Experience)
    #[arg(long, conflicts_with = "profile_file")]
    profile: Option<String>,
    /// Read the profile from a file (.pdf profile exports are supported)
    #[arg(long)]
    profile_file: Option<PathBuf>,
    /// Read 1-3 recent posts from a file
    #[arg(long)]
    posts_file: Option<PathBuf>,
    /// Meeting goal, e.g. "Intro: explore partnership"
    #[arg(long)]
    goal: Option<String>,
    /// Maximum bullets per list (3-12)
    #[arg(long)]
    max_bullets: Option<usize>,
    /// Leave out the suggested agenda
    #[arg(long)]
    no_agenda: bool,
    /// Leave out the outreach message and email subject
    #[arg(long)]
    no_outreach: bool,
    /// Summarization backend
    #[arg(long, value_enum)]
    summarizer: Option<Backend>,
    /// Summarization model id
    #[arg(long)]
    summarizer_model: Option<String>,
    /// Generation backend
    #[arg(long, value_enum)]
    generator: Option<Backend>,
    /// Generation model id
    #[arg(long)]
    generator_model: Option<String>,
    /// Where to write the markdown brief (file or directory)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Print the brief as JSON instead of formatted text
    #[arg(long)]
    json: bool,
    /// Also print the intermediate profile and posts summaries
    #[arg(long)]
    show_summaries: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Brief(args) => {
            let mut config = load_config(cli.config.as_ref())?;
            apply_overrides(&mut config, &args);
            config.validate()?;

            let bundle = collect_input(&args)?;
            if bundle.is_empty() {
                eprintln!(
                    "{}",
                    "No profile or posts text given; the brief will be generic.".yellow()
                );
            }

            eprintln!("Working...");
            let output = match pipeline::run_with_config(&config, &bundle).await {
                Ok(output) => output,
                Err(e) => {
                    eprintln!("{} {}", "✖".red(), e.to_string().red());
                    std::process::exit(1);
                }
            };

            let request = PipelineOptions::from_config(&config).request;

            if args.show_summaries {
                println!("🔎 {}", "Profile summary:".bold());
                println!("  {}\n", output.profile_summary);
                println!("🔎 {}", "Posts summary:".bold());
                println!("  {}\n", output.posts_summary);
            }

            if args.json {
                println!("{}", serde_json::to_string_pretty(&output.brief)?);
            } else {
                render::print_brief(&output.brief, &bundle.meeting_goal, &request);
            }

            let markdown = render::to_markdown(&output.brief, &bundle.meeting_goal, &request);
            let path = render::export_path(args.output.as_deref());
            render::write_markdown(&path, &markdown)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("⬇️  Saved markdown to {}", path.display());
        }
        Commands::Config => {
            let config = load_config(cli.config.as_ref())?;
            print!("{}", config.to_masked_toml()?);
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "connprep", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    Ok(config)
}

/// Flags win over the config file
fn apply_overrides(config: &mut Config, args: &BriefArgs) {
    let engine = &mut config.engine;
    // a model from the file belongs to the file's backend
    if let Some(backend) = args.summarizer {
        engine.summarizer = backend;
        engine.summarizer_model = None;
    }
    if let Some(model) = &args.summarizer_model {
        engine.summarizer_model = Some(model.clone());
    }
    if let Some(backend) = args.generator {
        engine.generator = backend;
        engine.generator_model = None;
    }
    if let Some(model) = &args.generator_model {
        engine.generator_model = Some(model.clone());
    }

    let brief = &mut config.brief;
    if let Some(n) = args.max_bullets {
        brief.max_bullets = n;
    }
    if args.no_agenda {
        brief.include_agenda = false;
    }
    if args.no_outreach {
        brief.include_outreach = false;
    }
}

/// Gather profile, posts and goal from flags, files, stdin or interactive prompts
fn collect_input(args: &BriefArgs) -> anyhow::Result<InputBundle> {
    let interactive = input::stdin_is_terminal();

    let profile_text = match (&args.profile, &args.profile_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => input::read_text_file(path)?,
        (None, None) if !interactive => input::read_stdin()?,
        (None, None) => input::profile_from_editor()?,
    };

    let posts_text = match &args.posts_file {
        Some(path) => input::read_text_file(path)?,
        None => String::new(),
    };

    let meeting_goal = match &args.goal {
        Some(goal) => goal.clone(),
        None if interactive => input::prompt_goal()?,
        None => String::new(),
    };

    Ok(InputBundle::new(profile_text, posts_text, meeting_goal))
}
