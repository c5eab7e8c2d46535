// src/cli.rs
use crate::core::config_manager::ConfigManager;
use crate::core::fs_ops::FsOps;
use crate::core::selector::Selection;
use crate::core::templates::TemplateRegistry;
use crate::generator::ResumeGenerator;
use crate::matching::MatchClient;
use crate::types::{ItemWithId, Resume, Section};
use crate::utils::{split_list, truncate_text};
use crate::web::start_web_server;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

pub const RESET: &str = "\x1b[0m";
pub const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const PURPLE: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

#[derive(Parser)]
#[command(name = "resume-builder")]
#[command(about = "Tailor a YAML resume to a job and typeset it to PDF")]
pub struct Cli {
    /// Resume source file (YAML, or JSON by extension)
    #[arg(short, long, global = true, default_value = "resume.yaml")]
    pub resume: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render the selected items and compile a PDF
    Generate {
        #[arg(short, long, default_value = "resume.pdf")]
        output: PathBuf,
        /// Comma-separated item ids to include
        #[arg(long)]
        ids: Option<String>,
        /// Comma-separated tags; ignored when --ids is given
        #[arg(long)]
        tags: Option<String>,
        /// Template name
        #[arg(long)]
        template: Option<String>,
        /// Also keep the rendered .tex next to the output
        #[arg(long)]
        tex: bool,
    },
    /// Score every item against a job description
    Match {
        /// File holding the job description
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Job description text
        #[arg(short, long)]
        job: Option<String>,
    },
    /// List every selectable item by section
    List,
    /// Start the HTTP API
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
}

pub async fn handle_command(cli: Cli, config: ConfigManager) -> Result<()> {
    match cli.command {
        Commands::Generate {
            output,
            ids,
            tags,
            template,
            tex,
        } => {
            let ids = ids.as_deref().map(split_list).unwrap_or_default();
            let tags = tags.as_deref().map(split_list).unwrap_or_default();
            run_generate(&cli.resume, &config, &output, &ids, &tags, template.as_deref(), tex).await
        }
        Commands::Match { file, job } => run_match(&cli.resume, &config, file, job).await,
        Commands::List => run_list(&cli.resume),
        Commands::Serve { port } => {
            ensure_resume_exists(&cli.resume)?;
            let port = port.unwrap_or(config.server.port);

            println!("{}Starting server with resume: {}{}", CYAN, cli.resume.display(), RESET);
            println!(
                "{}Server will be available at: {}http://localhost:{}{}",
                GREEN, WHITE, port, RESET
            );

            start_web_server(cli.resume, config, port).await
        }
    }
}

fn ensure_resume_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("resume file not found: {}", path.display());
    }
    Ok(())
}

fn load_resume(path: &Path) -> Result<Resume> {
    ensure_resume_exists(path)?;
    Resume::load(path).context("failed to load resume")
}

async fn run_generate(
    resume_path: &Path,
    config: &ConfigManager,
    output: &Path,
    ids: &[String],
    tags: &[String],
    template: Option<&str>,
    keep_tex: bool,
) -> Result<()> {
    println!("{}Loading resume from: {}{}", CYAN, resume_path.display(), RESET);
    let resume = load_resume(resume_path)?;

    let selection = if !ids.is_empty() {
        println!("{}Filtering by IDs: {}{}", YELLOW, ids.join(", "), RESET);
        Selection::by_ids(ids.iter().cloned())
    } else if !tags.is_empty() {
        println!("{}Filtering by tags: {}{}", YELLOW, tags.join(", "), RESET);
        Selection::by_tags(&resume, tags)
    } else {
        println!("{}Including all items{}", YELLOW, RESET);
        Selection::Unfiltered
    };

    let templates = TemplateRegistry::discover(config.paths.templates_dir.as_deref())?;
    let generator = ResumeGenerator::new(templates, config.toolchain.clone());

    println!("{}Generating LaTeX...{}", CYAN, RESET);
    let (_, latex) = generator.render(&resume, &selection, template)?;

    if keep_tex {
        let tex_path = output.with_extension("tex");
        FsOps::write_file_safe(&tex_path, &latex).await?;
        println!("{}Wrote LaTeX to: {}{}", GREEN, tex_path.display(), RESET);
    }

    println!(
        "{}Compiling PDF with {}...{}",
        CYAN,
        generator.toolchain().binary,
        RESET
    );
    let pdf = generator.compile(&latex).await?;
    FsOps::write_file_safe(output, &pdf).await?;

    println!("{}✓ Successfully generated: {}{}", GREEN, output.display(), RESET);
    Ok(())
}

async fn run_match(
    resume_path: &Path,
    config: &ConfigManager,
    file: Option<PathBuf>,
    job: Option<String>,
) -> Result<()> {
    let job_description = match (file, job) {
        (Some(file), _) => {
            let content = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("failed to read job description file: {}", file.display()))?;
            if content.trim().is_empty() {
                anyhow::bail!("job description file is empty");
            }
            content
        }
        (None, Some(job)) if !job.trim().is_empty() => job,
        _ => anyhow::bail!("either --file or --job must be specified"),
    };

    let client = MatchClient::new(&config.scoring)?;

    println!("{}Loading resume from: {}{}", CYAN, resume_path.display(), RESET);
    let resume = load_resume(resume_path)?;

    println!("{}Analyzing with AI...{}", YELLOW, RESET);
    let result = client
        .score(&resume, &job_description)
        .await
        .context("failed to analyze job")?;

    let mut scored: Vec<(ItemWithId<'_>, f64)> = resume
        .all_items()
        .into_iter()
        .filter_map(|item| result.scores.get(item.id).map(|score| (item, *score)))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    println!("\n{}=== Matching Results ==={}\n", GREEN, RESET);
    for (item, score) in scored {
        println!(
            "{}[{:.0}]{} {}{}{}",
            score_color(score),
            score,
            RESET,
            BLUE,
            item.id,
            RESET
        );
        println!("  {}", truncate_text(item.text, 100, 97));
        if !item.tags.is_empty() {
            println!("  {}Tags:{} {}", PURPLE, RESET, item.tags.join(", "));
        }
        println!();
    }

    Ok(())
}

fn run_list(resume_path: &Path) -> Result<()> {
    let resume = load_resume(resume_path)?;
    let items = resume.all_items();

    for section in Section::ALL {
        let in_section: Vec<&ItemWithId<'_>> =
            items.iter().filter(|item| item.section == section).collect();
        if in_section.is_empty() {
            continue;
        }

        println!("\n{}=== {} ==={}\n", GREEN, section.label(), RESET);

        let mut current_category = "";
        for item in in_section {
            if !item.category.is_empty() && item.category != current_category {
                current_category = item.category;
                println!("{}{}{}", YELLOW, current_category, RESET);
            }

            println!("  {}{}{}", BLUE, item.id, RESET);
            println!("    {}", truncate_text(item.text, 100, 97));
            if !item.tags.is_empty() {
                println!("    {}Tags:{} {}", PURPLE, RESET, item.tags.join(", "));
            }
            println!();
        }
    }

    Ok(())
}

fn score_color(score: f64) -> &'static str {
    if score >= 90.0 {
        GREEN
    } else if score >= 70.0 {
        YELLOW
    } else if score >= 50.0 {
        CYAN
    } else {
        RED
    }
}
