//! Lessons CLI
//!
//! Generates slide-ready lesson plans for a topic and writes them as JSON.

use anyhow::Context;
use clap::{Parser, Subcommand};
use lessons_core::config::{GenerationConfig, LessonSettings, DEFAULT_AUDIENCE, DEFAULT_LESSON_GOALS};
use lessons_core::schema::LearnerLevel;
use lessons_core::skills::offline::{self, StaticResearch, StaticSearch, StaticSynthesizer};
use lessons_core::skills::{ResearcherSkill, SynthesisSkill};
use lessons_core::synthesis::{LessonCoordinator, LessonSynthesizer, ResearchCapability};
use lessons_core::tools::{SearchProvider, ValyuSearchClient};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lessons", version, about = "Research a topic and generate lesson plans")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate lesson plans for a topic
    GenerateLessons(GenerateArgs),
}

#[derive(clap::Args, Debug)]
struct GenerateArgs {
    /// Topic to research and teach
    topic: String,

    /// Target learner level (beginner, intermediate, advanced)
    #[arg(long, default_value = "intermediate")]
    level: LearnerLevel,

    #[arg(long, default_value = DEFAULT_AUDIENCE)]
    audience: String,

    #[arg(long, default_value_t = 2)]
    num_lessons: u32,

    /// Estimated minutes per lesson
    #[arg(long, default_value_t = 45)]
    estimated_duration: u32,

    #[arg(long, default_value = DEFAULT_LESSON_GOALS)]
    goals: String,

    /// Directory the lesson files are written to
    #[arg(long, default_value = "./output")]
    output_dir: PathBuf,

    /// Run the pipeline with offline collaborators (no network or credentials)
    #[arg(long)]
    mock_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs)?;

    match cli.command {
        Command::GenerateLessons(args) => generate_lessons(args).await,
    }
}

fn init_tracing(verbose: bool, json: bool) -> anyhow::Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.with_target(false).try_init()
    };
    result.map_err(|e| anyhow::anyhow!("failed to initialize tracing subscriber: {e}"))
}

async fn generate_lessons(args: GenerateArgs) -> anyhow::Result<()> {
    let config = GenerationConfig::new(&args.topic)
        .with_level(args.level)
        .with_audience(&args.audience)
        .with_num_lessons(args.num_lessons)
        .with_duration(args.estimated_duration)
        .with_goals(&args.goals);

    let settings = LessonSettings::load().context("failed to load lesson settings")?;

    let (research, synthesizer, search): (
        Arc<dyn ResearchCapability>,
        Arc<dyn LessonSynthesizer>,
        Arc<dyn SearchProvider>,
    ) = if args.mock_run {
        let bundle = offline::mock_bundle(
            &config.topic,
            config.level,
            &config.audience,
            config.lesson_count(),
            config.estimated_duration_minutes,
        )
        .context("failed to build mock lesson bundle")?;
        (
            Arc::new(StaticResearch::mock(&config.topic)),
            Arc::new(StaticSynthesizer::new(bundle)),
            Arc::new(StaticSearch::empty()),
        )
    } else {
        let search = ValyuSearchClient::from_env(&settings.search)
            .context("failed to create search client")?;
        (
            Arc::new(ResearcherSkill::new(
                settings.llm.clone(),
                settings.research.clone(),
            )),
            Arc::new(SynthesisSkill::new(settings.llm.clone())),
            Arc::new(search),
        )
    };

    let mut coordinator = LessonCoordinator::new(research, synthesizer, search)
        .with_max_steps(settings.research.max_steps);
    let files = coordinator
        .generate_lessons_to_disk(&config, &args.output_dir)
        .await
        .with_context(|| format!("failed to generate lessons for '{}'", config.topic))?;

    println!(
        "Generated {} lessons in {}",
        files.len(),
        args.output_dir.display()
    );
    for info in &files {
        println!("- Lesson {}: {}", info.lesson_index, info.path.display());
    }
    Ok(())
}
