use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_subscriber::EnvFilter;

mod analysis;
mod compare;
mod dataset;
mod db;
mod error;
mod models;
mod recommend;
mod report;
mod segments;

use dataset::Dataset;

#[derive(Parser)]
#[command(name = "campus-insights")]
#[command(about = "Competitor comparison and student segmentation insights for college marketing", long_about = None)]
struct Cli {
    /// Institution table to use instead of the embedded one
    #[arg(long, global = true, env = "CAMPUS_DATASET")]
    dataset: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Markdown,
}

#[derive(Subcommand)]
enum Commands {
    /// List the home institution and its competitors
    Competitors,
    /// Build comparison chart data against a competitor
    Compare {
        #[arg(long)]
        competitor: String,
        #[arg(long)]
        home: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Print marketing recommendations against a competitor
    Recommend {
        #[arg(long)]
        competitor: String,
        #[arg(long)]
        home: Option<String>,
    },
    /// Summarize student segments from a CSV or a saved analysis payload
    #[command(group(
        ArgGroup::new("input")
            .args(["csv", "json"])
            .required(true)
            .multiple(false)
    ))]
    Segment {
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        json: Option<PathBuf>,
        #[arg(long, default_value_t = segments::TOP_SEGMENT_COUNT)]
        top: usize,
        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        competitor: String,
        #[arg(long)]
        home: Option<String>,
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Create or upgrade the database schema
    InitDb,
    /// Analyze a CSV and store it as the current segmentation snapshot
    SaveAnalysis {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Show the current stored segmentation snapshot
    ShowAnalysis {
        #[arg(long, default_value_t = segments::TOP_SEGMENT_COUNT)]
        top: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Competitors => {
            let dataset = load_dataset(&cli.dataset)?;
            println!("Home: {}", dataset.home());
            println!("Competitors ({}):", dataset.institutions().len() - 1);
            for name in dataset.competitors() {
                println!("- {name}");
            }
        }
        Commands::Compare {
            competitor,
            home,
            format,
        } => {
            let dataset = load_dataset(&cli.dataset)?;
            let (home, competitor) = resolve_pair(&dataset, home.as_deref(), &competitor)?;
            let left = dataset.entity(home)?;
            let right = dataset.entity(competitor)?;
            let charts = compare::shape_comparison(home, competitor, &left, &right);
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&charts.to_chart_json())?)
                }
                OutputFormat::Markdown => print!("{}", report::comparison_markdown(&charts)),
            }
        }
        Commands::Recommend { competitor, home } => {
            let dataset = load_dataset(&cli.dataset)?;
            let (home, competitor) = resolve_pair(&dataset, home.as_deref(), &competitor)?;
            let data = dataset.entity(home)?;
            let recs = recommend::recommend(home, competitor, &data);
            print!("{}", report::recommendations_markdown(&recs));
        }
        Commands::Segment {
            csv,
            json,
            top,
            format,
        } => {
            let analysis = match (csv, json) {
                (Some(path), _) => analysis::analyze_csv(&path)
                    .with_context(|| format!("failed to analyze {}", path.display()))?,
                (None, Some(path)) => {
                    let text = std::fs::read_to_string(&path)
                        .with_context(|| format!("failed to read {}", path.display()))?;
                    analysis::parse_analysis_json(&text)
                        .with_context(|| format!("failed to parse {}", path.display()))?
                }
                (None, None) => anyhow::bail!("either --csv or --json is required"),
            };
            match format {
                OutputFormat::Json => {
                    let summaries: Vec<segments::CategorySummary> = models::SegmentCategory::ALL
                        .into_iter()
                        .map(|category| {
                            segments::summarize(category, analysis.buckets(category), top)
                        })
                        .collect();
                    let payload = serde_json::json!({
                        "total_students": analysis.total_students,
                        "segments_created": analysis.segments_created,
                        "categories": summaries,
                        "insights": analysis.insights,
                    });
                    println!("{}", serde_json::to_string_pretty(&payload)?);
                }
                OutputFormat::Markdown => {
                    print!("{}", report::segmentation_markdown(&analysis, top))
                }
            }
        }
        Commands::Report {
            competitor,
            home,
            csv,
            out,
        } => {
            let dataset = load_dataset(&cli.dataset)?;
            let (home, competitor) = resolve_pair(&dataset, home.as_deref(), &competitor)?;
            let left = dataset.entity(home)?;
            let right = dataset.entity(competitor)?;
            let analysis = csv
                .as_deref()
                .map(analysis::analyze_csv)
                .transpose()
                .context("failed to analyze segmentation CSV")?;

            let charts = compare::shape_comparison(home, competitor, &left, &right);
            let recs = recommend::recommend(home, competitor, &left);
            let cards = segments::segment_cards(&left.segments);
            let output = report::build_report(&report::ReportInput {
                charts: &charts,
                recommendations: &recs,
                home_cards: &cards,
                analysis: analysis.as_ref(),
                top_n: segments::TOP_SEGMENT_COUNT,
                generated_on: Utc::now().date_naive(),
            });
            std::fs::write(&out, output)?;
            println!("Report written to {}.", out.display());
        }
        Commands::InitDb => {
            let pool = connect().await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::SaveAnalysis { csv } => {
            let analysis = analysis::analyze_csv(&csv)
                .with_context(|| format!("failed to analyze {}", csv.display()))?;
            let pool = connect().await?;
            let id = db::save_analysis(&pool, &csv.display().to_string(), &analysis).await?;
            println!(
                "Stored analysis {id} ({} students) from {}.",
                analysis.total_students,
                csv.display()
            );
        }
        Commands::ShowAnalysis { top } => {
            let pool = connect().await?;
            match db::fetch_current_analysis(&pool).await? {
                Some(stored) => {
                    println!(
                        "Analysis {} from {} (stored {})",
                        stored.id, stored.source, stored.created_at
                    );
                    println!();
                    print!("{}", report::segmentation_markdown(&stored.report, top));
                }
                None => println!("No analysis stored yet."),
            }
        }
    }

    Ok(())
}

fn load_dataset(path: &Option<PathBuf>) -> anyhow::Result<Dataset> {
    Dataset::load(path.as_deref()).context("failed to load institution dataset")
}

fn resolve_pair<'a>(
    dataset: &'a Dataset,
    home: Option<&str>,
    competitor: &str,
) -> anyhow::Result<(&'a str, &'a str)> {
    let home = match home {
        Some(name) => dataset.resolve(name)?,
        None => dataset.home(),
    };
    let competitor = dataset.resolve(competitor)?;
    Ok((home, competitor))
}

async fn connect() -> anyhow::Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a Postgres instance")?;

    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")
}
