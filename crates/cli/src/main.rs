use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use collab::{ModelHandle, TrainingConfig, save_model, train};
use colored::Colorize;
use data_loader::{Interaction, InteractionIndex, InteractionStore};
use pipeline::{Embedder, HashingEmbedder};
use rand::seq::IndexedRandom;
use server::{OrchestratorConfig, RecommendationOrchestrator};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::info;

/// repo-recs - Open-source repository recommender
#[derive(Parser)]
#[command(name = "repo-recs")]
#[command(about = "Repository recommendations from swipes, reranked by description", long_about = None)]
struct Cli {
    /// Directory holding users.dat, repos.dat and interactions.dat
    #[arg(short, long, env = "REPO_RECS_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Path of the CF model artifact
    #[arg(short, long, env = "REPO_RECS_MODEL", default_value = "models/cf.json")]
    model: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the CF model on all interactions and save it
    Train {
        #[arg(long, default_value = "32")]
        factors: usize,

        #[arg(long, default_value = "20")]
        epochs: usize,

        #[arg(long, default_value = "0.05")]
        learning_rate: f32,

        #[arg(long, default_value = "0.01")]
        regularization: f32,

        #[arg(long, default_value = "2")]
        threads: usize,

        #[arg(long, default_value = "42")]
        seed: u64,

        /// Weight of a saved repo
        #[arg(long, default_value = "1.0")]
        positive_weight: f32,

        /// Weight of a rejected repo
        #[arg(long, default_value = "-1.0", allow_negative_numbers = true)]
        negative_weight: f32,

        /// Share of negatives drawn from the user's own rejections
        #[arg(long, default_value = "0.5")]
        hard_negative_rate: f64,
    },

    /// Get repository recommendations for a user
    Recommend {
        #[arg(long)]
        user_id: String,

        /// Number of recommendations to return
        #[arg(long, default_value = "5")]
        limit: usize,

        /// Show description and CF score for each recommendation
        #[arg(long)]
        explain: bool,

        /// Remote embedding service; the in-process hashing embedder is used when unset
        #[arg(long, env = "REPO_RECS_EMBEDDER_ADDR")]
        embedder_addr: Option<String>,

        /// Serve pure CF order
        #[arg(long)]
        no_rerank: bool,

        /// CF candidates handed to the reranker
        #[arg(long, default_value = "10")]
        pool_size: usize,
    },

    /// Show a user's profile and swipe history
    User {
        #[arg(long)]
        user_id: String,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,

        #[arg(long, default_value = "5")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    println!("Loading dataset from {}...", cli.data_dir.display());
    let start = Instant::now();
    let index = Arc::new(
        InteractionIndex::load_from_files(&cli.data_dir).context("Failed to load dataset")?,
    );
    let (users, repos, interactions) = index.counts();
    println!(
        "{} Loaded {} users, {} repos, {} interactions in {:?}",
        "✓".green(),
        users,
        repos,
        interactions,
        start.elapsed()
    );

    match cli.command {
        Commands::Train {
            factors,
            epochs,
            learning_rate,
            regularization,
            threads,
            seed,
            positive_weight,
            negative_weight,
            hard_negative_rate,
        } => {
            let config = TrainingConfig::default()
                .with_factors(factors)
                .with_epochs(epochs)
                .with_learning_rate(learning_rate)
                .with_regularization(regularization)
                .with_threads(threads)
                .with_seed(seed)
                .with_weights(positive_weight, negative_weight)
                .with_hard_negative_rate(hard_negative_rate);
            handle_train(&index, &config, &cli.model)?
        }
        Commands::Recommend {
            user_id,
            limit,
            explain,
            embedder_addr,
            no_rerank,
            pool_size,
        } => {
            let config = OrchestratorConfig::default()
                .with_rerank_enabled(!no_rerank)
                .with_rerank_pool_size(pool_size);
            let orchestrator =
                build_orchestrator(index.clone(), &cli.model, embedder_addr, config).await?;
            handle_recommend(&orchestrator, &index, &user_id, limit, explain).await?
        }
        Commands::User { user_id } => handle_user(&index, &user_id)?,
        Commands::Benchmark {
            requests,
            concurrent,
            limit,
        } => {
            let orchestrator = build_orchestrator(
                index.clone(),
                &cli.model,
                None,
                OrchestratorConfig::default(),
            )
            .await?;
            handle_benchmark(orchestrator, &index, requests, concurrent, limit).await?
        }
    }

    Ok(())
}

async fn build_orchestrator(
    index: Arc<InteractionIndex>,
    model_path: &Path,
    embedder_addr: Option<String>,
    config: OrchestratorConfig,
) -> Result<RecommendationOrchestrator> {
    let model = Arc::new(
        ModelHandle::load(model_path)
            .with_context(|| format!("Failed to load model from {}", model_path.display()))?,
    );
    let store: Arc<dyn InteractionStore> = index;

    match embedder_addr {
        Some(addr) => RecommendationOrchestrator::with_remote_embedder(model, store, addr, config).await,
        None => {
            let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new());
            Ok(RecommendationOrchestrator::new(model, store, Some(embedder), config))
        }
    }
}

/// Handle the 'train' command
fn handle_train(index: &InteractionIndex, config: &TrainingConfig, model_path: &Path) -> Result<()> {
    info!(
        factors = config.factors,
        epochs = config.epochs,
        threads = config.threads,
        seed = config.seed,
        "Training CF model"
    );
    let start = Instant::now();
    let model = train(index.interactions(), config).context("Training failed")?;
    println!(
        "{} Trained {} users x {} repos ({} factors) in {:?}",
        "✓".green(),
        model.num_users(),
        model.num_items(),
        model.factors(),
        start.elapsed()
    );

    save_model(&model, model_path)
        .with_context(|| format!("Failed to save model to {}", model_path.display()))?;
    println!("{} Saved model to {}", "✓".green(), model_path.display());
    Ok(())
}

/// Handle the 'recommend' command
async fn handle_recommend(
    orchestrator: &RecommendationOrchestrator,
    index: &InteractionIndex,
    user_id: &str,
    limit: usize,
    explain: bool,
) -> Result<()> {
    info!(user_id, limit, "Requesting recommendations");
    let start = Instant::now();
    let recommendations = orchestrator.recommend(user_id, limit).await?;
    let elapsed = start.elapsed();

    if recommendations.is_empty() {
        println!("{}", format!("No recommendations for {user_id}").yellow());
        return Ok(());
    }

    println!("{}", format!("Recommendations for {user_id}:").bold().blue());
    let model = orchestrator.model_handle().current();
    for (rank, repo_id) in recommendations.iter().enumerate() {
        let name = index
            .get_repo(repo_id)
            .map_or(repo_id.as_str(), |repo| repo.name.as_str());
        println!("{}. {} ({})", (rank + 1).to_string().green(), name.bold(), repo_id);

        if explain {
            if let Some(repo) = index.get_repo(repo_id) {
                println!("   {}", repo.description.dimmed());
            }
            if let Some(score) = model.score_pair(user_id, repo_id) {
                println!("   CF score: {score:.4}");
            }
        }
    }
    println!("Served in {elapsed:?}");
    Ok(())
}

/// Handle the 'user' command
fn handle_user(index: &InteractionIndex, user_id: &str) -> Result<()> {
    let user = index
        .get_user(user_id)
        .ok_or_else(|| anyhow!("User {} not found", user_id))?;

    println!("{}", format!("User: {} ({})", user.username, user.id).bold().blue());
    println!("{}Languages: {}", "• ".green(), user.languages.join(", "));
    println!("{}Skills: {}", "• ".green(), user.skills.join(", "));
    println!("{}Interests: {}", "• ".green(), user.preference_tags.join(", "));

    let (saved, rejected) = split_by_signal(index.get_user_interactions(user_id));

    println!("{}Saved ({}):", "• ".cyan(), saved.len());
    for interaction in saved {
        println!("  + {}", repo_label(index, &interaction.repo_id));
    }

    println!("{}Rejected ({}):", "• ".cyan(), rejected.len());
    for interaction in rejected {
        match interaction.feedback_reason.as_deref().map(str::trim) {
            Some(reason) if !reason.is_empty() => println!(
                "  - {} {}",
                repo_label(index, &interaction.repo_id),
                format!("\"{reason}\"").dimmed()
            ),
            _ => println!("  - {}", repo_label(index, &interaction.repo_id)),
        }
    }
    Ok(())
}

/// (saved, rejected), each in swipe order
fn split_by_signal(interactions: Vec<&Interaction>) -> (Vec<&Interaction>, Vec<&Interaction>) {
    interactions
        .into_iter()
        .partition::<Vec<&Interaction>, _>(|interaction| interaction.signal.is_positive())
}

fn repo_label(index: &InteractionIndex, repo_id: &str) -> String {
    index
        .get_repo(repo_id)
        .map_or_else(|| repo_id.to_string(), |repo| repo.name.clone())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    orchestrator: RecommendationOrchestrator,
    index: &InteractionIndex,
    requests: usize,
    concurrent: usize,
    limit: usize,
) -> Result<()> {
    if requests == 0 {
        bail!("--requests must be at least 1");
    }
    let known_users = index.user_ids();
    if known_users.is_empty() {
        bail!("Dataset has no users to benchmark with");
    }

    let mut rng = rand::rng();
    let user_ids: Vec<String> = (0..requests)
        .filter_map(|_| known_users.choose(&mut rng).cloned())
        .collect();

    info!(requests, concurrent, limit, "Starting benchmark");
    let semaphore = Arc::new(Semaphore::new(concurrent.max(1)));
    let wall_clock = Instant::now();
    let mut handles = Vec::with_capacity(user_ids.len());
    for user_id in user_ids {
        let orchestrator = orchestrator.clone();
        let semaphore = semaphore.clone();
        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            let start = Instant::now();
            orchestrator.recommend(&user_id, limit).await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        }));
    }

    let mut timings = Vec::with_capacity(handles.len());
    for handle in handles {
        timings.push(handle.await??);
    }
    let total_time = wall_clock.elapsed();

    timings.sort();
    let average = timings.iter().sum::<Duration>() / timings.len() as u32;
    let throughput = timings.len() as f64 / total_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} ({} concurrent)", timings.len(), concurrent.max(1));
    println!("Total time: {total_time:?}");
    println!("Average latency: {average:?}");
    println!("P50 latency: {:?}", percentile(&timings, 0.50));
    println!("P95 latency: {:?}", percentile(&timings, 0.95));
    println!("P99 latency: {:?}", percentile(&timings, 0.99));
    println!("Throughput: {throughput:.2} requests/second");
    Ok(())
}

/// Nearest-rank percentile of sorted, non-empty timings
fn percentile(sorted: &[Duration], q: f64) -> Duration {
    let rank = ((sorted.len() as f64 * q).ceil() as usize).clamp(1, sorted.len());
    sorted[rank - 1]
}
