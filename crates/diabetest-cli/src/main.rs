use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use diabetest_core::model::Model;
use diabetest_core::{Classifier, PatientRecord, Predictor, Variant, FEATURE_NAMES};

const BANNER: &str = r#"
     _ _       _          _            _
  __| (_) __ _| |__   ___| |_ ___  ___| |_
 / _` | |/ _` | '_ \ / _ \ __/ _ \/ __| __|
| (_| | | (_| | |_) |  __/ ||  __/\__ \ |_
 \__,_|_|\__,_|_.__/ \___|\__\___||___/\__|"#;

#[derive(Parser)]
#[command(
    name = "diabetest",
    about = "Diabetes-risk inference service",
    long_about = "Loads a pre-trained classifier and feature scaler, and classifies\nten clinical measurements into a diabetes risk tier.",
    version,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Artifact selection shared by every subcommand.
#[derive(clap::Args)]
struct ArtifactArgs {
    /// Service variant: forest (tiered buckets) or logistic (binary cut)
    #[arg(long, env = "DIABETEST_VARIANT", default_value = "forest")]
    variant: Variant,
    /// Model artifact; defaults to the variant's file under models/
    #[arg(long, env = "DIABETEST_MODEL")]
    model: Option<PathBuf>,
    /// Scaler artifact
    #[arg(long, env = "DIABETEST_SCALER", default_value = "models/scaler.json")]
    scaler: PathBuf,
}

impl ArtifactArgs {
    fn model_path(&self) -> PathBuf {
        self.model
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.variant.default_model_path()))
    }

    fn load(&self) -> anyhow::Result<Predictor> {
        let model_path = self.model_path();
        let predictor = Predictor::load(&model_path, &self.scaler, self.variant.policy())
            .with_context(|| {
                format!(
                    "loading {} variant from {} and {}",
                    self.variant,
                    model_path.display(),
                    self.scaler.display()
                )
            })?;
        tracing::info!(
            "Loaded {} model ({} features) from {}",
            predictor.model().kind(),
            predictor.model().n_features(),
            model_path.display()
        );
        Ok(predictor)
    }
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Start the inference server
    Serve {
        /// Address to bind to
        #[arg(long, env = "DIABETEST_ADDR", default_value = "0.0.0.0:8000")]
        addr: String,
        #[command(flatten)]
        artifacts: ArtifactArgs,
    },
    /// Assess one patient record given as JSON
    Predict {
        /// JSON file with the ten measurements, or - for stdin
        #[arg(long, default_value = "-")]
        input: String,
        #[command(flatten)]
        artifacts: ArtifactArgs,
    },
    /// Show what the loaded artifacts contain
    Info {
        #[command(flatten)]
        artifacts: ArtifactArgs,
    },
    /// Time single-record predictions
    Bench {
        /// Number of predictions to time
        #[arg(long, default_value = "10000")]
        iters: usize,
        #[command(flatten)]
        artifacts: ArtifactArgs,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { addr, artifacts } => cmd_serve(&addr, &artifacts),
        Commands::Predict { input, artifacts } => cmd_predict(&input, &artifacts),
        Commands::Info { artifacts } => cmd_info(&artifacts),
        Commands::Bench { iters, artifacts } => cmd_bench(iters, &artifacts),
    }
}

fn cmd_serve(addr: &str, artifacts: &ArtifactArgs) -> anyhow::Result<()> {
    let predictor = artifacts.load()?;
    let model_path = artifacts.model_path();
    let model_name = model_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| model_path.display().to_string());

    println!("{}", BANNER);
    println!("  v{}  —  Inference Server\n", env!("CARGO_PKG_VERSION"));
    println!("  Listening on {}", addr);
    println!("  Variant: {} ({} model, {:?} buckets)", artifacts.variant, predictor.model().kind(), predictor.policy());
    println!("  Model:   {}", model_path.display());
    println!("  Scaler:  {}\n", artifacts.scaler.display());
    println!("  Endpoints:");
    println!("    POST /predict");
    println!("    GET  /health\n");

    let state = diabetest_serve::AppState::new(predictor, model_name, artifacts.variant);

    let rt = tokio::runtime::Runtime::new().context("creating tokio runtime")?;
    rt.block_on(diabetest_serve::serve_with_state(addr, state))
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).context("reading stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(Path::new(input)).with_context(|| format!("reading {}", input))
    }
}

fn cmd_predict(input: &str, artifacts: &ArtifactArgs) -> anyhow::Result<()> {
    let predictor = artifacts.load()?;
    let body: serde_json::Value = serde_json::from_str(&read_input(input)?).context("parsing input JSON")?;
    let record = PatientRecord::from_json(&body)?;
    let assessment = predictor.predict(&record)?;
    println!("{}", serde_json::to_string_pretty(&assessment)?);
    Ok(())
}

fn cmd_info(artifacts: &ArtifactArgs) -> anyhow::Result<()> {
    let predictor = artifacts.load()?;
    let model = predictor.model();

    println!("Model ({})", artifacts.model_path().display());
    println!("  Kind:     {}", model.kind());
    println!("  Features: {}", model.n_features());
    println!("  Classes:  {}", model.n_classes());
    match model {
        Model::RandomForest(forest) => {
            let nodes: usize = forest.trees.iter().map(|t| t.node_count()).sum();
            let depth = forest.trees.iter().map(|t| t.depth()).max().unwrap_or(0);
            println!("  Trees:    {}", forest.trees.len());
            println!("  Nodes:    {}", nodes);
            println!("  Depth:    {}", depth);
        }
        Model::LogisticRegression(lr) => {
            println!("  Intercept: {:.4}", lr.intercept);
        }
    }

    println!("\nScaler ({})", artifacts.scaler.display());
    let scaler = predictor.scaler();
    println!("  {:<14} {:>12} {:>12}", "Feature", "Mean", "Scale");
    println!("  {}", "-".repeat(40));
    for (i, name) in FEATURE_NAMES.iter().enumerate() {
        println!("  {:<14} {:>12.4} {:>12.4}", name, scaler.mean[i], scaler.scale[i]);
    }

    if let Model::LogisticRegression(lr) = model {
        println!("\nCoefficients");
        for (name, c) in FEATURE_NAMES.iter().zip(&lr.coef) {
            println!("  {:<14} {:>12.4}", name, c);
        }
    }
    Ok(())
}

fn cmd_bench(iters: usize, artifacts: &ArtifactArgs) -> anyhow::Result<()> {
    let predictor = artifacts.load()?;
    let iters = iters.max(1);

    // Vary glucose and BMI across typical clinical ranges.
    let records: Vec<PatientRecord> = (0..64)
        .map(|i| {
            PatientRecord::from_vector([
                (i % 8) as f64,
                70.0 + 2.5 * i as f64,
                72.0,
                25.0,
                80.0,
                27.0 + 0.2 * i as f64,
                0.45,
                25.0 + (i % 40) as f64,
                7.0,
                180.0 + i as f64,
            ])
        })
        .collect();

    println!("=== diabetest Prediction Benchmark ===");
    println!("Variant: {} ({})\n", artifacts.variant, predictor.model().kind());

    let mut tiers = std::collections::BTreeMap::new();
    for r in &records {
        *tiers.entry(predictor.predict(r)?.risk_level.as_str()).or_insert(0usize) += 1;
    }

    let per_call = time_it(iters, |i| {
        predictor.predict(&records[i % records.len()]).map(std::hint::black_box)
    })?;

    println!("{:<14} {:>12}", "Iterations", iters);
    println!("{:<14} {:>10.3}us", "Per predict", per_call * 1e6);
    println!("{:<14} {:>12.0}", "Predict/s", 1.0 / per_call);
    println!("\nTier spread over {} sample records", records.len());
    for (tier, n) in tiers {
        println!("  {:<12} {}", tier, n);
    }
    Ok(())
}

/// Mean seconds per call. Stops at the first failing call.
fn time_it<T, E>(iters: usize, mut f: impl FnMut(usize) -> Result<T, E>) -> Result<f64, E> {
    let start = Instant::now();
    for i in 0..iters {
        f(i)?;
    }
    Ok(start.elapsed().as_secs_f64() / iters.max(1) as f64)
}
