use std::{borrow::Cow, io::Write, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use textvec::{
    CountVectorizer, HashingParams, HashingVectorizer, Norm, TfidfParams, TfidfVectorizer,
    VectorizerParams, DEFAULT_N_FEATURES,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::{
    input::{self, InputArgs},
    model::{FittedModel, ModelKind},
    output::{self, VectorRows},
};

/// Batches larger than this get a progress bar
const PROGRESS_THRESHOLD: usize = 100;

/// Documents transformed per step while a progress bar is shown
const CHUNK_SIZE: usize = 64;

#[derive(Parser)]
#[command(name = "textvec")]
#[command(about = "Turn text into sparse count, tf-idf or hashed vectors", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Quiet mode (errors only, no progress)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fit a count or tf-idf model on a corpus and save it
    Fit(FitArgs),
    /// Vectorize text with a saved model
    Transform(TransformArgs),
    /// Vectorize text with the stateless hashing vectorizer
    Hash(HashArgs),
    /// Print a saved model's vocabulary
    Vocab(VocabArgs),
}

#[derive(Args)]
pub struct FitArgs {
    /// Model type to fit
    #[arg(long, value_enum, default_value = "tfidf")]
    pub kind: ModelKind,

    /// Corpus file, one document per line
    #[arg(short, long, value_name = "PATH")]
    pub corpus: PathBuf,

    /// Read the corpus as a JSON array of strings
    #[arg(long)]
    pub json: bool,

    /// Where to write the fitted model
    #[arg(long, value_name = "PATH")]
    pub output: PathBuf,

    /// JSON file with `vectorizer` and `tfidf` parameter objects
    #[arg(long, value_name = "PATH")]
    pub params: Option<PathBuf>,

    /// Inclusive word n-gram range (comma-separated: min,max)
    #[arg(long, value_name = "MIN,MAX", value_parser = parse_ngram_range)]
    pub ngram: Option<(usize, usize)>,

    /// Minimum document frequency (proportion below 1.0, absolute count otherwise)
    #[arg(long)]
    pub min_df: Option<f64>,

    /// Maximum document frequency (proportion up to 1.0, absolute count above)
    #[arg(long)]
    pub max_df: Option<f64>,

    /// Keep only the most frequent terms
    #[arg(long)]
    pub max_features: Option<usize>,

    /// Count presence instead of occurrences
    #[arg(long)]
    pub binary: bool,

    /// Use 1 + ln(tf) instead of tf (tf-idf only)
    #[arg(long)]
    pub sublinear_tf: bool,

    /// Row normalization (tf-idf only)
    #[arg(long, value_enum)]
    pub norm: Option<NormArg>,
}

#[derive(Args)]
pub struct TransformArgs {
    /// Model file written by `fit`
    #[arg(short, long, value_name = "PATH")]
    pub model: PathBuf,

    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Args)]
pub struct HashArgs {
    /// Output width
    #[arg(short, long, default_value_t = DEFAULT_N_FEATURES)]
    pub width: usize,

    /// Always add +1 instead of a hash-derived sign
    #[arg(long)]
    pub no_alternate_sign: bool,

    /// Row normalization
    #[arg(long, value_enum)]
    pub norm: Option<NormArg>,

    /// Inclusive word n-gram range (comma-separated: min,max)
    #[arg(long, value_name = "MIN,MAX", value_parser = parse_ngram_range)]
    pub ngram: Option<(usize, usize)>,

    /// Hash seed
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Args)]
pub struct VocabArgs {
    /// Model file written by `fit`
    #[arg(short, long, value_name = "PATH")]
    pub model: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum NormArg {
    L1,
    L2,
    None,
}

impl From<NormArg> for Norm {
    fn from(norm: NormArg) -> Self {
        match norm {
            NormArg::L1 => Self::L1,
            NormArg::L2 => Self::L2,
            NormArg::None => Self::None,
        }
    }
}

#[derive(Clone, Copy)]
enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Cli {
    fn verbosity(&self) -> Verbosity {
        match (self.quiet, self.verbose) {
            (true, _) => Verbosity::Quiet,
            (_, true) => Verbosity::Verbose,
            _ => Verbosity::Normal,
        }
    }
}

/// Parameter file layout for `fit --params`.
#[derive(Deserialize, Default)]
#[serde(default)]
struct ParamsFile {
    vectorizer: VectorizerParams,
    tfidf: TfidfParams,
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the flag-derived level.
pub fn init_logging(cli: &Cli) {
    let default_level = match cli.verbosity() {
        Verbosity::Quiet => "error",
        Verbosity::Normal => "warn",
        Verbosity::Verbose => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .init();
}

pub fn run(cli: &Cli) -> Result<()> {
    let verbosity = cli.verbosity();
    match &cli.command {
        Command::Fit(args) => fit(args, verbosity),
        Command::Transform(args) => transform(args, verbosity),
        Command::Hash(args) => hash(args, verbosity),
        Command::Vocab(args) => vocab(args),
    }
}

/// Parse `MIN,MAX` into an inclusive n-gram range.
fn parse_ngram_range(value: &str) -> std::result::Result<(usize, usize), String> {
    let (min_n, max_n) = value
        .split_once(',')
        .ok_or_else(|| format!("expected MIN,MAX, got {value:?}"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<usize>()
            .map_err(|e| format!("invalid n-gram size {part:?}: {e}"))
    };
    Ok((parse(min_n)?, parse(max_n)?))
}

fn fit_params(args: &FitArgs) -> Result<(VectorizerParams, TfidfParams)> {
    let ParamsFile {
        vectorizer: mut params,
        mut tfidf,
    } = match &args.params {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read params file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse params file: {}", path.display()))?
        }
        None => ParamsFile::default(),
    };

    if args.kind == ModelKind::Count && (args.norm.is_some() || args.sublinear_tf) {
        bail!("--norm and --sublinear-tf only apply to --kind tfidf");
    }

    if let Some((min_n, max_n)) = args.ngram {
        params = params.with_ngram_range(min_n..=max_n);
    }
    if let Some(min_df) = args.min_df {
        params = params.with_min_df(min_df);
    }
    if let Some(max_df) = args.max_df {
        params = params.with_max_df(max_df);
    }
    if args.max_features.is_some() {
        params = params.with_max_features(args.max_features);
    }
    if args.binary {
        params = params.with_binary(true);
    }
    if args.sublinear_tf {
        params = params.with_sublinear_tf(true);
    }
    if let Some(norm) = args.norm {
        tfidf.norm = norm.into();
    }
    Ok((params, tfidf))
}

fn fit(args: &FitArgs, verbosity: Verbosity) -> Result<()> {
    let corpus = if args.json {
        input::read_json_array(&args.corpus)?
    } else {
        input::read_lines(&args.corpus)?
    };
    let (params, tfidf) = fit_params(args)?;
    debug!(num_documents = corpus.len(), kind = ?args.kind, "Fitting model");

    let model = match args.kind {
        ModelKind::Count => {
            let mut vectorizer = CountVectorizer::new(params)?;
            vectorizer.fit(&corpus)?;
            FittedModel::Count(vectorizer)
        }
        ModelKind::Tfidf => {
            let mut vectorizer = TfidfVectorizer::new(params, tfidf)?;
            vectorizer.fit(&corpus)?;
            FittedModel::Tfidf(vectorizer)
        }
    };
    model.save(&args.output)?;

    let num_features = model.num_features().unwrap_or_default();
    info!(num_features, path = %args.output.display(), "Model saved");
    if !matches!(verbosity, Verbosity::Quiet) {
        eprintln!(
            "Fitted {:?} model on {} documents: {} features -> {}",
            model.kind(),
            corpus.len(),
            num_features,
            args.output.display()
        );
    }
    Ok(())
}

fn progress_bar_setup(len: usize, message: impl Into<Cow<'static, str>>) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    let style = ProgressStyle::default_bar()
        .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        .map_or_else(|_| ProgressStyle::default_bar(), |s| s.progress_chars("#>-"));
    pb.set_style(style);
    pb.set_message(message);
    pb
}

/// Run `transform_chunk` over the documents, chunked behind a progress bar for large batches.
fn vectorize_batch<F>(
    texts: &[String],
    cols: usize,
    verbosity: Verbosity,
    format: output::OutputFormat,
    transform_chunk: F,
) -> Result<VectorRows>
where
    F: Fn(&[String]) -> textvec::Result<textvec::CsMat<f64>>,
{
    let show_progress = !matches!(verbosity, Verbosity::Quiet)
        && texts.len() > PROGRESS_THRESHOLD
        && !matches!(format, output::OutputFormat::Json);

    let mut rows = VectorRows::new(cols);
    if !show_progress {
        rows.extend_from(&transform_chunk(texts)?);
        return Ok(rows);
    }

    let pb = progress_bar_setup(texts.len(), "Vectorizing");
    for chunk in texts.chunks(CHUNK_SIZE) {
        rows.extend_from(&transform_chunk(chunk)?);
        pb.inc(chunk.len() as u64);
    }
    pb.finish_with_message("Vectorizing complete");
    Ok(rows)
}

fn emit(rows: &VectorRows, format: output::OutputFormat) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    output::write_rows(&mut out, rows, format)?;
    out.flush()?;
    Ok(())
}

fn transform(args: &TransformArgs, verbosity: Verbosity) -> Result<()> {
    let model = FittedModel::load(&args.model)?;
    let cols = model
        .num_features()
        .context("Model file holds an unfitted vectorizer")?;
    let texts = args.input.read_documents()?;
    let rows = vectorize_batch(&texts, cols, verbosity, args.input.format, |chunk| {
        model.transform(chunk)
    })?;
    emit(&rows, args.input.format)
}

fn hash(args: &HashArgs, verbosity: Verbosity) -> Result<()> {
    let mut params = HashingParams {
        alternate_sign: !args.no_alternate_sign,
        seed: args.seed,
        ..HashingParams::with_n_features(args.width)
    };
    if let Some(norm) = args.norm {
        params.norm = norm.into();
    }
    if let Some(range) = args.ngram {
        params.ngram_range = range;
    }
    let vectorizer = HashingVectorizer::new(params)?;

    let texts = args.input.read_documents()?;
    let rows = vectorize_batch(
        &texts,
        vectorizer.num_features(),
        verbosity,
        args.input.format,
        |chunk| vectorizer.transform(chunk),
    )?;
    emit(&rows, args.input.format)
}

fn vocab(args: &VocabArgs) -> Result<()> {
    let model = FittedModel::load(&args.model)?;
    let vocabulary = model.vocabulary()?;
    let idf = model.idf();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for (idx, term) in vocabulary.iter() {
        match idf.and_then(|table| table.get(idx)) {
            Some(weight) => writeln!(out, "{idx}\t{term}\t{weight:.6}")?,
            None => writeln!(out, "{idx}\t{term}")?,
        }
    }
    out.flush()?;
    Ok(())
}
