//! Score command - run every scorer and write the report files

use clap::Parser;
use std::path::PathBuf;

use super::super::output::{color, score_colored};
use super::super::utils::{format_error, load_config, seeded_rng};
use crate::eval::loader::load_filelist;
use crate::eval::{
    load_reference, load_submission, resolve_threshold, score_tables, DiscountMethod, NilMapping,
    ReferenceOptions, ReportWriter, ScoreOptions, ScoreReport, SubmissionOptions,
};
use crate::gravity::GravityKind;

/// Score a system submission against a reference directory
#[derive(Parser, Debug)]
pub struct ScoreArgs {
    /// System situation frame JSON file
    #[arg(short = 's', long, value_name = "FILE")]
    pub system_output: PathBuf,

    /// Reference root (holds `needs/`, `issues/`, `sentiments/`, optional `speech/`)
    #[arg(short = 'g', long, value_name = "DIR")]
    pub ground_truth: PathBuf,

    /// Directory for report files (created if missing)
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_directory: PathBuf,

    /// System name written into report headers
    #[arg(short = 'm', long, value_name = "NAME")]
    pub system_name: String,

    /// System entity-linking output (.tab), for NIL mapping in SEC
    #[arg(short = 'e', long, value_name = "FILE", requires = "edl_ref")]
    pub edl_subm: Option<PathBuf>,

    /// Reference entity-linking table (.tab), for NIL mapping in SEC
    #[arg(short = 'r', long, value_name = "FILE", requires = "edl_subm")]
    pub edl_ref: Option<PathBuf>,

    /// Restrict scoring to the documents listed in this file
    #[arg(short = 'l', long, value_name = "FILE")]
    pub filelist: Option<PathBuf>,

    /// Prefix for every report file name
    #[arg(short = 'p', long, default_value = "", value_name = "PREFIX")]
    pub filename_prefix: String,

    /// Confidence threshold the run was produced at (default: parsed from the file name, else 0)
    #[arg(short = 't', long, value_name = "FLOAT")]
    pub system_threshold: Option<f64>,

    /// Gravity function for urgency ranking
    #[arg(long, value_enum, default_value_t = GravityKind::Numeric)]
    pub gravity: GravityKind,

    /// DCG discount
    #[arg(long, value_enum, default_value_t = DiscountMethod::Method0)]
    pub ndcg_method: DiscountMethod,

    /// Skip sentiment/emotion concordance
    #[arg(long)]
    pub skip_sec: bool,

    /// Also write the Type+Place precision/recall curve
    #[arg(long)]
    pub pr_curves: bool,

    /// Drop frames with unlinked (NIL) places before scoring
    #[arg(long)]
    pub exclude_nil: bool,

    /// Seed for annotator selection (default: the config's `[Run] seed`)
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Scoring configuration TOML (default: bundled)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

pub fn run(args: ScoreArgs) -> Result<(), String> {
    let config = load_config(args.config.as_deref())?;
    let mut rng = seeded_rng(args.seed, &config);

    let filelist = match &args.filelist {
        Some(path) => Some(
            load_filelist(path).map_err(|e| format_error("read document list", &e.to_string()))?,
        ),
        None => None,
    };

    let reference = load_reference(
        &args.ground_truth,
        &ReferenceOptions {
            gravity: args.gravity,
            filelist: filelist.clone(),
        },
        &mut rng,
    )
    .map_err(|e| format_error("load reference", &e.to_string()))?;
    log::info!(
        "loaded {} reference frames, {} sentiment annotations",
        reference.frames.len(),
        reference.sentiments.len()
    );

    let system = load_submission(
        &args.system_output,
        &SubmissionOptions {
            gravity: args.gravity,
            filelist,
        },
    )
    .map_err(|e| format_error("load submission", &e.to_string()))?;
    log::info!("loaded {} system frames", system.len());

    let threshold = resolve_threshold(args.system_threshold, &args.system_output);

    let mapping = match (&args.edl_subm, &args.edl_ref) {
        (Some(sub), Some(reference)) => NilMapping::from_edl(sub, reference)
            .map_err(|e| format_error("build NIL mapping", &e.to_string()))?,
        _ => NilMapping::identity(),
    };

    let options = ScoreOptions {
        system_name: args.system_name.clone(),
        method: args.ndcg_method,
        threshold,
        skip_sec: args.skip_sec,
        pr_curves: args.pr_curves,
        exclude_nil: args.exclude_nil,
    };
    let report = score_tables(&reference, system, &config, &mapping, &options);

    let writer = ReportWriter::create(&args.output_directory, &args.filename_prefix)
        .map_err(|e| format_error("prepare output directory", &e.to_string()))?;
    let written = writer
        .write_all(&report)
        .map_err(|e| format_error("write reports", &e.to_string()))?;

    print_summary(&report);
    log::info!(
        "wrote {} files in {}",
        written.len(),
        args.output_directory.display()
    );
    Ok(())
}

fn print_summary(report: &ScoreReport) {
    println!("{}", color("1", &format!("System: {}", report.system_name)));
    for (class, m) in &report.diagnostic.classes {
        println!(
            "  {:<42} MAP {}  MAR {}",
            class.label(),
            score_colored(m.map),
            score_colored(m.mar)
        );
    }
    println!(
        "  {:<42} MAP {}  MAR {}",
        "GRAVE",
        score_colored(report.diagnostic.grave.map),
        score_colored(report.diagnostic.grave.mar)
    );
    for curve in &report.ndcg {
        let last = curve.values.last().copied().unwrap_or(f64::NAN);
        println!(
            "  {:<42} {}",
            format!("nDCG@{} ({})", curve.values.len(), curve.tie_break.as_str()),
            score_colored(last)
        );
    }
    println!(
        "  {:<42} {}",
        "Type F1",
        score_colored(report.type_f1.f1)
    );
    println!(
        "  {:<42} {}",
        "Type+Place F1",
        score_colored(report.type_place_f1.f1)
    );
}
