// crates/lt_cli/src/main.rs
//
// Exit codes, typed error mapping, and the two run paths:
// validate-only (load + validate, nothing written) and the full run
// (load → pipeline → artifacts → self-verify → optional reports).

mod args;
mod telemetry;

mod exitcodes {
    pub const OK: i32 = 0;
    pub const VALIDATION: i32 = 2;
    pub const SELF_VERIFY: i32 = 3;
    pub const IO: i32 = 4;
    pub const ALLOCATION: i32 = 5;
}

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use chrono::{SecondsFormat, Utc};
use thiserror::Error;
use tracing::{error, info};

use args::{parse_and_validate as parse_cli, Args};
use lt_io::canonical_json::{write_atomic, write_canonical_file};
use lt_io::writer::write_csv;
use lt_pipeline::{
    engine_identifiers, load_inputs, normalize_rfc3339_utc, run_with_ctx, validate, verify_result_bytes, ApplicantRow, InputPaths,
    ParamOverrides, PipelineCtx, PipelineError, PipelineOutputs, ShowRow,
};

/// Central error type for CLI → exit-code mapping.
#[derive(Debug, Error)]
enum MainError {
    /// Bad flags, malformed inputs, duplicate ids, strict preference failures.
    #[error("validation: {0}")]
    Validation(String),
    /// Written artifacts do not re-derive to their recorded ids/digests.
    #[error("self-verify: {0}")]
    SelfVerify(String),
    /// Read/write failures.
    #[error("io: {0}")]
    Io(String),
    /// A grant was refused mid-allocation.
    #[error("allocation: {0}")]
    Allocation(String),
    /// Report model or renderer failures.
    #[error("render: {0}")]
    Render(String),
}

fn main() -> ExitCode {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("lt: error: {e}");
            return ExitCode::from(exitcodes::VALIDATION as u8);
        }
    };

    if let Err(e) = telemetry::init(&args.effective_log_level()) {
        eprintln!("lt: error: {e}");
        return ExitCode::from(exitcodes::VALIDATION as u8);
    }

    let outcome = if args.validate_only { validate_only(&args) } else { run_once(&args) };
    let rc = match outcome {
        Ok(()) => exitcodes::OK,
        Err(e) => {
            error!("{e}");
            eprintln!("lt: error: {e}");
            map_error(&e)
        }
    };
    ExitCode::from(rc as u8)
}

fn map_error(e: &MainError) -> i32 {
    use exitcodes::*;
    match e {
        MainError::Validation(_) => VALIDATION,
        MainError::SelfVerify(_) => SELF_VERIFY,
        MainError::Io(_) | MainError::Render(_) => IO,
        MainError::Allocation(_) => ALLOCATION,
    }
}

fn map_pipeline_err(e: PipelineError) -> MainError {
    match e {
        PipelineError::Validate(m) => MainError::Validation(m),
        PipelineError::Io(m) => MainError::Io(m),
        PipelineError::Build(m) => MainError::SelfVerify(m),
        PipelineError::Allocate(g) => MainError::Allocation(g.to_string()),
    }
}

fn map_io_err(e: lt_io::IoError) -> MainError {
    map_pipeline_err(PipelineError::from(e))
}

fn input_paths(args: &Args) -> (InputPaths, ParamOverrides) {
    let paths = InputPaths {
        params: args.params.clone(),
        applicants: args.applicants.clone(),
        shows: args.shows.clone(),
        vacancy: args.vacancy.clone(),
    };
    let overrides = ParamOverrides {
        seed: args.seed,
        max_orders: args.max_orders,
        enable_vacancy: args.enable_vacancy.then_some(true),
        strict_preferences: args.strict_preferences.then_some(true),
    };
    (paths, overrides)
}

/// Load + validate; nothing is written.
fn validate_only(args: &Args) -> Result<(), MainError> {
    let (paths, overrides) = input_paths(args);
    let inputs = load_inputs(&paths, &overrides).map_err(map_pipeline_err)?;
    let report = validate(&inputs);
    for w in report.warnings() {
        tracing::warn!(code = w.code, "{}", w.message);
    }
    if !report.pass {
        let msg = report.errors().map(|i| i.message.as_str()).collect::<Vec<_>>().join("; ");
        return Err(MainError::Validation(msg));
    }
    info!(
        applicants = inputs.applicants.len(),
        shows = inputs.shows.len(),
        warnings = report.warnings().count(),
        "validate-only: inputs OK"
    );
    Ok(())
}

fn run_once(args: &Args) -> Result<(), MainError> {
    let timestamp_utc = match &args.timestamp {
        Some(ts) => normalize_rfc3339_utc(ts).map_err(|e| MainError::Validation(format!("--timestamp: {e}")))?,
        None => Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    };

    let (paths, overrides) = input_paths(args);
    let inputs = load_inputs(&paths, &overrides).map_err(map_pipeline_err)?;
    let outs = run_with_ctx(PipelineCtx { inputs, engine_meta: engine_identifiers(), timestamp_utc })
        .map_err(map_pipeline_err)?;

    write_artifacts(&args.out, &outs)?;
    self_verify(&args.out, &outs)?;
    maybe_render_reports(args, &outs)?;

    info!(
        out = %args.out.display(),
        result_id = %outs.result.id,
        seed = outs.run_record.body.seed.value,
        "artifacts written"
    );
    Ok(())
}

fn write_artifacts(out_dir: &Path, outs: &PipelineOutputs) -> Result<(), MainError> {
    fs::create_dir_all(out_dir).map_err(|e| MainError::Io(format!("mkdir {}: {e}", out_dir.display())))?;

    write_canonical_file(&out_dir.join("result.json"), &outs.result).map_err(map_io_err)?;
    write_canonical_file(&out_dir.join("run_record.json"), &outs.run_record).map_err(map_io_err)?;
    write_csv(&out_dir.join("applicant_results.csv"), ApplicantRow::HEADER, &outs.applicant_rows).map_err(map_io_err)?;
    write_csv(&out_dir.join("show_results.csv"), ShowRow::HEADER, &outs.show_rows).map_err(map_io_err)?;
    Ok(())
}

/// Re-read result.json and check it against the digest the run record holds.
fn self_verify(out_dir: &Path, outs: &PipelineOutputs) -> Result<(), MainError> {
    let path = out_dir.join("result.json");
    let bytes = fs::read(&path).map_err(|e| MainError::Io(format!("read {}: {e}", path.display())))?;
    verify_result_bytes(&bytes, &outs.run_record.body.outputs.result_sha256)
        .map_err(|e| MainError::SelfVerify(e.to_string()))
}

fn maybe_render_reports(args: &Args, outs: &PipelineOutputs) -> Result<(), MainError> {
    if args.render.is_empty() {
        return Ok(());
    }

    let result_val =
        serde_json::to_value(&outs.result).map_err(|e| MainError::Render(format!("result to JSON: {e}")))?;
    let run_val =
        serde_json::to_value(&outs.run_record).map_err(|e| MainError::Render(format!("run_record to JSON: {e}")))?;
    let model = lt_report::build_model(&result_val, Some(&run_val)).map_err(|e| MainError::Render(e.to_string()))?;

    for fmt in &args.render {
        match fmt.as_str() {
            "json" => render_json_report(&model, &args.out)?,
            "html" => render_html_report(&model, &args.out)?,
            other => return Err(MainError::Render(format!("unknown renderer: {other}"))),
        }
    }
    Ok(())
}

fn write_text(path: &Path, text: &str) -> Result<(), MainError> {
    write_atomic(path, text.as_bytes()).map_err(|e| MainError::Io(format!("write {}: {e}", path.display())))
}

#[cfg(feature = "report-json")]
fn render_json_report(model: &lt_report::ReportModel, out_dir: &Path) -> Result<(), MainError> {
    write_text(&out_dir.join("report.json"), &lt_report::render_json::render_json(model))
}

#[cfg(not(feature = "report-json"))]
fn render_json_report(_model: &lt_report::ReportModel, _out_dir: &Path) -> Result<(), MainError> {
    Err(MainError::Render("json renderer not enabled (build with feature `report-json`)".into()))
}

#[cfg(feature = "report-html")]
fn render_html_report(model: &lt_report::ReportModel, out_dir: &Path) -> Result<(), MainError> {
    write_text(&out_dir.join("report.html"), &lt_report::render_html::render_html(model))
}

#[cfg(not(feature = "report-html"))]
fn render_html_report(_model: &lt_report::ReportModel, _out_dir: &Path) -> Result<(), MainError> {
    Err(MainError::Render("html renderer not enabled (build with feature `report-html`)".into()))
}
