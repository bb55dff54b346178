//! Purpose: Hold top-level CLI command dispatch for `jsonbatch`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: `load` writes exactly one report shape to stdout per `--output`.
//! Invariants: Skipped files surface as notices, never as a non-zero exit.

use super::*;
use jsonbatch::api::{
    BatchLoader, BatchReport, EntryFilter, EntryOrder, ErrorPolicy, LoadOptions, TracingObserver,
};
use jsonbatch::notice::{skip_notice, summary_notice};
use super::report_json::summary_json;

pub(super) fn dispatch_command(
    command: Command,
    color_mode: ColorMode,
) -> Result<RunOutcome, Error> {
    match command {
        Command::Load(args) => run_load(args, color_mode),
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            let mut script = Vec::new();
            clap_complete::aot::generate(shell, &mut cmd, "jsonbatch", &mut script);
            emit_bytes(&script)?;
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_json(
                &json!({
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION"),
                }),
                false,
            )?;
            Ok(RunOutcome::ok())
        }
    }
}

fn load_options(args: &LoadArgs) -> Result<LoadOptions, Error> {
    let filter = if args.all_files {
        EntryFilter::any_file()
    } else {
        let ext = args.ext.trim().trim_start_matches('.');
        if ext.is_empty() {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("--ext must not be empty")
                .with_hint("Use --all-files to load every regular file."));
        }
        EntryFilter::extension(ext)
    };
    Ok(LoadOptions {
        filter,
        order: match args.sort {
            SortCli::Listing => EntryOrder::Listing,
            SortCli::Name => EntryOrder::Name,
        },
        errors: match args.errors {
            ErrorPolicyCli::Stop => ErrorPolicy::Stop,
            ErrorPolicyCli::Skip => ErrorPolicy::Skip,
        },
        max_file_bytes: args.max_file_bytes,
    })
}

fn run_load(args: LoadArgs, color_mode: ColorMode) -> Result<RunOutcome, Error> {
    let options = load_options(&args)?;
    let dir_label = args.dir.display().to_string();

    let mut loader = BatchLoader::with_observer(options, TracingObserver);
    let report = loader.load_all_with(&args.dir, |failure| {
        emit_notice(
            &skip_notice(failure, &dir_label, notice_time_now()),
            color_mode,
        );
    })?;

    if report.failed() > 0 {
        emit_notice(
            &summary_notice(&report, &dir_label, notice_time_now()),
            color_mode,
        );
    }

    emit_report(&args, report)?;
    Ok(RunOutcome::ok())
}

fn emit_report(args: &LoadArgs, report: BatchReport) -> Result<(), Error> {
    match args.output {
        OutputCli::Summary => emit_json(&summary_json(&args.dir, &report), args.pretty),
        OutputCli::Documents => {
            emit_json_lines(report.documents.iter().map(|document| &document.value), false)
        }
        OutputCli::Collection => emit_json(&Value::Array(report.into_values()), args.pretty),
    }
}
