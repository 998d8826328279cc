use crate::cli::args::UpdateArgs;
use crate::cli::helpers::{confirm, metadata_from_pairs, ScanContext};
use crate::exit_codes;
use mdmeta_core::discovery::is_markdown;
use mdmeta_core::metadata::timestamp_now;
use mdmeta_core::process::{process_file, process_paths, BulkSummary, FileOutcome, ProcessOptions};

pub fn run(args: UpdateArgs) -> anyhow::Result<i32> {
    let ctx = ScanContext::from_args(&args.scan)?;

    let defaults = ctx.config.default_metadata()?;
    let set = metadata_from_pairs(&args.set);
    let auto_author = ctx.config.auto_author && !args.no_auto_author;

    if !args.remove && !args.overwrite && set.is_empty() && defaults.is_empty() && !auto_author {
        eprintln!("No metadata specified to add/update. Use --help for usage.");
        return Ok(exit_codes::FAILED);
    }

    let opts = ProcessOptions {
        set,
        defaults,
        remove: args.remove,
        overwrite: args.overwrite,
        dry_run: args.dry_run,
        auto_author,
        prefer_git: ctx.config.prefer_git,
    };
    let now = timestamp_now();

    let summary = if args.files.is_empty() {
        let files = ctx.markdown_files();
        if !args.yes {
            if files.is_empty() {
                eprintln!("No markdown files found to process.");
                return Ok(exit_codes::FAILED);
            }
            println!("Found {} markdown files to process.", files.len());
            if !confirm("Do you want to continue?", true) {
                println!("Operation cancelled.");
                return Ok(exit_codes::OK);
            }
        }
        process_paths(files, &opts, &now)
    } else {
        let mut summary = BulkSummary::default();
        for path in &args.files {
            if !path.exists() {
                eprintln!("Error: File not found: {}", path.display());
                continue;
            }
            if !is_markdown(path) {
                eprintln!("Warning: Not a markdown file: {}", path.display());
                continue;
            }
            tracing::debug!(path = %path.display(), "processing");
            summary.record(path.clone(), process_file(path, &opts, &now));
        }
        summary
    };

    print_outcomes(&summary, args.dry_run);

    if args.dry_run {
        println!(
            "\nDry run complete. Would process {} files, modify {}.",
            summary.total, summary.modified
        );
    } else {
        println!(
            "\nProcessed {} files, modified {}.",
            summary.total, summary.modified
        );
    }

    if summary.failed > 0 {
        eprintln!("{} file(s) failed.", summary.failed);
        return Ok(exit_codes::FAILED);
    }
    Ok(exit_codes::OK)
}

fn print_outcomes(summary: &BulkSummary, dry_run: bool) {
    for report in &summary.files {
        let path = report.path.display();
        match &report.result {
            Ok(FileOutcome::Updated) if dry_run => println!("Would update metadata in {path}"),
            Ok(FileOutcome::Updated) => println!("Updated metadata in {path}"),
            Ok(FileOutcome::Removed) if dry_run => println!("Would remove metadata from {path}"),
            Ok(FileOutcome::Removed) => println!("Removed metadata from {path}"),
            Ok(FileOutcome::Unchanged | FileOutcome::NoMetadata) => {}
            Err(e) => eprintln!("Error processing {path}: {e}"),
        }
    }
}
