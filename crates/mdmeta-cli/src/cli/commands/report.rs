use crate::cli::args::{ReportArgs, ReportFormat};
use crate::cli::helpers::ScanContext;
use crate::exit_codes;
use anyhow::Context;
use mdmeta_core::metadata::timestamp_now;
use mdmeta_core::report::{json, markdown, project_status};

pub fn run(args: ReportArgs) -> anyhow::Result<i32> {
    let ctx = ScanContext::from_args(&args.scan)?;
    let status = project_status(&ctx.root, &ctx.matcher);

    let project_dir = ctx
        .root
        .canonicalize()
        .unwrap_or_else(|_| ctx.root.clone())
        .display()
        .to_string();
    let now = timestamp_now();

    let report = match args.format {
        ReportFormat::Markdown => markdown::render_markdown_report(&status, &project_dir, &now),
        ReportFormat::Json => json::render_json(&status, &project_dir, &now)?,
    };

    match &args.output {
        Some(out) => {
            if let Err(e) = std::fs::write(out, &report)
                .with_context(|| format!("failed to write {}", out.display()))
            {
                eprintln!("Error saving report to {}: {e:#}", out.display());
                return Ok(exit_codes::FAILED);
            }
            println!("Report saved to {}", out.display());
        }
        None => print!("{report}"),
    }
    Ok(exit_codes::OK)
}
