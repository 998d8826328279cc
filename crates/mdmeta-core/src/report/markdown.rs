use super::ProjectStatus;
use std::fmt::Write;

/// Renders the human-readable project report.
pub fn render_markdown_report(status: &ProjectStatus, project_dir: &str, now: &str) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_report(&mut out, status, project_dir, now);
    out
}

fn write_report(
    out: &mut String,
    status: &ProjectStatus,
    project_dir: &str,
    now: &str,
) -> std::fmt::Result {
    writeln!(out, "# Markdown Files Metadata Report")?;
    writeln!(out)?;
    writeln!(out, "Generated on: {now}")?;
    writeln!(out, "Project directory: {project_dir}")?;
    writeln!(out)?;
    writeln!(out, "## Summary")?;
    writeln!(out, "- Total markdown files: {}", status.total_files)?;
    writeln!(out, "- Files with metadata: {}", status.files_with_metadata)?;
    writeln!(out, "- Files without metadata: {}", status.files_without_metadata)?;
    writeln!(out, "- Coverage: {:.1}%", status.coverage_percent())?;
    writeln!(out)?;
    writeln!(out, "## Authors")?;
    writeln!(out, "Total authors: {}", status.authors.len())?;
    for author in &status.authors {
        let count = status.files_by_author.get(author).map_or(0, Vec::len);
        writeln!(out, "- {author}: {count} files")?;
    }

    writeln!(out)?;
    writeln!(out, "## Version Distribution")?;
    for (version, count) in &status.versions {
        writeln!(out, "- v{version}: {count} files")?;
    }

    if !status.files_without_author.is_empty() {
        writeln!(out)?;
        writeln!(
            out,
            "## Files Without Author ({})",
            status.files_without_author.len()
        )?;
        for path in &status.files_without_author {
            writeln!(out, "- {}", path.display())?;
        }
    }

    if let Some(last) = &status.last_updated {
        writeln!(out)?;
        writeln!(out, "## Last Updated")?;
        writeln!(out, "{last}")?;
    }
    Ok(())
}
