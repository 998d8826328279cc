use crate::cli::args::InfoArgs;
use crate::cli::helpers::ScanContext;
use crate::exit_codes;
use mdmeta_core::author::author_info;

/// Contributors shown per file in verbose mode.
const SHOWN_CONTRIBUTORS: usize = 3;

pub fn run(args: InfoArgs, verbose: bool) -> anyhow::Result<i32> {
    let ctx = ScanContext::from_args(&args.scan)?;
    let files = if args.files.is_empty() {
        ctx.markdown_files()
    } else {
        args.files.clone()
    };

    println!("Author information for {} markdown files:\n", files.len());
    let mut missing = 0;
    for path in &files {
        if !path.exists() {
            eprintln!("Error: File not found: {}", path.display());
            missing += 1;
            continue;
        }
        let info = author_info(path, ctx.config.prefer_git, verbose);
        println!("File: {}", path.display());
        println!("  Primary author: {}", info.author);

        if verbose {
            if let Some(last) = &info.git_last_author {
                println!("  Git last author: {last}");
            }
            if !info.git_contributors.is_empty() {
                let shown: Vec<&str> = info
                    .git_contributors
                    .iter()
                    .take(SHOWN_CONTRIBUTORS)
                    .map(String::as_str)
                    .collect();
                println!("  Git contributors: {}", shown.join(", "));
            }
            if let Some(system) = &info.system_author {
                println!("  System author: {system}");
            }
            if let Some(owner) = &info.file_owner {
                println!("  File owner: {owner}");
            }
        }
        println!();
    }

    if missing > 0 {
        return Ok(exit_codes::FAILED);
    }
    Ok(exit_codes::OK)
}
