use crate::cli::args::ListArgs;
use crate::cli::helpers::ScanContext;
use crate::exit_codes;

pub fn run(args: ListArgs) -> anyhow::Result<i32> {
    let ctx = ScanContext::from_args(&args.scan)?;
    let files = ctx.markdown_files();

    println!("Found {} markdown files:", files.len());
    for path in &files {
        println!("  {}", path.display());
    }
    Ok(exit_codes::OK)
}
