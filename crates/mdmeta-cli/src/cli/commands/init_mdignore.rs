use crate::cli::args::InitMdignoreArgs;
use crate::exit_codes;
use mdmeta_core::ignore::create_ignore_file;
use mdmeta_core::MetaError;

pub fn run(args: InitMdignoreArgs) -> anyhow::Result<i32> {
    match create_ignore_file(&args.path, args.force) {
        Ok(()) => {
            println!("Created {} with default patterns.", args.path.display());
            Ok(exit_codes::OK)
        }
        Err(MetaError::AlreadyExists { path }) => {
            eprintln!(
                "Error: {} already exists. Use --force to overwrite.",
                path.display()
            );
            Ok(exit_codes::FAILED)
        }
        Err(e) => {
            eprintln!("Error creating {}: {e}", args.path.display());
            Ok(exit_codes::FAILED)
        }
    }
}
