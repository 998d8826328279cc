use super::args::*;

pub mod info;
pub mod init_mdignore;
pub mod list;
pub mod report;
pub mod update;

use crate::exit_codes;

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let verbose = cli.verbose;
    match cli.cmd {
        Command::Update(args) => update::run(args),
        Command::Report(args) => report::run(args),
        Command::InitMdignore(args) => init_mdignore::run(args),
        Command::List(args) => list::run(args),
        Command::Info(args) => info::run(args, verbose),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}
