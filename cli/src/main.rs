mod commands;
mod input;
mod output;
mod terminal;

use commands::{CommandLine, Commands, scan};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init(commands.verbose, commands.quiet);
    print::banner();

    match commands.command {
        Commands::Scan(args) => scan::scan(args, commands.quiet).await,
        Commands::Resolve(args) => scan::resolve(args, commands.quiet).await,
    }
}
