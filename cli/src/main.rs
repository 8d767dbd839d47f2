mod commands;
mod terminal;

use commands::{CommandLine, Commands, VendorAction, discover, vendors};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init(commands.verbose, commands.quiet);
    let vendor_cfg = commands.vendor_config();
    let q_level = commands.quiet;

    match commands.command {
        Commands::Discover(args) => {
            if !args.json {
                print::banner(q_level);
                print::header("getting ready for discovery", q_level);
            }
            discover::discover(args, &vendor_cfg, q_level).await
        }
        Commands::Vendors { action } => match action {
            VendorAction::Update => {
                print::header("updating vendor database", q_level);
                vendors::update(&vendor_cfg).await
            }
            VendorAction::Lookup { mac } => vendors::lookup(&mac, &vendor_cfg).await,
        },
    }
}
