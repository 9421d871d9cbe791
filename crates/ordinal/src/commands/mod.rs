//! Command dispatch: bridges CLI args to the reorder engine and output.

pub mod config_cmd;
pub mod rules;

use ordinal_core::{ConsoleConfig, ExtCommunityList, FirewallChain, LocalRoutePolicy};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a console-bound command to the rules handler for its collection.
pub async fn dispatch(
    cmd: Command,
    config: ConsoleConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Firewall(args) => {
            let chain = FirewallChain::new(args.protocol.into(), args.chain, args.custom);
            rules::handle(config, chain, args.action, global).await
        }
        Command::LocalRoute(args) => {
            let policy = LocalRoutePolicy::new(args.family.into(), args.policy);
            rules::handle(config, policy, args.action, global).await
        }
        Command::ExtCommunity(args) => {
            let list = ExtCommunityList::new(args.list);
            rules::handle(config, list, args.action, global).await
        }
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
