mod categories;
mod list;
mod show;

use std::fmt;

use anyhow::Result;
use bpaf::Bpaf;
use indoc::indoc;
use tracing::debug;

use crate::config::Config;
use crate::utils::init::init_catalog_client;

const STOREFRONT_DESCRIPTION: &str = indoc! {"
    Browse the products of a remote catalog.

    Products can be filtered by several categories and price ranges at once,
    searched by title and description, and sorted by title, price or category."
};

fn vec_len<T>(x: Vec<T>) -> usize {
    Vec::len(&x)
}

#[derive(Bpaf, Clone, Copy, Debug)]
pub enum Verbosity {
    Verbose(
        /// Increase logging verbosity
        ///
        /// Invoke multiple times for increasing detail.
        #[bpaf(short('v'), long("verbose"), req_flag(()), many, map(vec_len))]
        usize,
    ),

    /// Silence logs except for errors
    #[bpaf(short, long)]
    Quiet,
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Verbose(0)
    }
}

#[derive(Bpaf)]
#[bpaf(options, descr(STOREFRONT_DESCRIPTION))]
pub struct StorefrontCli(#[bpaf(external(storefront_args))] pub StorefrontArgs);

/// Main storefront args parser
///
/// To parse the storefront CLI, use [`StorefrontCli`] through
/// [`storefront_cli()`].
#[derive(Debug, Bpaf)]
#[bpaf(ignore_rustdoc)]
pub struct StorefrontArgs {
    /// Verbose mode
    ///
    /// Invoke multiple times for increasing detail.
    #[bpaf(external, fallback(Default::default()))]
    pub verbosity: Verbosity,

    #[bpaf(external(commands))]
    command: Commands,
}

impl StorefrontArgs {
    pub async fn handle(self, config: Config) -> Result<()> {
        let client = init_catalog_client(&config)?;
        debug!(command = ?self.command, "running command");

        match self.command {
            Commands::List(args) => args.handle(config, &client).await,
            Commands::Show(args) => args.handle(&client).await,
            Commands::Categories(args) => args.handle(&client).await,
        }
    }
}

#[derive(Bpaf, Clone)]
enum Commands {
    /// List products matching filters, one page at a time
    #[bpaf(command)]
    List(#[bpaf(external(list::list))] list::List),

    /// Show details of a single product
    #[bpaf(command)]
    Show(#[bpaf(external(show::show))] show::Show),

    /// List the names of all categories
    #[bpaf(command)]
    Categories(#[bpaf(external(categories::categories))] categories::Categories),
}

impl fmt::Debug for Commands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Commands::List(_) => "list",
            Commands::Show(_) => "show",
            Commands::Categories(_) => "categories",
        };
        write!(f, "{name}")
    }
}
