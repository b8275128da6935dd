use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "stockflow")]
#[command(version, about = "A local-first stock ledger: inbound notes, outbound movements and a dashboard")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new stockflow store in the current directory
    Init,

    /// Load the demo products, suppliers and inbound notes
    Seed,

    /// Sign in with the configured demo credentials
    Login {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Sign out
    Logout,

    /// Validate a sign-up form (accounts are not stored)
    Register {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        /// Password confirmation
        #[arg(long)]
        confirm: String,
    },

    /// Show the signed-in user
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Stock-in: inbound notes
    Entrada(EntradaCommand),

    /// Stock-out: outbound movements
    Saida(SaidaCommand),

    /// Available quantity per product, with restock warnings
    Stock {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Totals, low-stock alerts and recent activity
    Dashboard {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or toggle the light/dark preference
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },

    /// Edit the signed-in user's profile (changes are not stored)
    Profile(ProfileCommand),
}

#[derive(Args, Debug)]
pub struct EntradaCommand {
    #[command(subcommand)]
    pub action: EntradaAction,
}

#[derive(Subcommand, Debug)]
pub enum EntradaAction {
    /// Register an inbound note
    Add {
        /// Supplier id or name (created if unknown)
        #[arg(long)]
        supplier: Option<String>,

        /// Note number, unique across notes
        #[arg(long)]
        number: Option<String>,

        /// Note date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,

        /// Free-text notes
        #[arg(long)]
        notes: Option<String>,

        /// Product line in format "name:quantity:unit_price" (can be specified multiple times)
        #[arg(long = "item", short = 'i')]
        items: Vec<String>,

        /// Prefill from a demo note number (e.g. "10001")
        #[arg(long)]
        template: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List inbound notes
    List {
        /// Only notes with stock left
        #[arg(long)]
        available: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete an inbound note
    Remove {
        /// Note id or number
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Args, Debug)]
pub struct SaidaCommand {
    #[command(subcommand)]
    pub action: SaidaAction,
}

#[derive(Subcommand, Debug)]
pub enum SaidaAction {
    /// Register a stock-out against one inbound note
    Add {
        /// Inbound note id or number
        #[arg(long)]
        note: String,

        /// Reason for the stock-out
        #[arg(long)]
        reason: String,

        /// Movement date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        recipient: Option<String>,

        /// Free-text notes
        #[arg(long)]
        notes: Option<String>,

        /// Line in format "product_id:quantity" (can be specified multiple times)
        #[arg(long = "item", short = 'i')]
        items: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List outbound movements
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ThemeAction {
    /// Print the current theme
    Show,
    /// Switch between light and dark
    Toggle,
}

#[derive(Args, Debug)]
pub struct ProfileCommand {
    #[command(subcommand)]
    pub action: ProfileAction,
}

#[derive(Subcommand, Debug)]
pub enum ProfileAction {
    /// Validate profile changes
    Update {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        current_password: Option<String>,

        #[arg(long)]
        new_password: Option<String>,

        /// New password confirmation
        #[arg(long)]
        confirm: Option<String>,
    },
}
