use clap::Parser;
use stockflow::cli::{
    handle_dashboard, handle_entrada_add, handle_entrada_list, handle_entrada_remove, handle_init,
    handle_login, handle_logout, handle_profile_update, handle_register, handle_saida_add,
    handle_saida_list, handle_seed, handle_stock, handle_theme_show, handle_theme_toggle,
    handle_whoami, Cli, Commands, EntradaAction, ProfileAction, SaidaAction, ThemeAction,
};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_env("STOCKFLOW_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => handle_init(),
        Commands::Seed => handle_seed(),
        Commands::Login { email, password } => handle_login(email, password),
        Commands::Logout => handle_logout(),
        Commands::Register {
            name,
            email,
            password,
            confirm,
        } => handle_register(name, email, password, confirm),
        Commands::Whoami { json } => handle_whoami(json),
        Commands::Entrada(entrada) => match entrada.action {
            EntradaAction::Add {
                supplier,
                number,
                date,
                notes,
                items,
                template,
                json,
            } => handle_entrada_add(supplier, number, date, notes, items, template, json),
            EntradaAction::List { available, json } => handle_entrada_list(available, json),
            EntradaAction::Remove { id, force } => handle_entrada_remove(id, force),
        },
        Commands::Saida(saida) => match saida.action {
            SaidaAction::Add {
                note,
                reason,
                date,
                recipient,
                notes,
                items,
                json,
            } => handle_saida_add(note, reason, date, recipient, notes, items, json),
            SaidaAction::List { json } => handle_saida_list(json),
        },
        Commands::Stock { json } => handle_stock(json),
        Commands::Dashboard { json } => handle_dashboard(json),
        Commands::Theme { action } => match action.unwrap_or(ThemeAction::Show) {
            ThemeAction::Show => handle_theme_show(),
            ThemeAction::Toggle => handle_theme_toggle(),
        },
        Commands::Profile(profile) => match profile.action {
            ProfileAction::Update {
                name,
                email,
                current_password,
                new_password,
                confirm,
            } => handle_profile_update(name, email, current_password, new_password, confirm),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
