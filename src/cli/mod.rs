mod commands;
mod handlers;

pub use commands::{
    Cli, Commands, EntradaAction, EntradaCommand, ProfileAction, ProfileCommand, SaidaAction,
    SaidaCommand, ThemeAction,
};
pub use handlers::{
    handle_dashboard, handle_entrada_add, handle_entrada_list, handle_entrada_remove, handle_init,
    handle_login, handle_logout, handle_profile_update, handle_register, handle_saida_add,
    handle_saida_list, handle_seed, handle_stock, handle_theme_show, handle_theme_toggle,
    handle_whoami,
};
