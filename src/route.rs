use std::time::Duration;

/// Screens of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Home,
    StockIn,
    StockOut,
    Profile,
    // Linked from the dashboard but not built
    Products,
    Suppliers,
    Reports,
    StockQuery,
}

impl Route {
    pub const ALL: [Route; 10] = [
        Route::Login,
        Route::Register,
        Route::Home,
        Route::StockIn,
        Route::StockOut,
        Route::Profile,
        Route::Products,
        Route::Suppliers,
        Route::Reports,
        Route::StockQuery,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Home => "/home",
            Route::StockIn => "/estoque/entrada",
            Route::StockOut => "/estoque/saida",
            Route::Profile => "/perfil",
            Route::Products => "/produtos",
            Route::Suppliers => "/fornecedores",
            Route::Reports => "/relatorios",
            Route::StockQuery => "/estoque/consulta",
        }
    }

    /// Reachable without a session
    pub fn is_public(self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

impl std::str::FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = s.trim_end_matches('/');
        Route::ALL
            .iter()
            .copied()
            .find(|r| r.path() == path)
            .ok_or_else(|| format!("Unknown route: {}", s))
    }
}

/// Where to go after an action, and how long to wait first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redirect {
    pub to: Route,
    pub after: Duration,
}

impl Redirect {
    pub fn now(to: Route) -> Self {
        Self {
            to,
            after: Duration::ZERO,
        }
    }

    pub fn after(to: Route, delay: Duration) -> Self {
        Self { to, after: delay }
    }
}
