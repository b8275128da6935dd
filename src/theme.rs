use crate::error::Result;
use crate::storage::{keys, LocalStorage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(format!("Invalid theme: {}", s)),
        }
    }
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Stored preference, or the system preference (which is then stored)
    pub fn load_or_init(storage: &LocalStorage, prefers_dark: bool) -> Result<Self> {
        let stored = storage
            .read_raw(keys::THEME)?
            .and_then(|raw| raw.parse::<Theme>().ok());
        if let Some(theme) = stored {
            return Ok(theme);
        }

        let theme = if prefers_dark { Theme::Dark } else { Theme::Light };
        theme.save(storage)?;
        Ok(theme)
    }

    pub fn save(self, storage: &LocalStorage) -> Result<()> {
        storage.write_raw(keys::THEME, &self.to_string())
    }

    pub fn toggle(storage: &LocalStorage, prefers_dark: bool) -> Result<Self> {
        let next = Self::load_or_init(storage, prefers_dark)?.toggled();
        next.save(storage)?;
        Ok(next)
    }
}

/// Guess the system preference from the environment
pub fn system_prefers_dark() -> bool {
    std::env::var("STOCKFLOW_THEME")
        .or_else(|_| std::env::var("COLORFGBG"))
        .map(|v| {
            let v = v.to_lowercase();
            // COLORFGBG is "fg;bg"; background 0-6 or 8 is dark
            v == "dark"
                || v
                    .rsplit(';')
                    .next()
                    .and_then(|bg| bg.parse::<u8>().ok())
                    .map_or(false, |bg| bg < 7 || bg == 8)
        })
        .unwrap_or(false)
}
