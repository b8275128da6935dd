use thiserror::Error;

#[derive(Error, Debug)]
pub enum StockflowError {
    #[error("Not in a stockflow project. Run 'stockflow init' first.")]
    NotInitialized,

    #[error("Already initialized. Remove .stockflow/ to reinitialize.")]
    AlreadyInitialized,

    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Add at least one product")]
    EmptyItems,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("An inbound note with number '{0}' is already registered")]
    DuplicateNoteNumber(String),

    #[error("Invalid quantity for product '{product}': {quantity}")]
    InvalidQuantity { product: String, quantity: i64 },

    #[error("Invalid unit price: {0}")]
    InvalidPrice(f64),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid item '{item}', expected {expected}")]
    InvalidItem { item: String, expected: &'static str },

    #[error("Product '{0}' is already staged for this movement")]
    AlreadyStaged(String),

    #[error("Note '{0}' has no stock available")]
    NoStockAvailable(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(&'static str),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Login required to open {route}")]
    Unauthenticated { route: String },

    #[error("Stored data under '{key}' is corrupt: {reason}")]
    CorruptState { key: String, reason: String },

    #[error("'{key}' changed since it was loaded (expected version {expected}, found {found}); reload and try again")]
    StaleWrite {
        key: String,
        expected: u64,
        found: u64,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_yaml::Error),
}

impl StockflowError {
    /// True for errors caused by user input; nothing was written.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StockflowError::EmptyItems
                | StockflowError::MissingField(_)
                | StockflowError::DuplicateNoteNumber(_)
                | StockflowError::InvalidQuantity { .. }
                | StockflowError::InvalidPrice(_)
                | StockflowError::InvalidDate(_)
                | StockflowError::InvalidItem { .. }
                | StockflowError::AlreadyStaged(_)
                | StockflowError::NoStockAvailable(_)
                | StockflowError::InvalidPassword(_)
                | StockflowError::InvalidCredentials
        )
    }
}

pub type Result<T> = std::result::Result<T, StockflowError>;
