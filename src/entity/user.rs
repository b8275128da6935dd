use serde::{Deserialize, Serialize};

/// The single account the demo knows about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl DemoUser {
    pub fn admin(email: impl Into<String>) -> Self {
        Self {
            id: "1".to_string(),
            name: "Administrador".to_string(),
            email: email.into(),
            role: "admin".to_string(),
        }
    }
}
