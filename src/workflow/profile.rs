use crate::entity::DemoUser;
use crate::error::Result;
use crate::session::validate_new_password;

/// Profile form. Saving is simulated; nothing is stored.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl ProfileUpdate {
    pub fn for_user(user: &DemoUser) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            ..Default::default()
        }
    }

    /// A new password is optional; when given it must be 6+ characters and
    /// match the confirmation.
    pub fn validate(&self) -> Result<()> {
        if self.new_password.is_empty() {
            return Ok(());
        }
        validate_new_password(&self.new_password, &self.confirm_password)
    }
}
