//! Identity claims carried by User ID packets.

use regex::Regex;

/// "Full Name (comment) <email@example.com>"
#[allow(clippy::unwrap_used)]
static USER_ID_RE: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"^.+ <([A-Z0-9a-z._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,64})>$").unwrap()
});

/// A User ID from a key and the email address it names, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    user_id: String,
    email: Option<String>,
}

impl Identity {
    /// Parse a User ID string.
    #[must_use]
    pub fn parse(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            email: extract_email(user_id),
        }
    }

    /// The raw User ID.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The email address in angle brackets, if the User ID has the
    /// `Name <email>` form.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

/// Extract the email from a `Display Name <email>` User ID.
#[must_use]
pub fn extract_email(user_id: &str) -> Option<String> {
    USER_ID_RE
        .captures(user_id)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
