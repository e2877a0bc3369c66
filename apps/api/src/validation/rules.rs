use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Characters that satisfy the "special character" clause of the password policy.
pub const PASSWORD_SPECIALS: &str = "@$!%*?&=#_-";

pub const MIN_PASSWORD_LEN: usize = 8;

/// local@domain with a TLD, or a quoted local part, or an IPv4 literal domain.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    compile_regex(
        r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
    )
});

/// Optional leading `+`, then 8..=20 digits, spaces, dashes or parentheses.
static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| compile_regex(r"^\+?[0-9\s\-\(\)]{8,20}$"));

fn compile_regex(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        // Covered by test_patterns_compile
        Err(err) => panic!("invalid regex pattern `{pattern}`: {err}"),
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(&email.to_lowercase())
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_REGEX.is_match(phone)
}

/// At least 8 characters with one ASCII uppercase, one ASCII lowercase, one digit
/// and one character from [`PASSWORD_SPECIALS`].
pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(c))
}

/// Heuristic 0–4 score: one point each for length ≥ 8, length ≥ 12, uppercase,
/// lowercase, digit and any non-alphanumeric character, then `floor(points / 1.5)`.
pub fn password_strength(password: &str) -> u8 {
    if password.is_empty() {
        return 0;
    }
    let len = password.chars().count();
    let checks = [
        len >= 8,
        len >= 12,
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ];
    let points = checks.iter().filter(|&&passed| passed).count() as u8;
    // floor(points / 1.5) == floor(2 * points / 3)
    (points * 2 / 3).min(4)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrengthLabel {
    None,
    Weak,
    Fair,
    Good,
    Strong,
}

impl StrengthLabel {
    pub fn from_score(score: u8) -> Self {
        match score {
            1 => StrengthLabel::Weak,
            2 => StrengthLabel::Fair,
            3 => StrengthLabel::Good,
            4 => StrengthLabel::Strong,
            _ => StrengthLabel::None,
        }
    }
}
