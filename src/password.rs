// Password rules and bcrypt hashing.

pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*(),.?\":{}|<>";

// How letters are required to appear in a password
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LetterRule {
    // At least one ASCII letter of any case
    AnyLetter,
    // At least one uppercase and one lowercase ASCII letter
    MixedCase,
}

// Fixed rule set a candidate password is checked against.
// Rules run in order (length, digit, letters, special character) and the
// first one that fails is reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub letters: LetterRule,
    pub require_special: bool,
}

impl PasswordPolicy {
    pub fn basic() -> Self {
        Self {
            min_length: 6,
            letters: LetterRule::AnyLetter,
            require_special: false,
        }
    }

    pub fn strict() -> Self {
        Self {
            min_length: 8,
            letters: LetterRule::MixedCase,
            require_special: true,
        }
    }

    // Returns the first violated rule as a message, or `None` if the password passes.
    pub fn validate(&self, password: &str) -> Option<String> {
        if password.chars().count() < self.min_length {
            return Some(format!(
                "Password must be at least {} characters long",
                self.min_length
            ));
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Some("Password must contain at least one number".to_string());
        }
        match self.letters {
            LetterRule::AnyLetter => {
                if !password.chars().any(|c| c.is_ascii_alphabetic()) {
                    return Some("Password must contain at least one letter".to_string());
                }
            }
            LetterRule::MixedCase => {
                if !password.chars().any(|c| c.is_ascii_uppercase()) {
                    return Some("Password must contain at least one uppercase letter".to_string());
                }
                if !password.chars().any(|c| c.is_ascii_lowercase()) {
                    return Some("Password must contain at least one lowercase letter".to_string());
                }
            }
        }
        if self.require_special && !password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
            return Some("Password must contain at least one special character".to_string());
        }
        None
    }
}

// Hashes a password with a fresh random salt.
pub fn hash_password(plain: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(plain, cost)
}

// Checks a password against a stored hash. A malformed hash never verifies.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    bcrypt::verify(plain, hash).unwrap_or(false)
}
