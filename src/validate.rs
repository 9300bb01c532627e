// Input checks the front end runs before calling the store

use std::fmt;

const MIN_NAME_LEN: usize = 2;
const MIN_REGISTER_PASSWORD_LEN: usize = 8;
const MIN_LOGIN_PASSWORD_LEN: usize = 6;

/// One rejected form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub type Validation = Result<(), Vec<FieldError>>;

fn finish(errors: Vec<FieldError>) -> Validation {
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

pub fn validate_title(title: &str) -> Validation {
    if title.trim().is_empty() {
        return Err(vec![FieldError::new("title", "Title is required")]);
    }
    Ok(())
}

pub fn validate_registration(name: &str, email: &str, password: &str, confirm: &str) -> Validation {
    let mut errors = Vec::new();

    if name.is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    } else if name.chars().count() < MIN_NAME_LEN {
        errors.push(FieldError::new("name", "Name must be at least 2 characters"));
    }

    if let Some(e) = check_email(email) {
        errors.push(e);
    }

    if password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    } else {
        if password.chars().count() < MIN_REGISTER_PASSWORD_LEN {
            errors.push(FieldError::new("password", "Password must be at least 8 characters"));
        }
        if !password.chars().any(|c| c.is_ascii_uppercase()) {
            errors.push(FieldError::new("password", "Password must contain at least one uppercase letter"));
        }
        if !password.chars().any(|c| c.is_ascii_lowercase()) {
            errors.push(FieldError::new("password", "Password must contain at least one lowercase letter"));
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push(FieldError::new("password", "Password must contain at least one number"));
        }
    }

    if confirm.is_empty() {
        errors.push(FieldError::new("confirm_password", "Please confirm your password"));
    } else if confirm != password {
        errors.push(FieldError::new("confirm_password", "Passwords don't match"));
    }

    finish(errors)
}

pub fn validate_login(email: &str, password: &str) -> Validation {
    let mut errors = Vec::new();

    if let Some(e) = check_email(email) {
        errors.push(e);
    }

    if password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    } else if password.chars().count() < MIN_LOGIN_PASSWORD_LEN {
        errors.push(FieldError::new("password", "Password must be at least 6 characters"));
    }

    finish(errors)
}

fn check_email(email: &str) -> Option<FieldError> {
    if email.is_empty() {
        return Some(FieldError::new("email", "Email is required"));
    }
    if !looks_like_email(email) {
        return Some(FieldError::new("email", "Please enter a valid email"));
    }
    None
}

/// `local@domain.tld` with no whitespace and exactly one `@`
fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(result: Validation) -> Vec<&'static str> {
        result.unwrap_err().into_iter().map(|e| e.field).collect()
    }

    #[test]
    fn test_title() {
        assert!(validate_title("Buy milk").is_ok());
        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());
    }

    #[test]
    fn test_registration_ok() {
        assert!(validate_registration("Ann", "ann@example.com", "Secret123", "Secret123").is_ok());
    }

    #[test]
    fn test_registration_password_rules() {
        let errors = validate_registration("Ann", "ann@example.com", "secret", "secret").unwrap_err();
        let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Password must be at least 8 characters",
                "Password must contain at least one uppercase letter",
                "Password must contain at least one number",
            ]
        );
    }

    #[test]
    fn test_registration_collects_all_fields() {
        assert_eq!(
            fields(validate_registration("A", "not-an-email", "Secret123", "Secret124")),
            vec!["name", "email", "confirm_password"]
        );
    }

    #[test]
    fn test_login() {
        assert!(validate_login("b@x.com", "pw1234").is_ok());
        assert_eq!(fields(validate_login("", "")), vec!["email", "password"]);
        assert_eq!(fields(validate_login("b@x.com", "short")), vec!["password"]);
    }

    #[test]
    fn test_email_shapes() {
        assert!(looks_like_email("a@x.com"));
        assert!(looks_like_email("first.last@sub.example.org"));
        assert!(!looks_like_email("a@x"));
        assert!(!looks_like_email("@x.com"));
        assert!(!looks_like_email("a@@x.com"));
        assert!(!looks_like_email("a b@x.com"));
        assert!(!looks_like_email("a@.com"));
    }

    #[test]
    fn test_field_error_display() {
        assert_eq!(FieldError::new("title", "Title is required").to_string(), "title: Title is required");
    }
}
