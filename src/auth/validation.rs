//! Form checks that run before anything is sent

use crate::error::ValidationError;

pub const MIN_PASSWORD_LEN: usize = 6;

fn required(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(())
}

fn email(value: &str) -> Result<(), ValidationError> {
    required(value, "Email")?;
    let value = value.trim();
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

fn new_password(password: &str, confirm: &str) -> Result<(), ValidationError> {
    required(password, "Password")?;
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort { min: MIN_PASSWORD_LEN });
    }
    Ok(())
}

pub fn login(email_value: &str, password: &str) -> Result<(), ValidationError> {
    email(email_value)?;
    required(password, "Password")
}

pub fn register(name: &str, email_value: &str, password: &str, confirm: &str) -> Result<(), ValidationError> {
    required(name, "Name")?;
    email(email_value)?;
    new_password(password, confirm)
}

pub fn forgot_password(email_value: &str) -> Result<(), ValidationError> {
    email(email_value)
}

pub fn reset_password(password: &str, confirm: &str) -> Result<(), ValidationError> {
    new_password(password, confirm)
}

pub fn playlist_name(name: &str) -> Result<(), ValidationError> {
    required(name, "Playlist name")
}

pub fn comment(content: &str) -> Result<(), ValidationError> {
    required(content, "Comment")
}

/// Name plus both files
pub fn upload(name: &str, audio: &str, image: &str) -> Result<(), ValidationError> {
    required(audio, "Audio file")?;
    required(image, "Image file")?;
    required(name, "Song name")
}
