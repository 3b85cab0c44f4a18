use super::ApiError;
use crate::config::Limits;

/// Usernames allow letters, digits, and `@.+-_`.
pub fn validate_username<'a>(username: &'a str, limits: &Limits) -> Result<&'a str, ApiError> {
    if username.is_empty() {
        return Err(ApiError::validation("Username cannot be empty"));
    }

    if username.chars().count() > limits.username_max_chars {
        return Err(ApiError::validation(format!(
            "Username must be {} characters or less",
            limits.username_max_chars
        )));
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
    {
        return Err(ApiError::validation(
            "Username can only contain letters, digits, and @.+-_",
        ));
    }

    // Reserved by the /users/me endpoint.
    if username == "me" {
        return Err(ApiError::validation("Username 'me' is not allowed"));
    }

    Ok(username)
}

pub fn validate_email<'a>(email: &'a str, limits: &Limits) -> Result<&'a str, ApiError> {
    if email.chars().count() > limits.email_max_chars {
        return Err(ApiError::validation(format!(
            "Email must be {} characters or less",
            limits.email_max_chars
        )));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ApiError::validation(format!("Invalid email: {}", email)));
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(ApiError::validation(format!("Invalid email: {}", email)));
    }

    Ok(email)
}

pub fn validate_slug<'a>(slug: &'a str, limits: &Limits) -> Result<&'a str, ApiError> {
    if slug.is_empty() {
        return Err(ApiError::validation("Slug cannot be empty"));
    }

    if slug.chars().count() > limits.slug_max_chars {
        return Err(ApiError::validation(format!(
            "Slug must be {} characters or less",
            limits.slug_max_chars
        )));
    }

    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err(ApiError::validation(
            "Slug can only contain lowercase letters, digits, hyphens, and underscores",
        ));
    }

    Ok(slug)
}

pub fn validate_name<'a>(name: &'a str, limits: &Limits) -> Result<&'a str, ApiError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Name cannot be empty"));
    }

    if trimmed.chars().count() > limits.name_max_chars {
        return Err(ApiError::validation(format!(
            "Name must be {} characters or less",
            limits.name_max_chars
        )));
    }

    Ok(trimmed)
}

pub fn validate_score(score: i32) -> Result<i32, ApiError> {
    if !(1..=10).contains(&score) {
        return Err(ApiError::validation(format!(
            "Invalid score: {}. Score must be between 1 and 10",
            score
        )));
    }
    Ok(score)
}

/// A title cannot be released in the future.
pub fn validate_year(year: i32, current_year: i32) -> Result<i32, ApiError> {
    if year > current_year {
        return Err(ApiError::validation(format!(
            "Invalid year: {}. Year cannot be later than {}",
            year, current_year
        )));
    }
    Ok(year)
}

pub fn validate_role(role: &str) -> Result<&str, ApiError> {
    role.parse::<crate::domain::Role>()
        .map_err(ApiError::validation)?;
    Ok(role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        let limits = Limits::default();
        assert!(validate_username("marmot", &limits).is_ok());
        assert!(validate_username("a.b@c+d-e_f", &limits).is_ok());
        assert!(validate_username("", &limits).is_err());
        assert!(validate_username("me", &limits).is_err());
        assert!(validate_username("spaces here", &limits).is_err());
        assert!(validate_username(&"x".repeat(151), &limits).is_err());
        assert!(validate_username(&"x".repeat(150), &limits).is_ok());
    }

    #[test]
    fn test_validate_email() {
        let limits = Limits::default();
        assert!(validate_email("a@b.com", &limits).is_ok());
        assert!(validate_email("no-at-sign", &limits).is_err());
        assert!(validate_email("@b.com", &limits).is_err());
        assert!(validate_email("a@", &limits).is_err());
        assert!(validate_email("a@nodot", &limits).is_err());

        let long_local = "x".repeat(250);
        assert!(validate_email(&format!("{long_local}@b.com"), &limits).is_err());
    }

    #[test]
    fn test_validate_slug() {
        let limits = Limits::default();
        assert!(validate_slug("sci-fi", &limits).is_ok());
        assert!(validate_slug("movies_2", &limits).is_ok());
        assert!(validate_slug("", &limits).is_err());
        assert!(validate_slug("Upper", &limits).is_err());
        assert!(validate_slug("with space", &limits).is_err());
        assert!(validate_slug(&"x".repeat(51), &limits).is_err());
    }

    #[test]
    fn test_validate_score() {
        assert!(validate_score(1).is_ok());
        assert!(validate_score(10).is_ok());
        assert!(validate_score(0).is_err());
        assert!(validate_score(11).is_err());
    }

    #[test]
    fn test_validate_year() {
        assert!(validate_year(1994, 2026).is_ok());
        assert!(validate_year(2026, 2026).is_ok());
        assert!(validate_year(2027, 2026).is_err());
    }

    #[test]
    fn test_validate_role() {
        assert!(validate_role("user").is_ok());
        assert!(validate_role("moderator").is_ok());
        assert!(validate_role("admin").is_ok());
        assert!(validate_role("owner").is_err());
    }
}
