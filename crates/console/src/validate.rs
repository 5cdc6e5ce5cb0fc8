use thiserror::Error;

/// Client-side precondition failures. These are resolved locally; the
/// network layer is never touched for a request that fails here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Pick a challenge first.")]
    MissingChallenge,

    #[error("The range start must not be after its end.")]
    InvertedRange,

    #[error("An email address is required.")]
    MissingEmail,

    #[error("That does not look like an email address.")]
    MalformedEmail,

    #[error("The minimum group size ({min}) exceeds the maximum ({max}).")]
    MemberBounds { min: u32, max: u32 },
}

/// Check report parameters before they are sent anywhere.
///
/// Range bounds are ISO-8601 timestamps, which order lexicographically, so
/// the inversion check is a plain string comparison.
pub fn report_request(
    challenge_id: i64,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<(), ValidationError> {
    if challenge_id <= 0 {
        return Err(ValidationError::MissingChallenge);
    }
    if let (Some(from), Some(to)) = (from, to) {
        if !from.is_empty() && !to.is_empty() && from > to {
            return Err(ValidationError::InvertedRange);
        }
    }
    Ok(())
}

pub fn invite_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::MissingEmail);
    }
    // Just enough shape checking to catch typos; the server owns the rest.
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::MalformedEmail);
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(ValidationError::MalformedEmail);
    }
    Ok(())
}

pub fn member_bounds(min: u32, max: u32) -> Result<(), ValidationError> {
    if min > max {
        return Err(ValidationError::MemberBounds { min, max });
    }
    Ok(())
}
