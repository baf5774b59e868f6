//! Input sanitation for admins and events.
//!
//! Everything here runs before the store is touched. Each function returns
//! the first rule the input violates.

use std::sync::LazyLock;

use regex::Regex;

use super::{AdminInput, AdminStatus, EventPatch, NewEvent, NewEventImage, ValidAdmin};
use crate::error::ValidationError;

/// Maximum characters for admin fields, titles, slugs and alt text.
pub const MAX_FIELD_LEN: usize = 255;

/// Maximum characters for an image URL.
pub const MAX_URL_LEN: usize = 2048;

#[allow(clippy::expect_used)]
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,}$").expect("literal email pattern")
});

#[allow(clippy::expect_used)]
static SLUG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("literal slug pattern"));

/// Returns `true` if `email` (already lowercase) looks like an address.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Escapes the five HTML-significant characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Trims, lowercases the email, escapes the name and checks every rule.
///
/// Lengths are measured after normalisation, on what would be stored.
///
/// # Errors
///
/// Returns the first violated [`ValidationError`]. `permanent` is rejected
/// with [`ValidationError::ReservedStatus`].
pub fn sanitize_admin(input: &AdminInput) -> Result<ValidAdmin, ValidationError> {
    let name = escape_html(input.name.trim());
    let email = normalize_email(&input.email);
    let position = input.position.trim().to_string();
    let status = input.status.trim().to_lowercase();

    require_non_empty("name", &name)?;
    require_max_len("name", &name, MAX_FIELD_LEN)?;

    require_non_empty("email", &email)?;
    require_max_len("email", &email, MAX_FIELD_LEN)?;
    if !is_valid_email(&email) {
        return Err(ValidationError::InvalidEmail(email));
    }

    require_max_len("position", &position, MAX_FIELD_LEN)?;

    let status: AdminStatus = status.parse()?;
    if status.is_permanent() {
        return Err(ValidationError::ReservedStatus);
    }

    Ok(ValidAdmin {
        name,
        email,
        position,
        status,
    })
}

/// Canonical form used for storage and lookup.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Derives a slug: lowercase ASCII alphanumerics separated by single
/// hyphens, truncated to [`MAX_FIELD_LEN`].
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug.truncate(MAX_FIELD_LEN);
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Checks a caller-supplied slug.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidSlug`] or a length error.
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    require_non_empty("slug", slug)?;
    require_max_len("slug", slug, MAX_FIELD_LEN)?;
    if !SLUG_PATTERN.is_match(slug) {
        return Err(ValidationError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}

/// Checks one image to attach.
///
/// URL and alt text are measured trimmed, as they are stored.
///
/// # Errors
///
/// Returns an error for an empty or oversized URL or oversized alt text.
pub fn validate_image(image: &NewEventImage) -> Result<(), ValidationError> {
    let url = image.image_url.trim();
    require_non_empty("image_url", url)?;
    require_max_len("image_url", url, MAX_URL_LEN)?;
    require_max_len("alt_text", image.alt_text.trim(), MAX_FIELD_LEN)
}

/// Checks a batch of images; at most one may be flagged for display.
///
/// # Errors
///
/// Returns the first image error, or
/// [`ValidationError::MultipleDisplayImages`].
pub fn validate_images(images: &[NewEventImage]) -> Result<(), ValidationError> {
    for image in images {
        validate_image(image)?;
    }
    if images.iter().filter(|img| img.is_display).count() > 1 {
        return Err(ValidationError::MultipleDisplayImages);
    }
    Ok(())
}

/// Validates a new event and resolves its slug.
///
/// # Errors
///
/// Returns the first violated rule.
pub fn validate_new_event(event: &NewEvent) -> Result<String, ValidationError> {
    let title = event.title.trim();
    require_non_empty("title", title)?;
    require_max_len("title", title, MAX_FIELD_LEN)?;

    let slug = match &event.slug {
        Some(slug) => slug.trim().to_string(),
        None => slugify(title),
    };
    validate_slug(&slug)?;
    validate_images(&event.images)?;
    Ok(slug)
}

/// Validates the present fields of a patch.
///
/// # Errors
///
/// Returns the first violated rule.
pub fn validate_patch(patch: &EventPatch) -> Result<(), ValidationError> {
    if let Some(title) = &patch.title {
        let title = title.trim();
        require_non_empty("title", title)?;
        require_max_len("title", title, MAX_FIELD_LEN)?;
    }
    if let Some(slug) = &patch.slug {
        validate_slug(slug.trim())?;
    }
    Ok(())
}

pub(crate) fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(())
}

pub(crate) fn require_max_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}
