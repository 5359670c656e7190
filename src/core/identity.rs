//! Item identity: short random ids and title slugs

use rand::Rng;

use crate::core::error::StoreError;

/// Characters used for generated ids. Excludes 0/o, 1/l/i to keep ids
/// readable when typed back in.
pub const ID_ALPHABET: &[u8] = b"23456789abcdefghjkmnpqrstuvwxyz";

/// Default number of random characters in an id
pub const DEFAULT_ID_LENGTH: usize = 4;

/// Separator between id and short name in filenames
pub const NAME_SEPARATOR: &str = "--";

/// Maximum slug length in characters
const MAX_SLUG_LEN: usize = 40;

/// Generates ids of the form `{prefix}{random}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdGenerator {
    prefix: String,
    length: usize,
}

impl IdGenerator {
    pub fn new(prefix: impl Into<String>, length: usize) -> Result<Self, StoreError> {
        let prefix = prefix.into();
        if length == 0 {
            return Err(StoreError::Config("id_length must be at least 1".to_string()));
        }
        if prefix.contains(NAME_SEPARATOR) {
            return Err(StoreError::Config(format!(
                "id_prefix '{}' must not contain '{}'",
                prefix, NAME_SEPARATOR
            )));
        }
        if prefix.contains(['/', '\\', '.']) || prefix.chars().any(char::is_whitespace) {
            return Err(StoreError::Config(format!(
                "id_prefix '{}' must be usable in a filename",
                prefix
            )));
        }
        Ok(Self { prefix, length })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Generate a new id. Collisions are not checked here.
    pub fn generate(&self) -> String {
        let mut rng = rand::rng();
        let mut id = String::with_capacity(self.prefix.len() + self.length);
        id.push_str(&self.prefix);
        for _ in 0..self.length {
            let idx = rng.random_range(0..ID_ALPHABET.len());
            id.push(ID_ALPHABET[idx] as char);
        }
        id
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            length: DEFAULT_ID_LENGTH,
        }
    }
}

/// Check that an explicitly chosen id can live in a filename and be parsed
/// back out of it.
///
/// A trailing `-` would merge with the separator, so `ab-` plus `thing`
/// would read back as id `ab` with short name `-thing`.
pub fn validate_id(id: &str) -> Result<(), StoreError> {
    if id.is_empty()
        || id.starts_with('.')
        || id.ends_with('-')
        || id.contains(NAME_SEPARATOR)
        || id.contains(['/', '\\'])
        || id.chars().any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(StoreError::Validation(format!(
            "'{}' is not a usable item id",
            id
        )));
    }
    Ok(())
}

/// Check that a caller-supplied short name stays a single filename
/// component after the separator and reads back unchanged
pub fn validate_short_name(name: &str) -> Result<(), StoreError> {
    if name.is_empty()
        || name.starts_with('-')
        || name.starts_with('.')
        || name.contains(['/', '\\'])
        || name.chars().any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(StoreError::Validation(format!(
            "'{}' is not a usable short name",
            name
        )));
    }
    Ok(())
}

/// Turn a title into a filename-safe slug.
///
/// Lowercase ASCII alphanumerics joined by single dashes, capped at 40
/// characters. Returns `None` when nothing usable remains. Never contains
/// [`NAME_SEPARATOR`].
pub fn slugify(title: &str) -> Option<String> {
    let mut slug = String::new();
    let mut pending_dash = false;

    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
            if slug.len() >= MAX_SLUG_LEN {
                break;
            }
        } else {
            pending_dash = true;
        }
    }

    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        None
    } else {
        Some(slug)
    }
}
