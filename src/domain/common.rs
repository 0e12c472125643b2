/// Entities mirrored from the server are identified by their name.
pub trait Keyed {
    fn key(&self) -> &str;
}

/// Case-insensitive comparison used for category name uniqueness.
pub fn names_match(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}
