//! Mapping from assigned roles to granted authorities.
//!
//! Each role name becomes exactly one authority. The result is a set, so
//! duplicate role names collapse and ordering carries no meaning.

use std::collections::BTreeSet;

/// The set of authority strings granted to a principal.
pub type Authorities = BTreeSet<String>;

/// Derive the granted authorities from a user's role names.
pub fn granted_authorities<I, S>(role_names: I) -> Authorities
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    role_names
        .into_iter()
        .map(|name| name.as_ref().to_string())
        .collect()
}

/// Whether `authorities` contains `required`.
pub fn has_authority<'a, I>(authorities: I, required: &str) -> bool
where
    I: IntoIterator<Item = &'a String>,
{
    authorities.into_iter().any(|a| a == required)
}
