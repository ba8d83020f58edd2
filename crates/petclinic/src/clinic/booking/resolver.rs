use std::sync::Arc;

use crate::clinic::domain::Vet;
use crate::clinic::repository::{NameMatch, RepositoryError, VetDirectory};
use crate::clinic::validation::{ErrorCode, FieldError, FormField};

/// Failure to map free-text input onto exactly one vet.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("{input} is not a first and last name.")]
    InvalidFormat { input: String },
    #[error("{input} is not found.")]
    NotFound { input: String },
    #[error("Found multiple vets with name {input}")]
    Ambiguous { input: String, matches: usize },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ResolutionError {
    /// Field error for the vet name input, or `None` for store failures.
    pub fn field_error(&self) -> Option<FieldError> {
        let code = match self {
            ResolutionError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            ResolutionError::NotFound { .. } => ErrorCode::NotFound,
            ResolutionError::Ambiguous { .. } => ErrorCode::MultiFound,
            ResolutionError::Repository(_) => return None,
        };
        Some(FieldError::new(FormField::VetName, code, self.to_string()))
    }
}

/// Resolves "First Last" input against the vet directory.
///
/// The input is split on its first space; everything after it is the last name, so
/// "Abraham Van Helsing" looks up first name "Abraham" and last name "Van Helsing".
/// Matching is exact and case-sensitive.
pub struct VetResolver<V> {
    directory: Arc<V>,
}

impl<V> VetResolver<V>
where
    V: VetDirectory + 'static,
{
    pub fn new(directory: Arc<V>) -> Self {
        Self { directory }
    }

    pub fn directory(&self) -> &V {
        &self.directory
    }

    pub fn resolve(&self, full_name: &str) -> Result<Vet, ResolutionError> {
        let (first_name, last_name) =
            split_full_name(full_name).ok_or_else(|| ResolutionError::InvalidFormat {
                input: full_name.to_string(),
            })?;

        let mut matches = self
            .directory
            .find_by_name(first_name, last_name, NameMatch::Exact)?;

        match matches.len() {
            0 => Err(ResolutionError::NotFound {
                input: full_name.to_string(),
            }),
            1 => Ok(matches.remove(0)),
            count => Err(ResolutionError::Ambiguous {
                input: full_name.to_string(),
                matches: count,
            }),
        }
    }
}

fn split_full_name(input: &str) -> Option<(&str, &str)> {
    let (first, rest) = input.trim().split_once(' ')?;
    let last = rest.trim();
    if first.is_empty() || last.is_empty() {
        return None;
    }
    Some((first, last))
}

#[cfg(test)]
mod tests {
    use super::split_full_name;

    #[test]
    fn splits_on_first_space() {
        assert_eq!(split_full_name("Linda Douglas"), Some(("Linda", "Douglas")));
        assert_eq!(
            split_full_name("  Abraham Van Helsing "),
            Some(("Abraham", "Van Helsing"))
        );
        assert_eq!(split_full_name("Linda   Douglas"), Some(("Linda", "Douglas")));
    }

    #[test]
    fn single_token_is_rejected() {
        assert_eq!(split_full_name("Linda"), None);
        assert_eq!(split_full_name("   "), None);
        assert_eq!(split_full_name(""), None);
    }
}
