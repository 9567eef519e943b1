pub mod budget;
pub mod scenario;
pub mod system;
pub mod user;

use crate::cli::errors::CommandError;
use crate::cli::registry::CommandRegistry;

pub(crate) fn registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    for entry in system::definitions()
        .into_iter()
        .chain(user::definitions())
        .chain(scenario::definitions())
        .chain(budget::definitions())
    {
        registry.register(entry);
    }
    registry
}

/// Resolves a 1-based list position or a unique id prefix to an index.
pub(crate) fn resolve_index<T>(
    items: &[T],
    id_of: impl Fn(&T) -> &str,
    selector: &str,
    what: &str,
) -> Result<usize, CommandError> {
    let selector = selector.trim();
    if let Ok(position) = selector.parse::<usize>() {
        if (1..=items.len()).contains(&position) {
            return Ok(position - 1);
        }
    }
    let matches: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| !selector.is_empty() && id_of(item).starts_with(selector))
        .map(|(index, _)| index)
        .collect();
    match matches.as_slice() {
        [index] => Ok(*index),
        [] => Err(CommandError::InvalidArguments(format!(
            "no {what} matches `{selector}`"
        ))),
        _ => Err(CommandError::InvalidArguments(format!(
            "`{selector}` matches several {what}s; use more of the id"
        ))),
    }
}

pub(crate) fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

pub(crate) fn usage(text: &str) -> CommandError {
    CommandError::InvalidArguments(format!("usage: {text}"))
}
