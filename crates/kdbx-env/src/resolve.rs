//! Entry resolution - find requested entries anywhere in the group tree
//!
//! The tree is walked depth-first, pre-order, from the root group. Within a
//! group, its own entries are checked before any child group is entered, and
//! child groups are visited in store order. Every group is visited; when the
//! same label appears more than once, the entry encountered last wins.
//!
//! Groups are owned by their parent in every store this crate reads, so the
//! tree cannot contain cycles and no visited-set is kept.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use zeroize::Zeroizing;

use crate::tree::{Reveal, SecretEntry, SecretGroup, SecretStore};

/// Field that carries an entry's label
pub const DEFAULT_TITLE_FIELD: &str = "Title";

/// Field that carries an entry's secret
pub const DEFAULT_VALUE_FIELD: &str = "Password";

/// The names the caller asked for, in request order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestedNames {
    names: Vec<String>,
}

impl RequestedNames {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

/// Which fields identify an entry and supply its value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelection {
    pub title_field: String,
    pub value_field: String,
}

impl Default for FieldSelection {
    fn default() -> Self {
        Self {
            title_field: DEFAULT_TITLE_FIELD.to_string(),
            value_field: DEFAULT_VALUE_FIELD.to_string(),
        }
    }
}

/// Secrets found for the requested names
#[derive(Default)]
pub struct Resolution {
    /// Matched label -> secret value
    pub values: BTreeMap<String, Zeroizing<String>>,
    /// Requested names with no matching entry, in request order
    pub missing: Vec<String>,
}

impl Resolution {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(|v| v.as_str())
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

// Values never go through Debug
impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolution")
            .field("names", &self.values.keys().collect::<Vec<_>>())
            .field("missing", &self.missing)
            .finish()
    }
}

/// Collect the requested entries from a store.
///
/// Missing names are not an error; they are returned in `missing` and it is
/// up to the caller to report them.
pub fn resolve<S: SecretStore>(
    store: &S,
    names: &RequestedNames,
    fields: &FieldSelection,
) -> Resolution {
    let wanted: HashSet<&str> = names.as_slice().iter().map(String::as_str).collect();
    let mut values = BTreeMap::new();

    let mut stack = vec![store.root()];
    while let Some(group) = stack.pop() {
        for entry in group.entries() {
            let Some(label) = entry.label(&fields.title_field) else {
                continue;
            };
            if wanted.contains(label) {
                values.insert(label.to_string(), secret_value(entry, &fields.value_field));
            }
        }

        // Reversed so the first child is popped (visited) first
        let children: Vec<_> = group.groups().collect();
        stack.extend(children.into_iter().rev());
    }

    let missing = names
        .as_slice()
        .iter()
        .filter(|name| !values.contains_key(name.as_str()))
        .cloned()
        .collect();

    Resolution { values, missing }
}

/// The entry's secret as text; an absent field is an empty secret
fn secret_value<E: SecretEntry>(entry: &E, value_field: &str) -> Zeroizing<String> {
    match entry.field(value_field) {
        Some(value) => value.reveal_as_text(),
        None => Zeroizing::new(String::new()),
    }
}
