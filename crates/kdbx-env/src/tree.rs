//! Read-only view of a hierarchical secret store
//!
//! The resolver only needs three capabilities: the entries of a group, the
//! child groups of a group, and a way to read a field of an entry as text.
//! These traits describe exactly that, so the resolver never depends on the
//! concrete tree type of the store library.

use zeroize::Zeroizing;

/// A field value that may be held in plain or protected form.
///
/// `reveal_as_text` has the same contract for every implementor: the plain
/// text of the value, in a buffer that is wiped on drop.
pub trait Reveal {
    fn reveal_as_text(&self) -> Zeroizing<String>;
}

impl Reveal for str {
    fn reveal_as_text(&self) -> Zeroizing<String> {
        Zeroizing::new(self.to_string())
    }
}

impl Reveal for String {
    fn reveal_as_text(&self) -> Zeroizing<String> {
        self.as_str().reveal_as_text()
    }
}

/// A single secret record
pub trait SecretEntry {
    type Field: Reveal + ?Sized;

    /// Look up a field by name
    fn field(&self, name: &str) -> Option<&Self::Field>;

    /// The entry's label, read from `title_field`. Protected titles are
    /// not labels.
    fn label(&self, title_field: &str) -> Option<&str>;
}

/// A container of entries and nested groups
pub trait SecretGroup {
    type Entry: SecretEntry;

    /// Entries directly in this group, in store order
    fn entries(&self) -> impl Iterator<Item = &Self::Entry>;

    /// Child groups, in store order
    fn groups(&self) -> impl Iterator<Item = &Self>;
}

/// An opened store
pub trait SecretStore {
    type Group: SecretGroup;

    /// The root (default) group traversal starts from
    fn root(&self) -> &Self::Group;
}
