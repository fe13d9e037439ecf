//! Store access - open a KDBX database with a password and optional key file
//!
//! Decryption is left to the `keepass` crate. This module reads the files,
//! builds the composite key, and turns every unlock failure into a single
//! `KdbxEnvError::Access` so the user sees one actionable message.

use keepass::db::{Entry, Group, Node, Value};
use keepass::{Database, DatabaseKey};
use std::fs;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

use crate::error::{KdbxEnvError, Result};
use crate::tree::{Reveal, SecretEntry, SecretGroup, SecretStore};

/// Master password, wiped on drop
#[derive(Clone)]
pub struct Password(Zeroizing<String>);

impl Password {
    pub fn new(password: impl Into<String>) -> Self {
        Self(Zeroizing::new(password.into()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Everything needed to unlock a store
#[derive(Debug, Clone)]
pub struct Credentials {
    pub path: PathBuf,
    pub password: Password,
    pub keyfile: Option<PathBuf>,
}

/// Opens a store. The seam between the run and the store library.
pub trait StoreOpener {
    type Store: SecretStore;

    fn open(&self, credentials: &Credentials) -> Result<Self::Store>;
}

/// Opens KDBX 3.1 / 4 files through the `keepass` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct KdbxOpener;

impl StoreOpener for KdbxOpener {
    type Store = KdbxStore;

    fn open(&self, credentials: &Credentials) -> Result<KdbxStore> {
        KdbxStore::open(credentials)
    }
}

/// An unlocked KDBX database. Dropped (and its protected values wiped by
/// the library) at the end of the run.
pub struct KdbxStore {
    db: Database,
}

impl KdbxStore {
    pub fn open(credentials: &Credentials) -> Result<Self> {
        let data = read_file(&credentials.path)?;

        let mut key = DatabaseKey::new().with_password(credentials.password.expose());
        if let Some(keyfile) = &credentials.keyfile {
            let keyfile_data = read_file(keyfile)?;
            key = key
                .with_keyfile(&mut keyfile_data.as_slice())
                .map_err(KdbxEnvError::access)?;
        }

        let db = Database::open(&mut data.as_slice(), key).map_err(|e| {
            tracing::debug!("KDBX unlock failed: {}", e);
            KdbxEnvError::access(e)
        })?;

        Ok(Self { db })
    }
}

/// Read a whole file, keeping the path for the error message
fn read_file(path: &Path) -> Result<Zeroizing<Vec<u8>>> {
    fs::read(path)
        .map(Zeroizing::new)
        .map_err(|e| KdbxEnvError::io(path, e))
}

impl SecretStore for KdbxStore {
    type Group = Group;

    fn root(&self) -> &Group {
        &self.db.root
    }
}

impl SecretGroup for Group {
    type Entry = Entry;

    fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.children.iter().filter_map(|node| match node {
            Node::Entry(entry) => Some(entry),
            Node::Group(_) => None,
        })
    }

    fn groups(&self) -> impl Iterator<Item = &Group> {
        self.children.iter().filter_map(|node| match node {
            Node::Group(group) => Some(group),
            Node::Entry(_) => None,
        })
    }
}

impl SecretEntry for Entry {
    type Field = Value;

    fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    fn label(&self, title_field: &str) -> Option<&str> {
        match self.fields.get(title_field)? {
            Value::Unprotected(title) => Some(title.as_str()),
            _ => None,
        }
    }
}

impl Reveal for Value {
    fn reveal_as_text(&self) -> Zeroizing<String> {
        match self {
            Value::Unprotected(text) => text.reveal_as_text(),
            Value::Protected(secret) => {
                Zeroizing::new(String::from_utf8_lossy(secret.unsecure()).into_owned())
            }
            Value::Bytes(bytes) => Zeroizing::new(String::from_utf8_lossy(bytes).into_owned()),
        }
    }
}
