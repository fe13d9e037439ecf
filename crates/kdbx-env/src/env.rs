//! Child process environment composition

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::os::unix::ffi::OsStringExt;
use zeroize::Zeroize;

use crate::resolve::Resolution;

/// A complete set of environment variables for a child process.
///
/// Values are wiped when the environment is dropped, since a composed
/// environment holds revealed secrets.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<OsString, OsString>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current process environment. Taken once; later
    /// changes to the process environment are not seen.
    pub fn capture() -> Self {
        std::env::vars_os().collect()
    }

    pub fn get(&self, key: impl AsRef<OsStr>) -> Option<&OsStr> {
        self.vars.get(key.as_ref()).map(OsString::as_os_str)
    }

    pub fn set(&mut self, key: impl Into<OsString>, value: impl Into<OsString>) {
        let key = key.into();
        let value = value.into();
        if let Some(mut old) = self.vars.insert(key, value) {
            wipe(&mut old);
        }
    }

    pub fn contains(&self, key: impl AsRef<OsStr>) -> bool {
        self.vars.contains_key(key.as_ref())
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }
}

impl<K: Into<OsString>, V: Into<OsString>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut env = Self::new();
        for (k, v) in iter {
            env.set(k, v);
        }
        env
    }
}

impl Drop for Environment {
    fn drop(&mut self) {
        for value in self.vars.values_mut() {
            wipe(value);
        }
    }
}

// Names only
impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.vars.keys()).finish()
    }
}

fn wipe(value: &mut OsString) {
    let mut bytes = std::mem::take(value).into_vec();
    bytes.zeroize();
}

/// Overlay resolved secrets on a base environment.
///
/// Returns a new environment; `base` is left untouched. Secrets replace
/// existing variables of the same name. Names are not validated here.
pub fn compose(base: &Environment, overrides: &Resolution) -> Environment {
    let mut env = base.clone();
    for (name, value) in &overrides.values {
        env.set(name, value.as_str());
    }
    env
}
