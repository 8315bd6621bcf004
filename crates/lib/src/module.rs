//! Module identity.
//!
//! A user supplies a context tree, a raw module name and a subpath. The raw
//! name is normalized once into an identifier that is used verbatim as the
//! project directory, the project name and the C# namespace.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors in the user-supplied module source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleError {
  #[error("module name is empty")]
  EmptyName,

  #[error("module name '{raw}' does not normalize to a valid identifier (got '{normalized}')")]
  InvalidIdentifier { raw: String, normalized: String },

  #[error("invalid source subpath '{0}': must be relative and stay inside the context")]
  InvalidSubpath(String),
}

/// The module as handed over by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSource {
  /// Host directory mounted as the build context.
  pub context_dir: PathBuf,
  /// Raw, user-facing module name.
  pub name: String,
  /// Location of the module sources inside the context.
  pub subpath: String,
}

impl ModuleSource {
  pub fn new(context_dir: impl Into<PathBuf>, name: impl Into<String>, subpath: impl Into<String>) -> Self {
    Self {
      context_dir: context_dir.into(),
      name: name.into(),
      subpath: subpath.into(),
    }
  }

  /// Validate the name and subpath and derive the module descriptor.
  pub fn descriptor(&self) -> Result<ModuleDescriptor, ModuleError> {
    ModuleDescriptor::new(&self.name, &self.subpath)
  }
}

/// Normalized identity of a module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleDescriptor {
  pub raw_name: String,
  pub identifier: String,
  pub subpath: String,
}

impl ModuleDescriptor {
  pub fn new(raw_name: &str, subpath: &str) -> Result<Self, ModuleError> {
    if raw_name.trim().is_empty() {
      return Err(ModuleError::EmptyName);
    }

    let identifier = normalize_identifier(raw_name);
    let starts_ok = identifier.chars().next().is_some_and(|c| c.is_ascii_alphabetic());
    if !starts_ok {
      return Err(ModuleError::InvalidIdentifier {
        raw: raw_name.to_string(),
        normalized: identifier,
      });
    }

    Ok(Self {
      raw_name: raw_name.to_string(),
      identifier,
      subpath: normalize_subpath(subpath)?,
    })
  }
}

/// Camel-case a raw module name into an identifier.
///
/// Words are split on space, `_`, `-` and `.`; the first letter of every word
/// is upper-cased and capitals following a capital are lower-cased (`HTTP`
/// becomes `Http`). Digits are kept and end the current word. Every other
/// character is dropped, so the result only ever contains ASCII alphanumerics.
pub fn normalize_identifier(raw: &str) -> String {
  let raw = raw.trim();
  let mut out = String::with_capacity(raw.len());
  let mut cap_next = true;
  let mut prev_is_cap = false;

  for ch in raw.chars() {
    let is_cap = ch.is_ascii_uppercase();
    let is_low = ch.is_ascii_lowercase();

    let mut c = ch;
    if cap_next {
      c = c.to_ascii_uppercase();
    } else if prev_is_cap && is_cap {
      c = c.to_ascii_lowercase();
    }
    prev_is_cap = is_cap;

    if is_cap || is_low {
      out.push(c);
      cap_next = false;
    } else if ch.is_ascii_digit() {
      out.push(ch);
      cap_next = true;
    } else {
      cap_next = matches!(ch, '_' | ' ' | '-' | '.');
    }
  }

  out
}

/// Reduce a subpath to a clean, `/`-separated relative path.
///
/// `""` and `"."` both mean the context root.
fn normalize_subpath(subpath: &str) -> Result<String, ModuleError> {
  let mut parts = Vec::new();
  for component in Path::new(subpath).components() {
    match component {
      Component::Normal(part) => match part.to_str() {
        Some(part) => parts.push(part),
        None => return Err(ModuleError::InvalidSubpath(subpath.to_string())),
      },
      Component::CurDir => {}
      Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
        return Err(ModuleError::InvalidSubpath(subpath.to_string()));
      }
    }
  }
  Ok(parts.join("/"))
}
