//! Path-glob classification.
//!
//! Three independent glob sets describe the tree the pipeline produces:
//! what is never copied out of the SDK sources, what counts as
//! machine-generated, and what must stay out of version control.
//!
//! # Pattern syntax
//!
//! Patterns are `/`-separated and matched against relative paths:
//!
//! - `**` matches zero or more whole path segments
//! - `*` matches any run of characters inside a single segment
//! - everything else matches literally
//!
//! A path is covered by a set when the path itself or any of its ancestors
//! matches, so `**/bin` covers `tools/bin/app.dll`.

use serde::{Deserialize, Serialize};

/// A single compiled glob pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glob {
  pattern: String,
  segments: Vec<String>,
}

impl Glob {
  pub fn new(pattern: &str) -> Self {
    let segments = pattern
      .split('/')
      .filter(|s| !s.is_empty())
      .map(str::to_string)
      .collect();
    Self {
      pattern: pattern.to_string(),
      segments,
    }
  }

  pub fn as_str(&self) -> &str {
    &self.pattern
  }

  /// Match a relative, `/`-separated path exactly (ancestors are not considered).
  pub fn matches(&self, path: &str) -> bool {
    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let segments: Vec<&str> = self.segments.iter().map(String::as_str).collect();
    match_segments(&segments, &parts)
  }
}

fn match_segments(pattern: &[&str], path: &[&str]) -> bool {
  match pattern.split_first() {
    None => path.is_empty(),
    Some((&"**", rest)) => (0..=path.len()).any(|skip| match_segments(rest, &path[skip..])),
    Some((seg, rest)) => match path.split_first() {
      Some((part, tail)) => segment_matches(seg, part) && match_segments(rest, tail),
      None => false,
    },
  }
}

/// Match one path segment against a pattern segment containing `*` wildcards.
fn segment_matches(pattern: &str, text: &str) -> bool {
  let parts: Vec<&str> = pattern.split('*').collect();

  if parts.len() == 1 {
    return text == pattern;
  }

  let first = parts[0];
  let last = parts[parts.len() - 1];
  if !text.starts_with(first) || text.len() < first.len() + last.len() || !text.ends_with(last) {
    return false;
  }

  let mut pos = first.len();
  let end = text.len() - last.len();
  for part in &parts[1..parts.len() - 1] {
    match text[pos..end].find(part) {
      Some(found) => pos += found + part.len(),
      None => return false,
    }
  }

  true
}

/// An ordered set of globs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobSet {
  globs: Vec<Glob>,
}

impl GlobSet {
  pub fn new<I, S>(patterns: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    Self {
      globs: patterns.into_iter().map(|p| Glob::new(p.as_ref())).collect(),
    }
  }

  /// Patterns in declaration order.
  pub fn patterns(&self) -> Vec<String> {
    self.globs.iter().map(|g| g.as_str().to_string()).collect()
  }

  /// True if `path` matches any glob exactly.
  pub fn matches(&self, path: &str) -> bool {
    self.globs.iter().any(|g| g.matches(path))
  }

  /// True if `path` or one of its ancestors matches any glob.
  pub fn covers(&self, path: &str) -> bool {
    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    (1..=parts.len()).any(|n| self.matches(&parts[..n].join("/")))
  }
}

/// Default patterns excluded when copying SDK component sources.
pub const DEFAULT_COPY_EXCLUDE: &[&str] = &["**/introspection.json", "**/bin", "**/obj"];

/// Default patterns marking machine-generated output.
pub const DEFAULT_VCS_GENERATED: &[&str] = &["Dagger.SDK*/**"];

/// Default patterns that must not be version-controlled.
pub const DEFAULT_VCS_IGNORED: &[&str] = &["Dagger.SDK*/**", "**/obj", "**/bin", "**/.idea"];

/// The three classification sets, each independently configurable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreSpec {
  /// Excluded when SDK components are copied into the tree.
  pub copy_exclude: Vec<String>,
  /// Machine-generated output.
  pub vcs_generated: Vec<String>,
  /// Never version-controlled.
  pub vcs_ignored: Vec<String>,
}

impl Default for IgnoreSpec {
  fn default() -> Self {
    let owned = |patterns: &[&str]| patterns.iter().map(|p| p.to_string()).collect();
    Self {
      copy_exclude: owned(DEFAULT_COPY_EXCLUDE),
      vcs_generated: owned(DEFAULT_VCS_GENERATED),
      vcs_ignored: owned(DEFAULT_VCS_IGNORED),
    }
  }
}

impl IgnoreSpec {
  pub fn copy_exclude_set(&self) -> GlobSet {
    GlobSet::new(&self.copy_exclude)
  }

  pub fn generated_set(&self) -> GlobSet {
    GlobSet::new(&self.vcs_generated)
  }

  pub fn ignored_set(&self) -> GlobSet {
    GlobSet::new(&self.vcs_ignored)
  }
}
