//! Entrypoint templates.
//!
//! Templates are plain text with `{{ .Field }}` actions. The only field is
//! `Module`, the normalized module identifier. Rendering is a pure function of
//! the template and the [`ModuleDescriptor`]; any parse or lookup failure is a
//! packaging defect and is reported as an error rather than left in the output.
//!
//! ```
//! use csmod_lib::template::{render_str, TemplateData};
//!
//! let data = TemplateData { module: "HelloWorld".to_string() };
//! assert_eq!(render_str("namespace {{ .Module }};", &data).unwrap(), "namespace HelloWorld;");
//! ```

mod templates;

use thiserror::Error;

use crate::consts::SOURCE_EXT;
use crate::module::ModuleDescriptor;

pub use templates::{MAIN_MODULE_TEMPLATE, PROGRAM_TEMPLATE};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
  #[error("template {template}: unclosed action at byte {pos}")]
  Unclosed { template: String, pos: usize },

  #[error("template {template}: malformed action '{{{{{action}}}}}'")]
  Malformed { template: String, action: String },

  #[error("template {template}: unknown field '.{field}'")]
  UnknownField { template: String, field: String },
}

/// The two entrypoint templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Template {
  /// Program entry file.
  Program,
  /// Module-root class file.
  MainModule,
}

impl Template {
  pub const ALL: [Template; 2] = [Template::Program, Template::MainModule];

  pub fn name(self) -> &'static str {
    match self {
      Template::Program => "Program.cs",
      Template::MainModule => "MainModule.cs",
    }
  }

  pub fn source(self) -> &'static str {
    match self {
      Template::Program => PROGRAM_TEMPLATE,
      Template::MainModule => MAIN_MODULE_TEMPLATE,
    }
  }

  /// Path of the rendered file, relative to the module's group directory.
  pub fn output_path(self, identifier: &str) -> String {
    match self {
      Template::Program => format!("{identifier}/Program.{SOURCE_EXT}"),
      Template::MainModule => format!("{identifier}/{identifier}.{SOURCE_EXT}"),
    }
  }

  pub fn render(self, module: &ModuleDescriptor) -> Result<String, TemplateError> {
    let data = TemplateData {
      module: module.identifier.clone(),
    };
    render_named(self.name(), self.source(), &data)
  }
}

/// Values available to template actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateData {
  pub module: String,
}

impl TemplateData {
  fn field(&self, name: &str) -> Option<&str> {
    match name {
      "Module" => Some(&self.module),
      _ => None,
    }
  }
}

/// Render an ad-hoc template string.
pub fn render_str(source: &str, data: &TemplateData) -> Result<String, TemplateError> {
  render_named("<inline>", source, data)
}

fn render_named(name: &str, source: &str, data: &TemplateData) -> Result<String, TemplateError> {
  let mut out = String::with_capacity(source.len());
  let mut rest = source;
  let mut offset = 0;

  while let Some(start) = rest.find("{{") {
    out.push_str(&rest[..start]);

    let after_open = &rest[start + 2..];
    let Some(end) = after_open.find("}}") else {
      return Err(TemplateError::Unclosed {
        template: name.to_string(),
        pos: offset + start,
      });
    };

    let action = &after_open[..end];
    out.push_str(eval_action(name, action, data)?);

    let consumed = start + 2 + end + 2;
    rest = &rest[consumed..];
    offset += consumed;
  }

  out.push_str(rest);
  Ok(out)
}

fn eval_action<'a>(name: &str, action: &str, data: &'a TemplateData) -> Result<&'a str, TemplateError> {
  let trimmed = action.trim();
  let field = trimmed
    .strip_prefix('.')
    .filter(|f| !f.is_empty() && f.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
    .ok_or_else(|| TemplateError::Malformed {
      template: name.to_string(),
      action: action.to_string(),
    })?;

  data.field(field).ok_or_else(|| TemplateError::UnknownField {
    template: name.to_string(),
    field: field.to_string(),
  })
}
