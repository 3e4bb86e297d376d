// src/writer.rs - Document rendering and persistence
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::config::OutputFormat;
use crate::document::{ConfigDocument, ConfigSection, ConfigValue};
use crate::error::{GeneratorError, Result};

const INDENT: &str = "    ";

/// Render a document in the requested format.
pub fn render(document: &ConfigDocument, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Cfg => Ok(render_cfg(document)),
        OutputFormat::Toml => {
            toml::to_string(document).map_err(|e| GeneratorError::Serialize(e.to_string()))
        }
        OutputFormat::Json => serde_json::to_string_pretty(document)
            .map_err(|e| GeneratorError::Serialize(e.to_string())),
    }
}

/// ConfigObj-style text: `[Section]`, nested `[[Sub]]` blocks, `key = value`.
pub fn render_cfg(document: &ConfigDocument) -> String {
    let mut out = String::new();
    for (name, section) in document.iter() {
        let _ = writeln!(out, "[{name}]");
        write_section(&mut out, section, 1);
    }
    out
}

fn write_section(out: &mut String, section: &ConfigSection, depth: usize) {
    let indent = INDENT.repeat(depth - 1);
    // Scalars first so they stay attached to their own header.
    for (key, value) in section.iter() {
        if matches!(value, ConfigValue::Section(_)) {
            continue;
        }
        let rendered = format_value(value);
        if rendered.is_empty() {
            let _ = writeln!(out, "{indent}{key} = ");
        } else {
            let _ = writeln!(out, "{indent}{key} = {rendered}");
        }
    }
    for (key, value) in section.iter() {
        if let ConfigValue::Section(sub) = value {
            let open = "[".repeat(depth + 1);
            let close = "]".repeat(depth + 1);
            let _ = writeln!(out, "{}{open}{key}{close}", INDENT.repeat(depth));
            write_section(out, sub, depth + 1);
        }
    }
}

fn format_value(value: &ConfigValue) -> String {
    match value {
        ConfigValue::List(items) => items
            .iter()
            .map(format_nested)
            .collect::<Vec<_>>()
            .join(", "),
        ConfigValue::Str(s) => quote(s),
        other => format_nested(other),
    }
}

fn format_nested(value: &ConfigValue) -> String {
    match value {
        ConfigValue::Bool(true) => "True".to_string(),
        ConfigValue::Bool(false) => "False".to_string(),
        ConfigValue::Int(i) => i.to_string(),
        ConfigValue::Float(f) => format_float(*f),
        ConfigValue::Str(s) => quote(s),
        ConfigValue::List(items) => format!(
            "[{}]",
            items.iter().map(format_nested).collect::<Vec<_>>().join(", ")
        ),
        // Sections never appear inside lists.
        ConfigValue::Section(_) => String::new(),
    }
}

/// Floats always carry a decimal point so the runtime reads them back as floats.
fn format_float(f: f64) -> String {
    let s = format!("{f:?}");
    if s.contains(['.', 'e', 'E']) || !f.is_finite() {
        s
    } else {
        format!("{s}.0")
    }
}

fn quote(s: &str) -> String {
    if s.contains('\n') {
        format!("'''{s}'''")
    } else if s.contains('#') || s.starts_with(' ') || s.ends_with(' ') {
        format!("\"{s}\"")
    } else {
        s.to_string()
    }
}

/// Write `contents` to `path` atomically: a temp file in the same directory is
/// flushed, synced, then renamed over the target.
pub fn persist(path: &Path, contents: &str) -> Result<()> {
    let write_err = |source| GeneratorError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(contents.as_bytes()).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    tracing::info!("Written auto-generated default config to {}", path.display());
    Ok(())
}

/// Render and persist in one step.
pub fn write_document(document: &ConfigDocument, path: &Path, format: OutputFormat) -> Result<()> {
    let contents = render(document, format)?;
    persist(path, &contents)
}
