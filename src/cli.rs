//! The `huml` command line interface.
//!
//! Converts YAML or JSON input to human-friendly YAML, reading stdin or a
//! list of files and writing stdout, a file, or a directory of per-manifest
//! files.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};

use crate::dumper::{self, DumpOptions};
use crate::k8s;
use crate::loader;
use crate::ser::to_value;
use crate::value::Value;

/// Convert YAML or JSON input to human-friendly YAML.
///
/// Reads from stdin and writes to stdout unless --inputs or --output are
/// given.
///
/// Examples:
///   cat config.yaml | huml
///   echo '{"name": "web", "ports": [80, 443]}' | huml -f json
///   kubectl get deployment -o yaml | huml
#[derive(Debug, Parser)]
#[command(name = "huml", version, verbatim_doc_comment)]
struct Args {
    /// Indentation level
    #[arg(long, default_value_t = 2)]
    indent: usize,

    /// Input format
    #[arg(short, long, value_enum, default_value_t = InputFormat::Auto)]
    format: InputFormat,

    /// Comma-delimited list of JSON/YAML file paths to process
    #[arg(short, long)]
    inputs: Option<String>,

    /// Output file or directory path; a trailing path separator means
    /// directory, with one file per document
    #[arg(short, long)]
    output: Option<String>,

    /// Automatically create output directories if they don't exist
    #[arg(long)]
    auto: bool,

    /// Preserve blank lines and comments from YAML input
    #[arg(short = 'P', long)]
    preserve: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    Yaml,
    Json,
    Auto,
}

/// Where a document came from, for deriving output file names.
enum DocumentSource {
    File(PathBuf),
    Stdin(usize),
}

impl DocumentSource {
    fn fallback_name(&self) -> String {
        match self {
            DocumentSource::File(path) => path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "document".to_owned()),
            DocumentSource::Stdin(position) => format!("stdin-{}", position),
        }
    }
}

struct Documents {
    values: Vec<Value>,
    sources: Vec<DocumentSource>,
}

impl Documents {
    fn new() -> Self {
        Documents {
            values: Vec::new(),
            sources: Vec::new(),
        }
    }

    fn push(&mut self, value: Value, source: DocumentSource) {
        self.values.push(value);
        self.sources.push(source);
    }
}

/// Entry point for the `huml` binary.
pub fn run() -> Result<()> {
    execute(Args::parse())
}

fn execute(args: Args) -> Result<()> {
    let documents = match &args.inputs {
        Some(inputs) => read_files(inputs, &args)?,
        None => read_stdin(&args)?,
    };
    if documents.values.is_empty() {
        bail!("no documents to process");
    }

    let options = DumpOptions::new()
        .indent(args.indent)
        .preserve_empty_lines(args.preserve)
        .preserve_comments(args.preserve);

    match &args.output {
        Some(output) => write_output(&documents, output, args.auto, &options),
        None => {
            let text = dumper::to_string_all_with(&documents.values, &options)?;
            print!("{}", text);
            Ok(())
        }
    }
}

fn read_stdin(args: &Args) -> Result<Documents> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;
    if input.trim().is_empty() {
        bail!("no input provided");
    }

    let mut documents = Documents::new();
    let values = parse_content(&input, args.format, args.preserve, None)?;
    for value in values {
        let position = documents.values.len();
        documents.push(value, DocumentSource::Stdin(position));
    }
    Ok(documents)
}

fn read_files(inputs: &str, args: &Args) -> Result<Documents> {
    let mut documents = Documents::new();
    for path in inputs.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let path = Path::new(path);
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        if content.trim().is_empty() {
            continue;
        }
        let format = format_for_file(path, args.format);
        let values = parse_content(&content, format, args.preserve, Some(path))?;
        for value in values {
            documents.push(value, DocumentSource::File(path.to_owned()));
        }
    }
    Ok(documents)
}

/// File extensions override auto-detection; an explicit --format overrides
/// both.
fn format_for_file(path: &Path, format: InputFormat) -> InputFormat {
    if format != InputFormat::Auto {
        return format;
    }
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => InputFormat::Json,
        Some("yaml") | Some("yml") => InputFormat::Yaml,
        _ => InputFormat::Auto,
    }
}

fn parse_content(
    content: &str,
    format: InputFormat,
    preserve: bool,
    path: Option<&Path>,
) -> Result<Vec<Value>> {
    let looks_json = looks_like_json(content) || is_json_lines(content);
    let as_json = match format {
        InputFormat::Json => true,
        InputFormat::Yaml => false,
        InputFormat::Auto => looks_json,
    };
    let described = path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "input".to_owned());

    if as_json {
        parse_json(content).with_context(|| format!("invalid JSON in {}", described))
    } else {
        parse_yaml(content, preserve)
            .map_err(anyhow::Error::new)
            .with_context(|| format!("invalid YAML in {}", described))
    }
}

fn parse_json(content: &str) -> Result<Vec<Value>> {
    if is_json_lines(content) {
        let mut values = Vec::new();
        for (number, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let json: serde_json::Value = serde_json::from_str(line)
                .with_context(|| format!("invalid JSON on line {}", number + 1))?;
            values.push(to_value(&json).map_err(anyhow::Error::new)?);
        }
        return Ok(values);
    }

    let json: serde_json::Value = serde_json::from_str(content)?;
    if let Some(items) = items_array(&json) {
        return items
            .iter()
            .map(|item| to_value(item).map_err(anyhow::Error::new))
            .collect();
    }
    Ok(vec![to_value(&json).map_err(anyhow::Error::new)?])
}

fn parse_yaml(content: &str, preserve: bool) -> crate::error::Result<Vec<Value>> {
    let mut values = if preserve {
        loader::from_str_all_with_formatting(content)?
    } else {
        loader::from_str_all(content)?
    };
    // Multi-document streams drop empty documents, matching kubectl-style
    // input where trailing separators are common.
    if values.len() > 1 {
        values.retain(|value| !value.is_null());
    }
    Ok(values)
}

/// Simple heuristic to detect JSON input.
fn looks_like_json(content: &str) -> bool {
    let text = content.trim();
    (text.starts_with('{') && text.ends_with('}'))
        || (text.starts_with('[') && text.ends_with(']'))
}

/// JSON Lines: more than one non-empty line, each of which looks like JSON.
fn is_json_lines(content: &str) -> bool {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    lines.len() > 1 && lines.iter().all(|line| looks_like_json(line))
}

/// A JSON object with an `items` array of objects is unwrapped into one
/// document per item, the shape `kubectl get -o json` produces.
fn items_array(json: &serde_json::Value) -> Option<&Vec<serde_json::Value>> {
    let items = json.as_object()?.get("items")?.as_array()?;
    if !items.is_empty() && items.iter().any(|item| item.is_object()) {
        Some(items)
    } else {
        None
    }
}

fn write_output(
    documents: &Documents,
    output: &str,
    auto: bool,
    options: &DumpOptions,
) -> Result<()> {
    let is_directory = output.ends_with('/') || output.ends_with(std::path::MAIN_SEPARATOR);
    if is_directory {
        write_directory(documents, output, auto, options)
    } else {
        let path = Path::new(output);
        if auto {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("failed to create directories for {}", path.display())
                    })?;
                    eprintln!("Created parent directories for: {}", path.display());
                }
            }
        }
        let text = dumper::to_string_all_with(&documents.values, options)?;
        fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
    }
}

fn write_directory(
    documents: &Documents,
    output: &str,
    auto: bool,
    options: &DumpOptions,
) -> Result<()> {
    let dir = Path::new(output.trim_end_matches(|c| c == '/' || c == std::path::MAIN_SEPARATOR));
    if !dir.exists() {
        if auto {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create directory {}", dir.display()))?;
            eprintln!("Created directory: {}", dir.display());
        } else {
            bail!("directory does not exist: {}", dir.display());
        }
    }

    for (value, source) in documents.values.iter().zip(&documents.sources) {
        let filename = k8s::manifest_filename(value, &source.fallback_name());
        let mut path = dir.join(&filename);
        let base = filename.trim_end_matches(".yaml").to_owned();
        let mut counter = 1;
        while path.exists() {
            path = dir.join(format!("{}-{}.yaml", base, counter));
            counter += 1;
        }
        let text = dumper::to_string_with(value, options)?;
        fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_json_shapes() {
        assert!(looks_like_json("{\"a\": 1}"));
        assert!(looks_like_json(" [1, 2] "));
        assert!(!looks_like_json("a: 1"));
        assert!(!looks_like_json("{\"a\": 1} trailing"));
    }

    #[test]
    fn detects_json_lines() {
        assert!(is_json_lines("{\"a\": 1}\n{\"b\": 2}\n"));
        assert!(!is_json_lines("{\"a\": 1}\n"));
        assert!(!is_json_lines("{\"a\": 1}\nnot json\n"));
    }

    #[test]
    fn unwraps_items_arrays() {
        let json: serde_json::Value =
            serde_json::from_str("{\"items\": [{\"kind\": \"Pod\"}, {\"kind\": \"Job\"}]}")
                .unwrap();
        assert_eq!(items_array(&json).map(Vec::len), Some(2));

        let scalar_items: serde_json::Value =
            serde_json::from_str("{\"items\": [1, 2, 3]}").unwrap();
        assert!(items_array(&scalar_items).is_none());
    }

    #[test]
    fn json_documents_become_values() {
        let values = parse_json("{\"name\": \"web\", \"ports\": [80, 443]}").unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(
            values[0].get("name"),
            Some(&Value::String("web".to_owned()))
        );
    }

    #[test]
    fn multi_document_yaml_drops_empty_documents() {
        let values = parse_yaml("a: 1\n---\n---\nb: 2\n", false).unwrap();
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn file_extension_wins_detection() {
        assert_eq!(
            format_for_file(Path::new("x.json"), InputFormat::Auto),
            InputFormat::Json
        );
        assert_eq!(
            format_for_file(Path::new("x.yml"), InputFormat::Auto),
            InputFormat::Yaml
        );
        assert_eq!(
            format_for_file(Path::new("x.json"), InputFormat::Yaml),
            InputFormat::Yaml
        );
    }
}
