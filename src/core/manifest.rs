//! Requirement manifests: one `name<comparator>version` pin per line, with
//! optional extras, further constraints, an environment marker after `;`,
//! and `#` comments.

use crate::utils::error::{ModelStoreError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Comparators ordered so that longer operators match first.
const COMPARATORS: [&str; 8] = ["===", "==", "~=", "!=", ">=", "<=", ">", "<"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub comparator: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    pub extras: Vec<String>,
    pub comparator: String,
    pub version: String,
    /// Constraints after the first one, e.g. `<2.0` in `>=1.0,<2.0`.
    pub additional: Vec<Constraint>,
    pub marker: Option<String>,
    pub line: usize,
}

impl Requirement {
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Manifest {
    pub path: Option<PathBuf>,
    pub requirements: Vec<Requirement>,
}

impl Manifest {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut manifest = parse_with_origin(&content, &path.display().to_string())?;
        manifest.path = Some(path.to_path_buf());
        Ok(manifest)
    }

    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Requirement> {
        let wanted = normalize_name(name);
        self.requirements
            .iter()
            .find(|r| r.normalized_name() == wanted)
    }
}

static REQUIREMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<name>[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)\s*(?:\[(?P<extras>[^\]]*)\])?\s*(?P<constraints>[=~!<>].*)$",
    )
    .unwrap()
});

static MANIFEST_FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^requirements.*\.txt$").unwrap());

/// PEP 503 style: lowercase with runs of `-`, `_` and `.` collapsed to `-`.
pub fn normalize_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut previous_separator = false;
    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !previous_separator {
                normalized.push('-');
            }
            previous_separator = true;
        } else {
            normalized.push(c.to_ascii_lowercase());
            previous_separator = false;
        }
    }
    normalized
}

pub fn parse_manifest(content: &str) -> Result<Manifest> {
    parse_with_origin(content, "<input>")
}

fn parse_with_origin(content: &str, origin: &str) -> Result<Manifest> {
    let mut requirements = Vec::new();
    for (index, raw) in content.lines().enumerate() {
        let line_number = index + 1;
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }
        let requirement = parse_requirement(line, line_number).map_err(|reason| {
            ModelStoreError::ManifestParseError {
                path: origin.to_string(),
                line: line_number,
                content: raw.trim().to_string(),
                reason,
            }
        })?;
        requirements.push(requirement);
    }
    Ok(Manifest {
        path: None,
        requirements,
    })
}

/// Trailing comments need whitespace before the `#`, or start the line.
fn strip_comment(line: &str) -> &str {
    if line.trim_start().starts_with('#') {
        return "";
    }
    match line.find(" #").or_else(|| line.find("\t#")) {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn parse_requirement(line: &str, line_number: usize) -> std::result::Result<Requirement, String> {
    let (body, marker) = match line.split_once(';') {
        Some((body, marker)) => {
            let marker = marker.trim();
            if marker.is_empty() {
                return Err("empty environment marker".to_string());
            }
            (body.trim(), Some(marker.to_string()))
        }
        None => (line, None),
    };

    let caps = REQUIREMENT_RE
        .captures(body)
        .ok_or_else(|| "expected '<name><comparator><version>'".to_string())?;

    let name = caps["name"].to_string();
    let extras = caps
        .name("extras")
        .map(|m| {
            m.as_str()
                .split(',')
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let mut constraints = caps["constraints"]
        .split(',')
        .map(|part| parse_constraint(part.trim()))
        .collect::<std::result::Result<Vec<_>, _>>()?
        .into_iter();
    let first = constraints
        .next()
        .ok_or_else(|| "missing version constraint".to_string())?;

    Ok(Requirement {
        name,
        extras,
        comparator: first.comparator,
        version: first.version,
        additional: constraints.collect(),
        marker,
        line: line_number,
    })
}

fn parse_constraint(part: &str) -> std::result::Result<Constraint, String> {
    let comparator = COMPARATORS
        .iter()
        .find(|op| part.starts_with(*op))
        .ok_or_else(|| format!("unknown comparator in '{part}'"))?;
    let version = part[comparator.len()..].trim();
    if version.is_empty() {
        return Err(format!("missing version after '{comparator}'"));
    }
    if version.chars().any(char::is_whitespace) {
        return Err(format!("version '{version}' contains whitespace"));
    }
    if COMPARATORS.iter().any(|op| version.starts_with(op)) {
        return Err(format!("unknown comparator in '{part}'"));
    }
    Ok(Constraint {
        comparator: (*comparator).to_string(),
        version: version.to_string(),
    })
}

/// Manifest files (`requirements*.txt`) directly inside `dir`, by name.
pub fn discover_manifests<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut manifests = Vec::new();
    for entry in std::fs::read_dir(dir.as_ref())? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if MANIFEST_FILE_RE.is_match(name) {
                manifests.push(entry.path());
            }
        }
    }
    manifests.sort();
    Ok(manifests)
}
