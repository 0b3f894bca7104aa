//! Loading templates from YAML files
//!
//! A file holds a YAML sequence of template records. Loading is all-or-nothing:
//! any unreadable file, parse failure, or invalid template fails the whole load.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use cetok_common::yaml::parse_yaml;

use crate::error::LoadError;
use crate::template::{JobTemplate, TemplateSet};

/// Load and validate templates from a single file
pub fn load_template_file(path: &Path) -> Result<TemplateSet, LoadError> {
    if path.is_dir() {
        return Err(LoadError::IsDirectory {
            path: path.to_path_buf(),
        });
    }

    let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let templates = parse_templates(&contents).map_err(|message| LoadError::Parse {
        path: path.to_path_buf(),
        message,
    })?;

    let set = TemplateSet::new(templates).map_err(|(index, source)| LoadError::Invalid {
        path: path.to_path_buf(),
        index,
        source,
    })?;

    debug!(path = %path.display(), templates = set.len(), "loaded template file");
    Ok(set)
}

/// Load and validate templates from every path, in order
pub fn load_templates<P: AsRef<Path>>(paths: &[P]) -> Result<TemplateSet, LoadError> {
    let mut all = TemplateSet::default();
    for path in paths {
        all.extend(load_template_file(path.as_ref())?);
    }

    if all.is_empty() {
        warn!("no job templates loaded; events will not create any jobs");
    } else {
        let names: Vec<&str> = all.iter().map(|t| t.name.as_str()).collect();
        info!(templates = ?names, "loaded job templates");
    }
    Ok(all)
}

fn parse_templates(contents: &str) -> Result<Vec<JobTemplate>, String> {
    match parse_yaml(contents).map_err(|e| e.to_string())? {
        Value::Null => Ok(Vec::new()),
        value => serde_json::from_value(value).map_err(|e| e.to_string()),
    }
}

/// Path of a fixture under this crate's `testdata/` directory
#[cfg(test)]
pub(crate) fn testdata(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata").join(name)
}
