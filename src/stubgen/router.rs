//! Namespace buckets and output emission

use crate::error::StubError;
use indexmap::IndexMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

pub const PHP_HEADER: &str = "<?php\n\n";

/// One rendered declaration and where it belongs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedUnit {
    pub namespace: Option<String>,
    /// Short name of the declared class; `None` for functions and constants
    pub name: Option<String>,
    pub text: String,
}

/// Accumulates rendered units grouped by namespace
#[derive(Debug, Clone)]
pub struct NamespaceRouter {
    extension: String,
    global: Vec<String>,
    /// namespace -> file name -> texts
    namespaces: IndexMap<String, IndexMap<String, Vec<String>>>,
}

impl NamespaceRouter {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            global: Vec::new(),
            namespaces: IndexMap::new(),
        }
    }

    pub fn put(&mut self, unit: RenderedUnit) {
        match unit.namespace {
            None => self.global.push(unit.text),
            Some(namespace) => {
                let name = unit.name.unwrap_or_else(|| self.extension.clone());
                self.namespaces
                    .entry(namespace)
                    .or_default()
                    .entry(name)
                    .or_default()
                    .push(unit.text);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.namespaces.is_empty()
    }

    pub fn global(&self) -> &[String] {
        &self.global
    }

    pub fn namespaces(&self) -> &IndexMap<String, IndexMap<String, Vec<String>>> {
        &self.namespaces
    }

    /// Single document: namespace blocks first, then global declarations
    pub fn combined(&self) -> String {
        let mut output = String::from(PHP_HEADER);
        for (namespace, files) in &self.namespaces {
            let texts: Vec<&str> = files.values().flatten().map(String::as_str).collect();
            output.push_str("namespace ");
            output.push_str(namespace);
            output.push_str(" {\n");
            output.push_str(&texts.join("\n\n"));
            output.push_str("\n}\n\n");
        }
        if !self.global.is_empty() {
            output.push_str(&self.global.join("\n\n"));
            output.push('\n');
        }
        output
    }

    /// Write one file per namespace and name below `root`, returning the paths
    pub fn write_tree(&self, root: &Path) -> Result<Vec<PathBuf>, StubError> {
        let mut written = Vec::new();

        for (namespace, files) in &self.namespaces {
            let mut dir = root.to_path_buf();
            for segment in namespace.split('\\') {
                dir.push(path_segment(segment)?);
            }
            if let Err(err) = fs::create_dir_all(&dir) {
                warn!(dir = %dir.display(), error = %err, "could not create namespace directory");
            }
            for (name, texts) in files {
                let path = dir.join(format!("{}.php", path_segment(name)?));
                let contents = format!(
                    "{PHP_HEADER}namespace {namespace};\n\n{}\n",
                    texts.join("\n\n")
                );
                write_file(&path, &contents)?;
                written.push(path);
            }
        }

        if !self.global.is_empty() {
            let path = root.join(format!("{}.php", path_segment(&self.extension)?));
            let contents = format!("{PHP_HEADER}{}\n", self.global.join("\n\n"));
            write_file(&path, &contents)?;
            written.push(path);
        }

        Ok(written)
    }
}

/// A name that stays a single path component below the output root
fn path_segment(name: &str) -> Result<&str, StubError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains(['/', '\\', '\0']) => Ok(name),
        _ => Err(StubError::UnsafePath(name.to_string())),
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), StubError> {
    fs::write(path, contents).map_err(|source| StubError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = contents.len(), "stub written");
    Ok(())
}
