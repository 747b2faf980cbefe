use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// One document with a `namespace NS { ... }` block per namespace
    #[default]
    Combined,
    /// One file per namespace and declared name under `output_dir`
    Tree,
}

/// Stub generation settings
///
/// ```
/// use php_stubgen::stubgen::{OutputMode, StubConfig};
///
/// let config = StubConfig {
///     mode: OutputMode::Tree,
///     output_dir: "stubs".into(),
///     ..Default::default()
/// };
/// assert_eq!(config.indent, "\t");
/// ```
#[derive(Debug, Clone)]
pub struct StubConfig {
    /// Indentation used inside class bodies
    pub indent: String,
    pub mode: OutputMode,
    /// Root directory for tree mode
    pub output_dir: PathBuf,
}

impl Default for StubConfig {
    fn default() -> Self {
        Self {
            indent: "\t".to_string(),
            mode: OutputMode::Combined,
            output_dir: PathBuf::from("."),
        }
    }
}
