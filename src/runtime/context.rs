use crate::runtime::extension::Extension;
use crate::runtime::registry::ExtensionRegistry;

/// A fully initialised engine: every extension has run MINIT
pub struct EngineContext {
    pub registry: ExtensionRegistry,
}

impl EngineContext {
    /// Engine with the bundled extensions loaded
    pub fn bundled() -> Result<Self, String> {
        EngineBuilder::new().with_bundled_extensions().build()
    }
}

/// Builder for constructing EngineContext with extensions
///
/// # Example
/// ```ignore
/// let engine = EngineBuilder::new()
///     .with_core_extensions()
///     .with_extension(MyExtension)
///     .build()?;
/// ```
pub struct EngineBuilder {
    extensions: Vec<Box<dyn Extension>>,
}

impl EngineBuilder {
    /// Create a new empty builder
    pub fn new() -> Self {
        Self {
            extensions: Vec::new(),
        }
    }

    /// Add an extension to the builder
    pub fn with_extension<E: Extension + 'static>(mut self, ext: E) -> Self {
        self.extensions.push(Box::new(ext));
        self
    }

    /// Add the Core extension (base interfaces, exceptions and errors)
    pub fn with_core_extensions(mut self) -> Self {
        self.extensions
            .push(Box::new(super::core_extension::CoreExtension));
        self
    }

    /// Add every extension shipped with this crate
    ///
    /// Core must come first: the others depend on it.
    pub fn with_bundled_extensions(mut self) -> Self {
        self = self.with_core_extensions();
        self.extensions
            .push(Box::new(super::date_extension::DateExtension));
        self.extensions
            .push(Box::new(super::json_extension::JsonExtension));
        self.extensions
            .push(Box::new(super::example_extension::ExampleExtension));
        self
    }

    /// Build the EngineContext
    ///
    /// This will:
    /// 1. Create an empty registry
    /// 2. Register all extensions (calling MINIT for each, in order)
    /// 3. Return the configured EngineContext
    pub fn build(self) -> Result<EngineContext, String> {
        let mut registry = ExtensionRegistry::new();

        for ext in self.extensions {
            registry.register_extension(ext)?;
        }

        Ok(EngineContext { registry })
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
