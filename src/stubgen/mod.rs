//! Stub generation pipeline
//!
//! A snapshot is walked in a fixed order (constants, functions, then
//! classes, interfaces and traits), each entry is rendered on its own, and
//! the rendered units are routed into namespace buckets for output.

pub mod config;
pub mod interfaces;
pub mod literal;
pub mod render;
pub mod router;

pub use config::{OutputMode, StubConfig};
pub use render::Renderer;
pub use router::{NamespaceRouter, RenderedUnit};

use crate::core::value::Val;
use crate::error::StubError;
use crate::reflection::{
    namespace_name, ClassKind, ExtensionSnapshot, ReflectedClass, ReflectedFunction,
};
use std::path::PathBuf;
use tracing::debug;

/// One top-level entry of a snapshot
#[derive(Debug, Clone, Copy)]
pub enum Declaration<'a> {
    Constant { name: &'a str, value: &'a Val },
    Function(&'a ReflectedFunction),
    Class(&'a ReflectedClass),
    Interface(&'a ReflectedClass),
    Trait(&'a ReflectedClass),
}

impl<'a> Declaration<'a> {
    pub fn from_class(class: &'a ReflectedClass) -> Self {
        match class.kind {
            ClassKind::Class => Declaration::Class(class),
            ClassKind::Interface => Declaration::Interface(class),
            ClassKind::Trait => Declaration::Trait(class),
        }
    }

    pub fn qualified_name(&self) -> &'a str {
        match *self {
            Declaration::Constant { name, .. } => name,
            Declaration::Function(function) => &function.name,
            Declaration::Class(class)
            | Declaration::Interface(class)
            | Declaration::Trait(class) => {
                &class.name
            }
        }
    }

    pub fn namespace(&self) -> Option<&'a str> {
        namespace_name(self.qualified_name())
    }

    /// File name in tree mode; functions and constants share the extension's file
    pub fn primary_name(&self) -> Option<&'a str> {
        match *self {
            Declaration::Constant { .. } | Declaration::Function(_) => None,
            Declaration::Class(class)
            | Declaration::Interface(class)
            | Declaration::Trait(class) => {
                Some(class.short_name())
            }
        }
    }
}

/// Every declaration of a snapshot in output order
pub fn declarations(snapshot: &ExtensionSnapshot) -> Vec<Declaration<'_>> {
    let constants = snapshot
        .constants
        .iter()
        .map(|(name, value)| Declaration::Constant { name, value });
    let functions = snapshot.functions.iter().map(Declaration::Function);
    let classes = snapshot.classes.iter().map(Declaration::from_class);
    constants.chain(functions).chain(classes).collect()
}

/// What a generation run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubOutput {
    Combined(String),
    Tree(Vec<PathBuf>),
}

pub struct StubGenerator {
    config: StubConfig,
    renderer: Renderer,
}

impl StubGenerator {
    pub fn new(config: StubConfig) -> Self {
        let renderer = Renderer::new(config.indent.clone());
        Self { config, renderer }
    }

    pub fn config(&self) -> &StubConfig {
        &self.config
    }

    pub fn render(
        &self,
        declaration: &Declaration<'_>,
        snapshot: &ExtensionSnapshot,
    ) -> RenderedUnit {
        let text = match declaration {
            Declaration::Constant { name, value } => self.renderer.constant(name, value),
            Declaration::Function(function) => self.renderer.function(function),
            Declaration::Class(class)
            | Declaration::Interface(class)
            | Declaration::Trait(class) => {
                self.renderer.class(class, snapshot)
            }
        };
        RenderedUnit {
            namespace: declaration.namespace().map(str::to_string),
            name: declaration.primary_name().map(str::to_string),
            text,
        }
    }

    /// Render the whole snapshot into namespace buckets
    pub fn route(&self, snapshot: &ExtensionSnapshot) -> NamespaceRouter {
        let mut router = NamespaceRouter::new(snapshot.name.clone());
        for declaration in declarations(snapshot) {
            router.put(self.render(&declaration, snapshot));
        }
        router
    }

    pub fn generate(&self, snapshot: &ExtensionSnapshot) -> Result<StubOutput, StubError> {
        let router = self.route(snapshot);
        debug!(
            extension = %snapshot.name,
            namespaces = router.namespaces().len(),
            global = router.global().len(),
            mode = ?self.config.mode,
            "stubs rendered"
        );
        match self.config.mode {
            OutputMode::Combined => Ok(StubOutput::Combined(router.combined())),
            OutputMode::Tree => router
                .write_tree(&self.config.output_dir)
                .map(StubOutput::Tree),
        }
    }
}

impl Default for StubGenerator {
    fn default() -> Self {
        Self::new(StubConfig::default())
    }
}
