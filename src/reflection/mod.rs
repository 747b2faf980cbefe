//! Reflection data model and the providers that produce it
//!
//! A snapshot reports classes the way PHP's Reflection API does: the
//! interface list is flattened, and members carry the class that declares
//! them, so inherited members are visible on every subclass. Consumers that
//! want only what a class itself declares filter on `declaring_class`.

pub mod archive;
pub mod engine;

use crate::core::value::{Val, Visibility};
use crate::error::StubError;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Source of extension API snapshots
pub trait IntrospectionProvider {
    /// Names of every extension this provider can describe
    fn extension_names(&self) -> Vec<String>;

    /// Snapshot of one extension, looked up case-insensitively
    ///
    /// Fails with [`StubError::ExtensionNotFound`] for unknown names.
    fn snapshot(&self, extension: &str) -> Result<ExtensionSnapshot, StubError>;
}

/// Local name of a qualified name (`A\B\C` -> `C`)
pub fn short_name(name: &str) -> &str {
    let name = name.trim_start_matches('\\');
    match name.rfind('\\') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

/// Namespace of a qualified name (`A\B\C` -> `A\B`), `None` for global names
pub fn namespace_name(name: &str) -> Option<&str> {
    let name = name.trim_start_matches('\\');
    name.rfind('\\').map(|pos| &name[..pos])
}

/// Class names compare case-insensitively and ignore a leading separator
pub fn same_name(a: &str, b: &str) -> bool {
    a.trim_start_matches('\\')
        .eq_ignore_ascii_case(b.trim_start_matches('\\'))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Trait,
}

/// Named type as reported by `ReflectionNamedType`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub builtin: bool,
}

impl TypeRef {
    pub fn builtin(name: &str) -> Self {
        Self {
            name: name.to_string(),
            nullable: false,
            builtin: true,
        }
    }

    pub fn class(name: &str) -> Self {
        Self {
            name: name.to_string(),
            nullable: false,
            builtin: false,
        }
    }

    pub fn or_null(mut self) -> Self {
        self.nullable = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectedParameter {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<TypeRef>,
    #[serde(default)]
    pub by_reference: bool,
    #[serde(default)]
    pub variadic: bool,
    #[serde(default)]
    pub optional: bool,
    /// `None` on an optional parameter means no default is available
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Val>,
}

/// A `"default": null` key is a null default, not a missing one
fn present_value<'de, D>(deserializer: D) -> Result<Option<Val>, D::Error>
where
    D: Deserializer<'de>,
{
    Val::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectedFunction {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<ReflectedParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<TypeRef>,
    #[serde(default)]
    pub returns_reference: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_comment: Option<String>,
}

impl ReflectedFunction {
    pub fn short_name(&self) -> &str {
        short_name(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectedClassConstant {
    pub name: String,
    pub value: Val,
    /// Absent when the source could not report it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    pub declaring_class: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectedProperty {
    pub name: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(rename = "static", default)]
    pub is_static: bool,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<TypeRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_comment: Option<String>,
    pub declaring_class: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectedMethod {
    pub name: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(rename = "static", default)]
    pub is_static: bool,
    #[serde(rename = "abstract", default)]
    pub is_abstract: bool,
    #[serde(rename = "final", default)]
    pub is_final: bool,
    #[serde(default)]
    pub parameters: Vec<ReflectedParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<TypeRef>,
    #[serde(default)]
    pub returns_reference: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_comment: Option<String>,
    pub declaring_class: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectedClass {
    pub name: String,
    #[serde(default)]
    pub kind: ClassKind,
    #[serde(rename = "abstract", default)]
    pub is_abstract: bool,
    #[serde(rename = "final", default)]
    pub is_final: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Every interface the class satisfies, transitively
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default)]
    pub constants: Vec<ReflectedClassConstant>,
    #[serde(default)]
    pub properties: Vec<ReflectedProperty>,
    #[serde(default)]
    pub methods: Vec<ReflectedMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_comment: Option<String>,
}

impl ReflectedClass {
    pub fn short_name(&self) -> &str {
        short_name(&self.name)
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    /// True when `owner` names this class
    pub fn is_declared_by(&self, owner: &str) -> bool {
        same_name(&self.name, owner)
    }

    pub fn declared_constants(&self) -> impl Iterator<Item = &ReflectedClassConstant> {
        self.constants
            .iter()
            .filter(|c| self.is_declared_by(&c.declaring_class))
    }

    pub fn declared_properties(&self) -> impl Iterator<Item = &ReflectedProperty> {
        self.properties
            .iter()
            .filter(|p| self.is_declared_by(&p.declaring_class))
    }

    pub fn declared_methods(&self) -> impl Iterator<Item = &ReflectedMethod> {
        self.methods
            .iter()
            .filter(|m| self.is_declared_by(&m.declaring_class))
    }
}

/// Everything one extension exposes, captured once per run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionSnapshot {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub constants: IndexMap<String, Val>,
    #[serde(default)]
    pub functions: Vec<ReflectedFunction>,
    #[serde(default)]
    pub classes: Vec<ReflectedClass>,
    /// Classes from other extensions that this extension's hierarchies reach
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<ReflectedClass>,
}

impl ExtensionSnapshot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            constants: IndexMap::new(),
            functions: Vec::new(),
            classes: Vec::new(),
            related: Vec::new(),
        }
    }

    /// Look up a class among the extension's own classes, then the related ones
    pub fn find_class(&self, name: &str) -> Option<&ReflectedClass> {
        self.classes
            .iter()
            .chain(self.related.iter())
            .find(|class| same_name(&class.name, name))
    }
}
