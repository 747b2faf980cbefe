//! Stub text for single declarations

use super::interfaces::{self, ClassLookup};
use super::literal;
use crate::core::value::Val;
use crate::reflection::{
    short_name, ClassKind, ReflectedClass, ReflectedFunction, ReflectedMethod, ReflectedParameter,
    ReflectedProperty, TypeRef,
};

/// Formats declarations; holds nothing but the body indentation
#[derive(Debug, Clone)]
pub struct Renderer {
    indent: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new("\t")
    }
}

impl Renderer {
    pub fn new(indent: impl Into<String>) -> Self {
        Self {
            indent: indent.into(),
        }
    }

    /// `const NAME = value;` using the local part of `name`
    pub fn constant(&self, name: &str, value: &Val) -> String {
        format!("const {} = {};", short_name(name), literal::export(value))
    }

    pub fn function(&self, function: &ReflectedFunction) -> String {
        let mut output = String::new();
        if let Some(doc) = &function.doc_comment {
            output.push_str(doc);
            output.push('\n');
        }
        output.push_str("function ");
        if function.returns_reference {
            output.push('&');
        }
        output.push_str(function.short_name());
        output.push_str(&self.parameters(&function.parameters));
        if let Some(ty) = &function.return_type {
            output.push_str(" : ");
            output.push_str(&self.type_ref(ty));
        }
        output.push_str(" {}");
        output
    }

    /// Class, interface or trait declaration with its declared members
    pub fn class(&self, class: &ReflectedClass, lookup: &(impl ClassLookup + ?Sized)) -> String {
        let mut output = String::new();
        if let Some(doc) = &class.doc_comment {
            output.push_str(doc);
            output.push('\n');
        }

        match class.kind {
            ClassKind::Interface => output.push_str("interface "),
            ClassKind::Trait => output.push_str("trait "),
            ClassKind::Class => {
                if class.is_abstract {
                    output.push_str("abstract ");
                }
                if class.is_final {
                    output.push_str("final ");
                }
                output.push_str("class ");
            }
        }
        output.push_str(class.short_name());

        if class.kind == ClassKind::Class {
            if let Some(parent) = &class.parent {
                output.push_str(" extends ");
                output.push_str(&qualified(parent));
            }
        }

        let implemented = match class.kind {
            ClassKind::Trait => Vec::new(),
            _ => interfaces::actual_interfaces(class, lookup),
        };
        if !implemented.is_empty() {
            output.push_str(if class.is_interface() {
                " extends "
            } else {
                " implements "
            });
            let names: Vec<String> = implemented.iter().map(|name| qualified(name)).collect();
            output.push_str(&names.join(", "));
        }
        output.push_str(" {\n");

        if !class.is_interface() {
            for used in &class.traits {
                output.push_str(&self.indent);
                output.push_str("use ");
                output.push_str(&qualified(used));
                output.push_str(";\n");
            }
        }

        for constant in class.declared_constants() {
            output.push_str(&self.indent);
            if let (false, Some(visibility)) = (class.is_interface(), constant.visibility) {
                output.push_str(visibility.keyword());
                output.push(' ');
            }
            output.push_str(&self.constant(&constant.name, &constant.value));
            output.push('\n');
        }

        if !class.is_interface() {
            for property in class.declared_properties() {
                output.push_str(&self.property(property));
            }
        }

        for method in class.declared_methods() {
            output.push_str(&self.method(method, class.is_interface()));
        }

        output.push('}');
        output
    }

    /// Indented property line
    pub fn property(&self, property: &ReflectedProperty) -> String {
        let mut output = self.indent.clone();
        if let Some(doc) = &property.doc_comment {
            output.push_str(doc);
            output.push('\n');
            output.push_str(&self.indent);
        }
        output.push_str(property.visibility.keyword());
        output.push(' ');
        if property.is_static {
            output.push_str("static ");
        }
        output.push('$');
        output.push_str(&property.name);
        output.push_str(";\n");
        output
    }

    /// Method preceded by a blank line; abstract and interface methods have no body
    pub fn method(&self, method: &ReflectedMethod, in_interface: bool) -> String {
        let mut output = String::from("\n");
        output.push_str(&self.indent);
        if let Some(doc) = &method.doc_comment {
            output.push_str(doc);
            output.push('\n');
            output.push_str(&self.indent);
        }
        if !in_interface {
            if method.is_abstract {
                output.push_str("abstract ");
            }
            if method.is_final {
                output.push_str("final ");
            }
        }
        output.push_str(method.visibility.keyword());
        output.push(' ');
        if method.is_static {
            output.push_str("static ");
        }
        output.push_str("function ");
        if method.returns_reference {
            output.push('&');
        }
        output.push_str(&method.name);
        output.push_str(&self.parameters(&method.parameters));
        if let Some(ty) = &method.return_type {
            output.push_str(" : ");
            output.push_str(&self.type_ref(ty));
        }
        if method.is_abstract || in_interface {
            output.push_str(";\n");
        } else {
            output.push_str(" {}\n");
        }
        output
    }

    fn parameters(&self, parameters: &[ReflectedParameter]) -> String {
        let rendered: Vec<String> = parameters.iter().map(|p| self.parameter(p)).collect();
        format!("({})", rendered.join(", "))
    }

    pub fn parameter(&self, parameter: &ReflectedParameter) -> String {
        let mut output = String::new();
        if let Some(ty) = &parameter.ty {
            output.push_str(&self.type_ref(ty));
            output.push(' ');
        }
        if parameter.by_reference {
            output.push('&');
        }
        if parameter.variadic {
            output.push_str("...");
        }
        output.push('$');
        output.push_str(&parameter.name);
        if parameter.optional && !parameter.variadic {
            output.push_str(" = ");
            match &parameter.default {
                Some(value) => output.push_str(&literal::export(value)),
                None => output.push_str("null"),
            }
        }
        output
    }

    pub fn type_ref(&self, ty: &TypeRef) -> String {
        let implicitly_nullable =
            ty.name.eq_ignore_ascii_case("mixed") || ty.name.eq_ignore_ascii_case("null");
        let mut output = String::new();
        if ty.nullable && !implicitly_nullable {
            output.push('?');
        }
        if ty.builtin {
            output.push_str(&ty.name);
        } else {
            output.push_str(&qualified(&ty.name));
        }
        output
    }
}

/// Fully qualified reference with exactly one leading separator
fn qualified(name: &str) -> String {
    format!("\\{}", name.trim_start_matches('\\'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Visibility;
    use crate::reflection::ReflectedClassConstant;
    use pretty_assertions::assert_eq;

    fn param(name: &str) -> ReflectedParameter {
        ReflectedParameter {
            name: name.into(),
            ty: None,
            by_reference: false,
            variadic: false,
            optional: false,
            default: None,
        }
    }

    fn method(name: &str, owner: &str) -> ReflectedMethod {
        ReflectedMethod {
            name: name.into(),
            visibility: Visibility::Public,
            is_static: false,
            is_abstract: false,
            is_final: false,
            parameters: Vec::new(),
            return_type: None,
            returns_reference: false,
            doc_comment: None,
            declaring_class: owner.into(),
        }
    }

    fn class(name: &str, kind: ClassKind) -> ReflectedClass {
        ReflectedClass {
            name: name.into(),
            kind,
            is_abstract: false,
            is_final: false,
            parent: None,
            interfaces: Vec::new(),
            traits: Vec::new(),
            constants: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            doc_comment: None,
        }
    }

    #[test]
    fn test_constant_uses_local_name() {
        let renderer = Renderer::default();
        assert_eq!(
            renderer.constant("X\\Y\\VERSION", &Val::string("1.2.3")),
            "const VERSION = '1.2.3';"
        );
        assert_eq!(renderer.constant("E_ALL", &Val::Int(32767)), "const E_ALL = 32767;");
    }

    #[test]
    fn test_types() {
        let renderer = Renderer::default();
        assert_eq!(renderer.type_ref(&TypeRef::builtin("int")), "int");
        assert_eq!(renderer.type_ref(&TypeRef::builtin("int").or_null()), "?int");
        assert_eq!(renderer.type_ref(&TypeRef::builtin("mixed").or_null()), "mixed");
        assert_eq!(renderer.type_ref(&TypeRef::builtin("null").or_null()), "null");
        assert_eq!(renderer.type_ref(&TypeRef::class("\\Foo\\Bar").or_null()), "?\\Foo\\Bar");
        assert_eq!(renderer.type_ref(&TypeRef::class("Countable")), "\\Countable");
    }

    #[test]
    fn test_parameters() {
        let renderer = Renderer::default();
        let mut items = param("items");
        items.ty = Some(TypeRef::builtin("array"));
        items.by_reference = true;
        assert_eq!(renderer.parameter(&items), "array &$items");

        let mut rest = param("rest");
        rest.variadic = true;
        rest.optional = true;
        assert_eq!(renderer.parameter(&rest), "...$rest");

        let mut flags = param("flags");
        flags.ty = Some(TypeRef::builtin("int"));
        flags.optional = true;
        flags.default = Some(Val::Int(0));
        assert_eq!(renderer.parameter(&flags), "int $flags = 0");

        let mut unknown = param("context");
        unknown.optional = true;
        assert_eq!(renderer.parameter(&unknown), "$context = null");
    }

    #[test]
    fn test_function() {
        let function = ReflectedFunction {
            name: "Example\\greet".into(),
            parameters: vec![param("name")],
            return_type: Some(TypeRef::builtin("string")),
            returns_reference: true,
            doc_comment: Some("/** Greets */".into()),
        };
        assert_eq!(
            Renderer::default().function(&function),
            "/** Greets */\nfunction &greet($name) : string {}"
        );
    }

    #[test]
    fn test_class_body_order_and_ownership() {
        let mut base = class("Shapes\\Base", ClassKind::Class);
        base.methods.push(method("area", "Shapes\\Base"));

        let mut circle = class("Shapes\\Circle", ClassKind::Class);
        circle.is_final = true;
        circle.parent = Some("Shapes\\Base".into());
        circle.traits.push("Shapes\\Named".into());
        circle.constants.push(ReflectedClassConstant {
            name: "RATIO".into(),
            value: Val::Float(2.5),
            visibility: Some(Visibility::Public),
            declaring_class: "Shapes\\Circle".into(),
        });
        circle.properties.push(ReflectedProperty {
            name: "count".into(),
            visibility: Visibility::Protected,
            is_static: true,
            ty: None,
            doc_comment: Some("/** @var int */".into()),
            declaring_class: "shapes\\circle".into(),
        });
        let mut radius = method("radius", "Shapes\\Circle");
        radius.return_type = Some(TypeRef::builtin("float"));
        circle.methods.push(radius);
        circle.methods.push(method("area", "Shapes\\Base"));

        let classes = vec![base, circle];
        assert_eq!(
            Renderer::default().class(&classes[1], classes.as_slice()),
            "final class Circle extends \\Shapes\\Base {\n\
             \tuse \\Shapes\\Named;\n\
             \tpublic const RATIO = 2.5;\n\
             \t/** @var int */\n\
             \tprotected static $count;\n\
             \n\
             \tpublic function radius() : float {}\n\
             }"
        );
    }

    #[test]
    fn test_abstract_method_in_class_and_interface() {
        let mut shape = class("Shape", ClassKind::Class);
        shape.is_abstract = true;
        let mut area = method("area", "Shape");
        area.is_abstract = true;
        shape.methods.push(area.clone());

        let mut measurable = class("Measurable", ClassKind::Interface);
        measurable.interfaces.push("Countable".into());
        measurable.constants.push(ReflectedClassConstant {
            name: "UNIT".into(),
            value: Val::string("cm"),
            visibility: Some(Visibility::Public),
            declaring_class: "Measurable".into(),
        });
        area.declaring_class = "Measurable".into();
        measurable.methods.push(area);

        let renderer = Renderer::new("    ");
        let lookup: &[ReflectedClass] = &[];
        assert_eq!(
            renderer.class(&shape, lookup),
            "abstract class Shape {\n\n    abstract public function area();\n}"
        );
        assert_eq!(
            renderer.class(&measurable, lookup),
            "interface Measurable extends \\Countable {\n    const UNIT = 'cm';\n\n    public function area();\n}"
        );
    }
}
