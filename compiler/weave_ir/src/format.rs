//! C++ spelling of types.

use crate::{DeclarationGraph, Type, TypeId};

impl DeclarationGraph {
    /// The C++ spelling of a type, as used in generated code and in
    /// holder/registrator keys.
    ///
    /// Declarated types spell as the fully qualified declaration name.
    /// Qualifiers are written postfix (`int const &`).
    pub fn decl_string(&self, ty: TypeId) -> String {
        let mut out = String::new();
        self.write_decl_string(ty, &mut out);
        out
    }

    fn write_decl_string(&self, ty: TypeId, out: &mut String) {
        match self.ty(ty) {
            Type::Fundamental { name, .. } => out.push_str(name),
            Type::Pointer(base) => {
                self.write_decl_string(*base, out);
                // A pointer to a function type already spells as `(*)`.
                if !matches!(self.ty(*base), Type::FreeFunction { .. }) {
                    out.push_str(" *");
                }
            }
            Type::Reference(base) => {
                self.write_decl_string(*base, out);
                out.push_str(" &");
            }
            Type::Cv {
                base,
                is_const,
                is_volatile,
                ..
            } => {
                self.write_decl_string(*base, out);
                if *is_const {
                    out.push_str(" const");
                }
                if *is_volatile {
                    out.push_str(" volatile");
                }
            }
            Type::Array { base, size } => {
                self.write_decl_string(*base, out);
                match size {
                    Some(size) => {
                        out.push('[');
                        out.push_str(&size.to_string());
                        out.push(']');
                    }
                    None => out.push_str("[]"),
                }
            }
            Type::FreeFunction {
                return_type,
                arguments,
                has_ellipsis,
            } => {
                self.write_decl_string(*return_type, out);
                out.push_str(" (*)");
                self.write_argument_list(arguments, *has_ellipsis, out);
            }
            Type::MemberFunction {
                class,
                return_type,
                arguments,
                is_const,
            } => {
                self.write_decl_string(*return_type, out);
                out.push_str(" ( ");
                self.write_decl_string(*class, out);
                out.push_str("::* )");
                self.write_argument_list(arguments, false, out);
                if *is_const {
                    out.push_str(" const");
                }
            }
            Type::MemberVariable { class, variable } => {
                self.write_decl_string(*variable, out);
                out.push(' ');
                self.write_decl_string(*class, out);
                out.push_str("::*");
            }
            Type::Ellipsis => out.push_str("..."),
            Type::Unknown => out.push_str("?unknown?"),
            Type::Declarated(decl) => out.push_str(&self.full_name(*decl)),
        }
    }

    fn write_argument_list(&self, arguments: &[TypeId], has_ellipsis: bool, out: &mut String) {
        if arguments.is_empty() && !has_ellipsis {
            out.push_str("()");
            return;
        }
        out.push_str("( ");
        for (index, arg) in arguments.iter().enumerate() {
            if index > 0 {
                out.push_str(", ");
            }
            self.write_decl_string(*arg, out);
        }
        if has_ellipsis {
            if !arguments.is_empty() {
                out.push_str(", ");
            }
            out.push_str("...");
        }
        out.push_str(" )");
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::test_support::GraphBuilder;
    use crate::Type;

    #[test]
    fn test_compound_spellings() {
        let mut b = GraphBuilder::new();
        let ns = b.namespace(b.global(), "ns");
        let class = b.class(ns, "Widget");
        let int = b.fundamental("int");
        let const_int = b.constant(int);
        let const_int_ref = b.reference(const_int);
        let widget = b.declarated(class);
        let widget_ptr = b.pointer(widget);
        let array = b.add_type(Type::Array {
            base: int,
            size: Some(4),
        });
        let graph = b.build();

        assert_eq!(graph.decl_string(const_int_ref), "int const &");
        assert_eq!(graph.decl_string(widget_ptr), "::ns::Widget *");
        assert_eq!(graph.decl_string(array), "int[4]");
    }

    #[test]
    fn test_function_spellings() {
        let mut b = GraphBuilder::new();
        let class = b.class(b.global(), "C");
        let void = b.fundamental("void");
        let int = b.fundamental("int");
        let owner = b.declarated(class);
        let free = b.add_type(Type::FreeFunction {
            return_type: void,
            arguments: vec![int],
            has_ellipsis: true,
        });
        let free_ptr = b.pointer(free);
        let method = b.add_type(Type::MemberFunction {
            class: owner,
            return_type: int,
            arguments: Vec::new(),
            is_const: true,
        });
        let offset = b.add_type(Type::MemberVariable {
            class: owner,
            variable: int,
        });
        let graph = b.build();

        assert_eq!(graph.decl_string(free_ptr), "void (*)( int, ... )");
        assert_eq!(graph.decl_string(method), "int ( ::C::* )() const");
        assert_eq!(graph.decl_string(offset), "int ::C::*");
    }
}
