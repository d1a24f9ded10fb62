//! @acp:module "Go Parser"
//! @acp:summary "Parser capability backed by the tree-sitter Go grammar"
//! @acp:domain analysis
//! @acp:layer parser
//!
//! Turns Go source bytes into a [`SyntaxTree`]. Comments are always
//! retained. A tree containing any ERROR or MISSING node is rejected, so a
//! caller never sees a partial tree.

use std::sync::LazyLock;

use tree_sitter::{Language, Node, Parser as TsParser};

use super::{Comment, CommentGroup, Decl, GenKind, Spec, SyntaxTree, TypeExpr};
use crate::error::{BuildTagError, Result};

static GO_LANGUAGE: LazyLock<Language> = LazyLock::new(|| tree_sitter_go::LANGUAGE.into());

/// Parser capability: bytes in, syntax tree out
pub trait SourceParser: Send + Sync {
    /// Parse `src`, read from `path`, keeping all comments
    fn parse(&self, path: &str, src: &[u8]) -> Result<SyntaxTree>;
}

/// @acp:summary "Go source parser"
#[derive(Debug, Default, Clone, Copy)]
pub struct GoParser;

impl GoParser {
    pub fn new() -> Self {
        Self
    }
}

impl SourceParser for GoParser {
    fn parse(&self, path: &str, src: &[u8]) -> Result<SyntaxTree> {
        let source = std::str::from_utf8(src).map_err(|err| BuildTagError::Parse {
            path: path.to_string(),
            message: format!("invalid UTF-8 encoding at byte {}", err.valid_up_to()),
        })?;

        let mut parser = TsParser::new();
        parser.set_language(&GO_LANGUAGE)?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| BuildTagError::Parse {
                path: path.to_string(),
                message: "failed to parse".to_string(),
            })?;

        let root = tree.root_node();
        if root.has_error() {
            let message = match first_error(root) {
                Some(node) => {
                    let pos = node.start_position();
                    format!("syntax error at {}:{}", pos.row + 1, pos.column + 1)
                }
                None => "syntax error in source".to_string(),
            };
            return Err(BuildTagError::Parse {
                path: path.to_string(),
                message,
            });
        }

        let ctx = ReadContext::new(source);
        Ok(ctx.read_file(path, root))
    }
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() || child.is_missing() {
            if let Some(found) = first_error(child) {
                return Some(found);
            }
        }
    }
    None
}

struct ReadContext<'a> {
    source: &'a str,
}

impl<'a> ReadContext<'a> {
    fn new(source: &'a str) -> Self {
        Self { source }
    }

    fn node_text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn field_text(&self, node: Node, field: &str) -> Option<String> {
        node.child_by_field_name(field)
            .map(|n| self.node_text(n).to_string())
    }

    fn read_file(&self, path: &str, root: Node) -> SyntaxTree {
        let mut package = None;
        let mut decls = Vec::new();

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "package_clause" => package = self.read_package(child),
                "function_declaration" => {
                    if let Some(name) = self.field_text(child, "name") {
                        decls.push(Decl::Func {
                            name,
                            receiver: None,
                        });
                    }
                }
                "method_declaration" => {
                    if let Some(name) = self.field_text(child, "name") {
                        let receiver = child
                            .child_by_field_name("receiver")
                            .map(|list| self.read_receiver(list));
                        decls.push(Decl::Func { name, receiver });
                    }
                }
                "import_declaration" => decls.push(Decl::Gen {
                    kind: GenKind::Import,
                    specs: self.read_imports(child),
                }),
                "type_declaration" => decls.push(Decl::Gen {
                    kind: GenKind::Type,
                    specs: self.read_types(child),
                }),
                "const_declaration" => decls.push(Decl::Gen {
                    kind: GenKind::Const,
                    specs: self.read_values(child, "const_spec"),
                }),
                "var_declaration" => decls.push(Decl::Gen {
                    kind: GenKind::Var,
                    specs: self.read_values(child, "var_spec"),
                }),
                _ => {}
            }
        }

        SyntaxTree {
            path: path.to_string(),
            package,
            comments: self.read_comments(root),
            decls,
        }
    }

    fn read_package(&self, clause: Node) -> Option<String> {
        let mut cursor = clause.walk();
        let name = clause
            .named_children(&mut cursor)
            .find(|n| n.kind() == "package_identifier")
            .map(|n| self.node_text(n).to_string());
        name
    }

    fn read_imports(&self, decl: Node) -> Vec<Spec> {
        spec_nodes(decl, &["import_spec"])
            .into_iter()
            .filter_map(|spec| self.field_text(spec, "path"))
            .map(|path| Spec::Import {
                path: path.trim_matches(|c| c == '"' || c == '`').to_string(),
            })
            .collect()
    }

    fn read_types(&self, decl: Node) -> Vec<Spec> {
        spec_nodes(decl, &["type_spec", "type_alias"])
            .into_iter()
            .filter_map(|spec| self.field_text(spec, "name"))
            .map(|name| Spec::Type { name })
            .collect()
    }

    fn read_values(&self, decl: Node, kind: &str) -> Vec<Spec> {
        spec_nodes(decl, &[kind])
            .into_iter()
            .map(|spec| {
                let mut cursor = spec.walk();
                let names = spec
                    .children_by_field_name("name", &mut cursor)
                    .filter(|n| n.kind() == "identifier")
                    .map(|n| self.node_text(n).to_string())
                    .collect();
                Spec::Value { names }
            })
            .collect()
    }

    // First receiver parameter's type, like `a A` or `l *List[T]`
    fn read_receiver(&self, list: Node) -> TypeExpr {
        let mut cursor = list.walk();
        let param = list.named_children(&mut cursor).find(|n| {
            matches!(
                n.kind(),
                "parameter_declaration" | "variadic_parameter_declaration"
            )
        });
        match param.and_then(|p| p.child_by_field_name("type")) {
            Some(ty) => self.read_type(ty),
            None => TypeExpr::Unsupported(list.kind().to_string()),
        }
    }

    fn read_type(&self, node: Node) -> TypeExpr {
        match node.kind() {
            "type_identifier" | "identifier" => TypeExpr::Ident(self.node_text(node).to_string()),
            "pointer_type" => match node.named_child(0) {
                Some(inner) => TypeExpr::Pointer(Box::new(self.read_type(inner))),
                None => TypeExpr::Unsupported(node.kind().to_string()),
            },
            "parenthesized_type" => match node.named_child(0) {
                Some(inner) => TypeExpr::Paren(Box::new(self.read_type(inner))),
                None => TypeExpr::Unsupported(node.kind().to_string()),
            },
            "qualified_type" => {
                match (
                    self.field_text(node, "package"),
                    self.field_text(node, "name"),
                ) {
                    (Some(package), Some(name)) => TypeExpr::Qualified { package, name },
                    _ => TypeExpr::Unsupported(node.kind().to_string()),
                }
            }
            "generic_type" => {
                let base = node.child_by_field_name("type");
                let args = node.child_by_field_name("type_arguments");
                match (base, args) {
                    (Some(base), Some(args)) => {
                        let mut cursor = args.walk();
                        let args = args
                            .named_children(&mut cursor)
                            .map(|arg| self.read_type_arg(arg))
                            .collect();
                        TypeExpr::Generic {
                            base: Box::new(self.read_type(base)),
                            args,
                        }
                    }
                    _ => TypeExpr::Unsupported(node.kind().to_string()),
                }
            }
            other => TypeExpr::Unsupported(other.to_string()),
        }
    }

    // Type arguments may be wrapped in a `type_elem` node
    fn read_type_arg(&self, node: Node) -> TypeExpr {
        if node.kind() != "type_elem" {
            return self.read_type(node);
        }
        if node.named_child_count() == 1 {
            if let Some(inner) = node.named_child(0) {
                return self.read_type(inner);
            }
        }
        TypeExpr::Unsupported(node.kind().to_string())
    }

    fn read_comments(&self, root: Node) -> Vec<CommentGroup> {
        let mut found = Vec::new();
        collect_comments(root, &mut found);

        let mut groups: Vec<CommentGroup> = Vec::new();
        let mut last_end_row: Option<usize> = None;
        for node in found {
            let start_row = node.start_position().row;
            let comment = Comment {
                text: self.node_text(node).to_string(),
                line: start_row + 1,
            };
            let adjacent = last_end_row.is_some_and(|end| start_row <= end + 1);
            match groups.last_mut() {
                Some(group) if adjacent => group.list.push(comment),
                _ => groups.push(CommentGroup {
                    list: vec![comment],
                }),
            }
            last_end_row = Some(node.end_position().row);
        }
        groups
    }
}

fn collect_comments<'t>(node: Node<'t>, out: &mut Vec<Node<'t>>) {
    if node.kind() == "comment" {
        out.push(node);
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_comments(child, out);
    }
}

// Specs of a declaration, flattening parenthesized `*_spec_list` nodes
fn spec_nodes<'t>(decl: Node<'t>, kinds: &[&str]) -> Vec<Node<'t>> {
    let mut specs = Vec::new();
    let mut cursor = decl.walk();
    for child in decl.named_children(&mut cursor) {
        if kinds.contains(&child.kind()) {
            specs.push(child);
        } else if child.kind().ends_with("_spec_list") {
            specs.extend(spec_nodes(child, kinds));
        }
    }
    specs
}
