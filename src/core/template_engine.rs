// src/core/template_engine.rs
//! Minimal text template language for typeset documents.
//!
//! Tags use `<<` and `>>` so they never collide with LaTeX braces:
//!
//! - `<<contact.name>>` interpolates a value through the escape filter
//! - `<<#each experience>> ... <</each>>` repeats for every array element;
//!   `<<.>>` is the current element and lookups fall back to outer scopes
//! - `<<#if summary>> ... <<else>> ... <</if>>` renders on truthy values
//!   (non-empty strings and arrays, `true`, numbers, objects)

use serde_json::Value;
use thiserror::Error;

const OPEN: &str = "<<";
const CLOSE: &str = ">>";

#[derive(Debug, Error, PartialEq)]
pub enum TemplateError {
    #[error("failed to parse template '{template}' at line {line}: {message}")]
    Parse {
        template: String,
        line: usize,
        message: String,
    },

    #[error("failed to execute template '{template}': {message}")]
    Render { template: String, message: String },
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Var(String),
    Each { path: String, body: Vec<Node> },
    If {
        path: String,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
}

enum BlockKind {
    Root,
    Each(String),
    If(String),
}

struct Block {
    kind: BlockKind,
    line: usize,
    nodes: Vec<Node>,
    otherwise: Option<Vec<Node>>,
}

impl Block {
    fn new(kind: BlockKind, line: usize) -> Self {
        Self {
            kind,
            line,
            nodes: Vec::new(),
            otherwise: None,
        }
    }

    fn push(&mut self, node: Node) {
        match self.otherwise.as_mut() {
            Some(otherwise) => otherwise.push(node),
            None => self.nodes.push(node),
        }
    }
}

/// A parsed template, ready to render against any JSON-shaped context
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    nodes: Vec<Node>,
}

impl Template {
    pub fn parse(name: &str, source: &str) -> Result<Self, TemplateError> {
        let parse_error = |line: usize, message: String| TemplateError::Parse {
            template: name.to_string(),
            line,
            message,
        };

        let mut stack = vec![Block::new(BlockKind::Root, 1)];
        let mut rest = source;
        let mut line = 1;

        while let Some(start) = rest.find(OPEN) {
            let (text, after_text) = rest.split_at(start);
            if !text.is_empty() {
                push_node(&mut stack, Node::Text(text.to_string()));
            }
            line += text.matches('\n').count();

            let after_open = &after_text[OPEN.len()..];
            let end = after_open
                .find(CLOSE)
                .ok_or_else(|| parse_error(line, "unclosed tag".to_string()))?;
            let raw_tag = &after_open[..end];
            let tag = raw_tag.trim();
            let tag_line = line;
            line += raw_tag.matches('\n').count();
            rest = &after_open[end + CLOSE.len()..];

            if let Some(path) = tag.strip_prefix("#each ") {
                let path = validate_path(path.trim()).map_err(|m| parse_error(tag_line, m))?;
                stack.push(Block::new(BlockKind::Each(path), tag_line));
            } else if let Some(path) = tag.strip_prefix("#if ") {
                let path = validate_path(path.trim()).map_err(|m| parse_error(tag_line, m))?;
                stack.push(Block::new(BlockKind::If(path), tag_line));
            } else if tag == "else" {
                let block = stack.last_mut().filter(|b| matches!(b.kind, BlockKind::If(_)));
                match block {
                    Some(block) if block.otherwise.is_none() => block.otherwise = Some(Vec::new()),
                    Some(_) => return Err(parse_error(tag_line, "duplicate <<else>>".to_string())),
                    None => {
                        return Err(parse_error(
                            tag_line,
                            "<<else>> outside of an #if block".to_string(),
                        ))
                    }
                }
            } else if tag == "/each" || tag == "/if" {
                let block = match stack.pop() {
                    Some(block) if !matches!(block.kind, BlockKind::Root) => block,
                    _ => {
                        return Err(parse_error(
                            tag_line,
                            format!("unexpected <<{}>>", tag),
                        ))
                    }
                };
                let node = match (block.kind, tag) {
                    (BlockKind::Each(path), "/each") => Node::Each {
                        path,
                        body: block.nodes,
                    },
                    (BlockKind::If(path), "/if") => Node::If {
                        path,
                        then: block.nodes,
                        otherwise: block.otherwise.unwrap_or_default(),
                    },
                    _ => {
                        return Err(parse_error(
                            tag_line,
                            format!(
                                "<<{}>> does not close the block opened at line {}",
                                tag, block.line
                            ),
                        ))
                    }
                };
                push_node(&mut stack, node);
            } else if tag.starts_with('#') || tag.starts_with('/') {
                return Err(parse_error(tag_line, format!("unknown block tag <<{}>>", tag)));
            } else {
                let path = validate_path(tag).map_err(|m| parse_error(tag_line, m))?;
                push_node(&mut stack, Node::Var(path));
            }
        }

        if !rest.is_empty() {
            push_node(&mut stack, Node::Text(rest.to_string()));
        }

        if stack.len() > 1 {
            let open = stack.last().map(|b| b.line).unwrap_or(line);
            return Err(parse_error(
                open,
                "block opened here is never closed".to_string(),
            ));
        }

        let root = stack.pop().map(|b| b.nodes).unwrap_or_default();
        Ok(Self {
            name: name.to_string(),
            nodes: root,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render against `context`, passing every interpolated value through `escape`.
    /// Nothing is returned unless the whole template renders.
    pub fn render(&self, context: &Value, escape: fn(&str) -> String) -> Result<String, TemplateError> {
        let mut out = String::new();
        let mut scopes = vec![context];
        self.render_nodes(&self.nodes, &mut scopes, escape, &mut out)?;
        Ok(out)
    }

    fn render_nodes<'v>(
        &self,
        nodes: &[Node],
        scopes: &mut Vec<&'v Value>,
        escape: fn(&str) -> String,
        out: &mut String,
    ) -> Result<(), TemplateError> {
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Var(path) => {
                    let value = lookup(scopes, path)
                        .ok_or_else(|| self.render_error(format!("no value for '{}'", path)))?;
                    let text = scalar_text(value).ok_or_else(|| {
                        self.render_error(format!("'{}' is not a printable value", path))
                    })?;
                    out.push_str(&escape(&text));
                }
                Node::Each { path, body } => {
                    let value = lookup(scopes, path)
                        .ok_or_else(|| self.render_error(format!("no list for '{}'", path)))?;
                    let items = match value {
                        Value::Array(items) => items.as_slice(),
                        Value::Null => &[],
                        _ => {
                            return Err(self.render_error(format!("'{}' is not a list", path)))
                        }
                    };
                    for item in items {
                        scopes.push(item);
                        let result = self.render_nodes(body, scopes, escape, out);
                        scopes.pop();
                        result?;
                    }
                }
                Node::If {
                    path,
                    then,
                    otherwise,
                } => {
                    let branch = if lookup(scopes, path).is_some_and(is_truthy) {
                        then
                    } else {
                        otherwise
                    };
                    self.render_nodes(branch, scopes, escape, out)?;
                }
            }
        }
        Ok(())
    }

    fn render_error(&self, message: String) -> TemplateError {
        TemplateError::Render {
            template: self.name.clone(),
            message,
        }
    }
}

fn push_node(stack: &mut [Block], node: Node) {
    if let Some(block) = stack.last_mut() {
        block.push(node);
    }
}

fn validate_path(path: &str) -> Result<String, String> {
    if path.is_empty() {
        return Err("empty tag".to_string());
    }
    if path == "." {
        return Ok(path.to_string());
    }
    let valid = path.split('.').all(|segment| {
        !segment.is_empty()
            && segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
    });
    if valid {
        Ok(path.to_string())
    } else {
        Err(format!("invalid variable name '{}'", path))
    }
}

/// Resolve a dotted path, innermost scope first
fn lookup<'v>(scopes: &[&'v Value], path: &str) -> Option<&'v Value> {
    if path == "." {
        return scopes.last().copied();
    }

    let mut segments = path.split('.');
    let first = segments.next()?;
    let root = scopes.iter().rev().find_map(|scope| scope.get(first))?;
    segments.try_fold(root, |value, segment| value.get(segment))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Number(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn identity(s: &str) -> String {
        s.to_string()
    }

    fn upper(s: &str) -> String {
        s.to_uppercase()
    }

    #[test]
    fn test_variables_are_escaped_but_text_is_not() {
        let template = Template::parse("t", "\\textbf{<<name>>} & <<role>>").unwrap();
        let out = template
            .render(&json!({"name": "ada", "role": "eng"}), upper)
            .unwrap();
        assert_eq!(out, "\\textbf{ADA} & ENG");
    }

    #[test]
    fn test_each_with_outer_scope_fallback() {
        let template =
            Template::parse("t", "<<#each items>>[<<.>>/<<suffix>>]<</each>>").unwrap();
        let out = template
            .render(&json!({"items": ["a", "b"], "suffix": "z"}), identity)
            .unwrap();
        assert_eq!(out, "[a/z][b/z]");
    }

    #[test]
    fn test_nested_each_over_objects() {
        let template = Template::parse(
            "t",
            "<<#each jobs>><<title>>:<<#each bullets>> <<.>><</each>>;<</each>>",
        )
        .unwrap();
        let ctx = json!({"jobs": [
            {"title": "A", "bullets": ["x", "y"]},
            {"title": "B", "bullets": []}
        ]});
        assert_eq!(template.render(&ctx, identity).unwrap(), "A: x y;B:;");
    }

    #[test]
    fn test_if_else_truthiness() {
        let template = Template::parse("t", "<<#if v>>yes<<else>>no<</if>>").unwrap();
        for (value, expected) in [
            (json!(""), "no"),
            (json!("x"), "yes"),
            (json!([]), "no"),
            (json!([1]), "yes"),
            (json!(false), "no"),
            (json!(null), "no"),
        ] {
            assert_eq!(template.render(&json!({ "v": value }), identity).unwrap(), expected);
        }
        assert_eq!(template.render(&json!({}), identity).unwrap(), "no");
    }

    #[test]
    fn test_parse_errors_report_line() {
        let err = Template::parse("t", "line one\n<<#each xs>>\nno end").unwrap_err();
        assert_eq!(
            err,
            TemplateError::Parse {
                template: "t".to_string(),
                line: 2,
                message: "block opened here is never closed".to_string(),
            }
        );

        assert!(matches!(
            Template::parse("t", "<<#if a>><</each>>"),
            Err(TemplateError::Parse { .. })
        ));
        assert!(matches!(
            Template::parse("t", "<<name"),
            Err(TemplateError::Parse { .. })
        ));
        assert!(matches!(
            Template::parse("t", "<<#loop xs>><</loop>>"),
            Err(TemplateError::Parse { .. })
        ));
        assert!(matches!(
            Template::parse("t", "<<else>>"),
            Err(TemplateError::Parse { .. })
        ));
        assert!(matches!(
            Template::parse("t", "<<bad name>>"),
            Err(TemplateError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_variable_is_a_render_error() {
        let template = Template::parse("t", "hello <<missing>>").unwrap();
        let err = template.render(&json!({}), identity).unwrap_err();
        assert!(matches!(err, TemplateError::Render { .. }));
    }

    #[test]
    fn test_each_over_scalar_is_a_render_error() {
        let template = Template::parse("t", "<<#each name>>x<</each>>").unwrap();
        let err = template.render(&json!({"name": "ada"}), identity).unwrap_err();
        assert!(err.to_string().contains("is not a list"));
    }
}
