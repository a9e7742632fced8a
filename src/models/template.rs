use std::collections::HashMap;

use crate::error::{PipelineError, Result};
use crate::models::PipelineState;

/// A parsed piece of template text
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

/// Prompt text with `{name}` placeholders
///
/// `{{` and `}}` render as literal braces. Substituted values are inserted
/// verbatim and are never scanned for placeholders themselves.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    segments: Vec<Segment>,
    /// Required variables in order of first appearance
    variables: Vec<String>,
}

impl PromptTemplate {
    /// Parse a template, collecting its required variables
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        let segments = parse(&template)?;

        let mut variables: Vec<String> = Vec::new();
        for segment in &segments {
            if let Segment::Variable(name) = segment {
                if !variables.contains(name) {
                    variables.push(name.clone());
                }
            }
        }

        Ok(Self {
            template,
            segments,
            variables,
        })
    }

    /// Raw template text
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Required variable names, in order of first appearance
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Render against the pipeline state
    pub fn render(&self, state: &PipelineState) -> Result<String> {
        self.render_from(|name| state.get(name))
    }

    /// Render against an ad-hoc variable map
    pub fn render_with(&self, values: &HashMap<String, String>) -> Result<String> {
        self.render_from(|name| values.get(name).map(String::as_str))
    }

    fn render_from<'a>(&self, lookup: impl Fn(&str) -> Option<&'a str>) -> Result<String> {
        // Resolve everything first so a missing variable never yields partial output
        let mut resolved = HashMap::with_capacity(self.variables.len());
        for name in &self.variables {
            let value = lookup(name).ok_or_else(|| PipelineError::missing(name.as_str()))?;
            resolved.insert(name.as_str(), value);
        }

        let mut output = String::with_capacity(self.template.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Variable(name) => output.push_str(resolved[name.as_str()]),
            }
        }
        Ok(output)
    }
}

fn parse(template: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' if chars.peek().map(|&(_, n)| n) == Some('{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek().map(|&(_, n)| n) == Some('}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for (_, n) in chars.by_ref() {
                    match n {
                        '}' => {
                            closed = true;
                            break;
                        }
                        '{' => {
                            return Err(PipelineError::InvalidTemplate(format!(
                                "nested '{{' in placeholder starting at byte {}",
                                pos
                            )));
                        }
                        _ => name.push(n),
                    }
                }
                if !closed {
                    return Err(PipelineError::InvalidTemplate(format!(
                        "unclosed placeholder starting at byte {}",
                        pos
                    )));
                }
                if !is_identifier(&name) {
                    return Err(PipelineError::InvalidTemplate(format!(
                        "invalid placeholder name '{}' at byte {}",
                        name, pos
                    )));
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Variable(name));
            }
            '}' => {
                return Err(PipelineError::InvalidTemplate(format!(
                    "unmatched '}}' at byte {}",
                    pos
                )));
            }
            _ => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(pairs: &[(&str, &str)]) -> PipelineState {
        let mut state = PipelineState::new();
        for (k, v) in pairs {
            state.insert(*k, *v).unwrap();
        }
        state
    }

    #[test]
    fn test_variables_in_first_appearance_order() {
        let t = PromptTemplate::new("{b} then {a} then {b} again").unwrap();
        assert_eq!(t.variables(), &["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_render_all_present() {
        let t = PromptTemplate::new("Question: {question}\nAnswer:").unwrap();
        let out = t.render(&state(&[("question", "2+2?")])).unwrap();
        assert_eq!(out, "Question: 2+2?\nAnswer:");
    }

    #[test]
    fn test_render_ignores_extra_state() {
        let t = PromptTemplate::new("{a}").unwrap();
        let out = t.render(&state(&[("a", "x"), ("b", "y")])).unwrap();
        assert_eq!(out, "x");
    }

    #[test]
    fn test_missing_variable_fails_without_partial_output() {
        let t = PromptTemplate::new("{a} and {b}").unwrap();
        let err = t.render(&state(&[("a", "x")])).unwrap_err();
        match err {
            PipelineError::MissingVariable { variable } => assert_eq!(variable, "b"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_escaped_braces() {
        let t = PromptTemplate::new("{{literal}} {x} }}").unwrap();
        assert_eq!(t.variables(), &["x".to_string()]);
        let out = t.render(&state(&[("x", "1")])).unwrap();
        assert_eq!(out, "{literal} 1 }");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let t = PromptTemplate::new("<{a}>").unwrap();
        let out = t.render(&state(&[("a", "{b}")])).unwrap();
        assert_eq!(out, "<{b}>");
    }

    #[test]
    fn test_render_with_map() {
        let t = PromptTemplate::new("{greeting}, {name}!").unwrap();
        let mut values = HashMap::new();
        values.insert("greeting".to_string(), "Hello".to_string());
        values.insert("name".to_string(), "world".to_string());
        assert_eq!(t.render_with(&values).unwrap(), "Hello, world!");

        values.remove("name");
        assert!(matches!(
            t.render_with(&values),
            Err(PipelineError::MissingVariable { .. })
        ));
    }

    #[test]
    fn test_malformed_templates() {
        for bad in ["{unclosed", "stray }", "{}", "{1abc}", "{a b}", "{a{b}}", "{ q }", "{q }"] {
            assert!(
                matches!(PromptTemplate::new(bad), Err(PipelineError::InvalidTemplate(_))),
                "expected InvalidTemplate for {bad:?}"
            );
        }
    }

    #[test]
    fn test_template_without_variables() {
        let t = PromptTemplate::new("static text").unwrap();
        assert!(t.variables().is_empty());
        assert_eq!(t.render(&PipelineState::new()).unwrap(), "static text");
    }
}
