//! Query and script evaluation for the mock store.
//!
//! Only the shapes the todo CLI sends are understood: `match_all`, `term`
//! (long and short form) and single-field assignment scripts.

use serde_json::{Map, Value};

use crate::error::EsError;

/// Split text the way the standard analyzer does for plain ASCII input:
/// lowercase, break on anything that is not alphanumeric.
pub fn analyze(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum Matcher {
    All,
    Term { field: String, value: Value },
}

impl Matcher {
    /// A missing query means match-all.
    pub fn parse(query: Option<&Value>) -> Result<Self, EsError> {
        let Some(query) = query else {
            return Ok(Matcher::All);
        };
        let (kind, body) = single_entry(query)
            .ok_or_else(|| EsError::parsing("query malformed, expected a single clause"))?;
        match kind.as_str() {
            "match_all" => Ok(Matcher::All),
            "term" => parse_term(body),
            other => Err(EsError::parsing(format!("unknown query [{other}]"))),
        }
    }

    pub fn matches(&self, source: &Map<String, Value>) -> bool {
        match self {
            Matcher::All => true,
            Matcher::Term { field, value } => match source.get(field) {
                Some(Value::String(text)) => value
                    .as_str()
                    .is_some_and(|term| analyze(text).iter().any(|token| token == term)),
                Some(Value::Bool(flag)) => match value {
                    Value::Bool(b) => b == flag,
                    Value::String(s) => s.parse::<bool>().ok() == Some(*flag),
                    _ => false,
                },
                Some(stored) => stored == value,
                None => false,
            },
        }
    }
}

fn single_entry(value: &Value) -> Option<(&String, &Value)> {
    value
        .as_object()
        .filter(|obj| obj.len() == 1)
        .and_then(|obj| obj.iter().next())
}

fn parse_term(body: &Value) -> Result<Matcher, EsError> {
    let (field, clause) = single_entry(body)
        .ok_or_else(|| EsError::parsing("[term] query malformed, expected a single field"))?;
    let value = match clause {
        Value::Object(long) => long
            .get("value")
            .cloned()
            .ok_or_else(|| EsError::parsing("[term] query does not support missing [value]"))?,
        short => short.clone(),
    };
    Ok(Matcher::Term {
        field: field.clone(),
        value,
    })
}

/// `ctx._source.<field> = <literal>`
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub field: String,
    pub value: Value,
}

impl Assignment {
    /// Accepts either `"script": "<source>"` or `"script": {"source": ...}`.
    pub fn parse(script: &Value) -> Result<Self, EsError> {
        let source = match script {
            Value::String(source) => source.as_str(),
            Value::Object(obj) => obj
                .get("source")
                .and_then(Value::as_str)
                .ok_or_else(|| EsError::script("script must have a [source]"))?,
            _ => return Err(EsError::script("script must be a string or an object")),
        };
        if let Some(lang) = script.get("lang").and_then(Value::as_str) {
            if lang != "painless" {
                return Err(EsError::script(format!("script_lang not supported [{lang}]")));
            }
        }
        Self::parse_source(source)
    }

    fn parse_source(source: &str) -> Result<Self, EsError> {
        let unsupported = || EsError::script(format!("compile error: unsupported script [{source}]"));
        let statement = source.trim().trim_end_matches(';');
        let (target, literal) = statement.split_once('=').ok_or_else(unsupported)?;
        let field = target
            .trim()
            .strip_prefix("ctx._source.")
            .filter(|f| !f.is_empty() && f.chars().all(|c| c.is_alphanumeric() || c == '_'))
            .ok_or_else(unsupported)?;
        let value = parse_literal(literal.trim()).ok_or_else(unsupported)?;
        Ok(Self {
            field: field.to_string(),
            value,
        })
    }

    pub fn apply(&self, source: &mut Map<String, Value>) {
        source.insert(self.field.clone(), self.value.clone());
    }
}

fn parse_literal(literal: &str) -> Option<Value> {
    match literal {
        "true" => return Some(Value::Bool(true)),
        "false" => return Some(Value::Bool(false)),
        "null" => return Some(Value::Null),
        _ => {}
    }
    for quote in ['"', '\''] {
        if let Some(inner) = literal
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return Some(Value::String(inner.to_string()));
        }
    }
    literal
        .parse::<i64>()
        .map(Value::from)
        .ok()
        .or_else(|| literal.parse::<f64>().ok().map(Value::from))
}
