//! The pattern module contract (spec §6): compiling a persisted, opaque
//! `PatternRow` into a parameterized `WHERE` fragment, independent of the
//! storage engine. The engine only ever sees the fragment plus its bound
//! parameters — it never concatenates pattern text into SQL itself.
//!
//! The full compact pattern grammar (asset-id filters, wildcard
//! credentials, and so on) is out of scope here — see spec §1. What ships
//! is the minimal slice that exercises the query layer end to end: exact
//! `address =` and `payment_credential =` predicates, and a match-all `*`.

use serde::{Deserialize, Serialize};

/// A compiled predicate: a `WHERE`-clause fragment plus the parameters it
/// binds, in order. The fragment never embeds `params` as text — it only
/// ever contains `?` placeholders.
#[derive(Debug, Clone)]
pub struct CompiledPredicate {
    pub sql_fragment: String,
    pub params: Vec<String>,
}

/// A compact, persisted textual predicate over `inputs` rows.
///
/// Only two shapes are recognized today:
/// - `*` — match every input.
/// - `address:<value>` — exact match on `inputs.address`.
/// - `credential:<value>` — exact match on `inputs.payment_credential`.
///
/// Anything else fails to parse; callers surface that as a deterministic
/// query failure rather than silently matching nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pattern {
    MatchAll,
    Address(String),
    PaymentCredential(String),
}

/// Narrows `fold_inputs` to spent, unspent, or either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusFlag {
    Spent,
    Unspent,
    Any,
}

/// Ascending or descending sort for `fold_inputs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// Compile a pattern to a parameterized `WHERE` fragment. The returned
/// fragment is safe to splice directly into a query string — it contains
/// only `?` placeholders, never pattern text.
pub fn pattern_to_sql(pattern: &Pattern) -> CompiledPredicate {
    match pattern {
        Pattern::MatchAll => CompiledPredicate {
            sql_fragment: "1 = 1".to_string(),
            params: Vec::new(),
        },
        Pattern::Address(addr) => CompiledPredicate {
            sql_fragment: "inputs.address = ?".to_string(),
            params: vec![addr.clone()],
        },
        Pattern::PaymentCredential(cred) => CompiledPredicate {
            sql_fragment: "inputs.payment_credential = ?".to_string(),
            params: vec![cred.clone()],
        },
    }
}

/// Compile a status flag to an `AND`-prefixed fragment, ready to append
/// after a pattern fragment. Binds no parameters.
pub fn status_flag_to_sql(flag: StatusFlag) -> &'static str {
    match flag {
        StatusFlag::Spent => "AND inputs.spent_at IS NOT NULL",
        StatusFlag::Unspent => "AND inputs.spent_at IS NULL",
        StatusFlag::Any => "",
    }
}

/// Render a pattern to its persisted textual form (the form stored in
/// `patterns.pattern`).
pub fn pattern_to_text(pattern: &Pattern) -> String {
    match pattern {
        Pattern::MatchAll => "*".to_string(),
        Pattern::Address(addr) => format!("address:{addr}"),
        Pattern::PaymentCredential(cred) => format!("credential:{cred}"),
    }
}

/// Parse a pattern back from its persisted textual form.
///
/// Returns `None` if `text` does not match one of the recognized shapes.
/// The caller (query layer) turns that into a deterministic query
/// failure rather than a silent no-op match.
pub fn pattern_from_text(text: &str) -> Option<Pattern> {
    if text == "*" {
        return Some(Pattern::MatchAll);
    }
    if let Some(addr) = text.strip_prefix("address:") {
        return Some(Pattern::Address(addr.to_string()));
    }
    if let Some(cred) = text.strip_prefix("credential:") {
        return Some(Pattern::PaymentCredential(cred.to_string()));
    }
    None
}
