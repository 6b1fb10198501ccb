//! Keyword based read/write classification of commands.
//!
//! This is a heuristic, not a parser. Only the leading keyword and a handful of row-locking and
//! `RETURNING` markers are inspected. Keywords hidden in string literals or in comments after the
//! leading position are not understood and may cause misclassification. When nothing matches, the
//! entry point decides: `execute` defaults to [`QueryType::Write`], `query` to
//! [`QueryType::Read`].

use derive_more::Display;
use fxhash::FxHashMap;
use itertools::Itertools;

const WRITE_KEYWORDS: &[&str] = &[
    "INSERT", "UPDATE", "DELETE", "MERGE", "UPSERT", "REPLACE", "CREATE", "ALTER", "DROP",
    "TRUNCATE", "RENAME", "GRANT", "REVOKE", "COMMENT", "LOCK", "VACUUM", "REINDEX", "REFRESH",
    "COPY", "CALL", "DO", "BEGIN", "START", "COMMIT", "ROLLBACK", "SAVEPOINT", "RELEASE",
];

const READ_KEYWORDS: &[&str] = &["SELECT", "SHOW", "EXPLAIN", "DESCRIBE", "DESC", "VALUES", "TABLE"];

// token pairs which make an otherwise reading statement lock or modify rows
const WRITE_MARKER_PAIRS: &[(&str, &str)] = &[
    ("FOR", "UPDATE"),
    ("FOR", "SHARE"),
    ("KEY", "UPDATE"),
    ("KEY", "SHARE"),
];

const RETURNING: &str = "RETURNING";

/// Where a command must be routed.
#[derive(Debug, PartialEq, Eq, Ord, PartialOrd, Hash, Copy, Clone, Display)]
pub enum QueryType {
    Read,
    Write,
}

/// Entry point a command came through.
#[derive(Debug, PartialEq, Eq, Ord, PartialOrd, Hash, Copy, Clone, Display)]
pub enum Intent {
    Execute,
    Query,
}

impl Intent {
    /// Classification used when the command text gives no hint.
    #[inline]
    pub fn default_query_type(self) -> QueryType {
        match self {
            Intent::Execute => QueryType::Write,
            Intent::Query => QueryType::Read,
        }
    }
}

/// Maps commands to [`QueryType`] based on their leading keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    keywords: FxHashMap<String, QueryType>,
}

impl Default for Classifier {
    fn default() -> Self {
        let keywords = WRITE_KEYWORDS
            .iter()
            .map(|keyword| (keyword.to_string(), QueryType::Write))
            .chain(
                READ_KEYWORDS
                    .iter()
                    .map(|keyword| (keyword.to_string(), QueryType::Read)),
            )
            .collect();

        Classifier { keywords }
    }
}

impl Classifier {
    /// Creates classifier with built-in keyword table.
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates classifier without any keywords - only entry point intent and write markers are
    /// taken into account.
    pub fn empty() -> Self {
        Classifier {
            keywords: Default::default(),
        }
    }

    /// Sets the query type for given leading keyword, replacing any previous mapping.
    pub fn with_override(mut self, keyword: &str, query_type: QueryType) -> Self {
        self.keywords
            .insert(keyword.trim().to_ascii_uppercase(), query_type);
        self
    }

    /// Returns configured query type for given keyword.
    pub fn keyword(&self, keyword: &str) -> Option<QueryType> {
        self.keywords.get(&keyword.to_ascii_uppercase()).copied()
    }

    /// Classifies given command coming through given entry point.
    pub fn classify(&self, cmd: &str, intent: Intent) -> QueryType {
        let tokens = tokens(cmd).collect_vec();

        let by_keyword = tokens
            .first()
            .and_then(|leading| self.keywords.get(leading.as_str()).copied());

        match by_keyword.unwrap_or_else(|| intent.default_query_type()) {
            QueryType::Write => QueryType::Write,
            QueryType::Read if has_write_marker(&tokens) => QueryType::Write,
            QueryType::Read => QueryType::Read,
        }
    }
}

fn has_write_marker(tokens: &[String]) -> bool {
    tokens.iter().any(|token| token == RETURNING)
        || tokens.iter().tuple_windows().any(|(first, second)| {
            WRITE_MARKER_PAIRS
                .iter()
                .any(|(marker_first, marker_second)| first == marker_first && second == marker_second)
        })
}

fn tokens(cmd: &str) -> impl Iterator<Item = String> + '_ {
    skip_leading_comments(cmd)
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| !token.is_empty())
        .map(str::to_ascii_uppercase)
}

fn skip_leading_comments(mut cmd: &str) -> &str {
    loop {
        cmd = cmd.trim_start_matches(|c: char| c.is_whitespace() || c == '(' || c == ';');

        if let Some(rest) = cmd.strip_prefix("--") {
            cmd = rest.split_once('\n').map(|(_, rest)| rest).unwrap_or("");
        } else if let Some(rest) = cmd.strip_prefix("/*") {
            cmd = rest.split_once("*/").map(|(_, rest)| rest).unwrap_or("");
        } else {
            return cmd;
        }
    }
}
