//! The pre-parse gate.
//!
//! Cheap rejections on the raw query string, run before the parser sees it:
//! the length cap, the forbidden-keyword scan, and (when
//! `sql_injection_protection` is on) a handful of lexical injection
//! heuristics. The scan works on the same token stream the parser would see,
//! so string literals and quoted identifiers are never mistaken for
//! keywords.

use langsec_core::{Diagnostic, SecuritySchema};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::{Token, TokenWithSpan, Tokenizer, Whitespace};

use crate::span::LineIndex;

/// Run every gate check in order. The length cap is evaluated before
/// anything else, regardless of the other schema settings.
pub fn check(query: &str, schema: &SecuritySchema) -> Result<(), Diagnostic> {
    if let Some(max) = schema.max_query_length {
        let len = query.chars().count();
        if len > max {
            return Err(Diagnostic::query_too_long(len, max));
        }
    }

    let dialect = PostgreSqlDialect {};
    let tokens = match Tokenizer::new(&dialect, query).tokenize_with_location() {
        Ok(tokens) => tokens,
        Err(err) => {
            // An unterminated string or comment. With protection on this is
            // treated as an injection attempt; otherwise the parser will
            // report it as a syntax error.
            if schema.sql_injection_protection {
                return Err(Diagnostic::injection(format!(
                    "unbalanced quote or comment: {}",
                    err
                )));
            }
            return Ok(());
        }
    };

    let index = LineIndex::new(query);

    if !schema.forbidden_keywords.is_empty() {
        scan_forbidden_keywords(&tokens, schema, &index)?;
    }

    if schema.sql_injection_protection {
        scan_stacked_statements(&tokens, &index)?;
        scan_inline_comments(&tokens, &index)?;
        scan_tautologies(&tokens, &index)?;
    }

    Ok(())
}

fn scan_forbidden_keywords(
    tokens: &[TokenWithSpan],
    schema: &SecuritySchema,
    index: &LineIndex,
) -> Result<(), Diagnostic> {
    for token in tokens {
        if let Token::Word(word) = &token.token {
            let upper = word.value.to_uppercase();
            if schema.forbidden_keywords.contains(&upper) {
                return Err(
                    Diagnostic::forbidden_keyword(&upper).at_opt(index.location(token.span))
                );
            }
        }
    }
    Ok(())
}

fn is_significant(token: &Token) -> bool {
    !matches!(token, Token::Whitespace(_) | Token::EOF)
}

/// Reject `...; <anything>` — stacked statements have no single validation
/// semantics, so they are refused outright.
fn scan_stacked_statements(
    tokens: &[TokenWithSpan],
    index: &LineIndex,
) -> Result<(), Diagnostic> {
    let mut after_semicolon = false;
    for token in tokens {
        if after_semicolon && is_significant(&token.token) {
            return Err(Diagnostic::injection("multiple SQL statements in one query")
                .at_opt(index.location(token.span)));
        }
        if matches!(token.token, Token::SemiColon) {
            after_semicolon = true;
        }
    }
    Ok(())
}

/// Reject `--` and `/* */` comments once the statement has begun. A comment
/// placed mid-statement can silence a trailing predicate, which is the
/// classic way to defeat an appended filter.
fn scan_inline_comments(tokens: &[TokenWithSpan], index: &LineIndex) -> Result<(), Diagnostic> {
    let mut statement_started = false;
    for token in tokens {
        match &token.token {
            Token::Whitespace(Whitespace::SingleLineComment { .. })
            | Token::Whitespace(Whitespace::MultiLineComment(_)) => {
                if statement_started {
                    return Err(Diagnostic::injection("inline comment in query")
                        .at_opt(index.location(token.span)));
                }
            }
            other if is_significant(other) => statement_started = true,
            _ => {}
        }
    }
    Ok(())
}

fn comparison_op(token: &Token) -> bool {
    matches!(
        token,
        Token::Eq | Token::Neq | Token::Lt | Token::Gt | Token::LtEq | Token::GtEq
    )
}

/// The literal payload of a token, if it is one the tautology scan compares.
fn literal_value(token: &Token) -> Option<&str> {
    match token {
        Token::Number(value, _) => Some(value),
        Token::SingleQuotedString(value) => Some(value),
        _ => None,
    }
}

/// Reject `<lit> <cmp> <same lit>` appearing after a WHERE keyword —
/// `1=1`, `'a' = 'a'` and friends.
fn scan_tautologies(tokens: &[TokenWithSpan], index: &LineIndex) -> Result<(), Diagnostic> {
    let significant: Vec<&TokenWithSpan> = tokens
        .iter()
        .filter(|t| is_significant(&t.token))
        .collect();

    let mut in_where = false;
    for (i, token) in significant.iter().enumerate() {
        if let Token::Word(word) = &token.token {
            if word.keyword == Keyword::WHERE {
                in_where = true;
                continue;
            }
        }
        if !in_where || i + 2 >= significant.len() {
            continue;
        }
        let (Some(left), Some(right)) = (
            literal_value(&token.token),
            significant
                .get(i + 2)
                .and_then(|t| literal_value(&t.token)),
        ) else {
            continue;
        };
        if comparison_op(&significant[i + 1].token) && left == right {
            return Err(Diagnostic::injection(format!(
                "tautological condition: {} {} {}",
                left, significant[i + 1].token, right
            ))
            .at_opt(index.location(token.span)));
        }
    }
    Ok(())
}
