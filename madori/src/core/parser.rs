//! Parser for `windowrule { key = value ... }` blocks.
//!
//! The parser never fails on content. Comments are stripped without regard
//! to quoting, so a `#` inside a value truncates it. A block whose closing
//! brace is missing is dropped and scanning resumes right after its opening
//! brace, so later blocks still load.

use std::ops::Range;
use std::path::Path;

use super::rule::{parse_bool, Directive, Rule};
use super::{Result, RulesError, Ruleset};

const BLOCK_KEYWORD: &str = "windowrule";

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Word(String),
    Value(String),
    Open,
    Close,
    Equals,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    kind: TokenKind,
    /// 1-based source line
    line: usize,
}

/// Read and parse a config file.
pub fn parse_file(path: &Path) -> Result<Ruleset> {
    let source = std::fs::read_to_string(path).map_err(|source| RulesError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let ruleset = parse_str(&source);
    tracing::info!("Loaded {} rule(s) from {}", ruleset.len(), path.display());
    Ok(ruleset)
}

pub fn parse_str(source: &str) -> Ruleset {
    let tokens = tokenize(&strip_comments(source));
    let blocks = locate_blocks(&tokens);

    let mut ruleset = Ruleset::with_capacity(blocks.len());
    for block in blocks {
        ruleset.push(parse_block(&tokens[block]));
    }
    ruleset
}

fn strip_comments(source: &str) -> String {
    source
        .lines()
        .map(|line| line.split_once('#').map_or(line, |(code, _)| code))
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '{' | '}' | '=')
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();
    let mut line = 1;

    while let Some(&(start, c)) = chars.peek() {
        match c {
            '\n' => {
                line += 1;
                chars.next();
            }
            '{' | '}' => {
                chars.next();
                let kind = if c == '{' {
                    TokenKind::Open
                } else {
                    TokenKind::Close
                };
                tokens.push(Token { kind, line });
            }
            '=' => {
                chars.next();
                tokens.push(Token {
                    kind: TokenKind::Equals,
                    line,
                });

                // Value: rest of the line up to a newline or closing brace
                while chars.next_if(|&(_, c)| c == ' ' || c == '\t').is_some() {}
                let begin = chars.peek().map_or(text.len(), |&(i, _)| i);
                let mut end = begin;
                while let Some((i, c)) = chars.next_if(|&(_, c)| c != '\n' && c != '}') {
                    end = i + c.len_utf8();
                }
                tokens.push(Token {
                    kind: TokenKind::Value(text[begin..end].trim_end().to_string()),
                    line,
                });
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            _ => {
                let mut end = start;
                while let Some((i, c)) = chars.next_if(|&(_, c)| is_word_char(c)) {
                    end = i + c.len_utf8();
                }
                tokens.push(Token {
                    kind: TokenKind::Word(text[start..end].to_string()),
                    line,
                });
            }
        }
    }

    tokens
}

fn is_block_start(tokens: &[Token], pos: usize) -> bool {
    matches!(&tokens[pos].kind, TokenKind::Word(w) if w == BLOCK_KEYWORD)
        && matches!(tokens.get(pos + 1).map(|t| &t.kind), Some(TokenKind::Open))
}

/// Index of the brace closing a block whose body starts at `body_start`.
fn find_close(tokens: &[Token], body_start: usize) -> Option<usize> {
    let mut depth = 1usize;
    for (offset, token) in tokens[body_start..].iter().enumerate() {
        match token.kind {
            TokenKind::Open => depth += 1,
            TokenKind::Close => {
                depth -= 1;
                if depth == 0 {
                    return Some(body_start + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Token ranges of every balanced `windowrule` block body.
fn locate_blocks(tokens: &[Token]) -> Vec<Range<usize>> {
    let mut blocks = Vec::new();
    let mut pos = 0;

    while pos < tokens.len() {
        if !is_block_start(tokens, pos) {
            pos += 1;
            continue;
        }

        let body_start = pos + 2;
        match find_close(tokens, body_start) {
            Some(close) => {
                blocks.push(body_start..close);
                pos = close + 1;
            }
            None => {
                tracing::warn!(
                    "Skipping unterminated {} block at line {}",
                    BLOCK_KEYWORD,
                    tokens[pos].line
                );
                pos = body_start;
            }
        }
    }

    blocks
}

fn parse_block(body: &[Token]) -> Rule {
    let mut rule = Rule::new();
    let mut depth = 0usize;
    let mut i = 0;

    while i < body.len() {
        match &body[i].kind {
            TokenKind::Open => depth += 1,
            TokenKind::Close => depth = depth.saturating_sub(1),
            TokenKind::Word(key) if depth == 0 => {
                if let (Some(TokenKind::Equals), Some(TokenKind::Value(value))) = (
                    body.get(i + 1).map(|t| &t.kind),
                    body.get(i + 2).map(|t| &t.kind),
                ) {
                    apply_directive(&mut rule, key, value, body[i].line);
                    i += 3;
                    continue;
                }
            }
            _ => {}
        }
        i += 1;
    }

    rule
}

fn set_once<T>(slot: &mut Option<T>, value: T) {
    if slot.is_none() {
        *slot = Some(value);
    }
}

/// Apply one `key = value` line. The first assignment of a field wins.
fn apply_directive(rule: &mut Rule, key: &str, value: &str, line: usize) {
    match Directive::from_key(key) {
        Directive::Match(field) => set_once(rule.matcher.slot_mut(field), value.to_string()),
        Directive::Action(field) => set_once(rule.actions.slot_mut(field), value.to_string()),
        Directive::Toggle(field) => match parse_bool(value) {
            Some(flag) => set_once(rule.actions.toggle_mut(field), flag),
            None => tracing::debug!("line {}: ignoring non-boolean {} = {}", line, key, value),
        },
        Directive::Name => set_once(&mut rule.name, value.to_string()),
        Directive::UnknownMatch => {
            tracing::debug!("line {}: discarding unsupported {}", line, key)
        }
        Directive::Extra => rule.extras.push((key.to_string(), value.to_string())),
    }
}
