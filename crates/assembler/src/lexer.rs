//! Tokenizer for NVM assembly text.

use crate::error::AsmError;

/// A single token from an assembly line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    /// A bare word: a mnemonic or a name. Case is preserved.
    Word(&'a str),
    /// A numeric literal (decimal or hex, optionally negative).
    Number { value: i64, text: &'a str },
    /// A double-quoted name with escapes resolved.
    Quoted(String),
    /// A directive, without its leading `.`.
    Directive(&'a str),
}

impl Token<'_> {
    /// Text of the token for error messages.
    pub(crate) fn text(&self) -> String {
        match self {
            Token::Word(w) => (*w).to_string(),
            Token::Number { text, .. } => (*text).to_string(),
            Token::Quoted(s) => format!("{s:?}"),
            Token::Directive(d) => format!(".{d}"),
        }
    }
}

/// Tokenize a single line of assembly text.
///
/// Returns an empty Vec for blank lines and comment-only lines.
/// Comments start with `;` (outside quotes) and extend to end of line.
pub(crate) fn tokenize_line(line: &str, line_num: usize) -> Result<Vec<Token<'_>>, AsmError> {
    let mut tokens = Vec::new();
    let mut rest = line;

    loop {
        rest = rest.trim_start();
        if rest.is_empty() || rest.starts_with(';') {
            break;
        }

        if let Some(body) = rest.strip_prefix('"') {
            let (name, after) = quoted(body, line_num)?;
            tokens.push(Token::Quoted(name));
            rest = after;
            continue;
        }

        let end = rest
            .find(|c: char| c.is_whitespace() || c == ';')
            .unwrap_or(rest.len());
        let (word, after) = rest.split_at(end);
        tokens.push(classify(word, line_num)?);
        rest = after;
    }

    Ok(tokens)
}

fn classify(word: &str, line_num: usize) -> Result<Token<'_>, AsmError> {
    if let Some(directive) = word.strip_prefix('.') {
        return Ok(Token::Directive(directive));
    }

    let unsigned = word.strip_prefix('-').unwrap_or(word);
    if !unsigned.as_bytes().first().is_some_and(u8::is_ascii_digit) {
        return Ok(Token::Word(word));
    }

    let value = parse_number(word).ok_or_else(|| AsmError::InvalidNumber {
        line: line_num,
        token: word.to_string(),
    })?;
    Ok(Token::Number { value, text: word })
}

fn parse_number(word: &str) -> Option<i64> {
    let (negative, digits) = match word.strip_prefix('-') {
        Some(d) => (true, d),
        None => (false, word),
    };
    let magnitude = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) if hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
            i64::from_str_radix(hex, 16).ok()?
        }
        Some(_) => return None,
        None if digits.bytes().all(|b| b.is_ascii_digit()) => digits.parse().ok()?,
        None => return None,
    };
    Some(if negative { -magnitude } else { magnitude })
}

/// Read a quoted name up to its closing quote. `body` starts just after the
/// opening quote. Supported escapes: `\\`, `\"` and `\u{HEX}`.
fn quoted(body: &str, line_num: usize) -> Result<(String, &str), AsmError> {
    let bad = |token: &str| AsmError::UnexpectedToken {
        line: line_num,
        token: format!("\"{token}"),
    };

    let mut out = String::new();
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((out, &body[i + 1..])),
            '\\' => match chars.next() {
                Some((_, '\\')) => out.push('\\'),
                Some((_, '"')) => out.push('"'),
                Some((j, 'u')) => {
                    let tail = &body[j + 1..];
                    let close = tail
                        .strip_prefix('{')
                        .and_then(|t| t.find('}'))
                        .ok_or_else(|| bad(body))?;
                    let hex = &tail[1..close + 1];
                    let decoded = u32::from_str_radix(hex, 16)
                        .ok()
                        .and_then(char::from_u32)
                        .ok_or_else(|| bad(body))?;
                    out.push(decoded);
                    // Skip `{HEX}`.
                    for _ in 0..close + 2 {
                        chars.next();
                    }
                }
                _ => return Err(bad(body)),
            },
            c => out.push(c),
        }
    }

    Err(bad(body))
}
