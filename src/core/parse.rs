use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("no closing quotation")]
    UnterminatedQuote,
    #[error("no escaped character after `\\`")]
    TrailingEscape,
}

/// Splits a line into the command name and the raw argument string.
pub fn split_command(line: &str) -> (&str, &str) {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    }
}

/// Peels a leading `:tablename` override off an argument string.
pub fn split_table_override(args: &str) -> (Option<&str>, &str) {
    let args = args.trim();
    let Some(stripped) = args.strip_prefix(':') else {
        return (None, args);
    };
    match stripped.split_once(char::is_whitespace) {
        Some((name, rest)) => (Some(name), rest.trim()),
        None => (Some(stripped), ""),
    }
}

/// Shell-style tokenizer: whitespace separates tokens, single quotes are
/// literal, double quotes allow `\"` and `\\`, a backslash outside quotes
/// escapes the next character.
pub fn tokenize(input: &str) -> Result<Vec<String>, ParseError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            '\'' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => current.push(c),
                        None => return Err(ParseError::UnterminatedQuote),
                    }
                }
            }
            '"' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(c @ ('"' | '\\')) => current.push(c),
                            Some(c) => {
                                current.push('\\');
                                current.push(c);
                            }
                            None => return Err(ParseError::UnterminatedQuote),
                        },
                        Some(c) => current.push(c),
                        None => return Err(ParseError::UnterminatedQuote),
                    }
                }
            }
            '\\' => {
                in_token = true;
                current.push(chars.next().ok_or(ParseError::TrailingEscape)?);
            }
            c => {
                in_token = true;
                current.push(c);
            }
        }
    }

    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Splits an attribute list such as `name,size,tags`.
pub fn split_list(token: &str) -> Vec<String> {
    token
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Removes every occurrence of `flag`, reporting whether one was present.
pub fn take_flag(tokens: &mut Vec<String>, flag: &str) -> bool {
    let before = tokens.len();
    tokens.retain(|t| t != flag);
    tokens.len() != before
}

/// Parses an on/off switch value.
pub fn parse_switch(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "yes" | "true" | "1" => Some(true),
        "off" | "no" | "false" | "0" => Some(false),
        _ => None,
    }
}
