// Autoconf
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Property-format text parsing
//!
//! Supports `key=value`, `key: value` and `key value` separators, `#` and `!`
//! comment lines, backslash line continuation and the usual escapes.

/// Parses property-format text into key/value pairs in source order.
///
/// Later duplicates are kept; callers decide whether the first or last wins.
pub fn parse_properties(text: &str) -> Vec<(String, String)> {
    logical_lines(text).into_iter().filter_map(|line| split_entry(&line)).collect()
}

fn logical_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut continuing = false;

    for raw in text.lines() {
        let line = if continuing { raw.trim_start() } else { raw };
        if !continuing {
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                continue;
            }
        }

        if ends_with_continuation(line) {
            current.push_str(&line[..line.len() - 1]);
            continuing = true;
        } else {
            current.push_str(line);
            lines.push(std::mem::take(&mut current));
            continuing = false;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

// An odd number of trailing backslashes continues the line.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn split_entry(line: &str) -> Option<(String, String)> {
    let line = line.trim_start();
    if line.is_empty() {
        return None;
    }

    let mut key_end = line.len();
    let mut escaped = false;
    for (index, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' | ' ' | '\t' | '\u{c}' => {
                key_end = index;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start_matches([' ', '\t', '\u{c}']);
    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start_matches([' ', '\t', '\u{c}']);
    }

    Some((unescape(key), unescape(rest)))
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('u');
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

/// Splits a comma-delimited value into trimmed, non-empty items.
pub fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|item| !item.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(text: &str) -> Vec<(String, String)> {
        parse_properties(text)
    }

    #[test]
    fn test_separators() {
        let parsed = pairs("a=1\nb: 2\nc 3\nd = 4 \ne");
        assert_eq!(
            parsed,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string()),
                ("c".to_string(), "3".to_string()),
                ("d".to_string(), "4 ".to_string()),
                ("e".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let parsed = pairs("# comment\n! also comment\n\n   \nkey=value");
        assert_eq!(parsed, vec![("key".to_string(), "value".to_string())]);
    }

    #[test]
    fn test_line_continuation() {
        let parsed = pairs("Unit.ConditionalOnClass=First,\\\n    Second,\\\n    Third\nnext=1");
        assert_eq!(parsed[0].1, "First,Second,Third");
        assert_eq!(parsed[1], ("next".to_string(), "1".to_string()));
    }

    #[test]
    fn test_escaped_backslash_does_not_continue() {
        let parsed = pairs("path=C\\\\\nnext=1");
        assert_eq!(parsed[0].1, "C\\");
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_escapes_in_key_and_value() {
        let parsed = pairs("my\\=key=tab\\there\nuni=\\u0041");
        assert_eq!(parsed[0], ("my=key".to_string(), "tab\there".to_string()));
        assert_eq!(parsed[1].1, "A");
    }

    #[test]
    fn test_split_list() {
        let items: Vec<_> = split_list(" a, ,b ,c,").collect();
        assert_eq!(items, vec!["a", "b", "c"]);
    }
}
