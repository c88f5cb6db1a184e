//! Field extraction from one logical record.
//!
//! Records look like `&OBST ID='desk' XB=0,1,0,2,0,0.8 /`. Keys are matched
//! as whole identifiers (so `ID` never matches inside `GRP_ID`), ASCII
//! case-insensitively, and never inside quoted text.

use std::ops::Range;

/// Numeric values read after `KEY=`, plus the byte range they occupy.
///
/// `span` runs from the first value to the end of the last one, so
/// `&line[..span.start]` and `&line[span.end..]` are the text around the
/// values and can be reassembled with new numbers in between.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatField {
    pub values: Vec<f64>,
    pub span: Range<usize>,
}

fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Byte offset just past the `=` that follows `key`, if present.
pub fn find_key(line: &str, key: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut quote: Option<u8> = None;
    let mut pos = 0;
    while pos < bytes.len() {
        let b = bytes[pos];
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            pos += 1;
            continue;
        }
        if b == b'\'' || b == b'"' {
            quote = Some(b);
            pos += 1;
            continue;
        }
        if is_ident(b) && (pos == 0 || !is_ident(bytes[pos - 1])) {
            let start = pos;
            while pos < bytes.len() && is_ident(bytes[pos]) {
                pos += 1;
            }
            if line[start..pos].eq_ignore_ascii_case(key) {
                let mut eq = pos;
                while eq < bytes.len() && bytes[eq].is_ascii_whitespace() {
                    eq += 1;
                }
                if eq < bytes.len() && bytes[eq] == b'=' {
                    return Some(eq + 1);
                }
            }
            continue;
        }
        pos += 1;
    }
    None
}

fn skip_blanks(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

/// Text value of `KEY='value'`. Unquoted values run to the next blank,
/// comma or `/`. Empty values count as absent.
pub fn key_text(line: &str, key: &str) -> Option<String> {
    let bytes = line.as_bytes();
    let start = skip_blanks(bytes, find_key(line, key)?);
    let value = match bytes.get(start) {
        Some(&q) if q == b'\'' || q == b'"' => {
            let rest = &line[start + 1..];
            let end = rest.find(q as char)?;
            &rest[..end]
        }
        Some(_) => {
            let rest = &line[start..];
            let end = rest
                .find(|c: char| c.is_whitespace() || c == ',' || c == '/')
                .unwrap_or(rest.len());
            &rest[..end]
        }
        None => return None,
    };
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Parse one Fortran-style real (`1.`, `-2.5E1`, `3d0`) starting at `pos`.
fn number_at(line: &str, pos: usize) -> Option<(f64, usize)> {
    let bytes = line.as_bytes();
    let mut end = pos;
    while end < bytes.len() && matches!(bytes[end], b'0'..=b'9' | b'.' | b'+' | b'-' | b'e' | b'E' | b'd' | b'D') {
        end += 1;
    }
    if end == pos {
        return None;
    }
    let token = line[pos..end].replace(['d', 'D'], "e");
    token.parse::<f64>().ok().map(|v| (v, end))
}

/// Up to `max` numbers following `KEY=`, separated by commas or blanks.
/// Returns `None` when the key is missing or no number follows it.
pub fn key_floats(line: &str, key: &str, max: usize) -> Option<FloatField> {
    let bytes = line.as_bytes();
    let begin = skip_blanks(bytes, find_key(line, key)?);
    let mut values = Vec::with_capacity(max);
    let mut end = begin;
    let mut pos = begin;
    while values.len() < max {
        let Some((v, next)) = number_at(line, pos) else {
            break;
        };
        values.push(v);
        end = next;
        pos = skip_blanks(bytes, next);
        if bytes.get(pos) == Some(&b',') {
            pos = skip_blanks(bytes, pos + 1);
        }
    }
    if values.is_empty() {
        return None;
    }
    Some(FloatField {
        values,
        span: begin..end,
    })
}

/// Exactly `N` numbers after `KEY=`, or `None`.
pub fn key_array<const N: usize>(line: &str, key: &str) -> Option<([f64; N], Range<usize>)> {
    let field = key_floats(line, key, N)?;
    let values: [f64; N] = field.values.try_into().ok()?;
    Some((values, field.span))
}

/// Six-decimal fixed notation with insignificant trailing zeros removed,
/// keeping one digit after the point: `1.500000` → `1.5`, `2.000000` → `2.0`.
pub fn format_coord(v: f64) -> String {
    let mut s = format!("{:.6}", v);
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.push('0');
        }
    }
    if s == "-0.0" {
        s = "0.0".to_string();
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_word_key_match() {
        let line = "&GRP GRP_ID='desk' XYZ=1,2,3 /";
        assert_eq!(key_text(line, "GRP_ID").as_deref(), Some("desk"));
        assert_eq!(key_text(line, "ID"), None);
    }

    #[test]
    fn keys_inside_quotes_are_ignored() {
        let line = "&OBST ID='XB=9,9' XB=0,1,0,1,0,1 /";
        let (xb, _) = key_array::<6>(line, "XB").unwrap();
        assert_eq!(xb, [0.0, 1.0, 0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn span_brackets_the_values() {
        let line = "&OBST XB= 0.,1.5,-2.5E1 , 3d0,0,1 SURF_ID='INERT' /";
        let field = key_floats(line, "XB", 6).unwrap();
        assert_eq!(field.values, vec![0.0, 1.5, -25.0, 3.0, 0.0, 1.0]);
        assert_eq!(&line[..field.span.start], "&OBST XB= ");
        assert_eq!(&line[field.span.end..], " SURF_ID='INERT' /");
    }

    #[test]
    fn short_arrays_are_rejected() {
        assert!(key_array::<3>("&BGRP ID='A' ORIG=1,2 /", "ORIG").is_none());
        assert!(key_floats("&GRP GRP_ID='A' /", "XYZ", 3).is_none());
    }

    #[test]
    fn unquoted_text_value() {
        assert_eq!(key_text("&BGRP ID=desk /", "id").as_deref(), Some("desk"));
        assert_eq!(key_text("&BGRP ID='' /", "ID"), None);
    }

    #[test]
    fn coordinates_lose_trailing_zeros() {
        assert_eq!(format_coord(1.5), "1.5");
        assert_eq!(format_coord(2.0), "2.0");
        assert_eq!(format_coord(-0.0), "0.0");
        assert_eq!(format_coord(-0.0000001), "0.0");
        assert_eq!(format_coord(0.1234567), "0.123457");
        assert_eq!(format_coord(-12.25), "-12.25");
    }
}
