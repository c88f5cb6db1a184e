//! Logical-record reader.
//!
//! A physical line whose first non-blank character is `&` opens a record
//! that continues across lines until a `/` appears outside quotes. Any other
//! line is a record on its own. Trailing whitespace is trimmed.

use crate::error::AidError;

/// One logical record and the physical line it started on.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub text: String,
    pub line: u32,
}

/// Tracks quote state across the physical lines of one record.
#[derive(Default)]
struct Terminator {
    quote: Option<char>,
}

impl Terminator {
    /// Feed one physical line; returns true once an unquoted `/` is seen.
    fn scan(&mut self, chunk: &str) -> bool {
        for c in chunk.chars() {
            match self.quote {
                Some(q) if c == q => self.quote = None,
                Some(_) => {}
                None => match c {
                    '\'' | '"' => self.quote = Some(c),
                    '/' => return true,
                    _ => {}
                },
            }
        }
        false
    }
}

pub fn read_records(src: &str, file: &str, max_len: usize) -> Result<Vec<Record>, AidError> {
    let mut records = Vec::new();
    let mut lines = src.split_inclusive('\n').zip(1u32..);

    while let Some((first, line)) = lines.next() {
        let mut text = first.to_string();
        if text.trim_start().starts_with('&') {
            let mut term = Terminator::default();
            let mut done = term.scan(first);
            while !done {
                let Some((next, _)) = lines.next() else {
                    return Err(AidError::UnterminatedRecord {
                        file: file.to_string(),
                        line,
                    });
                };
                text.push_str(next);
                if text.len() > max_len {
                    return Err(AidError::RecordTooLong {
                        file: file.to_string(),
                        line,
                        limit: max_len,
                    });
                }
                done = term.scan(next);
            }
        }
        if text.len() > max_len {
            return Err(AidError::RecordTooLong {
                file: file.to_string(),
                line,
                limit: max_len,
            });
        }
        records.push(Record {
            text: text.trim_end().to_string(),
            line,
        });
    }
    Ok(records)
}

/// True when `text`, ignoring leading blanks, starts with `tag`.
pub fn has_tag(text: &str, tag: &str) -> bool {
    text.trim_start().starts_with(tag)
}
