//! Line-oriented scanner for the tile resource.

use crate::RegistryError;

/// Attribute value as written in the resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum RawValue {
    /// Key written without `=value`.
    Flag,
    /// Quoted string or bare token.
    Text(String),
    /// Parenthesized `|`-separated list.
    List(Vec<String>),
}

/// Single parsed record before interpretation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RawRecord {
    pub(crate) line: usize,
    pub(crate) id: u16,
    pub(crate) attributes: Vec<(String, RawValue)>,
}

/// Parses one line. Blank lines and `#` comments yield `None`.
pub(crate) fn parse_line(line: usize, text: &str) -> Result<Option<RawRecord>, RegistryError> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let mut cursor = Cursor { rest: trimmed };
    let token = cursor.take_while(|c| !c.is_whitespace());
    let id = token
        .parse::<u16>()
        .map_err(|_| parse_error(line, format!("expected a tile id, found {token:?}")))?;

    let mut attributes = Vec::new();
    loop {
        cursor.skip_whitespace();
        if cursor.rest.is_empty() {
            break;
        }
        let key = cursor.take_while(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if key.is_empty() {
            return Err(parse_error(
                line,
                format!("expected an attribute name at {:?}", cursor.rest),
            ));
        }
        let value = if cursor.eat('=') {
            cursor.value(line)?
        } else {
            RawValue::Flag
        };
        attributes.push((key.to_owned(), value));
    }

    Ok(Some(RawRecord {
        line,
        id,
        attributes,
    }))
}

fn parse_error(line: usize, reason: String) -> RegistryError {
    RegistryError::Parse { line, reason }
}

fn ends_bare(c: char) -> bool {
    c.is_whitespace() || c == ')' || c == '|'
}

struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn skip_whitespace(&mut self) {
        self.rest = self.rest.trim_start();
    }

    fn eat(&mut self, expected: char) -> bool {
        match self.rest.strip_prefix(expected) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    fn take_while(&mut self, mut keep: impl FnMut(char) -> bool) -> &'a str {
        let source = self.rest;
        let end = source
            .char_indices()
            .find(|&(_, c)| !keep(c))
            .map_or(source.len(), |(index, _)| index);
        let (taken, rest) = source.split_at(end);
        self.rest = rest;
        taken
    }

    fn value(&mut self, line: usize) -> Result<RawValue, RegistryError> {
        if self.eat('(') {
            return self.list(line).map(RawValue::List);
        }
        self.scalar(line).map(RawValue::Text)
    }

    fn scalar(&mut self, line: usize) -> Result<String, RegistryError> {
        if self.eat('"') {
            return Ok(self.quoted());
        }
        let token = self.take_while(|c| !ends_bare(c));
        if token.is_empty() {
            return Err(parse_error(line, "missing attribute value".to_owned()));
        }
        Ok(token.to_owned())
    }

    // An unterminated quote runs to the end of the line.
    fn quoted(&mut self) -> String {
        let source = self.rest;
        let mut value = String::new();
        let mut chars = source.char_indices();
        while let Some((index, c)) = chars.next() {
            match c {
                '\\' => {
                    if let Some((_, escaped)) = chars.next() {
                        value.push(escaped);
                    }
                }
                '"' => {
                    self.rest = &source[index + c.len_utf8()..];
                    return value;
                }
                _ => value.push(c),
            }
        }
        self.rest = "";
        value
    }

    fn list(&mut self, line: usize) -> Result<Vec<String>, RegistryError> {
        let mut items = Vec::new();
        self.skip_whitespace();
        if self.eat(')') {
            return Ok(items);
        }
        loop {
            self.skip_whitespace();
            items.push(self.scalar(line)?);
            self.skip_whitespace();
            if self.eat('|') {
                continue;
            }
            if self.eat(')') {
                return Ok(items);
            }
            return Err(parse_error(
                line,
                if self.rest.is_empty() {
                    "unterminated list".to_owned()
                } else {
                    format!("unexpected {:?} in list", self.rest)
                },
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> RawRecord {
        parse_line(1, text)
            .expect("line parses")
            .expect("line holds a record")
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        assert_eq!(parse_line(1, "   ").expect("blank"), None);
        assert_eq!(parse_line(2, "# 12 name=x").expect("comment"), None);
    }

    #[test]
    fn bare_quoted_flag_and_list_values() {
        let record = parse(r#"73 name="Residential (1,1)" zone=residential conductive members=(69|70 | 71)"#);
        assert_eq!(record.id, 73);
        assert_eq!(
            record.attributes,
            vec![
                (
                    "name".to_owned(),
                    RawValue::Text("Residential (1,1)".to_owned())
                ),
                (
                    "zone".to_owned(),
                    RawValue::Text("residential".to_owned())
                ),
                ("conductive".to_owned(), RawValue::Flag),
                (
                    "members".to_owned(),
                    RawValue::List(vec!["69".to_owned(), "70".to_owned(), "71".to_owned()])
                ),
            ]
        );
    }

    #[test]
    fn escaped_quote_does_not_terminate_string() {
        let record = parse(r#"4 name="say \"hi\"" level=2"#);
        assert_eq!(
            record.attributes[0].1,
            RawValue::Text(r#"say "hi""#.to_owned())
        );
        assert_eq!(record.attributes[1].1, RawValue::Text("2".to_owned()));
    }

    #[test]
    fn unterminated_quote_reads_to_end_of_line() {
        let record = parse(r#"5 name="Open ended level=3"#);
        assert_eq!(record.attributes.len(), 1);
        assert_eq!(
            record.attributes[0].1,
            RawValue::Text("Open ended level=3".to_owned())
        );
    }

    #[test]
    fn bare_value_stops_at_list_terminators() {
        let error = parse_line(9, "9 category=road)").expect_err("stray terminator");
        assert!(matches!(error, RegistryError::Parse { line: 9, .. }));
    }

    #[test]
    fn malformed_lines_report_their_line_number() {
        let error = parse_line(17, "x name=dirt").expect_err("id must be numeric");
        assert!(matches!(error, RegistryError::Parse { line: 17, .. }));

        let error = parse_line(18, "3 members=(1|2").expect_err("list must close");
        assert!(matches!(error, RegistryError::Parse { line: 18, .. }));

        let error = parse_line(19, "3 name= level=2").expect_err("value required");
        assert!(matches!(error, RegistryError::Parse { line: 19, .. }));
    }
}
