use anyhow::{Context, Result};
use csv::StringRecord;
use serde::de::DeserializeOwned;

/// One GTFS flat file, split into records. Each record has exactly one value per header; missing
/// trailing fields are empty strings and surplus fields are dropped.
pub struct Table {
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl Table {
    /// Never fails. Quoting problems only affect the line they appear on.
    pub fn parse(text: &str) -> Self {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut lines = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .filter(|line| !line.trim().is_empty());

        let headers = match lines.next() {
            Some(line) => parse_line(line),
            None => {
                return Self {
                    headers: StringRecord::new(),
                    rows: Vec::new(),
                };
            }
        };

        let rows = lines
            .map(|line| {
                let mut fields = parse_line(line);
                fields.resize(headers.len(), String::new());
                StringRecord::from(fields)
            })
            .collect();
        Self {
            headers: StringRecord::from(headers),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Deserializes every row by header name. Empty fields become `None` for optional columns.
    pub fn deserialize<T: DeserializeOwned>(&self) -> impl Iterator<Item = Result<T>> + '_ {
        self.rows.iter().enumerate().map(move |(idx, row)| {
            row.deserialize(Some(&self.headers))
                // Line numbers are 1-based and the header is line 1, ignoring blank lines
                .with_context(|| format!("row {}", idx + 2))
        })
    }
}

/// Splits one line on commas, honoring double quotes and `""` escapes. Every field is trimmed.
fn parse_line(line: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(ch);
            }
        } else if ch == '"' {
            in_quotes = true;
        } else if ch == ',' {
            result.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(ch);
        }
    }
    result.push(current.trim().to_string());
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_fields() {
        assert_eq!(
            parse_line(r#"a,"b, c","say ""hi""",  d  "#),
            vec!["a", "b, c", r#"say "hi""#, "d"]
        );
        assert_eq!(parse_line(""), vec![""]);
        assert_eq!(parse_line("x,,"), vec!["x", "", ""]);
    }

    #[derive(Debug, PartialEq, serde::Deserialize)]
    struct IdName {
        id: String,
        name: String,
    }

    #[test]
    fn unmatched_quote_degrades() {
        // The rest of the line becomes part of the field
        assert_eq!(parse_line(r#"1,"open,2"#), vec!["1", "open,2"]);

        let table = Table::parse("id,name\n1,\"broken\n2,fine\n");
        let rows: Vec<IdName> = table.deserialize().collect::<Result<_>>().unwrap();
        assert_eq!(
            rows,
            vec![
                IdName {
                    id: "1".to_string(),
                    name: "broken".to_string(),
                },
                IdName {
                    id: "2".to_string(),
                    name: "fine".to_string(),
                },
            ]
        );
    }

    #[test]
    fn line_endings_blank_lines_and_padding() {
        #[derive(Debug, serde::Deserialize)]
        struct Row {
            a: String,
            b: String,
            c: Option<String>,
        }

        let table = Table::parse("\u{feff}a,b,c\r\n1,2\r\n\r\n   \n4,5,6,7\n");
        assert_eq!(table.headers.iter().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(table.len(), 2);
        let rows: Vec<Row> = table.deserialize().collect::<Result<_>>().unwrap();
        assert_eq!((rows[0].a.as_str(), rows[0].b.as_str()), ("1", "2"));
        assert_eq!(rows[0].c, None);
        assert_eq!(rows[1].c.as_deref(), Some("6"));
    }

    #[test]
    fn empty_input() {
        assert!(Table::parse("").is_empty());
        assert!(Table::parse("\n\n").is_empty());
        assert!(Table::parse("only,headers\n").is_empty());
    }

    #[test]
    fn deserialize_by_header() {
        #[derive(Debug, serde::Deserialize)]
        struct Record {
            id: String,
            count: u32,
            note: Option<String>,
        }

        let table = Table::parse("note,count,id\n,3,x\n\"hi, there\",4,y\n");
        let rows: Vec<Record> = table.deserialize().collect::<Result<_>>().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "x");
        assert_eq!(rows[0].count, 3);
        assert_eq!(rows[0].note, None);
        assert_eq!(rows[1].note.as_deref(), Some("hi, there"));

        let bad = Table::parse("note,count,id\n,lots,x\n");
        let err = bad.deserialize::<Record>().next().unwrap().unwrap_err();
        assert!(format!("{err:#}").contains("row 2"));
    }
}
