/// parse document with structure like " title1 key1: value1, value2 key2: value2 title2 key3:value3, value4" which has titles and
/// pairs key-vector of values. Used to read analysis settings:
/// ```text
/// analysis
///   sample_point: 1e6
///   vocabulary: strict
/// plot
///   start: 1
///   end: 80
/// ```
/// Lines starting with //, #, % or ; are comments. A key that was not present in the document
/// is simply absent from its section map.
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{alpha1, alphanumeric1, multispace0, space0},
    combinator::{map, map_res, recognize},
    multi::{many0, many1, separated_list0},
    sequence::{delimited, pair, separated_pair, terminated},
};
use std::collections::HashMap;
use std::fmt::Display;

pub type DocumentMap = HashMap<String, SectionMap>;
pub type SectionMap = HashMap<String, Vec<Value>>;

/// enum to represent different value types:
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Float(f64),
    Integer(i64),
    Boolean(bool),
}

impl Value {
    /// numeric value of a float or an integer
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        if let Value::Boolean(b) = self {
            Some(*b)
        } else {
            None
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Float(val) => write!(f, "{}", val),
            Value::Integer(val) => write!(f, "{}", val),
            Value::Boolean(val) => write!(f, "{}", val),
        }
    }
}

fn identifier(input: &str) -> IResult<&str, String> {
    let parser = recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ));
    let mut parser = map(parser, String::from);
    parser.parse(input)
}

/// Parses a title (word characters without spaces)
pub fn parse_title(input: &str) -> IResult<&str, String> {
    let (input, result) = identifier(input)?;
    // Ignore trailing whitespace and newline characters
    Ok((input.trim(), result))
}

/// Parses a key (word characters without spaces)
pub fn parse_key(input: &str) -> IResult<&str, String> {
    identifier(input)
}

pub fn parse_value(input: &str) -> IResult<&str, Value> {
    // a single value ends at a comma, whitespace, newline or semicolon
    let value_parser = take_while1(|c: char| !matches!(c, ',' | ' ' | '\t' | '\n' | '\r' | ';'));
    let mut value_parser = map_res(value_parser, |s: &str| -> Result<Value, String> {
        // Try parsing as different types in order
        if let Ok(val) = s.parse::<i64>() {
            Ok(Value::Integer(val))
        } else if let Ok(val) = s.parse::<f64>() {
            Ok(Value::Float(val))
        } else if let Ok(val) = s.parse::<bool>() {
            Ok(Value::Boolean(val))
        } else {
            Ok(Value::String(s.to_string()))
        }
    });
    value_parser.parse(input)
}

pub fn parse_value_list(input: &str) -> IResult<&str, Vec<Value>> {
    let (input, _) = space0(input)?;
    let separator_coma = delimited(space0, tag(","), space0);
    let mut value_parser = separated_list0(separator_coma, parse_value);
    value_parser.parse(input)
}

/// Parses a key-value pair where value is a list
pub fn parse_key_value_pair(input: &str) -> IResult<&str, (String, Vec<Value>)> {
    let colon_separator = delimited(space0, tag(":"), space0);
    let mut parser = separated_pair(parse_key, colon_separator, parse_value_list);
    let (input, result) = parser.parse(input)?;
    Ok((input.trim(), result))
}

/// Parses a section with a title and multiple key-value pairs
pub fn parse_section(input: &str) -> IResult<&str, (String, SectionMap)> {
    let (input, _) = space0(input)?;
    let (input, title) = parse_title(input)?;
    let (input, _) = multispace0(input)?;
    let mut parser = many1(terminated(parse_key_value_pair, space0));
    let (input, pairs) = parser.parse(input)?;
    Ok((input, (title, pairs.into_iter().collect())))
}

/// Filters out comment lines (starting with //, #, %, or ;)
pub fn filter_comments(input: &str) -> String {
    input
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("//")
                && !trimmed.starts_with('#')
                && !trimmed.starts_with('%')
                && !trimmed.starts_with(';')
                && !trimmed.is_empty()
        })
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Parses the entire document into a HashMap; a repeated title merges into the earlier section
pub fn parse_document(input: &str) -> IResult<&str, DocumentMap> {
    let mut parser = many1(delimited(space0, parse_section, multispace0));
    let (input, sections) = parser.parse(input)?;

    let mut result: DocumentMap = HashMap::new();
    for (title, section_map) in sections {
        result.entry(title).or_default().extend(section_map);
    }
    Ok((input, result))
}

/// Parses a whole document after removing comments. An empty document gives an empty map.
pub fn parse_document_as(input: &str) -> Result<DocumentMap, String> {
    let filtered = filter_comments(input);
    if filtered.trim().is_empty() {
        return Ok(HashMap::new());
    }
    match parse_document(&filtered) {
        Ok((remaining, parsed)) => {
            if !remaining.trim().is_empty() {
                return Err(format!(
                    "Failed to parse entire document. Remaining: '{}'",
                    remaining
                ));
            }
            Ok(parsed)
        }
        Err(e) => Err(format!("Parsing error: {:?}", e)),
    }
}

/////////////////////////////TESTS////////////////////////////////////////////////////

#[cfg(test)]
mod tests1 {
    use super::*;

    #[test]
    fn test_parse_title() {
        let (remaining, title) = parse_title("analysis\n sample_point: 1e6").unwrap();
        assert_eq!(title, "analysis");
        assert_eq!(remaining, "sample_point: 1e6");

        let (remaining, title) = parse_title("plot_2 start: 1").unwrap();
        assert_eq!(title, "plot_2");
        assert_eq!(remaining, "start: 1");
    }

    #[test]
    fn test_parse_key() {
        let (remaining, key) = parse_key("max_limit_steps: 10").unwrap();
        assert_eq!(key, "max_limit_steps");
        assert_eq!(remaining, ": 10");
    }

    #[test]
    fn test_parse_value() {
        let (remaining, value) = parse_value("strict, next").unwrap();
        assert_eq!(value, Value::String("strict".to_string()));
        assert_eq!(remaining, ", next");

        let (_, value) = parse_value("400").unwrap();
        assert_eq!(value, Value::Integer(400));

        let (_, value) = parse_value("1e6").unwrap();
        assert_eq!(value, Value::Float(1e6));

        let (_, value) = parse_value("true").unwrap();
        assert_eq!(value, Value::Boolean(true));
    }

    #[test]
    fn test_parse_value_list() {
        let (remaining, values) = parse_value_list("1, 2.5 ,on").unwrap();
        assert_eq!(
            values,
            vec![
                Value::Integer(1),
                Value::Float(2.5),
                Value::String("on".to_string())
            ]
        );
        assert_eq!(remaining, "");
    }

    #[test]
    fn test_parse_section_stops_at_next_title() {
        let (remaining, (title, section)) =
            parse_section("plot\n  start: 1\n  end: 80\nlogging\n  level: info").unwrap();
        assert_eq!(title, "plot");
        assert_eq!(section.get("start"), Some(&vec![Value::Integer(1)]));
        assert_eq!(section.get("end"), Some(&vec![Value::Integer(80)]));
        assert_eq!(remaining, "logging\n  level: info");
    }

    #[test]
    fn test_parse_document_as_with_comments() {
        let doc = "# settings\nanalysis\n  sample_point: 1e6\n  vocabulary: extended\n\n// plotting\nplot\n  points: 100\n";
        let parsed = parse_document_as(doc).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(
            parsed["analysis"]["vocabulary"],
            vec![Value::String("extended".to_string())]
        );
        assert_eq!(parsed["analysis"]["sample_point"][0].as_float(), Some(1e6));
        assert_eq!(parsed["plot"]["points"][0].as_integer(), Some(100));
    }

    #[test]
    fn test_parse_document_as_empty_and_malformed() {
        assert!(parse_document_as("  \n# nothing\n").unwrap().is_empty());
        assert!(parse_document_as("analysis\n  : 3").is_err());
    }
}
