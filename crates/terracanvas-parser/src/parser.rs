//! Parser for configuration source text.
//!
//! Transforms source text into raw top-level blocks whose bodies are already
//! normalized attribute maps. The public entry point is [`parse_blocks`].
//!
//! Normalization rules:
//! - Bare expressions (traversals, function calls, operators) are stored as
//!   `"${expr}"` strings.
//! - Nested blocks accumulate under their type as a list of bodies.
//! - Labeled nested blocks (such as `dynamic "ingress"`) are stored as
//!   `{ "<label>": body }` entries of that list.

use winnow::{
    Parser as _,
    ascii::{digit1, multispace1},
    combinator::{alt, cut_err, not, opt, peek, repeat, terminated},
    error::{ContextError, ErrMode, ModalResult, StrContext, StrContextValue},
    stream::{LocatingSlice, Location, Stream},
    token::{none_of, one_of, take_until, take_while},
};

use terracanvas_core::{Attributes, Value};

use crate::{error::ParseError, span::Span};

type Input<'a> = LocatingSlice<&'a str>;
type PResult<O> = ModalResult<O, ContextError>;

/// A top-level block before it is sorted into a configuration section.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawBlock {
    pub keyword: String,
    pub labels: Vec<String>,
    pub body: Attributes,
    pub span: Span,
}

fn expected(description: &'static str) -> StrContext {
    StrContext::Expected(StrContextValue::Description(description))
}

/// Parse a comment: `# ...`, `// ...` or `/* ... */`
fn comment(input: &mut Input<'_>) -> PResult<()> {
    alt((
        ("#", take_while(0.., |c: char| c != '\n')).void(),
        ("//", take_while(0.., |c: char| c != '\n')).void(),
        ("/*", take_until(0.., "*/"), "*/").void(),
    ))
    .parse_next(input)
}

/// Parse zero or more whitespace characters (including newlines) and comments
fn ws(input: &mut Input<'_>) -> PResult<()> {
    repeat(0.., alt((multispace1.void(), comment))).parse_next(input)
}

/// Parse zero or more spaces, tabs and comments, stopping at newlines
fn sp(input: &mut Input<'_>) -> PResult<()> {
    repeat(
        0..,
        alt((
            take_while(1.., |c: char| c == ' ' || c == '\t' || c == '\r').void(),
            comment,
        )),
    )
    .parse_next(input)
}

/// Parse an identifier: a letter or underscore followed by letters, digits,
/// underscores or dashes
fn identifier<'a>(input: &mut Input<'a>) -> PResult<&'a str> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
    )
        .take()
        .context(StrContext::Label("identifier"))
        .parse_next(input)
}

/// Parse an escape sequence after the backslash
fn string_escape(input: &mut Input<'_>) -> PResult<char> {
    (
        '\\',
        one_of(['n', 'r', 't', '\\', '"']).map(|c| match c {
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            other => other,
        }),
    )
        .map(|(_, c)| c)
        .parse_next(input)
}

/// Parse a double-quoted string literal. Interpolation sequences are kept
/// verbatim.
fn string_literal(input: &mut Input<'_>) -> PResult<String> {
    '"'.parse_next(input)?;

    let content = repeat(0.., alt((string_escape, none_of(['"', '\\', '\n'])))).fold(
        String::new,
        |mut acc, ch| {
            acc.push(ch);
            acc
        },
    );

    cut_err(terminated(content, '"'))
        .context(StrContext::Label("string"))
        .context(expected("closing `\"`"))
        .parse_next(input)
}

/// Convert the text of a numeric literal to a JSON number.
///
/// Integers too large for `i64` fall back to `u64`, then to `f64`.
fn number_value(text: &str) -> Option<Value> {
    if !text.contains(['.', 'e', 'E']) {
        if let Ok(value) = text.parse::<i64>() {
            return Some(Value::from(value));
        }
        if let Ok(value) = text.parse::<u64>() {
            return Some(Value::from(value));
        }
    }
    let value: f64 = text.parse().ok()?;
    serde_json::Number::from_f64(value).map(Value::Number)
}

/// Parse a numeric literal not followed by identifier characters
fn number(input: &mut Input<'_>) -> PResult<Value> {
    terminated(
        (
            opt('-'),
            digit1,
            opt(('.', digit1)),
            opt((one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)),
        )
            .take(),
        peek(not(one_of(|c: char| {
            c.is_ascii_alphanumeric() || c == '_' || c == '.'
        }))),
    )
    .verify_map(number_value)
    .parse_next(input)
}

/// Parse a bare expression: everything up to the end of the line, a comma
/// or a closing bracket at nesting depth zero.
///
/// `true`, `false` and `null` become literals; anything else is stored as an
/// interpolation string.
fn bare_expression(input: &mut Input<'_>) -> PResult<Value> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut previous = '\0';
    let mut end = input.eof_offset();

    for (offset, c) in input.iter_offsets() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            previous = c;
            continue;
        }
        match c {
            '"' => in_string = true,
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' if depth == 0 => {
                end = offset;
                break;
            }
            ')' | ']' | '}' => depth -= 1,
            '\n' | ',' | '#' if depth == 0 => {
                end = offset;
                break;
            }
            '/' if depth == 0 && previous == '/' => {
                end = offset - 1;
                break;
            }
            _ => {}
        }
        previous = c;
    }

    let text = input.next_slice(end).trim();
    match text {
        "" => Err(ErrMode::Backtrack(ContextError::new())),
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        "null" => Ok(Value::Null),
        expression => Ok(Value::String(format!("${{{expression}}}"))),
    }
}

/// Parse a list: `[ value, value, ]`
fn list(input: &mut Input<'_>) -> PResult<Value> {
    '['.parse_next(input)?;
    let mut items = Vec::new();
    loop {
        ws(input)?;
        if opt(']').parse_next(input)?.is_some() {
            break;
        }
        items.push(expression(input)?);
        ws(input)?;
        if opt(',').parse_next(input)?.is_none() {
            ws(input)?;
            ']'.parse_next(input)?;
            break;
        }
    }
    Ok(Value::Array(items))
}

/// Parse an object key: an identifier or a quoted string
fn object_key(input: &mut Input<'_>) -> PResult<String> {
    alt((string_literal, identifier.map(str::to_string))).parse_next(input)
}

/// Parse an object: `{ key = value, "key" : value }`
fn object(input: &mut Input<'_>) -> PResult<Value> {
    '{'.parse_next(input)?;
    let mut map = Attributes::new();
    loop {
        ws(input)?;
        if opt('}').parse_next(input)?.is_some() {
            break;
        }
        let key = object_key(input)?;
        sp(input)?;
        one_of(['=', ':']).parse_next(input)?;
        ws(input)?;
        let value = expression(input)?;
        map.insert(key, value);
        sp(input)?;
        opt(',').parse_next(input)?;
    }
    Ok(Value::Object(map))
}

/// Parse any attribute value
fn expression(input: &mut Input<'_>) -> PResult<Value> {
    alt((
        string_literal.map(Value::String),
        number,
        list,
        object,
        bare_expression,
    ))
    .context(expected("value"))
    .parse_next(input)
}

/// Parse block labels: zero or more quoted strings or identifiers
fn block_labels(input: &mut Input<'_>) -> PResult<Vec<String>> {
    repeat(
        0..,
        terminated(
            alt((string_literal, identifier.map(str::to_string))),
            sp,
        ),
    )
    .parse_next(input)
}

/// Store a nested block body under its type.
fn push_nested_block(attributes: &mut Attributes, key: &str, labels: Vec<String>, body: Attributes) {
    let entry = labels
        .into_iter()
        .rev()
        .fold(Value::Object(body), |inner, label| {
            let mut wrapper = Attributes::new();
            wrapper.insert(label, inner);
            Value::Object(wrapper)
        });

    match attributes.get_mut(key) {
        Some(Value::Array(blocks)) => blocks.push(entry),
        _ => {
            attributes.insert(key.to_string(), Value::Array(vec![entry]));
        }
    }
}

/// Parse the contents of a block body up to (not including) the closing brace
fn body(input: &mut Input<'_>) -> PResult<Attributes> {
    let mut attributes = Attributes::new();
    loop {
        ws(input)?;
        if input.eof_offset() == 0 || opt(peek('}')).parse_next(input)?.is_some() {
            return Ok(attributes);
        }

        let key = identifier.parse_next(input)?;
        sp(input)?;
        if opt('=').parse_next(input)?.is_some() {
            sp(input)?;
            let value = cut_err(expression).parse_next(input)?;
            attributes.insert(key.to_string(), value);
        } else {
            let labels = block_labels(input)?;
            cut_err('{')
                .context(StrContext::Label("block"))
                .context(expected("`=` or `{`"))
                .parse_next(input)?;
            let inner = body(input)?;
            cut_err('}')
                .context(StrContext::Label("block"))
                .context(expected("`}`"))
                .parse_next(input)?;
            push_nested_block(&mut attributes, key, labels, inner);
        }
    }
}

/// Parse one top-level block: `keyword "label" ... { body }`
fn raw_block(input: &mut Input<'_>) -> PResult<RawBlock> {
    let start = input.current_token_start();
    let keyword = identifier.parse_next(input)?;
    sp(input)?;
    let labels = block_labels(input)?;
    cut_err('{')
        .context(StrContext::Label("block header"))
        .context(expected("`{`"))
        .parse_next(input)?;
    let body = body(input)?;
    cut_err('}')
        .context(StrContext::Label("block"))
        .context(expected("`}`"))
        .parse_next(input)?;
    let end = input.current_token_start();

    Ok(RawBlock {
        keyword: keyword.to_string(),
        labels,
        body,
        span: Span::new(start..end),
    })
}

/// Parse a whole source file into raw top-level blocks.
pub(crate) fn parse_blocks(source: &str) -> Result<Vec<RawBlock>, ParseError> {
    let mut input = LocatingSlice::new(source);
    let mut blocks = Vec::new();

    loop {
        let step = ws(&mut input).and_then(|()| {
            if input.eof_offset() == 0 {
                Ok(None)
            } else {
                cut_err(raw_block).parse_next(&mut input).map(Some)
            }
        });

        match step {
            Ok(Some(block)) => blocks.push(block),
            Ok(None) => return Ok(blocks),
            Err(err) => {
                let offset = input.current_token_start();
                return Err(ParseError::from_winnow(err, offset, source.len()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse_value(source: &str) -> Value {
        let mut input = LocatingSlice::new(source);
        expression(&mut input).expect("value should parse")
    }

    #[test]
    fn test_literals() {
        assert_eq!(parse_value("\"hello\""), json!("hello"));
        assert_eq!(parse_value("42"), json!(42));
        assert_eq!(parse_value("-3.5"), json!(-3.5));
        assert_eq!(parse_value("1e3"), json!(1000.0));
        assert_eq!(parse_value("true"), json!(true));
        assert_eq!(parse_value("false"), json!(false));
        assert_eq!(parse_value("null"), json!(null));
    }

    #[test]
    fn test_integers_beyond_i64() {
        assert_eq!(parse_value("9223372036854775807"), json!(i64::MAX));
        assert_eq!(parse_value("18446744073709551615"), json!(u64::MAX));
        assert_eq!(parse_value("-9223372036854775808"), json!(i64::MIN));
        assert_eq!(parse_value("100000000000000000000"), json!(1e20));
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            parse_value(r#""a \"quoted\"\tvalue\\n""#),
            json!("a \"quoted\"\tvalue\\n")
        );
    }

    #[test]
    fn test_bare_expressions_become_interpolations() {
        assert_eq!(parse_value("var.region"), json!("${var.region}"));
        assert_eq!(
            parse_value("aws_subnet.public[0].id"),
            json!("${aws_subnet.public[0].id}")
        );
        assert_eq!(
            parse_value("lookup(var.tags, \"env\", \"dev\")"),
            json!("${lookup(var.tags, \"env\", \"dev\")}")
        );
        assert_eq!(parse_value("string # comment"), json!("${string}"));
    }

    #[test]
    fn test_identifier_prefixed_with_keyword_is_not_a_literal() {
        assert_eq!(parse_value("true_value"), json!("${true_value}"));
        assert_eq!(parse_value("nullable"), json!("${nullable}"));
    }

    #[test]
    fn test_number_followed_by_identifier_is_bare() {
        assert_eq!(parse_value("10m"), json!("${10m}"));
    }

    #[test]
    fn test_lists_and_objects() {
        assert_eq!(
            parse_value("[\n  \"a\",\n  var.b,\n  3,\n]"),
            json!(["a", "${var.b}", 3])
        );
        assert_eq!(parse_value("[]"), json!([]));
        assert_eq!(
            parse_value("{\n  Name = \"web\"\n  \"kubernetes.io/role\" : var.role,\n}"),
            json!({ "Name": "web", "kubernetes.io/role": "${var.role}" })
        );
        assert_eq!(parse_value("{ a = [1, 2] }"), json!({ "a": [1, 2] }));
    }

    #[test]
    fn test_nested_and_labeled_blocks() {
        let source = r#"
            resource "aws_security_group" "web" {
              name = "web"
              ingress {
                from_port = 80
              }
              ingress {
                from_port = 443
              }
              dynamic "egress" {
                for_each = var.rules
                content {
                  to_port = egress.value
                }
              }
            }
        "#;
        let blocks = parse_blocks(source).unwrap();
        assert_eq!(blocks.len(), 1);
        let block = &blocks[0];
        assert_eq!(block.keyword, "resource");
        assert_eq!(block.labels, vec!["aws_security_group", "web"]);
        assert_eq!(
            Value::Object(block.body.clone()),
            json!({
                "name": "web",
                "ingress": [{ "from_port": 80 }, { "from_port": 443 }],
                "dynamic": [{
                    "egress": {
                        "for_each": "${var.rules}",
                        "content": [{ "to_port": "${egress.value}" }]
                    }
                }]
            })
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        let source = r#"
            # leading comment
            // another
            /* block
               comment */
            variable "region" { # trailing
              default = "eu" // inline
            }
        "#;
        let blocks = parse_blocks(source).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].body["default"], json!("eu"));
    }

    #[test]
    fn test_block_span_covers_block() {
        let source = "module \"vpc\" {\n}\n";
        let blocks = parse_blocks(source).unwrap();
        assert_eq!(blocks[0].span, Span::new(0..16));
    }

    #[test]
    fn test_unclosed_block_is_an_error() {
        let err = parse_blocks("resource \"a\" \"b\" {\n  x = 1\n").unwrap_err();
        assert!(err.message().contains("`}`"), "{}", err.message());
    }

    #[test]
    fn test_unterminated_string_is_an_error() {
        let err = parse_blocks("variable \"a\" {\n  default = \"oops\n}\n").unwrap_err();
        assert!(err.message().contains("string"), "{}", err.message());
    }

    #[test]
    fn test_empty_source() {
        assert!(parse_blocks("").unwrap().is_empty());
        assert!(parse_blocks("  \n # only a comment\n").unwrap().is_empty());
    }
}
