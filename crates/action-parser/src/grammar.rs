use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag, take_while},
    character::complete::{char, digit1, satisfy, space0},
    combinator::{cut, eof, map, map_res, opt, recognize, value},
    multi::separated_list0,
    sequence::{pair, terminated, tuple},
    IResult,
};

use super::{Literal, ParsedAction};

fn parse_ident(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(input)
}

fn to_number(text: &str) -> Result<Literal, String> {
    if text.contains('.') {
        text.parse::<f64>().map(Literal::Float).map_err(|e| e.to_string())
    } else {
        text.parse::<i64>().map(Literal::Int).map_err(|e| e.to_string())
    }
}

fn parse_number(input: &str) -> IResult<&str, Literal> {
    let number = recognize(tuple((opt(char('-')), digit1, opt(pair(char('.'), digit1)))));

    map_res(number, to_number)(input)
}

fn parse_keyword(input: &str) -> IResult<&str, Literal> {
    alt((
        value(Literal::Bool(true), alt((tag("True"), tag("true")))),
        value(Literal::Bool(false), alt((tag("False"), tag("false")))),
        value(Literal::None, tag("None")),
    ))(input)
}

fn parse_double_quote(input: &str) -> IResult<&str, Literal> {
    let (input, _) = char('"')(input)?;
    let (input, text) = opt(escaped_transform(
        is_not("\\\"\n"),
        '\\',
        alt((
            value("\t", tag("t")),
            value("\r", tag("r")),
            value("\n", tag("n")),
            value("\\", tag("\\")),
            value("\"", tag("\"")),
            value("'", tag("'")),
        )),
    ))(input)?;
    let (input, _) = cut(char('"'))(input)?;

    Ok((input, Literal::Str(text.unwrap_or_default())))
}

fn parse_single_quote(input: &str) -> IResult<&str, Literal> {
    let (input, _) = char('\'')(input)?;
    let (input, text) = opt(escaped_transform(
        is_not("\\'\n"),
        '\\',
        alt((
            value("\t", tag("t")),
            value("\r", tag("r")),
            value("\n", tag("n")),
            value("\\", tag("\\")),
            value("\"", tag("\"")),
            value("'", tag("'")),
        )),
    ))(input)?;
    let (input, _) = cut(char('\''))(input)?;

    Ok((input, Literal::Str(text.unwrap_or_default())))
}

fn parse_literal(input: &str) -> IResult<&str, Literal> {
    alt((parse_single_quote, parse_double_quote, parse_number, parse_keyword))(input)
}

fn parse_args(input: &str) -> IResult<&str, Vec<Literal>> {
    let comma = tuple((space0, char(','), space0));

    let (input, _) = char('(')(input)?;
    let (input, _) = space0(input)?;
    let (input, args) = separated_list0(comma, parse_literal)(input)?;
    let (input, _) = space0(input)?;
    let (input, _) = opt(char(','))(input)?;
    let (input, _) = space0(input)?;
    let (input, _) = cut(char(')'))(input)?;

    Ok((input, args))
}

pub(crate) fn action(input: &str) -> IResult<&str, ParsedAction> {
    let (input, _) = space0(input)?;
    let (input, namespace) = opt(terminated(parse_ident, char('.')))(input)?;
    let (input, name) = parse_ident(input)?;
    let (input, args) = map(opt(parse_args), Option::unwrap_or_default)(input)?;
    let (input, _) = space0(input)?;
    let (input, _) = eof(input)?;

    let action = ParsedAction {
        namespace: namespace.map(str::to_string),
        name: name.to_string(),
        args,
    };

    Ok((input, action))
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! parsed {
        ($ns: expr, $name: expr, [ $( $arg: expr ),* ]) => {
            ParsedAction {
                namespace: $ns.map(String::from),
                name: String::from($name),
                args: vec![ $( $arg, )* ],
            }
        };
    }

    fn parse(input: &str) -> ParsedAction {
        action(input).unwrap().1
    }

    #[test]
    fn test_parse_name() {
        assert_eq!(parse("quit"), parsed!(None::<&str>, "quit", []));
        assert_eq!(parse("  push_screen  "), parsed!(None::<&str>, "push_screen", []));
        assert_eq!(parse("_private2"), parsed!(None::<&str>, "_private2", []));
        assert_eq!(parse("record()"), parsed!(None::<&str>, "record", []));
    }

    #[test]
    fn test_parse_namespace() {
        assert_eq!(parse("app.quit"), parsed!(Some("app"), "quit", []));
        assert_eq!(
            parse("screen.record('x')"),
            parsed!(Some("screen"), "record", [Literal::Str("x".into())])
        );

        // Only a single namespace level is allowed.
        assert!(action("app.screen.quit").is_err());
    }

    #[test]
    fn test_parse_strings() {
        assert_eq!(
            parse("record('x')"),
            parsed!(None::<&str>, "record", [Literal::Str("x".into())])
        );
        assert_eq!(
            parse(r#"record("locally_up")"#),
            parsed!(None::<&str>, "record", [Literal::Str("locally_up".into())])
        );
        assert_eq!(
            parse(r#"record('', "")"#),
            parsed!(None::<&str>, "record", [Literal::Str("".into()), Literal::Str("".into())])
        );
        assert_eq!(
            parse(r#"record('a\'b', "c\"d\n")"#),
            parsed!(None::<&str>, "record", [
                Literal::Str("a'b".into()),
                Literal::Str("c\"d\n".into())
            ])
        );
        assert_eq!(
            parse(r#"record('a,b)')"#),
            parsed!(None::<&str>, "record", [Literal::Str("a,b)".into())])
        );
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(
            parse("scroll(5, -3, 0.25, -1.5)"),
            parsed!(None::<&str>, "scroll", [
                Literal::Int(5),
                Literal::Int(-3),
                Literal::Float(0.25),
                Literal::Float(-1.5)
            ])
        );

        // Too large for an i64.
        assert!(action("scroll(99999999999999999999)").is_err());
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!(
            parse("toggle(True, false, None)"),
            parsed!(None::<&str>, "toggle", [
                Literal::Bool(true),
                Literal::Bool(false),
                Literal::None
            ])
        );

        // Bare words aren't literals.
        assert!(action("toggle(maybe)").is_err());
    }

    #[test]
    fn test_parse_trailing_comma() {
        assert_eq!(
            parse("record('x',)"),
            parsed!(None::<&str>, "record", [Literal::Str("x".into())])
        );
        assert_eq!(
            parse("record( 'x' , 'y' , )"),
            parsed!(None::<&str>, "record", [Literal::Str("x".into()), Literal::Str("y".into())])
        );
    }
}
