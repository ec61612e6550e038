//! Line-level recognizers for the post markup.

use nom::{
    bytes::complete::{tag, take_until, take_while, take_while_m_n},
    character::complete::{char, one_of, space0},
    combinator::{all_consuming, eof, map, opt, rest, verify},
    sequence::{delimited, preceded, terminated, tuple},
    IResult,
};

/// Metadata block delimiter.
pub const METADATA_DELIMITER: &str = "++++";

/// A macro tag found on its own line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroTag<'a> {
    pub name: &'a str,
    pub props: Option<&'a str>,
}

/// Characters allowed in a macro name.
pub fn is_macro_name_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'
}

/// Match a line consisting of exactly `++++`.
pub fn metadata_delimiter(input: &str) -> IResult<&str, ()> {
    map(all_consuming(tag(METADATA_DELIMITER)), |_| ())(input)
}

/// Parse a `key: value` metadata line. The value must not be empty.
///
/// Any number of spaces after the colon is accepted, including none.
pub fn metadata_field(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, key) = take_until(":")(input)?;
    let (input, _) = char(':')(input)?;
    let (input, _) = space0(input)?;
    let (input, value) = verify(rest, |v: &str| !v.is_empty())(input)?;
    Ok((input, (key.trim(), value)))
}

/// Parse a header line (`h1. Text` to `h6. Text`).
pub fn header(input: &str) -> IResult<&str, (u8, &str)> {
    let (input, level) = preceded(char('h'), one_of("123456"))(input)?;
    let (input, _) = tag(". ")(input)?;
    let (input, text) = rest(input)?;
    // one_of only yields '1'..='6'
    let level = level as u8 - b'0';
    Ok((input, (level, text)))
}

/// Parse a line holding a single macro tag: `{name}` or `{name:props}`.
pub fn macro_tag(input: &str) -> IResult<&str, MacroTag<'_>> {
    let props = preceded(char(':'), take_while(|c: char| c != '{' && c != '}'));
    let tag_body = tuple((
        take_while_m_n(2, usize::MAX, is_macro_name_char),
        opt(props),
    ));

    map(
        all_consuming(terminated(
            delimited(char('{'), tag_body, char('}')),
            terminated(space0, eof),
        )),
        |(name, props)| MacroTag { name, props },
    )(input)
}
