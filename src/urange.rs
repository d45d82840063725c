use std::fmt;

/// Highest valid code point, exclusive.
const CODEPOINT_LIMIT: u32 = 0x11_0000;

/// A half-open range of Unicode code points, `start..end`.
///
/// The grammar is inclusive (`a-z` means `z` can be drawn), so `end` stores
/// the inclusive upper bound plus one and a uniform draw in `[start, end)`
/// covers exactly the requested code points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodepointRange {
    pub start: u32,
    pub end: u32,
}

impl CodepointRange {
    /// Number of code points in the range. Always at least 1 for a range
    /// that passed validation.
    pub fn weight(&self) -> u32 {
        self.end - self.start
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    /// An endpoint is U+0000. Rejected separately from the generic
    /// out-of-range case: NUL breaks downstream string handling.
    Nul,
    /// An endpoint lies beyond U+10FFFF.
    OutOfRange(u32),
    /// The range overlaps U+D800..U+DFFF, which `char` cannot represent.
    Surrogate,
    /// The start endpoint lies beyond the end endpoint.
    Empty,
    /// An endpoint expression could not be parsed at all.
    Parse(String),
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeError::Nul => write!(f, "range endpoint is U+0000 (NUL)"),
            RangeError::OutOfRange(cp) => {
                write!(f, "code point {cp:#x} is beyond U+10FFFF")
            }
            RangeError::Surrogate => {
                write!(f, "range overlaps the surrogate block U+D800..U+DFFF")
            }
            RangeError::Empty => write!(f, "range start is beyond its end"),
            RangeError::Parse(part) => write!(f, "cannot parse {part:?} as a code point"),
        }
    }
}

impl std::error::Error for RangeError {}

/// Parse a comma-separated list of range expressions.
///
/// Any invalid expression fails the whole list; there is no partial
/// acceptance.
pub fn parse_uranges(input: &str) -> Result<Vec<CodepointRange>, RangeError> {
    input
        .split(',')
        .map(|expr| parse_urange(expr.trim()))
        .collect()
}

/// Parse a single range expression into a validated half-open range.
pub fn parse_urange(expr: &str) -> Result<CodepointRange, RangeError> {
    let (start, end) = if !expr.contains('-') {
        let cp = match expr.strip_prefix("U+") {
            Some(hex) => parse_hex(hex)?,
            None => parse_part(expr)?,
        };
        (cp, cp)
    } else if expr.get(..2).is_some_and(|p| p.eq_ignore_ascii_case("u+")) {
        // `U+0061-007A`: both halves are hex.
        let (start, end) = expr[2..]
            .split_once('-')
            .ok_or_else(|| RangeError::Parse(expr.to_owned()))?;
        (parse_hex(start)?, parse_hex(end)?)
    } else {
        let (start, end) = expr
            .split_once('-')
            .ok_or_else(|| RangeError::Parse(expr.to_owned()))?;
        (parse_part(start)?, parse_part(end)?)
    };

    for endpoint in [start, end] {
        if endpoint == 0 {
            return Err(RangeError::Nul);
        }
        if endpoint >= CODEPOINT_LIMIT {
            return Err(RangeError::OutOfRange(endpoint));
        }
    }
    if start > end {
        return Err(RangeError::Empty);
    }
    if start <= 0xDFFF && end >= 0xD800 {
        return Err(RangeError::Surrogate);
    }

    Ok(CodepointRange {
        start,
        end: end + 1,
    })
}

/// Resolve one range endpoint: `0x..` hex, `0b..` binary, `\u....` escape,
/// a decimal integer, or a single literal character's code point.
fn parse_part(part: &str) -> Result<u32, RangeError> {
    let parsed = if let Some(hex) = part.strip_prefix("0x") {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = part.strip_prefix("0b") {
        u32::from_str_radix(bin, 2).ok()
    } else if let Some(esc) = part.strip_prefix("\\u") {
        u32::from_str_radix(esc, 16).ok()
    } else if let Ok(dec) = part.parse::<u32>() {
        Some(dec)
    } else {
        let mut chars = part.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c as u32),
            _ => None,
        }
    };
    parsed.ok_or_else(|| RangeError::Parse(part.to_owned()))
}

fn parse_hex(part: &str) -> Result<u32, RangeError> {
    u32::from_str_radix(part, 16).map_err(|_| RangeError::Parse(part.to_owned()))
}
