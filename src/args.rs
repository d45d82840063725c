use std::collections::HashMap;

/// A parsed command flag: either bare presence (`shuffle`) or a `name=value`
/// pair (`base=85`). Flag names are lower-cased; values keep their case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flag {
    Bool,
    Value(String),
}

impl Flag {
    /// The string value of the flag, if it was given as `name=value`.
    pub fn value(&self) -> Option<&str> {
        match self {
            Flag::Bool => None,
            Flag::Value(v) => Some(v),
        }
    }
}

pub type Args = HashMap<String, Flag>;

/// Tokenize a raw command-argument string into a flag map.
///
/// Tokens are separated by spaces, empty tokens are dropped, and each token
/// splits on its first `=`. Malformed tokens degrade to bare flags; there are
/// no error conditions. Duplicated names keep the last occurrence.
pub fn parse_args(raw: &str) -> Args {
    let mut args = Args::new();
    for token in raw.split(' ') {
        if token.is_empty() {
            continue;
        }
        match token.split_once('=') {
            Some((name, value)) => {
                args.insert(name.to_lowercase(), Flag::Value(value.to_owned()));
            }
            None => {
                args.insert(token.to_lowercase(), Flag::Bool);
            }
        }
    }
    args
}
