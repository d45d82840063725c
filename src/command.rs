//! The `!urandom` command turn: raw argument text in, chat actions out.
//!
//! Everything here is pure computation over the injected random source, so
//! the host can stay a thin dispatcher and tests can run on a seeded rng.

use rand::{CryptoRng, Rng};
use tracing::warn;

use crate::args::{parse_args, Args, Flag};
use crate::generate::{self, GenerateError, DEFAULT_LENGTH, MAX_LENGTH};
use crate::help;
use crate::urange::{self, RangeError};

pub const COMMAND: &str = "!urandom";

/// What the host should do with a finished command turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Post a plain notice into the room.
    Notice(String),
    /// Post a notice as a reply to the triggering message.
    Reply(String),
    /// Set the room topic.
    SetTopic(String),
}

/// Handle `content` if it is a `!urandom` invocation.
///
/// Returns `None` for unrelated messages, `Some(actions)` otherwise. Every
/// invocation yields at least one action; validation failures come back as
/// reply actions rather than errors.
pub fn try_handle<R: Rng + CryptoRng>(content: &str, rng: &mut R) -> Option<Vec<Action>> {
    let rest = content.strip_prefix(COMMAND)?;
    if !rest.is_empty() && !rest.starts_with(' ') {
        // Some other command sharing the prefix, e.g. `!urandomize`.
        return None;
    }
    Some(handle(&parse_args(rest), rng))
}

/// Run one command turn over already-parsed arguments.
pub fn handle<R: Rng + CryptoRng>(args: &Args, rng: &mut R) -> Vec<Action> {
    // `help` short-circuits all generation.
    if let Some(flag) = args.get("help") {
        return vec![Action::Reply(help::help_text(flag.value()).to_owned())];
    }

    // A `len` value that doesn't parse as an integer falls back to the
    // default; out-of-bounds values are rejected before mode dispatch.
    let length = args
        .get("len")
        .and_then(Flag::value)
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(DEFAULT_LENGTH as i64);
    if length > MAX_LENGTH as i64 {
        return vec![Action::Reply("Too high length".to_owned())];
    }
    if length < 0 {
        return vec![Action::Reply("Invalid length".to_owned())];
    }
    let length = length as usize;

    let text = if let Some(flag) = args.get("alphabet") {
        let Some(alphabet) = flag.value() else {
            return vec![Action::Reply("Invalid alphabet".to_owned())];
        };
        let alphabet = match args.get("space").and_then(Flag::value) {
            Some(space) if !space.is_empty() => alphabet.replace(space, " "),
            _ => alphabet.to_owned(),
        };
        let result = if args.contains_key("shuffle") || args.contains_key("permutation") {
            if alphabet.is_empty() {
                Err(GenerateError::EmptyAlphabet)
            } else {
                Ok(generate::shuffle_alphabet(&alphabet, rng))
            }
        } else {
            generate::sample_alphabet(&alphabet, length, rng)
        };
        match result {
            Ok(text) => text,
            Err(err) => {
                warn!("alphabet mode rejected: {err}");
                return vec![Action::Reply("Invalid alphabet".to_owned())];
            }
        }
    } else if let Some(flag) = args.get("urange") {
        let spec = flag.value().unwrap_or_default();
        match urange::parse_uranges(spec) {
            Ok(ranges) => generate::sample_ranges(&ranges, length, rng),
            Err(RangeError::Nul) => {
                warn!("invalid unicode range {spec:?}: {}", RangeError::Nul);
                return vec![Action::Reply(
                    "Unicode range must not include U+0000".to_owned(),
                )];
            }
            Err(err) => {
                warn!("invalid unicode range {spec:?}: {err}");
                return vec![Action::Reply("Invalid unicode range".to_owned())];
            }
        }
    } else {
        let base = match args.get("base") {
            None => "64",
            Some(Flag::Value(v)) => v.as_str(),
            Some(Flag::Bool) => "",
        };
        let bytes = generate::random_bytes(length, rng);
        match generate::encode_bytes(base, &bytes) {
            Ok(text) => text,
            Err(err) => {
                warn!("byte mode rejected: {err}");
                return vec![Action::Reply("Unknown base".to_owned())];
            }
        }
    };

    let warn_nonprintable = generate::contains_control(&text);

    let mut actions = Vec::with_capacity(2);
    if args.contains_key("topic") {
        actions.push(Action::SetTopic(text));
    } else if args.contains_key("reply") || args.contains_key("replay") {
        actions.push(Action::Reply(text));
    } else {
        actions.push(Action::Notice(text));
    }
    if warn_nonprintable {
        // Sent in addition to the output, not instead of it.
        actions.push(Action::Reply(
            "Warning: output contains non-printable characters".to_owned(),
        ));
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use rand::{rngs::StdRng, SeedableRng};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0x5eed)
    }

    fn handle_raw(raw: &str) -> Vec<Action> {
        handle(&parse_args(raw), &mut rng())
    }

    fn single_notice(actions: Vec<Action>) -> String {
        assert_eq!(actions.len(), 1, "expected exactly one action: {actions:?}");
        match actions.into_iter().next().unwrap() {
            Action::Notice(text) => text,
            other => panic!("expected a notice, got {other:?}"),
        }
    }

    #[test]
    fn default_turn_is_64_bytes_of_base64() {
        let text = single_notice(handle_raw(""));
        let decoded = base64::engine::general_purpose::STANDARD_NO_PAD
            .decode(&text)
            .unwrap();
        assert_eq!(decoded.len(), 64);
    }

    #[test]
    fn len_bounds_are_checked_before_dispatch() {
        assert_eq!(
            handle_raw("len=513"),
            vec![Action::Reply("Too high length".to_owned())]
        );
        assert_eq!(
            handle_raw("len=-1"),
            vec![Action::Reply("Invalid length".to_owned())]
        );
        // Applies to non-byte modes too.
        assert_eq!(
            handle_raw("alphabet=abc len=513"),
            vec![Action::Reply("Too high length".to_owned())]
        );
    }

    #[test]
    fn unparsable_len_falls_back_to_default() {
        let text = single_notice(handle_raw("len=abc base=16"));
        assert_eq!(text.len(), 128);
        let text = single_notice(handle_raw("len base=16"));
        assert_eq!(text.len(), 128);
    }

    #[test]
    fn len_zero_yields_empty_output() {
        assert_eq!(single_notice(handle_raw("len=0")), "");
    }

    #[test]
    fn unknown_base_is_reported() {
        assert_eq!(
            handle_raw("base=99"),
            vec![Action::Reply("Unknown base".to_owned())]
        );
        assert_eq!(
            handle_raw("base"),
            vec![Action::Reply("Unknown base".to_owned())]
        );
    }

    #[test]
    fn alphabet_mode_samples_from_the_alphabet() {
        let text = single_notice(handle_raw("alphabet=abc len=10"));
        assert_eq!(text.chars().count(), 10);
        assert!(text.chars().all(|c| "abc".contains(c)));
    }

    #[test]
    fn space_flag_substitutes_spaces() {
        let text = single_notice(handle_raw("alphabet=a_ space=_ len=50"));
        assert!(text.chars().all(|c| c == 'a' || c == ' '));
        assert!(text.contains(' '));
    }

    #[test]
    fn shuffle_permutes_and_ignores_len() {
        for flag in ["shuffle", "permutation"] {
            let text = single_notice(handle_raw(&format!("alphabet=abcdef {flag} len=3")));
            let mut got: Vec<char> = text.chars().collect();
            got.sort_unstable();
            assert_eq!(got, vec!['a', 'b', 'c', 'd', 'e', 'f']);
        }
    }

    #[test]
    fn valueless_alphabet_is_invalid() {
        assert_eq!(
            handle_raw("alphabet"),
            vec![Action::Reply("Invalid alphabet".to_owned())]
        );
        assert_eq!(
            handle_raw("alphabet= shuffle"),
            vec![Action::Reply("Invalid alphabet".to_owned())]
        );
    }

    #[test]
    fn urange_mode_stays_in_range() {
        let text = single_notice(handle_raw("urange=a-z len=40"));
        assert_eq!(text.chars().count(), 40);
        assert!(text.chars().all(|c| c.is_ascii_lowercase()));
    }

    #[test]
    fn zero_endpoint_gets_the_dedicated_diagnostic() {
        assert_eq!(
            handle_raw("urange=0-5"),
            vec![Action::Reply(
                "Unicode range must not include U+0000".to_owned()
            )]
        );
    }

    #[test]
    fn bad_uranges_get_the_generic_diagnostic() {
        let invalid = vec![Action::Reply("Invalid unicode range".to_owned())];
        assert_eq!(handle_raw("urange=zzz"), invalid);
        assert_eq!(handle_raw("urange=0x110000-0x110001"), invalid);
        assert_eq!(handle_raw("urange"), invalid);
    }

    #[test]
    fn control_characters_add_a_warning_reply() {
        let actions = handle_raw("urange=0x1-0x5 len=8");
        assert_eq!(actions.len(), 2);
        assert!(matches!(&actions[0], Action::Notice(text)
            if text.chars().count() == 8 && text.chars().all(|c| ('\u{1}'..='\u{5}').contains(&c))));
        assert_eq!(
            actions[1],
            Action::Reply("Warning: output contains non-printable characters".to_owned())
        );
    }

    #[test]
    fn topic_flag_sets_the_topic() {
        let actions = handle_raw("topic len=16");
        assert_eq!(actions.len(), 1);
        assert!(matches!(&actions[0], Action::SetTopic(_)));
    }

    #[test]
    fn reply_flags_switch_to_reply() {
        for flag in ["reply", "replay"] {
            let actions = handle_raw(&format!("{flag} len=16"));
            assert_eq!(actions.len(), 1);
            assert!(matches!(&actions[0], Action::Reply(_)));
        }
    }

    #[test]
    fn help_short_circuits_generation() {
        assert_eq!(
            handle_raw("help=alphabet len=9999"),
            vec![Action::Reply(crate::help::ALPHABET.to_owned())]
        );
        assert_eq!(
            handle_raw("help"),
            vec![Action::Reply(crate::help::GENERAL.to_owned())]
        );
        assert_eq!(
            handle_raw("help=nonexistent"),
            vec![Action::Reply(crate::help::UNKNOWN.to_owned())]
        );
    }

    #[test]
    fn try_handle_only_matches_the_command() {
        let mut rng = rng();
        assert!(try_handle("hello there", &mut rng).is_none());
        assert!(try_handle("!urandomize", &mut rng).is_none());
        assert!(try_handle("!urandom", &mut rng).is_some());
        assert!(try_handle("!urandom len=16", &mut rng).is_some());
    }
}
