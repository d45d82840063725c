//! Static help texts for the `!urandom` command.

pub const GENERAL: &str = "\
!urandom generates random output and posts it in this room.\n\
Default: 64 random bytes, base64-encoded.\n\
Flags: len=<0..512>, base=<raw|16|hex|32|64|85|65536>, alphabet=<chars>, \
space=<char>, shuffle, urange=<ranges>, topic, reply.\n\
Ask help=<flag> for details on a flag.";

pub const BASE: &str = "\
base=<encoding> picks the byte-mode encoding: raw (decimal byte list), \
16/hex (uppercase hex), 32 (base32, no padding), 64 (base64, no padding, \
the default), 85 (base85), 65536 (base65536, two bytes per character).";

pub const ALPHABET: &str = "\
alphabet=<chars> draws each output character uniformly from the given \
characters. space=<char> substitutes a space for every occurrence of that \
character first. shuffle (or permutation) returns a random permutation of \
the alphabet instead, ignoring len.";

pub const URANGE: &str = "\
urange=<ranges> draws code points from a comma-separated list of inclusive \
ranges, e.g. urange=a-z,0x30-0x39,U+00C0-00FF. Endpoints may be hex (0x61 \
or U+0061), binary (0b1100001), decimal (97), a \\u escape, or a literal \
character. Larger ranges are proportionally more likely.";

pub const TOPIC: &str = "\
topic sets the generated output as the room topic instead of posting it as \
a message.";

pub const LEN: &str = "\
len=<n> sets the output length: bytes in byte mode, characters otherwise. \
Allowed range is 0 to 512; the default is 64.";

pub const HELP: &str = "\
help shows the general help; help=<topic> documents one flag. Topics: \
base, alphabet, urange, topic, len, help.";

pub const UNKNOWN: &str = "Unknown help topic, see help=help.";

/// Look up the help text for a sub-topic; `None` is the general text.
pub fn help_text(topic: Option<&str>) -> &'static str {
    match topic {
        None => GENERAL,
        Some("base") => BASE,
        Some("alphabet") => ALPHABET,
        Some("urange") => URANGE,
        Some("topic") => TOPIC,
        Some("len") => LEN,
        Some("help") => HELP,
        Some(_) => UNKNOWN,
    }
}
