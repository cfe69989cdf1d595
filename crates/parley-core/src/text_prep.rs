//! Text preparation: input commands, emoji stripping, and speech markup.
//!
//! Pure functions, no I/O.

use regex::Regex;
use std::sync::LazyLock;

// Dingbats, private use, variation selectors, circled M, and everything
// outside the Basic Multilingual Plane (pictographs, flags, symbols).
static RE_EMOJI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\x{2700}-\x{27BF}\x{E000}-\x{F8FF}\x{FE00}-\x{FE0F}\x{24C2}\x{10000}-\x{10FFFF}]")
        .unwrap()
});

/// Word that ends a chat session.
pub const EXIT_COMMAND: &str = "exit";

/// True when the (untrimmed) input asks to leave the chat.
pub fn is_exit_command(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case(EXIT_COMMAND)
}

/// Remove emoji so the speech service doesn't read out their names.
pub fn strip_emojis(text: &str) -> String {
    RE_EMOJI.replace_all(text, "").into_owned()
}

/// Escape the five XML metacharacters.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Build the SSML document sent to the speech service.
///
/// Both `text` and `voice` are escaped, so user input can't open new
/// elements or break out of the `name` attribute.
pub fn build_ssml(text: &str, voice: &str) -> String {
    format!(
        "<speak version='1.0' xml:lang='en-US'>\
         <voice xml:lang='en-US' xml:gender='Female' name='{}'>{}</voice>\
         </speak>",
        escape_xml(voice),
        escape_xml(text),
    )
}
