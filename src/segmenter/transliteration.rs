// Pluggable character transliteration applied during normalization

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Maps typographic and accented characters to a canonical representation.
pub trait Transliterate: Send + Sync {
    fn transliterate(&self, text: &str) -> String;
}

impl<F> Transliterate for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn transliterate(&self, text: &str) -> String {
        self(text)
    }
}

/// Folds text towards ASCII: typographic punctuation is replaced, accents are
/// stripped through canonical decomposition, a few letters without a
/// decomposition are spelled out. Anything else passes through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiFold;

impl Transliterate for AsciiFold {
    fn transliterate(&self, text: &str) -> String {
        if text.is_ascii() {
            return text.to_string();
        }

        let mut result = String::with_capacity(text.len());
        for ch in text.nfd() {
            if ch.is_ascii() {
                result.push(ch);
                continue;
            }
            if is_combining_mark(ch) {
                continue;
            }
            match fold_char(ch) {
                Some(replacement) => result.push_str(replacement),
                None => result.push(ch),
            }
        }
        // Leftover non-ASCII letters go back to their composed form.
        result.nfc().collect()
    }
}

/// Leaves text unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Transliterate for Passthrough {
    fn transliterate(&self, text: &str) -> String {
        text.to_string()
    }
}

fn fold_char(ch: char) -> Option<&'static str> {
    let folded = match ch {
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' => "'",
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' | '\u{00AB}' | '\u{00BB}' => "\"",
        '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2015}' | '\u{2212}' => "-",
        '\u{2026}' => "...",
        '\u{00A0}' | '\u{2007}' | '\u{202F}' | '\u{3000}' => " ",
        '\u{2022}' | '\u{00B7}' => "*",
        '\u{FB01}' => "fi",
        '\u{FB02}' => "fl",
        '\u{FB00}' => "ff",
        '\u{0131}' => "i",
        '\u{00DF}' => "ss",
        '\u{00E6}' => "ae",
        '\u{00C6}' => "AE",
        '\u{0153}' => "oe",
        '\u{0152}' => "OE",
        '\u{00F8}' => "o",
        '\u{00D8}' => "O",
        '\u{0142}' => "l",
        '\u{0141}' => "L",
        '\u{0111}' => "d",
        '\u{0110}' => "D",
        _ => return None,
    };
    Some(folded)
}
