//! Fixed Morse code table: 26 letters and 10 digits
//!
//! Built once on first use and shared read-only by every decoder.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::types::{Pattern, Symbol};

/// (pattern, character) pairs in ".-" notation
const CODES: [(&str, char); 36] = [
    (".-", 'A'),
    ("-...", 'B'),
    ("-.-.", 'C'),
    ("-..", 'D'),
    (".", 'E'),
    ("..-.", 'F'),
    ("--.", 'G'),
    ("....", 'H'),
    ("..", 'I'),
    (".---", 'J'),
    ("-.-", 'K'),
    (".-..", 'L'),
    ("--", 'M'),
    ("-.", 'N'),
    ("---", 'O'),
    (".--.", 'P'),
    ("--.-", 'Q'),
    (".-.", 'R'),
    ("...", 'S'),
    ("-", 'T'),
    ("..-", 'U'),
    ("...-", 'V'),
    (".--", 'W'),
    ("-..-", 'X'),
    ("-.--", 'Y'),
    ("--..", 'Z'),
    (".----", '1'),
    ("..---", '2'),
    ("...--", '3'),
    ("....-", '4'),
    (".....", '5'),
    ("-....", '6'),
    ("--...", '7'),
    ("---..", '8'),
    ("----.", '9'),
    ("-----", '0'),
];

lazy_static! {
    static ref DECODE: HashMap<Vec<Symbol>, char> = CODES
        .iter()
        .map(|(code, c)| (to_symbols(code), *c))
        .collect();

    static ref ENCODE: HashMap<char, Vec<Symbol>> = CODES
        .iter()
        .map(|(code, c)| (*c, to_symbols(code)))
        .collect();
}

fn to_symbols(code: &str) -> Vec<Symbol> {
    code.chars().filter_map(Symbol::from_char).collect()
}

/// Look up the character for a symbol sequence
pub fn lookup(symbols: &[Symbol]) -> Option<char> {
    DECODE.get(symbols).copied()
}

/// Look up the pattern for a character (case-insensitive)
pub fn pattern_for(c: char) -> Option<Pattern> {
    ENCODE
        .get(&c.to_ascii_uppercase())
        .map(|symbols| Pattern::from(symbols.clone()))
}

/// Number of entries in the table
pub fn len() -> usize {
    DECODE.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_has_letters_and_digits() {
        assert_eq!(len(), 36);
        for c in ('A'..='Z').chain('0'..='9') {
            assert!(pattern_for(c).is_some(), "missing {}", c);
        }
    }

    #[test]
    fn test_lookup_known_patterns() {
        assert_eq!(lookup(&[Symbol::Dot]), Some('E'));
        assert_eq!(lookup(&[Symbol::Dash]), Some('T'));
        assert_eq!(lookup(&[Symbol::Dot, Symbol::Dash]), Some('A'));
        assert_eq!(lookup(Pattern::parse("...").unwrap().symbols()), Some('S'));
        assert_eq!(lookup(Pattern::parse("-----").unwrap().symbols()), Some('0'));
    }

    #[test]
    fn test_lookup_misses() {
        assert_eq!(lookup(&[]), None);
        assert_eq!(lookup(Pattern::parse("......").unwrap().symbols()), None);
        assert_eq!(lookup(Pattern::parse("..--").unwrap().symbols()), None);
    }

    #[test]
    fn test_patterns_round_trip_through_lookup() {
        for c in ('A'..='Z').chain('0'..='9') {
            let pattern = pattern_for(c).unwrap();
            assert!((1..=5).contains(&pattern.len()));
            assert_eq!(lookup(pattern.symbols()), Some(c));
        }
    }

    #[test]
    fn test_pattern_for_lowercase_and_unsupported() {
        assert_eq!(pattern_for('s').unwrap().to_string(), "...");
        assert!(pattern_for('?').is_none());
    }
}
