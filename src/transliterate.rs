//! Cyrillic to Latin transliteration.
//!
//! The table covers the Ukrainian and Russian alphabets in both cases. It is
//! static configuration: built once at startup and passed by reference.

use std::collections::HashMap;

const TABLE: &[(char, &str)] = &[
    ('а', "a"),
    ('б', "b"),
    ('в', "v"),
    ('г', "g"),
    ('ґ', "g"),
    ('д', "d"),
    ('е', "e"),
    ('є', "ye"),
    ('ё', "yo"),
    ('ж', "zh"),
    ('з', "z"),
    ('и', "y"),
    ('і', "i"),
    ('ї', "yi"),
    ('й', "y"),
    ('к', "k"),
    ('л', "l"),
    ('м', "m"),
    ('н', "n"),
    ('о', "o"),
    ('п', "p"),
    ('р', "r"),
    ('с', "s"),
    ('т', "t"),
    ('у', "u"),
    ('ф', "f"),
    ('х', "h"),
    ('ц', "ts"),
    ('ч', "ch"),
    ('ш', "sh"),
    ('щ', "shch"),
    ('ъ', ""),
    ('ы', "y"),
    ('ь', ""),
    ('э', "e"),
    ('ю', "yu"),
    ('я', "ya"),
    ('А', "A"),
    ('Б', "B"),
    ('В', "V"),
    ('Г', "G"),
    ('Ґ', "G"),
    ('Д', "D"),
    ('Е', "E"),
    ('Є', "Ye"),
    ('Ё', "Yo"),
    ('Ж', "Zh"),
    ('З', "Z"),
    ('И', "I"),
    ('І', "I"),
    ('Ї', "Yi"),
    ('Й', "Y"),
    ('К', "K"),
    ('Л', "L"),
    ('М', "M"),
    ('Н', "N"),
    ('О', "O"),
    ('П', "P"),
    ('Р', "R"),
    ('С', "S"),
    ('Т', "T"),
    ('У', "U"),
    ('Ф', "F"),
    ('Х', "H"),
    ('Ц', "Ts"),
    ('Ч', "Ch"),
    ('Ш', "Sh"),
    ('Щ', "Shch"),
    ('Ъ', ""),
    ('Ы', "Y"),
    ('Ь', ""),
    ('Э', "E"),
    ('Ю', "Yu"),
    ('Я', "Ya"),
];

/// Per-character substitution table.
#[derive(Debug, Clone)]
pub struct Transliterator {
    map: HashMap<char, &'static str>,
}

impl Transliterator {
    pub fn new() -> Self {
        Self {
            map: TABLE.iter().copied().collect(),
        }
    }

    /// Returns the Latin replacement of `c`, if it is a table letter.
    pub fn lookup(&self, c: char) -> Option<&'static str> {
        self.map.get(&c).copied()
    }

    /// Whether `c` passes through untouched.
    pub fn is_safe(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '_'
    }

    /// Appends the sanitized form of `c` to `out`.
    ///
    /// Safe characters are kept, table letters are replaced, and anything
    /// else becomes a single `_`.
    pub fn push_sanitized(&self, c: char, out: &mut String) {
        if Self::is_safe(c) {
            out.push(c);
        } else if let Some(latin) = self.lookup(c) {
            out.push_str(latin);
        } else {
            out.push('_');
        }
    }
}

impl Default for Transliterator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_output_is_ascii_letters() {
        for (_, latin) in TABLE {
            assert!(latin.chars().all(|c| c.is_ascii_alphabetic()));
        }
    }

    #[test]
    fn test_table_has_no_duplicate_keys() {
        let t = Transliterator::new();
        assert_eq!(t.map.len(), TABLE.len());
    }

    #[test]
    fn test_every_lowercase_letter_has_uppercase_pair() {
        let t = Transliterator::new();
        for (c, _) in TABLE.iter().filter(|(c, _)| c.is_lowercase()) {
            for upper in c.to_uppercase() {
                assert!(t.lookup(upper).is_some(), "missing upper case for {c}");
            }
        }
    }

    #[test]
    fn test_push_sanitized() {
        let t = Transliterator::new();
        let mut out = String::new();
        for c in "Щ-a_9ьé".chars() {
            t.push_sanitized(c, &mut out);
        }
        assert_eq!(out, "Shch_a_9_");
    }
}
