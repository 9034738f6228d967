//! Word tables of the AWSW word clock firmware.
//!
//! Each language edition of the clock has its own set of extra words. The
//! numeric ID is what the device's HTTP interface addresses; IDs are unique
//! within a table but tables are not required to be contiguous.

use strum::Display;
use strum::EnumIter;
use strum::EnumString;
use strum::IntoStaticStr;

/// Word ID as used in the device's `ew` and `ewstatus` routes
pub type WordId = u8;

/// Ordered `(word ID, label)` entries of one language
pub type WordTable = &'static [(WordId, &'static str)];

/// Language editions of the clock
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
pub enum Language {
    German,
    English,
    Dutch,
    French,
    Italian,
    Swedish,
    Spanish,
}

/// Language used when a configuration entry doesn't name one
pub const DEFAULT_LANGUAGE: Language = Language::German;

const GERMAN: WordTable = &[
    (1, "ALARM"),
    (2, "GEBURTSTAG"),
    (3, "MÜLL RAUS BRINGEN"),
    (4, "AUTO"),
    (5, "FEIERTAG"),
    (6, "FORMEL1"),
    (7, "GELBER SACK"),
    (8, "URLAUB"),
    (9, "WERKSTATT"),
    (10, "ZEIT ZUM ZOCKEN"),
    (11, "FRISEUR"),
    (12, "TERMIN"),
];

const ENGLISH: WordTable = &[
    (1, "COME HERE"),
    (2, "LUNCH TIME"),
    (3, "ALARM"),
    (4, "GARBAGE"),
    (5, "HOLIDAY"),
    (6, "TEMPERATURE"),
    (7, "DATE"),
    (8, "BIRTHDAY"),
    (9, "DOORBELL"),
];

const DUTCH: WordTable = &[
    (1, "KOM HIER"),
    (2, "LUNCH TIJD"),
    (3, "ALARM"),
    (4, "AFVAL"),
    (5, "VAKANTIE"),
    (6, "TEMPERATUUR"),
    (7, "DATUM"),
    (8, "VERJAARDAG"),
    (9, "DEURBEL"),
];

const FRENCH: WordTable = &[
    (1, "ALARME"),
    (2, "ANNIVERSAIRE"),
    (3, "POUBELLE"),
    (4, "A TABLE"),
    (5, "VACANCES"),
    (6, "VIENS ICI"),
    (7, "SONNETTE"),
    (8, "TEMPERATURE"),
    (9, "DATE"),
];

const ITALIAN: WordTable = &[
    (1, "VIENI QUI"),
    (2, "ORA DI PRANZO"),
    (3, "ALLARME"),
    (4, "VACANZA"),
    (5, "TEMPERATURA"),
    (6, "DATA"),
    (7, "COMPLEANNO"),
    (8, "CAMPANELLO"),
];

const SWEDISH: WordTable = &[
    (1, "FÖDELSEDAG"),
    (2, "LARM"),
    (3, "HÖGTID"),
    (4, "SEMESTER"),
    (5, "LADDA NER"),
    (6, "LUNCHTID"),
    (7, "KOM HIT"),
    (8, "DÖRRKLOCKA"),
    (9, "TEMPERATUR"),
];

const SPANISH: WordTable = &[
    (1, "CUMPLEAÑOS"),
    (2, "ALARMA"),
    (3, "VACACIONES"),
    (4, "DÍA DE BASURA"),
    (5, "FECHA"),
    (6, "HORA DE ALMUERZO"),
    (7, "VEN AQUÍ"),
    (8, "TIMBRE"),
    (9, "TEMPERATURA"),
];

impl Language {
    /// Word table of this language edition
    pub fn words(self) -> WordTable {
        match self {
            Language::German => GERMAN,
            Language::English => ENGLISH,
            Language::Dutch => DUTCH,
            Language::French => FRENCH,
            Language::Italian => ITALIAN,
            Language::Swedish => SWEDISH,
            Language::Spanish => SPANISH,
        }
    }
}

/// Look up the word table for a language name.
///
/// Names match exactly (`"English"`, not `"english"`). Unknown names yield an
/// empty table.
pub fn lookup(language: &str) -> WordTable {
    language
        .parse::<Language>()
        .map(Language::words)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use strum::IntoEnumIterator;

    use super::*;

    fn labels(table: WordTable) -> String {
        table
            .iter()
            .map(|(_, label)| *label)
            .collect::<Vec<_>>()
            .join(", ")
    }

    #[test]
    fn test_every_language_has_unique_ids() {
        for language in Language::iter() {
            let table = language.words();
            assert!(!table.is_empty(), "{} has no words", language);

            let ids: BTreeSet<WordId> = table.iter().map(|(id, _)| *id).collect();
            assert_eq!(ids.len(), table.len(), "{} has duplicate IDs", language);
            assert!(!ids.contains(&0), "{} uses word ID 0", language);
        }
    }

    #[test]
    fn test_lookup_by_name() {
        for language in Language::iter() {
            assert_eq!(lookup(&language.to_string()), language.words());
        }
    }

    #[test]
    fn test_unknown_language_is_empty() {
        assert!(lookup("Klingon").is_empty());
        assert!(lookup("english").is_empty());
        assert!(lookup("").is_empty());
    }

    #[test]
    fn test_english_table() {
        let table = lookup("English");
        let ids: Vec<WordId> = table.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, (1..=9).collect::<Vec<_>>());
        insta::assert_snapshot!(
            labels(table),
            @"COME HERE, LUNCH TIME, ALARM, GARBAGE, HOLIDAY, TEMPERATURE, DATE, BIRTHDAY, DOORBELL"
        );
    }

    #[test]
    fn test_german_is_default() {
        assert_eq!(DEFAULT_LANGUAGE.to_string(), "German");
        assert_eq!(DEFAULT_LANGUAGE.words().len(), 12);
        assert_eq!(DEFAULT_LANGUAGE.words()[2], (3, "MÜLL RAUS BRINGEN"));
    }

    #[test]
    fn test_language_names() {
        let names: Vec<&'static str> = Language::iter().map(Into::into).collect();
        insta::assert_snapshot!(
            names.join(", "),
            @"German, English, Dutch, French, Italian, Swedish, Spanish"
        );
    }
}
