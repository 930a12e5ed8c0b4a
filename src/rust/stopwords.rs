//! Spanish stopword configuration.
//!
//! Stopwords come from one of two tiers: a preferred external word list
//! (one word per line) or the embedded [`FALLBACK_STOPWORDS`] constant. The
//! choice is made once, deterministically, and logged.

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Environment variable pointing at a preferred stopword file.
pub const STOPWORDS_ENV: &str = "CARTAS_STOPWORDS";

/// Embedded Spanish stopword list used when no external source is available.
///
/// Kept verbatim, repeated entries included.
pub const FALLBACK_STOPWORDS: &[&str] = &[
    "de", "la", "que", "el", "en", "y", "a", "los", "del", "se", "las", "por", "un", "para",
    "con", "no", "una", "su", "al", "lo", "como", "mas", "pero", "sus", "le", "ya", "o",
    "este", "si", "porque", "esta", "entre", "cuando", "muy", "sin", "sobre", "tambien", "me",
    "hasta", "hay", "donde", "quien", "desde", "todo", "nos", "durante", "todos", "uno", "les",
    "ni", "contra", "otros", "ese", "eso", "ante", "ellos", "e", "esto", "mi", "antes",
    "algunos", "que", "unos", "yo", "otro", "otras", "otra", "el", "tanto", "esa", "estos",
    "mucho", "quienes", "nada", "muchos", "cual", "poco", "ella", "estar", "estas", "algunas",
    "algo", "nosotros", "mi", "mis", "tus", "te", "ti", "tu", "ellas", "nosotras", "vosostros",
    "vosostras", "os", "mio", "mia", "mios", "mias", "tuyo", "tuya", "tuyos", "tuyas", "suyo",
    "suya", "suyos", "suyas", "nuestro", "nuestra", "nuestros", "nuestras", "vuestro",
    "vuestra", "vuestros", "vuestras", "esos", "esas", "estoy", "estas", "esta", "estamos",
    "estais", "estan", "este", "estes", "estemos", "esteis", "esten", "estare", "estaras",
    "estara", "estaremos", "estareis", "estaran", "estaria", "estarias", "estariamos",
    "estariais", "estarian", "estaba", "estabas", "estabamos", "estabais", "estaban", "estuve",
    "estuviste", "estuvo", "estuvimos", "estuvisteis", "estuvieron", "estuviera", "estuvieras",
    "estuvieramos", "estuvierais", "estuvieran", "estuviese", "estuvieses", "estuviesemos",
    "estuvieseis", "estuviesen", "estando", "estado", "estada", "estados", "estadas", "estad",
];

/// Where the stopword list should be read from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StopwordSource {
    /// A newline-separated word list on disk, falling back to the embedded
    /// list if it cannot be read or is empty.
    File(PathBuf),
    /// The embedded [`FALLBACK_STOPWORDS`] list.
    #[default]
    Embedded,
}

/// Which tier actually provided the words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopwordOrigin {
    File(PathBuf),
    Embedded,
}

/// A resolved stopword list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stopwords {
    words: Vec<String>,
    origin: StopwordOrigin,
}

impl StopwordSource {
    /// Uses the file named by `CARTAS_STOPWORDS` when set, the embedded list otherwise.
    pub fn from_env() -> Self {
        match env::var(STOPWORDS_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::File(PathBuf::from(path)),
            _ => Self::Embedded,
        }
    }

    /// Loads the words from this source. Never fails: an unusable file
    /// degrades to the embedded list with a warning.
    pub fn resolve(&self) -> Stopwords {
        match self {
            Self::File(path) => match read_word_list(path) {
                Ok(words) if !words.is_empty() => {
                    let stopwords = Stopwords {
                        words,
                        origin: StopwordOrigin::File(path.clone()),
                    };
                    info!(
                        "Using {} stopwords ({} distinct) from {:?}",
                        stopwords.words.len(),
                        stopwords.to_set().len(),
                        path
                    );
                    stopwords
                }
                Ok(_) => {
                    warn!("Stopword file {:?} is empty, using embedded list", path);
                    Stopwords::embedded()
                }
                Err(e) => {
                    warn!("Cannot read stopword file {:?} ({}), using embedded list", path, e);
                    Stopwords::embedded()
                }
            },
            Self::Embedded => {
                let stopwords = Stopwords::embedded();
                info!(
                    "Using embedded stopword list ({} entries, {} distinct)",
                    stopwords.words.len(),
                    stopwords.to_set().len()
                );
                stopwords
            }
        }
    }
}

impl Stopwords {
    pub fn embedded() -> Self {
        Self {
            words: FALLBACK_STOPWORDS.iter().map(|w| w.to_string()).collect(),
            origin: StopwordOrigin::Embedded,
        }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn origin(&self) -> &StopwordOrigin {
        &self.origin
    }

    pub fn to_set(&self) -> HashSet<String> {
        self.words.iter().cloned().collect()
    }
}

fn read_word_list(path: &Path) -> std::io::Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_lowercase)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_fallback_list_is_pinned() {
        assert_eq!(FALLBACK_STOPWORDS.len(), 165);
        let distinct: HashSet<&str> = FALLBACK_STOPWORDS.iter().copied().collect();
        assert_eq!(distinct.len(), 159);
        assert_eq!(&FALLBACK_STOPWORDS[..4], &["de", "la", "que", "el"]);
        assert_eq!(FALLBACK_STOPWORDS.last(), Some(&"estad"));
        assert!(distinct.contains("vosostros"));
    }

    #[test]
    fn test_embedded_source() {
        let stopwords = StopwordSource::Embedded.resolve();
        assert_eq!(stopwords.origin(), &StopwordOrigin::Embedded);
        assert_eq!(stopwords.words().len(), 165);
        assert_eq!(stopwords.to_set().len(), 159);
    }

    #[test]
    fn test_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# comentario\nDe\n\n la \nque").unwrap();
        let source = StopwordSource::File(file.path().to_path_buf());
        let stopwords = source.resolve();
        assert_eq!(stopwords.words(), &["de", "la", "que"]);
        assert_eq!(stopwords.origin(), &StopwordOrigin::File(file.path().to_path_buf()));
    }

    #[test]
    fn test_missing_or_empty_file_falls_back() {
        let missing = StopwordSource::File(PathBuf::from("/nonexistent/cartas/stopwords.txt"));
        assert_eq!(missing.resolve().origin(), &StopwordOrigin::Embedded);

        let empty = tempfile::NamedTempFile::new().unwrap();
        let source = StopwordSource::File(empty.path().to_path_buf());
        assert_eq!(source.resolve().words().len(), FALLBACK_STOPWORDS.len());
    }
}
