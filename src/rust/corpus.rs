//! Synthetic corpus of short love-letter phrases and its CSV form.
//!
//! [`generate`] is fully determined by `(n, seed)`: one `StdRng` stream is
//! consumed in a fixed order per example (prefix, phrase, suffix, extension
//! flag, optional extension), labels are produced in [`Emotion::ALL`] order
//! and are never shuffled across each other.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::classifier::ClassifierError;
use crate::labels::Emotion;

const PREFIXES: [&str; 5] = ["Realmente ", "A veces ", "Ultimamente ", "Creo que ", "Siento que "];
const SUFFIXES: [&str; 5] = ["...", "!", ".", "?", " entiendes?"];
const EXTENSIONS: [&str; 5] = [
    " y no puedo evitarlo.",
    " aunque se que deberia pensarlo mas.",
    " a pesar de todo lo que ha pasado.",
    " y espero que tu tambien lo sientas.",
    " pero tengo miedo de decirtelo.",
];

/// Seed phrases for a label.
pub fn seed_phrases(label: Emotion) -> &'static [&'static str] {
    match label {
        Emotion::Enamoramiento => &[
            "te amo con todo mi corazon",
            "eres lo mejor que me ha pasado",
            "me haces muy feliz",
            "quiero pasar mi vida contigo",
            "tu sonrisa ilumina mi dia",
            "te extrano cuando no estas",
            "contigo todo es mejor",
            "mi amor por ti crece cada dia",
            "eres mi persona favorita",
            "no imagino mi vida sin ti",
        ],
        Emotion::Ruptura => &[
            "necesito tiempo para mi",
            "esto ya no funciona",
            "he decidido terminar nuestra relacion",
            "no somos felices juntos",
            "me duele decir esto pero",
            "es mejor que cada uno siga su camino",
            "ya no siento lo mismo",
            "necesitamos separarnos",
            "no podemos seguir asi",
            "admitamos que esto se acabo",
        ],
        Emotion::Confusion => &[
            "no se que sentir",
            "estoy confundido acerca de nosotros",
            "a veces pienso una cosa y a veces otra",
            "no estoy seguro de mis sentimientos",
            "no entiendo lo que pasa entre nosotros",
            "tengo sentimientos encontrados",
            "parte de mi quiere pero otra parte no",
            "no se si es amor o costumbre",
            "estoy en una encrucijada emocional",
            "mis emociones son un caos",
        ],
    }
}

/// One labeled text, as stored in the dataset CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub texto: String,
    pub emocion: Emotion,
}

impl Example {
    pub fn new(texto: impl Into<String>, emocion: Emotion) -> Self {
        Self {
            texto: texto.into(),
            emocion,
        }
    }
}

/// Generates `floor(n / 3)` examples per label from the given seed.
///
/// When `n` is not a multiple of three the remainder is dropped, so the
/// result can hold up to two fewer examples than requested.
///
/// # Example
/// ```
/// use cartas_emociones::corpus::generate;
///
/// let corpus = generate(10, 7);
/// assert_eq!(corpus.len(), 9);
/// assert_eq!(corpus, generate(10, 7));
/// ```
pub fn generate(n: usize, seed: u64) -> Vec<Example> {
    let mut rng = StdRng::seed_from_u64(seed);
    generate_with(n, &mut rng)
}

/// Like [`generate`] with a seed drawn from the operating system.
pub fn generate_unseeded(n: usize) -> Vec<Example> {
    let mut rng = StdRng::from_os_rng();
    generate_with(n, &mut rng)
}

fn generate_with<R: Rng>(n: usize, rng: &mut R) -> Vec<Example> {
    let per_label = n / Emotion::ALL.len();
    let mut examples = Vec::with_capacity(per_label * Emotion::ALL.len());

    for label in Emotion::ALL {
        let phrases = seed_phrases(label);
        for _ in 0..per_label {
            let prefix = PREFIXES[rng.random_range(0..PREFIXES.len())];
            let phrase = phrases[rng.random_range(0..phrases.len())];
            let suffix = SUFFIXES[rng.random_range(0..SUFFIXES.len())];

            let mut texto = format!("{}{}{}", prefix, phrase, suffix);
            if rng.random::<f64>() > 0.5 {
                texto.push_str(EXTENSIONS[rng.random_range(0..EXTENSIONS.len())]);
            }
            examples.push(Example::new(texto, label));
        }
    }

    debug!("Generated {} examples ({} per label)", examples.len(), per_label);
    examples
}

/// Count of examples per label.
pub fn label_distribution(examples: &[Example]) -> BTreeMap<Emotion, usize> {
    let mut counts = BTreeMap::new();
    for example in examples {
        *counts.entry(example.emocion).or_insert(0) += 1;
    }
    counts
}

/// Writes the dataset as UTF-8 CSV with a `texto,emocion` header,
/// creating parent directories as needed.
pub fn write_csv(path: impl AsRef<Path>, examples: &[Example]) -> Result<(), ClassifierError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    for example in examples {
        writer.serialize(example)?;
    }
    writer.flush()?;
    info!("Wrote {} examples to {:?}", examples.len(), path);
    Ok(())
}

#[derive(Debug, Deserialize)]
struct RawRow {
    texto: Option<String>,
    emocion: Option<String>,
}

/// Reads a `texto,emocion` CSV file.
///
/// Fails with [`ClassifierError::MalformedData`] on a missing column value
/// or a label outside the three known emotions.
pub fn read_csv(path: impl AsRef<Path>) -> Result<Vec<Example>, ClassifierError> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)?;
    let mut examples = Vec::new();

    for (i, row) in reader.deserialize::<RawRow>().enumerate() {
        let row = row?;
        // Header is line 1.
        let line = i + 2;
        let texto = row.texto.ok_or_else(|| {
            ClassifierError::MalformedData(format!("line {}: missing 'texto'", line))
        })?;
        let emocion = row
            .emocion
            .ok_or_else(|| ClassifierError::MalformedData(format!("line {}: missing 'emocion'", line)))?
            .parse::<Emotion>()
            .map_err(|e| ClassifierError::MalformedData(format!("line {}: {}", line, e)))?;
        examples.push(Example { texto, emocion });
    }

    debug!("Read {} examples from {:?}", examples.len(), path);
    Ok(examples)
}
