//! TF-IDF vectorizer over word n-grams.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use lazy_static::lazy_static;
use log::debug;
use ndarray::{Array1, Array2};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::ClassifierError;
use super::utils::normalize_vector;

lazy_static! {
    // Words of two or more characters.
    static ref TOKEN: Regex = Regex::new(r"\b\w\w+\b").unwrap();
}

/// Term-frequency / inverse-document-frequency vectorizer.
///
/// Stopwords are removed before n-grams are built, the vocabulary keeps
/// the `max_features` most frequent terms across the corpus, idf is
/// smoothed as `ln((1 + n) / (1 + df)) + 1` and every output row is
/// L2-normalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    max_features: usize,
    ngram_range: (usize, usize),
    stop_words: BTreeSet<String>,
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    pub fn new(max_features: usize, ngram_range: (usize, usize)) -> Self {
        let min_n = ngram_range.0.max(1);
        Self {
            max_features,
            ngram_range: (min_n, ngram_range.1.max(min_n)),
            stop_words: BTreeSet::new(),
            vocabulary: BTreeMap::new(),
            idf: Vec::new(),
        }
    }

    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_words = words.into_iter().map(Into::into).collect();
        self
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    pub fn is_fitted(&self) -> bool {
        !self.vocabulary.is_empty()
    }

    /// Splits a document into its n-gram terms, stopwords removed first.
    pub fn analyze(&self, document: &str) -> Vec<String> {
        let tokens: Vec<&str> = TOKEN
            .find_iter(document)
            .map(|m| m.as_str())
            .filter(|t| !self.stop_words.contains(*t))
            .collect();

        let mut terms = Vec::new();
        for n in self.ngram_range.0..=self.ngram_range.1 {
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }

    /// Learns the vocabulary and idf weights.
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<(), ClassifierError> {
        if documents.is_empty() {
            return Err(ClassifierError::Training("cannot fit vectorizer on zero documents".into()));
        }

        let mut term_freq: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let terms = self.analyze(doc.as_ref());
            let mut seen: HashSet<&str> = HashSet::new();
            for term in &terms {
                *term_freq.entry(term.clone()).or_insert(0) += 1;
                if seen.insert(term.as_str()) {
                    *doc_freq.entry(term.clone()).or_insert(0) += 1;
                }
            }
        }

        if term_freq.is_empty() {
            return Err(ClassifierError::Training(
                "empty vocabulary: documents contain only stopwords or short tokens".into(),
            ));
        }

        let mut ranked: Vec<(String, usize)> = term_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(self.max_features);

        let mut kept: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        kept.sort();

        let n_docs = documents.len() as f64;
        self.idf = kept
            .iter()
            .map(|term| {
                let df = doc_freq.get(term).copied().unwrap_or(0) as f64;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();
        self.vocabulary = kept.into_iter().enumerate().map(|(i, term)| (term, i)).collect();

        debug!("TF-IDF vocabulary: {} terms from {} documents", self.vocabulary.len(), documents.len());
        Ok(())
    }

    /// Vectorizes a single document. Unknown terms are ignored, so an
    /// empty or out-of-vocabulary document yields the zero vector.
    pub fn transform_one(&self, document: &str) -> Array1<f64> {
        let mut row = Array1::zeros(self.vocabulary.len());
        for term in self.analyze(document) {
            if let Some(&idx) = self.vocabulary.get(&term) {
                row[idx] += 1.0;
            }
        }
        for (value, idf) in row.iter_mut().zip(&self.idf) {
            *value *= idf;
        }
        normalize_vector(&mut row);
        row
    }

    pub fn transform<S: AsRef<str>>(&self, documents: &[S]) -> Array2<f64> {
        let mut matrix = Array2::zeros((documents.len(), self.vocabulary.len()));
        for (i, doc) in documents.iter().enumerate() {
            matrix.row_mut(i).assign(&self.transform_one(doc.as_ref()));
        }
        matrix
    }

    pub fn fit_transform<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<Array2<f64>, ClassifierError> {
        self.fit(documents)?;
        Ok(self.transform(documents))
    }
}
