use aprender::primitives::Vector;
use aprender::text::similarity::pairwise_cosine_similarity;
use aprender::text::tokenize::WhitespaceTokenizer;
use aprender::text::vectorize::TfidfVectorizer;
use aprender::AprenderError;

use super::SimilarityProvider;
use crate::services::snapshot::TrainingError;

/// TF-IDF document vectors compared by cosine similarity
///
/// Documents are split on whitespace and lowercased; English stop words are
/// dropped unless the provider is built with [`TfidfSimilarity::without_stop_words`].
#[derive(Debug, Clone)]
pub struct TfidfSimilarity {
    english_stop_words: bool,
}

impl Default for TfidfSimilarity {
    fn default() -> Self {
        Self::english()
    }
}

impl TfidfSimilarity {
    pub fn english() -> Self {
        Self {
            english_stop_words: true,
        }
    }

    /// No stop word filtering
    pub fn without_stop_words() -> Self {
        Self {
            english_stop_words: false,
        }
    }

    fn vectorizer(&self) -> TfidfVectorizer {
        let vectorizer =
            TfidfVectorizer::new().with_tokenizer(Box::new(WhitespaceTokenizer::new()));
        if self.english_stop_words {
            vectorizer.with_stop_words_english()
        } else {
            vectorizer
        }
    }

    fn provider_error(&self, error: AprenderError) -> TrainingError {
        TrainingError::Provider {
            provider: self.name(),
            message: error.to_string(),
        }
    }
}

impl SimilarityProvider for TfidfSimilarity {
    fn similarity(&self, documents: &[String]) -> Result<Vec<f64>, TrainingError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let tfidf = self
            .vectorizer()
            .fit_transform(documents)
            .map_err(|e| self.provider_error(e))?;
        let vectors: Vec<Vector<f64>> = (0..tfidf.n_rows()).map(|i| tfidf.row(i)).collect();
        let rows = pairwise_cosine_similarity(&vectors).map_err(|e| self.provider_error(e))?;

        let n = rows.len();
        let mut matrix: Vec<f64> = rows.into_iter().flatten().collect();
        for (idx, value) in matrix.iter_mut().enumerate() {
            *value = if idx / n == idx % n {
                1.0
            } else {
                (*value).clamp(0.0, 1.0)
            };
        }

        Ok(matrix)
    }

    fn name(&self) -> &'static str {
        "tfidf-cosine"
    }
}
