use rayon::prelude::*;

use super::driver::{Normalization, Normalizer};
use crate::error::Error;

impl Normalizer {
    /// Normalize independent statements in parallel.
    ///
    /// Returns one result per input, in input order; a failing input does not
    /// affect the others.
    pub fn normalize_batch<S>(&self, sources: &[S]) -> Vec<Result<String, Error>>
    where
        S: AsRef<str> + Sync,
    {
        sources
            .par_iter()
            .map(|source| self.normalize(source.as_ref()))
            .collect()
    }

    /// Like [`normalize_batch`](Self::normalize_batch), keeping the detailed report.
    pub fn normalize_batch_detailed<S>(&self, sources: &[S]) -> Vec<Result<Normalization, Error>>
    where
        S: AsRef<str> + Sync,
    {
        sources
            .par_iter()
            .map(|source| self.normalize_detailed(source.as_ref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_follow_input_order() {
        let inputs = vec![
            "SELECT 1".to_string(),
            "SELECT 'broken".to_string(),
            "UPDATE t SET a = 2 WHERE b = 'x'".to_string(),
        ];
        let results = Normalizer::default().normalize_batch(&inputs);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_deref().unwrap(), "SELECT $1");
        assert!(results[1].is_err());
        assert_eq!(
            results[2].as_deref().unwrap(),
            "UPDATE t SET a = $1 WHERE b = $2"
        );
    }

    #[test]
    fn detailed_batch_keeps_reports() {
        let results = Normalizer::default().normalize_batch_detailed(&["SELECT 1, 2", "FETCH 5 FROM c"]);
        let first = results[0].as_ref().unwrap();
        assert_eq!(first.substitution_count(), 2);
        let second = results[1].as_ref().unwrap();
        assert_eq!(second.normalized, "FETCH 5 FROM c");
        assert_eq!(second.statements[0].preserved[0].text, "5");
    }

    #[test]
    fn normalizer_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Normalizer>();
    }
}
