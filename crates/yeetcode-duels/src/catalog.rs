//! Problem selection collaborator

use async_trait::async_trait;
use rand::Rng;

use yeetcode_types::{Difficulty, Problem};

use crate::CatalogError;

/// Source of duel problems
#[async_trait]
pub trait ProblemCatalog: Send + Sync {
    /// Pick a random problem of exactly `difficulty`
    async fn random_problem(&self, difficulty: Difficulty) -> Result<Problem, CatalogError>;
}

/// Fixed problem list, for tests and offline demos
pub struct StaticCatalog {
    problems: Vec<Problem>,
}

impl StaticCatalog {
    pub fn new(problems: Vec<Problem>) -> Self {
        Self { problems }
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::new(vec![
            Problem::new("two-sum", "Two Sum", Difficulty::Easy),
            Problem::new("valid-parentheses", "Valid Parentheses", Difficulty::Easy),
            Problem::new("climbing-stairs", "Climbing Stairs", Difficulty::Easy),
            Problem::new("longest-palindromic-substring", "Longest Palindromic Substring", Difficulty::Medium),
            Problem::new("coin-change", "Coin Change", Difficulty::Medium),
            Problem::new("course-schedule", "Course Schedule", Difficulty::Medium),
            Problem::new("trapping-rain-water", "Trapping Rain Water", Difficulty::Hard),
            Problem::new("median-of-two-sorted-arrays", "Median of Two Sorted Arrays", Difficulty::Hard),
        ])
    }
}

#[async_trait]
impl ProblemCatalog for StaticCatalog {
    async fn random_problem(&self, difficulty: Difficulty) -> Result<Problem, CatalogError> {
        let matching: Vec<&Problem> = self
            .problems
            .iter()
            .filter(|p| p.difficulty == difficulty)
            .collect();

        if matching.is_empty() {
            return Err(CatalogError::NoProblems(difficulty));
        }

        let idx = rand::thread_rng().gen_range(0..matching.len());
        Ok(matching[idx].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_catalog_respects_difficulty() {
        let catalog = StaticCatalog::default();
        for difficulty in Difficulty::ALL {
            let problem = catalog.random_problem(difficulty).await.unwrap();
            assert_eq!(problem.difficulty, difficulty);
        }
    }

    #[tokio::test]
    async fn test_static_catalog_missing_difficulty() {
        let catalog = StaticCatalog::new(vec![Problem::new("two-sum", "Two Sum", Difficulty::Easy)]);
        let result = catalog.random_problem(Difficulty::Hard).await;
        assert!(matches!(result, Err(CatalogError::NoProblems(Difficulty::Hard))));
    }
}
