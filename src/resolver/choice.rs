//! Disambiguation between several accepted iframes.

use async_trait::async_trait;
use log::error;

/// Picks one of several accepted iframe URLs.
#[async_trait]
pub trait IframeChooser: Send + Sync {
    /// Returns the raw answer, expected to start with a 1-based index into
    /// `candidates`. `None` means no answer is available.
    async fn choose(&self, candidates: &[String]) -> Option<String>;
}

/// Never answers, so the first iframe is followed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoChoice;

#[async_trait]
impl IframeChooser for NoChoice {
    async fn choose(&self, _candidates: &[String]) -> Option<String> {
        None
    }
}

/// Index selected by `answer` among `len` candidates; 0 when the answer is
/// missing or unusable.
///
/// Only the first whitespace-separated token of the answer is read.
pub(crate) fn pick_index(answer: Option<&str>, len: usize) -> usize {
    let Some(answer) = answer else {
        return 0;
    };
    match answer.split_whitespace().next().map(str::parse::<usize>) {
        Some(Ok(number)) if (1..=len).contains(&number) => number - 1,
        Some(Ok(_)) => {
            error!("invalid input number");
            0
        }
        _ => {
            error!("invalid input answer");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_index() {
        assert_eq!(pick_index(Some("2"), 3), 1);
        assert_eq!(pick_index(Some("3 please"), 3), 2);
        assert_eq!(pick_index(Some("  1\n"), 3), 0);
    }

    #[test]
    fn test_unusable_answers_pick_first() {
        assert_eq!(pick_index(None, 3), 0);
        assert_eq!(pick_index(Some("0"), 3), 0);
        assert_eq!(pick_index(Some("4"), 3), 0);
        assert_eq!(pick_index(Some("two"), 3), 0);
        assert_eq!(pick_index(Some(""), 3), 0);
    }

    #[tokio::test]
    async fn test_no_choice() {
        assert_eq!(NoChoice.choose(&["a".to_string()]).await, None);
    }
}
