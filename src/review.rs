use sha2::{Digest, Sha256};

use crate::schemas::result::ResultQuestion;

/// Normalized answer digest: trim, lowercase, SHA-256, hex. Must match the
/// backend's hashing exactly or every review renders as unanswered.
pub(crate) fn hash_answer(value: &str) -> String {
    let normalized = value.trim().to_lowercase();
    hex::encode(Sha256::digest(normalized.as_bytes()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OptionVerdict {
    Correct,
    ChosenIncorrect,
    Neutral,
}

pub(crate) fn verdict_for(option: &str, question: &ResultQuestion) -> OptionVerdict {
    let hash = hash_answer(option);
    if hash == question.correct_answer_hash {
        OptionVerdict::Correct
    } else if question.selected_answer_hash.as_deref() == Some(hash.as_str()) {
        OptionVerdict::ChosenIncorrect
    } else {
        OptionVerdict::Neutral
    }
}

pub(crate) fn review_options(question: &ResultQuestion) -> [(&str, OptionVerdict); 4] {
    question.options().map(|option| (option, verdict_for(option, question)))
}
