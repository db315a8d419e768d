// Plagiarism checking: sentence-level Jaccard similarity over the submission store.
// The engine is pure; handlers load a fresh snapshot for every query.

pub mod handlers;
pub mod similarity;
