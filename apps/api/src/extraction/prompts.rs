pub const TRANSCRIBE_SYSTEM: &str = "You are a transcription engine for student assignments. \
    You output only the text that appears in the document, nothing else.";

/// Handwriting must come back as written: spelling mistakes are evidence too.
pub const TRANSCRIBE_INSTRUCTION: &str = "\
    Extract the text exactly as it appears in this document. \
    Do not answer any questions it contains. \
    If the text is handwritten, do not correct or change it. \
    Preserve sentence punctuation. Output the text only.";
