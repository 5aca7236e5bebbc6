pub mod boundary;
pub mod sentence;

pub use boundary::{clean_word, resolve_word_at, word_span_at, ResolvedWord, WordSpan};
pub use sentence::{find_sentence_containing, locate_span, sentence_at, split_sentences};
