pub mod srt_parser;

pub use srt_parser::{load_srt_file, parse_srt_text, SAMPLE_TRACK};
