/// Line-delimited JSON task corpora.
pub mod jsonl_source;
/// Plain text corpora, one record per line.
pub mod text_lines;
