/// Record identifier assigned monotonically at load time.
/// Example: `0`, `1`, `41_523`
pub type RecordId = usize;
/// Name of the task a record belongs to, as loaded (shard variants included).
/// Examples: `allnli_split1`, `quora_duplicates`, `msmarco_passage`
pub type TaskName = String;
/// Task name after shard variants have been merged.
/// Examples: `allnli`, `quora_duplicates`
pub type CanonicalTaskName = String;
/// Instruction text prefixed to templated queries.
/// Example: `Given a claim, retrieve documents that support or refute the claim`
pub type InstructionText = String;
/// 1-based line of a corpus file (or row position for in-memory sources).
/// Example: `1`, `3`
pub type LineNumber = usize;
/// Field name read from a parsed corpus row.
/// Examples: `query`, `positive`, `negative`
pub type FieldName = &'static str;
