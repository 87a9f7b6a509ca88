//! Instruction lookup table used to template task queries.
//!
//! The table is configuration: the built-in [`PromptTable::e5`] set can be
//! replaced or extended from JSON without touching loader logic.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::aggregate::ShardSuffixes;
use crate::errors::DatasetError;
use crate::types::{InstructionText, TaskName};

/// Instruction(s) registered for a task.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Instruction {
    /// One instruction used for every record.
    Single(InstructionText),
    /// Two instructions alternated by record position parity.
    Alternating([InstructionText; 2]),
}

impl Instruction {
    /// Instruction for the record at `position` within its task.
    ///
    /// Even positions take the first instruction of an alternating pair, odd
    /// positions the second.
    pub fn for_position(&self, position: usize) -> &str {
        match self {
            Instruction::Single(text) => text,
            Instruction::Alternating(pair) => &pair[position % 2],
        }
    }
}

/// How a task's positive/negative text is templated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TemplateMode {
    /// Only the query carries the instruction.
    Asymmetric,
    /// Query, positive, and negative all carry the instruction.
    Symmetric,
}

/// Task instruction table plus the list of symmetrically templated variants.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTable {
    /// Instructions keyed by task name, in registration order.
    #[serde(default)]
    pub instructions: IndexMap<TaskName, Instruction>,
    /// Task names (exact, shard variants included) templated symmetrically.
    #[serde(default)]
    pub symmetric_tasks: Vec<TaskName>,
}

impl PromptTable {
    /// Empty table: no task carries an instruction.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in E5 retrieval instruction set.
    pub fn e5() -> Self {
        let single = |text: &str| Instruction::Single(text.to_string());
        let pair = |first: &str, second: &str| {
            Instruction::Alternating([first.to_string(), second.to_string()])
        };
        let mut instructions = IndexMap::new();
        instructions.insert(
            "allnli".to_string(),
            pair(
                "Given a premise, retrieve a hypothesis that is entailed by the premise",
                "Retrieve semantically similar text",
            ),
        );
        instructions.insert(
            "dureader".to_string(),
            single("Given a Chinese search query, retrieve web passages that answer the question"),
        );
        instructions.insert(
            "eli5_question_answer".to_string(),
            single("Provided a user question, retrieve the highest voted answers on Reddit ELI5 forum"),
        );
        instructions.insert(
            "fever".to_string(),
            single("Given a claim, retrieve documents that support or refute the claim"),
        );
        instructions.insert(
            "hotpot_qa".to_string(),
            single("Given a multi-hop question, retrieve documents that can help answer the question"),
        );
        instructions.insert(
            "miracl".to_string(),
            single("Given a question, retrieve Wikipedia passages that answer the question"),
        );
        instructions.insert(
            "mrtydi".to_string(),
            single("Given a question, retrieve Wikipedia passages that answer the question"),
        );
        instructions.insert(
            "msmarco_passage".to_string(),
            single("Given a web search query, retrieve relevant passages that answer the query"),
        );
        instructions.insert(
            "msmarco_document".to_string(),
            single("Given a web search query, retrieve relevant documents that answer the query"),
        );
        instructions.insert(
            "nq".to_string(),
            single("Given a question, retrieve Wikipedia passages that answer the question"),
        );
        instructions.insert(
            "quora_duplicates".to_string(),
            pair(
                "Given a question, retrieve questions that are semantically equivalent to the given question",
                "Find questions that have the same meaning as the input question",
            ),
        );
        instructions.insert(
            "squad".to_string(),
            single("Retrieve Wikipedia passages that answer the question"),
        );
        instructions.insert(
            "t2ranking".to_string(),
            single("Given a Chinese search query, retrieve web passages that answer the question"),
        );
        instructions.insert(
            "trivia_qa".to_string(),
            single("Retrieve Wikipedia passages that answer the question"),
        );
        Self {
            instructions,
            symmetric_tasks: vec![
                "allnli_split2".to_string(),
                "quora_duplicates_split1".to_string(),
                "quora_duplicates_split2".to_string(),
            ],
        }
    }

    /// Parse a table from JSON (`{"instructions": {...}, "symmetric_tasks": [...]}`).
    pub fn from_json_str(raw: &str) -> Result<Self, DatasetError> {
        serde_json::from_str(raw)
            .map_err(|err| DatasetError::Configuration(format!("invalid prompt table: {err}")))
    }

    /// Read and parse a JSON prompt table from disk.
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    /// Register or replace the instruction for `task`.
    pub fn with_instruction(mut self, task: impl Into<TaskName>, instruction: Instruction) -> Self {
        self.instructions.insert(task.into(), instruction);
        self
    }

    /// Mark `task` as symmetrically templated.
    pub fn with_symmetric_task(mut self, task: impl Into<TaskName>) -> Self {
        let task = task.into();
        if !self.symmetric_tasks.contains(&task) {
            self.symmetric_tasks.push(task);
        }
        self
    }

    /// Registered task names in table order.
    pub fn tasks(&self) -> impl Iterator<Item = &TaskName> {
        self.instructions.keys()
    }

    /// Instruction for `task`, falling back to its shard-stripped canonical name.
    pub fn instruction_for(&self, task: &str, suffixes: &ShardSuffixes) -> Option<&Instruction> {
        self.instructions.get(task).or_else(|| {
            suffixes
                .canonical_name(task)
                .and_then(|canonical| self.instructions.get(canonical))
        })
    }

    /// Template mode for `task`, matched on the exact task name.
    pub fn template_mode(&self, task: &str) -> TemplateMode {
        if self.symmetric_tasks.iter().any(|name| name == task) {
            TemplateMode::Symmetric
        } else {
            TemplateMode::Asymmetric
        }
    }
}
