//! Corpus loading and task templating.
//!
//! The loader turns parsed source rows into [`Record`]s: it resolves each
//! task's template once (instruction, template mode), applies it per row,
//! and hands out globally increasing ids across every task it loads.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::info;

use crate::aggregate::ShardSuffixes;
use crate::config::{CorpusFormat, DatasetConfig};
use crate::constants::fields;
use crate::constants::templating::INSTRUCTION_DELIMITER;
use crate::data::{RawRecord, Record};
use crate::errors::DatasetError;
use crate::prompts::{Instruction, PromptTable, TemplateMode};
use crate::source::{RecordSource, SourceRow};
use crate::types::{FieldName, LineNumber, RecordId, TaskName};

/// Template resolved for one task.
#[derive(Clone, Debug)]
pub struct TaskTemplate<'a> {
    instruction: Option<&'a Instruction>,
    mode: TemplateMode,
    separator: &'a str,
}

impl<'a> TaskTemplate<'a> {
    /// Resolve the template for `task` from the prompt table.
    pub fn resolve(
        task: &str,
        prompts: &'a PromptTable,
        suffixes: &ShardSuffixes,
        separator: &'a str,
    ) -> Self {
        Self {
            instruction: prompts.instruction_for(task, suffixes),
            mode: prompts.template_mode(task),
            separator,
        }
    }

    /// Template mode of this task.
    pub fn mode(&self) -> TemplateMode {
        self.mode
    }

    fn prefix(&self, position: usize) -> String {
        match self.instruction {
            Some(instruction) => format!(
                "{}{INSTRUCTION_DELIMITER}{}",
                instruction.for_position(position),
                self.separator
            ),
            None => self.separator.to_string(),
        }
    }

    /// Apply the template to the row at `position` within its task.
    pub fn apply(&self, position: usize, raw: RawRecord) -> (String, String, Option<String>) {
        let (query, positive, negative) = raw.into_parts();
        let query_prefix = self.prefix(position);
        let text_prefix = match self.mode {
            TemplateMode::Symmetric => query_prefix.clone(),
            TemplateMode::Asymmetric => self.separator.to_string(),
        };
        (
            format!("{query_prefix}{query}"),
            format!("{text_prefix}{positive}"),
            negative.map(|negative| format!("{text_prefix}{negative}")),
        )
    }
}

/// Records of one load plus their per-task id buckets (uncanonicalized).
#[derive(Clone, Debug, Default)]
pub struct LoadedCorpus {
    /// Records in id order.
    pub records: Vec<Record>,
    /// Ids per loaded task name, in load order.
    pub buckets: IndexMap<TaskName, Vec<RecordId>>,
}

/// Turns task sources into templated records with global ids.
#[derive(Clone, Debug)]
pub struct CorpusLoader {
    format: CorpusFormat,
    separator: String,
    prompts: PromptTable,
    suffixes: ShardSuffixes,
    implicit_task: bool,
    next_id: RecordId,
}

impl CorpusLoader {
    /// Create a loader for `format` rows.
    pub fn new(
        format: CorpusFormat,
        separator: impl Into<String>,
        prompts: PromptTable,
        suffixes: ShardSuffixes,
    ) -> Self {
        Self {
            format,
            separator: separator.into(),
            prompts,
            suffixes,
            implicit_task: false,
            next_id: 0,
        }
    }

    /// Create a loader from dataset configuration.
    pub fn from_config(config: &DatasetConfig) -> Self {
        Self::new(
            config.format,
            config.separator.clone(),
            config.prompts.clone(),
            config.shard_suffixes.clone(),
        )
    }

    /// Leave `task_name` unset on loaded records (single implicit task corpora).
    pub fn with_implicit_task(mut self, implicit_task: bool) -> Self {
        self.implicit_task = implicit_task;
        self
    }

    /// Id the next loaded record will receive.
    pub fn next_id(&self) -> RecordId {
        self.next_id
    }

    /// Load every row of `source` as a record of its task.
    pub fn load(&mut self, source: &dyn RecordSource) -> Result<Vec<Record>, DatasetError> {
        let task = source.task();
        info!(task, "[taskbatch:loader] loading task");
        let rows = source.numbered_rows()?;
        let template = TaskTemplate::resolve(task, &self.prompts, &self.suffixes, &self.separator);
        let mut records = Vec::with_capacity(rows.len());
        for (position, (line, row)) in rows.into_iter().enumerate() {
            let raw = raw_record(self.format, task, line, row)?;
            let (query, positive, negative) = template.apply(position, raw);
            records.push(Record {
                id: self.next_id + position,
                query,
                positive,
                negative,
                task_name: (!self.implicit_task).then(|| task.to_string()),
            });
        }
        self.next_id += records.len();
        info!(task, records = records.len(), "[taskbatch:loader] task loaded");
        Ok(records)
    }

    /// Load all `sources` in order. Any failure aborts the whole load.
    pub fn load_all<'s, I>(&mut self, sources: I) -> Result<LoadedCorpus, DatasetError>
    where
        I: IntoIterator<Item = &'s dyn RecordSource>,
    {
        let mut corpus = LoadedCorpus::default();
        for source in sources {
            let records = self.load(source)?;
            let ids = corpus
                .buckets
                .entry(source.task().to_string())
                .or_default();
            ids.extend(records.iter().map(|record| record.id));
            corpus.records.extend(records);
        }
        info!(
            records = corpus.records.len(),
            tasks = corpus.buckets.len(),
            "[taskbatch:loader] corpus loaded"
        );
        Ok(corpus)
    }
}

fn raw_record(
    format: CorpusFormat,
    task: &str,
    line: LineNumber,
    row: SourceRow,
) -> Result<RawRecord, DatasetError> {
    match (format, row) {
        (CorpusFormat::TextLines, SourceRow::Line(text)) => Ok(RawRecord::SelfPaired { text }),
        (CorpusFormat::TextLines, SourceRow::Object(map)) => Ok(RawRecord::SelfPaired {
            text: required(&map, task, line, fields::QUERY)?,
        }),
        (CorpusFormat::Triplet, SourceRow::Object(map)) => Ok(RawRecord::Paired {
            query: required(&map, task, line, fields::QUERY)?,
            positive: required(&map, task, line, fields::POSITIVE)?,
            negative: Some(required(&map, task, line, fields::NEGATIVE)?),
        }),
        (CorpusFormat::Pair, SourceRow::Object(map)) => Ok(RawRecord::Paired {
            query: required(&map, task, line, fields::QUERY)?,
            positive: required(&map, task, line, fields::POSITIVE)?,
            negative: optional(&map, task, line, fields::NEGATIVE)?,
        }),
        (format, SourceRow::Line(_)) => Err(DatasetError::MalformedRecord {
            task: task.to_string(),
            line,
            details: format!("{format:?} corpora require key-value records, found a raw line"),
        }),
    }
}

fn optional(
    map: &Map<String, Value>,
    task: &str,
    line: LineNumber,
    field: FieldName,
) -> Result<Option<String>, DatasetError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(other) => Err(DatasetError::MalformedRecord {
            task: task.to_string(),
            line,
            details: format!("field '{field}' must be a string, found {other}"),
        }),
    }
}

fn required(
    map: &Map<String, Value>,
    task: &str,
    line: LineNumber,
    field: FieldName,
) -> Result<String, DatasetError> {
    optional(map, task, line, field)?.ok_or_else(|| DatasetError::MissingField {
        task: task.to_string(),
        line,
        field,
    })
}
