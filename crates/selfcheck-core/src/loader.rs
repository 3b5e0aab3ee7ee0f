//! Tabular question dataset loader.
//!
//! Decodes a delimited text blob (tab-separated by default) into an ordered
//! sequence of [`Question`]s and validates the result.

use std::collections::{BTreeSet, HashMap};

use csv::StringRecord;
use serde::{Deserialize, Serialize};

use crate::error::{Diagnostic, DiagnosticKind, LoadError};
use crate::model::{parse_whole, Question, QuestionKey, TaskId};

/// Delimiter convention of a dataset.
///
/// One convention applies to the whole blob; it is never auto-detected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetFormat {
    /// Separates columns within a row.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Separates items inside list-valued columns (tags, answers, labels).
    #[serde(default = "default_list_delimiter")]
    pub list_delimiter: char,
}

fn default_delimiter() -> char {
    '\t'
}

fn default_list_delimiter() -> char {
    ','
}

impl Default for DatasetFormat {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            list_delimiter: default_list_delimiter(),
        }
    }
}

impl DatasetFormat {
    fn delimiter_byte(&self) -> Result<u8, LoadError> {
        if self.delimiter == self.list_delimiter {
            return Err(LoadError::Format(format!(
                "row and list delimiters are both {:?}",
                self.delimiter
            )));
        }
        if !self.delimiter.is_ascii() || self.delimiter == '"' {
            return Err(LoadError::Format(format!(
                "unsupported row delimiter {:?}",
                self.delimiter
            )));
        }
        Ok(self.delimiter as u8)
    }
}

/// A loaded dataset: questions in source order plus recovered problems.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub questions: Vec<Question>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn into_questions(self) -> Vec<Question> {
        self.questions
    }
}

/// Column positions resolved from the header row.
struct Columns {
    width: usize,
    week: usize,
    task: usize,
    prompt: usize,
    answers: usize,
    tags: Option<usize>,
    variant: Option<usize>,
    field_number: Option<usize>,
    field_names: Option<usize>,
    tolerance: Option<usize>,
}

impl Columns {
    fn from_header(header: &StringRecord) -> Result<Self, LoadError> {
        let names: Vec<String> = header
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_ascii_lowercase())
            .collect();
        let find = |name: &str| names.iter().position(|n| n == name);
        let require = |name: &'static str| find(name).ok_or(LoadError::MissingColumn(name));

        Ok(Self {
            width: names.len(),
            week: require("week")?,
            task: require("task")?,
            prompt: require("question")?,
            answers: require("field-answers")?,
            tags: find("tags"),
            variant: find("unique-variant"),
            field_number: find("field-number"),
            field_names: find("field-names"),
            tolerance: find("tolerance"),
        })
    }
}

/// Parse a dataset using the default tab-separated convention.
pub fn parse_dataset(raw: &str) -> Result<Dataset, LoadError> {
    parse_dataset_with(raw, &DatasetFormat::default())
}

/// Parse a dataset using an explicit delimiter convention.
pub fn parse_dataset_with(raw: &str, format: &DatasetFormat) -> Result<Dataset, LoadError> {
    let delimiter = format.delimiter_byte()?;
    if raw.trim().is_empty() {
        return Err(LoadError::Empty);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(raw.as_bytes());

    let header = reader
        .headers()
        .map_err(|e| LoadError::Header(e.to_string()))?
        .clone();
    let columns = Columns::from_header(&header)?;

    let mut dataset = Dataset::default();
    let mut rows = 0usize;

    for result in reader.records() {
        rows += 1;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                push_diagnostic(
                    &mut dataset.diagnostics,
                    line,
                    DiagnosticKind::MalformedRow,
                    format!("unreadable row: {e}"),
                );
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.len() != columns.width {
            push_diagnostic(
                &mut dataset.diagnostics,
                line,
                DiagnosticKind::MalformedRow,
                format!(
                    "expected {} columns, found {}",
                    columns.width,
                    record.len()
                ),
            );
            continue;
        }

        let mut decoder = RowDecoder {
            record: &record,
            columns: &columns,
            format,
            line,
            diagnostics: &mut dataset.diagnostics,
        };
        if let Some(question) = decoder.decode() {
            dataset.questions.push(question);
        }
    }

    if dataset.questions.is_empty() {
        return Err(LoadError::NoUsableRows { rows });
    }

    tracing::info!(
        "loaded {} question(s) from {} row(s), {} diagnostic(s)",
        dataset.questions.len(),
        rows,
        dataset.diagnostics.len()
    );

    Ok(dataset)
}

fn push_diagnostic(
    diagnostics: &mut Vec<Diagnostic>,
    line: u64,
    kind: DiagnosticKind,
    message: String,
) {
    match kind {
        DiagnosticKind::MalformedRow => tracing::warn!("skipping line {line}: {message}"),
        DiagnosticKind::InvalidField => tracing::warn!("line {line}: {message}"),
    }
    diagnostics.push(Diagnostic {
        line,
        kind,
        message,
    });
}

/// Decodes one data row into a question, recording problems as it goes.
struct RowDecoder<'a> {
    record: &'a StringRecord,
    columns: &'a Columns,
    format: &'a DatasetFormat,
    line: u64,
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl RowDecoder<'_> {
    fn field(&self, index: usize) -> &str {
        self.record.get(index).unwrap_or("").trim()
    }

    fn optional(&self, index: Option<usize>) -> &str {
        index.map(|i| self.field(i)).unwrap_or("")
    }

    fn invalid(&mut self, message: String) {
        push_diagnostic(
            self.diagnostics,
            self.line,
            DiagnosticKind::InvalidField,
            message,
        );
    }

    fn reject(&mut self, message: String) -> Option<Question> {
        push_diagnostic(
            self.diagnostics,
            self.line,
            DiagnosticKind::MalformedRow,
            message,
        );
        None
    }

    fn decode(&mut self) -> Option<Question> {
        let raw_week = self.field(self.columns.week).to_string();
        let week = parse_whole(&raw_week);
        if week.is_none() {
            self.invalid(format!(
                "week {raw_week:?} is not a number; question cannot be selected"
            ));
        }

        let raw_task = self.field(self.columns.task).to_string();
        let task = raw_task.parse::<TaskId>().ok();
        if task.is_none() {
            self.invalid(format!(
                "task {raw_task:?} is not a number; question cannot be selected"
            ));
        }

        let answers = match self.answers() {
            Ok(answers) => answers,
            Err(message) => return self.reject(message),
        };

        let field_count = self.field_count();
        let has_variants = self
            .optional(self.columns.variant)
            .eq_ignore_ascii_case("yes");

        let answers = if has_variants {
            if answers.len() < field_count {
                return self.reject(format!(
                    "{} answer(s) cannot fill one variant of {field_count} field(s)",
                    answers.len()
                ));
            }
            let usable = answers.len() - answers.len() % field_count;
            if usable != answers.len() {
                self.invalid(format!(
                    "{} answer(s) is not a multiple of {field_count}; ignoring the last {}",
                    answers.len(),
                    answers.len() - usable
                ));
            }
            let mut answers = answers;
            answers.truncate(usable);
            answers
        } else {
            if answers.len() != field_count {
                return self.reject(format!(
                    "expected {field_count} answer(s), found {}",
                    answers.len()
                ));
            }
            answers
        };

        let tags: BTreeSet<String> = self
            .split_list(self.optional(self.columns.tags))
            .into_iter()
            .filter(|t| !t.is_empty())
            .collect();
        let field_labels = self.split_list(self.optional(self.columns.field_names));
        let tolerance = self.tolerance();
        let prompt = normalize_prompt(self.field(self.columns.prompt));

        Some(Question {
            week,
            task,
            tags,
            prompt,
            has_variants,
            field_count,
            field_labels,
            answers,
            tolerance,
            line: self.line,
        })
    }

    fn split_list(&self, raw: &str) -> Vec<String> {
        let raw = strip_quotes(raw);
        if raw.is_empty() {
            return Vec::new();
        }
        raw.split(self.format.list_delimiter)
            .map(|item| strip_quotes(item).to_string())
            .collect()
    }

    fn answers(&self) -> Result<Vec<f64>, String> {
        let items = self.split_list(self.field(self.columns.answers));
        if items.is_empty() {
            return Err("field-answers is empty".into());
        }
        items
            .iter()
            .enumerate()
            .map(|(i, item)| match item.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(v),
                _ => Err(format!("answer {} is not a number: {item:?}", i + 1)),
            })
            .collect()
    }

    fn field_count(&mut self) -> usize {
        let raw = self.optional(self.columns.field_number).to_string();
        if raw.is_empty() {
            return 1;
        }
        match parse_whole(&raw) {
            Some(n) if n > 0 => n as usize,
            _ => {
                self.invalid(format!("field-number {raw:?} is invalid; using 1"));
                1
            }
        }
    }

    fn tolerance(&mut self) -> Option<f64> {
        let raw = self.optional(self.columns.tolerance).to_string();
        if raw.is_empty() {
            return None;
        }
        match raw.trim_end_matches('%').trim().parse::<f64>() {
            Ok(t) if t.is_finite() && t >= 0.0 => Some(t),
            _ => {
                self.invalid(format!(
                    "tolerance {raw:?} is invalid; using the default"
                ));
                None
            }
        }
    }
}

/// Remove one pair of matching surrounding quotes.
fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return s[1..s.len() - 1].trim();
        }
    }
    s
}

/// Turn the line-break markers found in datasets into real line breaks.
fn normalize_prompt(raw: &str) -> String {
    raw.replace("\r\n", "\n")
        .replace("\\n", "\n")
        .replace("<br />", "\n")
        .replace("<br/>", "\n")
        .replace("<br>", "\n")
        .trim()
        .to_string()
}

/// A warning from dataset validation.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationWarning {
    /// Source line of the question concerned.
    pub line: u64,
    pub message: String,
}

/// Validate a loaded dataset for problems that do not prevent loading.
pub fn validate_dataset(dataset: &Dataset) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Duplicate identities: only the first one can ever be selected
    let mut seen: HashMap<QuestionKey, u64> = HashMap::new();
    for q in &dataset.questions {
        if let Some(key) = q.key() {
            if let Some(first) = seen.get(&key) {
                warnings.push(ValidationWarning {
                    line: q.line,
                    message: format!("duplicate {key}; line {first} takes precedence"),
                });
            } else {
                seen.insert(key, q.line);
            }
        }
    }

    for q in &dataset.questions {
        if !q.is_targetable() {
            warnings.push(ValidationWarning {
                line: q.line,
                message: "week or task is not numeric; question cannot be selected".into(),
            });
        }
        if q.prompt.trim().is_empty() {
            warnings.push(ValidationWarning {
                line: q.line,
                message: "prompt is empty".into(),
            });
        }

        let labels = q.field_labels.len();
        if labels > q.field_count {
            warnings.push(ValidationWarning {
                line: q.line,
                message: format!("{labels} labels for {} input(s)", q.field_count),
            });
        } else if labels > 1 && labels < q.field_count {
            warnings.push(ValidationWarning {
                line: q.line,
                message: format!(
                    "only {labels} labels for {} inputs; the rest use default labels",
                    q.field_count
                ),
            });
        }
    }

    warnings.sort_by_key(|w| w.line);
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "week\ttask\ttags\tunique-variant\tquestion\tfield-answers\tfield-number\tfield-names\ttolerance";

    fn tsv(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out
    }

    #[test]
    fn parse_single_question() {
        let raw = tsv(&["1\t1\t\tno\tFind x\t\"10\"\t1\t\"x\"\t1"]);
        let dataset = parse_dataset(&raw).unwrap();
        assert_eq!(dataset.len(), 1);
        assert!(dataset.diagnostics.is_empty());

        let q = &dataset.questions[0];
        assert_eq!(q.week, Some(1));
        assert_eq!(q.task, Some(TaskId::from(1)));
        assert!(!q.has_variants);
        assert!(!q.is_bonus());
        assert_eq!(q.prompt, "Find x");
        assert_eq!(q.answers, vec![10.0]);
        assert_eq!(q.field_labels, vec!["x"]);
        assert_eq!(q.tolerance, Some(1.0));
        assert_eq!(q.line, 2);
    }

    #[test]
    fn variants_and_tags() {
        let raw = tsv(&["2\t3.1\tbonus, extra\tYES\tCompute\t5,6,7,8\t2\ta,b\t"]);
        let q = &parse_dataset(&raw).unwrap().questions[0];
        assert!(q.has_variants);
        assert!(q.is_bonus());
        assert_eq!(q.task, Some(TaskId::new(3, 1)));
        assert_eq!(q.tags.len(), 2);
        assert!(q.tags.contains("extra"));
        assert_eq!(q.variant_count(), 2);
        assert_eq!(q.tolerance, None);
    }

    #[test]
    fn optional_columns_default() {
        let raw = "week\ttask\tquestion\tfield-answers\n4\t2\tHow many?\t42";
        let q = &parse_dataset(raw).unwrap().questions[0];
        assert_eq!(q.field_count, 1);
        assert!(!q.has_variants);
        assert!(q.tags.is_empty());
        assert!(q.field_labels.is_empty());
        assert_eq!(q.labels(), vec!["Input 1"]);
    }

    #[test]
    fn column_mismatch_skips_row() {
        let raw = tsv(&[
            "1\t1\t\tno\tFind x\t10\t1\tx\t",
            "1\t2\tno\tbroken row",
            "1\t3\t\tno\tFind y\t20\t1\ty\t",
        ]);
        let dataset = parse_dataset(&raw).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.diagnostics.len(), 1);
        assert_eq!(dataset.diagnostics[0].kind, DiagnosticKind::MalformedRow);
        assert_eq!(dataset.diagnostics[0].line, 3);
    }

    #[test]
    fn non_numeric_week_is_kept_but_untargetable() {
        let raw = tsv(&["one\t1\t\tno\tFind x\t10\t1\tx\t"]);
        let dataset = parse_dataset(&raw).unwrap();
        assert_eq!(dataset.len(), 1);
        assert!(!dataset.questions[0].is_targetable());
        assert_eq!(dataset.diagnostics[0].kind, DiagnosticKind::InvalidField);
    }

    #[test]
    fn non_numeric_answer_rejects_row() {
        let raw = tsv(&[
            "1\t1\t\tno\tFind x\t10,abc\t2\tx\t",
            "1\t2\t\tno\tFind y\t3\t1\ty\t",
        ]);
        let dataset = parse_dataset(&raw).unwrap();
        assert_eq!(dataset.len(), 1);
        assert!(dataset.diagnostics[0].message.contains("not a number"));
    }

    #[test]
    fn ragged_variant_answers_are_truncated() {
        let raw = tsv(&["1\t1\t\tyes\tFind x\t1,2,3,4,5\t2\t\t"]);
        let dataset = parse_dataset(&raw).unwrap();
        let q = &dataset.questions[0];
        assert_eq!(q.answers, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(q.variant_count(), 2);
        assert_eq!(dataset.diagnostics[0].kind, DiagnosticKind::InvalidField);
    }

    #[test]
    fn answer_count_mismatch_rejects_non_variant_row() {
        let raw = tsv(&[
            "1\t1\t\tno\tFind x\t1,2,3\t2\t\t",
            "1\t2\t\tno\tFind y\t3\t1\ty\t",
        ]);
        let dataset = parse_dataset(&raw).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.questions[0].task, Some(TaskId::from(2)));
    }

    #[test]
    fn invalid_field_number_and_tolerance_fall_back() {
        let raw = tsv(&["1\t1\t\tno\tFind x\t10\tmany\tx\tlots"]);
        let dataset = parse_dataset(&raw).unwrap();
        let q = &dataset.questions[0];
        assert_eq!(q.field_count, 1);
        assert_eq!(q.tolerance, None);
        assert_eq!(dataset.diagnostics.len(), 2);
    }

    #[test]
    fn prompt_line_breaks_are_preserved() {
        let raw = tsv(&[
            "1\t1\t\tno\t\"Line one\nLine two\"\t10\t1\tx\t",
            "1\t2\t\tno\tFirst\\nSecond<br>Third\t10\t1\tx\t",
        ]);
        let dataset = parse_dataset(&raw).unwrap();
        assert_eq!(dataset.questions[0].prompt, "Line one\nLine two");
        assert_eq!(
            dataset.questions[1].prompt_lines().collect::<Vec<_>>(),
            vec!["First", "Second", "Third"]
        );
    }

    #[test]
    fn semicolon_convention() {
        let format = DatasetFormat {
            delimiter: ',',
            list_delimiter: ';',
        };
        let raw = "week,task,tags,unique-variant,question,field-answers,field-number,field-names\n\
                   1,1,bonus;hard,yes,Find x,5;6;7;8,2,a;b";
        let q = &parse_dataset_with(raw, &format).unwrap().questions[0];
        assert!(q.is_bonus());
        assert_eq!(q.answers, vec![5.0, 6.0, 7.0, 8.0]);
        assert_eq!(q.field_labels, vec!["a", "b"]);
    }

    #[test]
    fn load_failures() {
        assert!(matches!(parse_dataset(""), Err(LoadError::Empty)));
        assert!(matches!(parse_dataset("  \n "), Err(LoadError::Empty)));
        assert!(matches!(
            parse_dataset("week\ttask\tquestion\n1\t1\tx"),
            Err(LoadError::MissingColumn("field-answers"))
        ));
        assert!(matches!(
            parse_dataset(HEADER),
            Err(LoadError::NoUsableRows { rows: 0 })
        ));
        assert!(matches!(
            parse_dataset(&tsv(&["1\t1\tbroken"])),
            Err(LoadError::NoUsableRows { rows: 1 })
        ));
        let same = DatasetFormat {
            delimiter: ',',
            list_delimiter: ',',
        };
        assert!(matches!(
            parse_dataset_with(&tsv(&[]), &same),
            Err(LoadError::Format(_))
        ));
    }

    #[test]
    fn validate_duplicates_and_labels() {
        let raw = tsv(&[
            "2\t3\t\tno\tRegular\t1\t1\tx\t",
            "2\t3\tbonus\tno\tBonus\t1\t1\tx\t",
            "2\t3\t\tno\tShadowed\t1\t1\tx\t",
            "2\t4\t\tno\t\t1,2,3\t3\ta,b\t",
        ]);
        let dataset = parse_dataset(&raw).unwrap();
        let warnings = validate_dataset(&dataset);
        assert!(warnings
            .iter()
            .any(|w| w.line == 4 && w.message.contains("duplicate")));
        assert!(warnings
            .iter()
            .any(|w| w.line == 5 && w.message.contains("prompt is empty")));
        assert!(warnings
            .iter()
            .any(|w| w.line == 5 && w.message.contains("default labels")));
        assert!(!warnings.iter().any(|w| w.line == 3));
    }

    #[test]
    fn strip_quotes_variants() {
        assert_eq!(strip_quotes("\"5,6\""), "5,6");
        assert_eq!(strip_quotes("'x'"), "x");
        assert_eq!(strip_quotes("\"unbalanced"), "\"unbalanced");
        assert_eq!(strip_quotes("\""), "\"");
    }
}
