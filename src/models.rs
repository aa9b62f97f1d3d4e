use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

// The six achievement categories a mark can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Category {
    #[serde(rename = "KU")]
    KnowledgeUnderstanding,
    #[serde(rename = "A")]
    Application,
    #[serde(rename = "T")]
    Thinking,
    #[serde(rename = "C")]
    Communication,
    #[serde(rename = "O")]
    Other,
    #[serde(rename = "F")]
    FinalExam,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::KnowledgeUnderstanding,
        Category::Thinking,
        Category::Communication,
        Category::Application,
        Category::Other,
        Category::FinalExam,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Category::KnowledgeUnderstanding => "KU",
            Category::Application => "A",
            Category::Thinking => "T",
            Category::Communication => "C",
            Category::Other => "O",
            Category::FinalExam => "F",
        }
    }

    // `bgcolor` value of a mark cell in the assignment table. The final-exam
    // cell carries a leading '#' there while the others don't.
    pub fn assignment_color(self) -> &'static str {
        match self {
            Category::FinalExam => "#dedede",
            other => other.weight_color(),
        }
    }

    // Background colour of a row in the weighting table, without the '#'.
    // The final-exam row is styled differently here than in the assignment table.
    pub fn weight_color(self) -> &'static str {
        match self {
            Category::KnowledgeUnderstanding => "ffffaa",
            Category::Thinking => "c0fea4",
            Category::Communication => "afafff",
            Category::Application => "ffd490",
            Category::Other => "eeeeee",
            Category::FinalExam => "cccccc",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// Overall course mark: a percentage, or the "N/A" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum OverallMark {
    Percent(f64),
    #[default]
    NotAvailable,
}

impl OverallMark {
    pub fn percent(self) -> Option<f64> {
        match self {
            OverallMark::Percent(value) => Some(value),
            OverallMark::NotAvailable => None,
        }
    }
}

impl Serialize for OverallMark {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OverallMark::Percent(value) => serializer.serialize_f64(*value),
            OverallMark::NotAvailable => serializer.serialize_str("N/A"),
        }
    }
}

// Result of the overall mark parser: the mark plus which banner produced it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MarkStatus {
    pub mark: OverallMark,
    pub is_final: bool,
    pub is_midterm: bool,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Mark {
    pub get: f64,
    pub total: f64,
    pub weight: f64,
    pub finished: bool,
}

impl Mark {
    // Stand-in for a coloured cell whose text could not be parsed.
    pub fn placeholder() -> Self {
        Mark { get: 0.0, total: 0.0, weight: 0.0, finished: true }
    }
}

// Per-category marks of one assignment. A field is `None` when the row had no
// cell of that category's colour.
#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct CategoryMarks {
    #[serde(rename = "KU", serialize_with = "as_list", skip_serializing_if = "Option::is_none")]
    pub knowledge: Option<Mark>,
    #[serde(rename = "T", serialize_with = "as_list", skip_serializing_if = "Option::is_none")]
    pub thinking: Option<Mark>,
    #[serde(rename = "C", serialize_with = "as_list", skip_serializing_if = "Option::is_none")]
    pub communication: Option<Mark>,
    #[serde(rename = "A", serialize_with = "as_list", skip_serializing_if = "Option::is_none")]
    pub application: Option<Mark>,
    #[serde(rename = "O", serialize_with = "as_list", skip_serializing_if = "Option::is_none")]
    pub other: Option<Mark>,
    #[serde(rename = "F", serialize_with = "as_list", skip_serializing_if = "Option::is_none")]
    pub final_exam: Option<Mark>,
}

impl CategoryMarks {
    pub fn get(&self, category: Category) -> Option<&Mark> {
        match category {
            Category::KnowledgeUnderstanding => self.knowledge.as_ref(),
            Category::Thinking => self.thinking.as_ref(),
            Category::Communication => self.communication.as_ref(),
            Category::Application => self.application.as_ref(),
            Category::Other => self.other.as_ref(),
            Category::FinalExam => self.final_exam.as_ref(),
        }
    }

    pub fn set(&mut self, category: Category, mark: Mark) {
        let slot = match category {
            Category::KnowledgeUnderstanding => &mut self.knowledge,
            Category::Thinking => &mut self.thinking,
            Category::Communication => &mut self.communication,
            Category::Application => &mut self.application,
            Category::Other => &mut self.other,
            Category::FinalExam => &mut self.final_exam,
        };
        *slot = Some(mark);
    }

    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|c| self.get(*c).is_none())
    }
}

// Category values are emitted as one-element lists.
fn as_list<S: Serializer>(mark: &Option<Mark>, serializer: S) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(mark.iter().len()))?;
    for m in mark {
        seq.serialize_element(m)?;
    }
    seq.end()
}

#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct Assignment {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(flatten)]
    pub marks: CategoryMarks,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Weighting {
    #[serde(rename = "W")]
    pub weight: f64,
    #[serde(rename = "CW")]
    pub course_weight: f64,
    #[serde(rename = "SA")]
    pub strand_allocation: f64,
}

pub type WeightTable = BTreeMap<Category, Weighting>;

#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct Course {
    pub code: String,
    pub name: String,
    pub block: String,
    pub room: String,
    pub start_time: String,
    pub end_time: String,
    pub dropped_time: String,
    pub overall_mark: OverallMark,
    #[serde(rename = "isFinal")]
    pub is_final: bool,
    #[serde(rename = "isMidterm")]
    pub is_midterm: bool,
    #[serde(rename = "link", skip_serializing_if = "Option::is_none")]
    pub detail_link: Option<String>,
    pub assignments: Vec<Assignment>,
    pub weight_table: WeightTable,
}

impl Course {
    // Replaces whatever detail data the course holds with a freshly parsed set.
    pub fn apply_detail(&mut self, assignments: Vec<Assignment>, weight_table: WeightTable) {
        self.assignments = assignments;
        self.weight_table = weight_table;
    }

    pub fn is_dropped(&self) -> bool {
        !self.dropped_time.is_empty()
    }
}

// Where in the pipeline an item was dropped or substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    CourseRow,
    MarkCell,
    WeightCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedItem {
    pub stage: Stage,
    pub reason: String,
}

// A parser's output together with the items it had to skip on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction<T> {
    pub value: T,
    pub skipped: Vec<SkippedItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct GradeReport {
    pub courses: Vec<Course>,
    pub skipped: Vec<SkippedItem>,
}
