use std::sync::LazyLock;

use log::warn;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::RowError;
use crate::models::{Assignment, Category, CategoryMarks, Extraction, Mark, SkippedItem, Stage};
use crate::utils::parse_number;

static ROW_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"table[width="100%"] > tbody > tr"#).expect("static selector")
});
static NAME_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"td[rowspan="2"]"#).expect("static selector"));
static CELL_SELECTORS: LazyLock<Vec<(Category, Selector)>> = LazyLock::new(|| {
    Category::ALL
        .iter()
        .map(|category| {
            let css = format!(r#"td[bgcolor="{}"]"#, category.assignment_color());
            (*category, Selector::parse(&css).expect("static selector"))
        })
        .collect()
});
static MARK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(?P<get>[^/]*)/(?P<total>[^=]*)=.*?weight=(?P<weight>[^%\s]*)")
        .expect("static regex")
});

// Parses the assignment table of a course detail page. Rows alternate: an
// assignment row, then a feedback row for that assignment. The first row of
// the table is the header and is never treated as feedback.
pub fn parse_assignments(html: &str) -> Extraction<Vec<Assignment>> {
    let document = Html::parse_document(html);
    let mut assignments: Vec<Assignment> = Vec::new();
    let mut skipped = Vec::new();
    let mut position = 1;

    for row in document.select(&ROW_SELECTOR) {
        position += 1;

        if position % 2 == 0 {
            if let Some(previous) = assignments.last_mut() {
                let text = clean_text(row);
                if !text.is_empty() {
                    previous.feedback = Some(text);
                }
            }
            continue;
        }

        let name = row
            .select(&NAME_SELECTOR)
            .next()
            .map(|cell| cell.text().collect::<String>().replace('\t', ""))
            .unwrap_or_default();

        let mut marks = CategoryMarks::default();
        for (category, selector) in CELL_SELECTORS.iter() {
            let Some(cell) = row.select(selector).next() else {
                continue;
            };
            let text = clean_text(cell);
            let mark = match parse_mark_cell(&text) {
                Ok(mark) => mark,
                Err(e) => {
                    warn!("Unreadable {} mark for {:?} ({:?}): {}", category, name.trim(), text, e);
                    skipped.push(SkippedItem {
                        stage: Stage::MarkCell,
                        reason: format!("{}: {}", category, e),
                    });
                    Mark::placeholder()
                }
            };
            marks.set(*category, mark);
        }

        assignments.push(Assignment { name, feedback: None, marks });
    }

    Extraction { value: assignments, skipped }
}

// Parses a mark cell of the form "<get> / <total> = ... weight=<weight>%".
// The word "finished" anywhere in the cell marks the item as not finished.
pub fn parse_mark_cell(text: &str) -> Result<Mark, RowError> {
    let caps = MARK_PATTERN
        .captures(text)
        .ok_or(RowError::MissingSegment("mark"))?;

    Ok(Mark {
        get: parse_number("get", &caps["get"])?,
        total: parse_number("total", &caps["total"])?,
        weight: parse_number("weight", &caps["weight"])?,
        finished: !text.contains("finished"),
    })
}

fn clean_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().replace('\t', "").trim().to_string()
}
