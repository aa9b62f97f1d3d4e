use std::sync::LazyLock;

use log::debug;
use scraper::{Html, Selector};

use crate::error::RowError;
use crate::models::{Category, Extraction, SkippedItem, Stage, WeightTable, Weighting};
use crate::utils::parse_number;

static CELL_SELECTORS: LazyLock<Vec<(Category, Selector)>> = LazyLock::new(|| {
    Category::ALL
        .iter()
        .map(|category| {
            let css = format!(
                r##"table[cellpadding="5"] tr[bgcolor="#{}"] > td"##,
                category.weight_color()
            );
            (*category, Selector::parse(&css).expect("static selector"))
        })
        .collect()
});

// Parses the category weighting table of a course detail page. A category
// with no usable row is left out of the table.
pub fn parse_weight_table(html: &str) -> Extraction<WeightTable> {
    let document = Html::parse_document(html);
    let mut table = WeightTable::new();
    let mut skipped = Vec::new();

    for (category, selector) in CELL_SELECTORS.iter() {
        let values: Vec<String> = document
            .select(selector)
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .collect();

        match read_weighting(values) {
            Ok(weighting) => {
                table.insert(*category, weighting);
            }
            Err(e) => {
                debug!("No weighting for {}: {}", category, e);
                skipped.push(SkippedItem {
                    stage: Stage::WeightCategory,
                    reason: format!("{}: {}", category, e),
                });
            }
        }
    }

    Extraction { value: table, skipped }
}

// Reads W, CW and SA from the collected cells. Normally the first cell is the
// category label and the triple starts after it; a final-exam label row
// instead starts at the label itself, which counts as 0%.
fn read_weighting(mut values: Vec<String>) -> Result<Weighting, RowError> {
    let start = match values.first_mut() {
        Some(first) if first.contains("Final") => {
            *first = "0%".to_string();
            0
        }
        _ => 1,
    };

    let triple = values
        .get(start..start + 3)
        .ok_or(RowError::TooFewCells(values.len().saturating_sub(start)))?;

    Ok(Weighting {
        weight: parse_percent("W", &triple[0])?,
        course_weight: parse_percent("CW", &triple[1])?,
        strand_allocation: parse_percent("SA", &triple[2])?,
    })
}

fn parse_percent(field: &'static str, text: &str) -> Result<f64, RowError> {
    parse_number(field, text.strip_suffix('%').unwrap_or(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weight_page(rows: &str) -> String {
        format!(
            "<html><body><table cellpadding=\"5\">\
             <tr><th>Category</th><th>Weighting</th><th>Course Weighting</th><th>Student Achievement</th></tr>\
             {}</table></body></html>",
            rows
        )
    }

    #[test]
    fn reads_category_rows() {
        let html = weight_page(
            "<tr bgcolor=\"#ffffaa\"><td>Knowledge/Understanding</td>\
             <td>25%</td><td>17.5%</td><td>82.1%</td></tr>\
             <tr bgcolor=\"#c0fea4\"><td>Thinking</td><td>25%</td><td>17.5%</td><td>76%</td></tr>",
        );
        let extraction = parse_weight_table(&html);
        let table = &extraction.value;

        assert_eq!(
            table.get(&Category::KnowledgeUnderstanding),
            Some(&Weighting { weight: 25.0, course_weight: 17.5, strand_allocation: 82.1 })
        );
        assert_eq!(table.get(&Category::Thinking).map(|w| w.strand_allocation), Some(76.0));
        assert_eq!(table.len(), 2);
        assert_eq!(extraction.skipped.len(), 4);
        assert!(extraction.skipped.iter().all(|s| s.stage == Stage::WeightCategory));
    }

    #[test]
    fn final_label_starts_at_index_zero() {
        let html = weight_page(
            "<tr bgcolor=\"#cccccc\"><td>Final/Culminating</td><td>30%</td><td>88%</td></tr>",
        );
        let table = parse_weight_table(&html).value;
        assert_eq!(
            table.get(&Category::FinalExam),
            Some(&Weighting { weight: 0.0, course_weight: 30.0, strand_allocation: 88.0 })
        );
    }

    #[test]
    fn final_exam_row_uses_weight_table_colour() {
        // The final-exam row is #cccccc here but #dedede in the assignment table.
        let html = weight_page(
            "<tr bgcolor=\"#dedede\"><td>Final/Culminating</td><td>30%</td><td>88%</td></tr>",
        );
        let table = parse_weight_table(&html).value;
        assert!(table.get(&Category::FinalExam).is_none());
        assert_eq!(Category::FinalExam.assignment_color(), "#dedede");
        assert_eq!(Category::FinalExam.weight_color(), "cccccc");
    }

    #[test]
    fn too_few_cells_omits_category() {
        let html = weight_page("<tr bgcolor=\"#afafff\"><td>Communication</td><td>25%</td></tr>");
        let extraction = parse_weight_table(&html);
        assert!(!extraction.value.contains_key(&Category::Communication));
        assert!(extraction
            .skipped
            .iter()
            .any(|s| s.reason == "C: expected 3 weighting cells, found 1"));
    }

    #[test]
    fn unreadable_percent_omits_category() {
        let html = weight_page(
            "<tr bgcolor=\"#eeeeee\"><td>Other</td><td>n/a</td><td>0%</td><td>0%</td></tr>",
        );
        assert!(parse_weight_table(&html).value.is_empty());
    }

    #[test]
    fn parsing_is_repeatable() {
        let html = weight_page(
            "<tr bgcolor=\"#ffd490\"><td>Application</td><td>25%</td><td>17.5%</td><td>70%</td></tr>",
        );
        let first = serde_json::to_string(&parse_weight_table(&html).value).unwrap();
        let second = serde_json::to_string(&parse_weight_table(&html).value).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, r#"{"A":{"W":25.0,"CW":17.5,"SA":70.0}}"#);
    }

    #[test]
    fn cells_outside_weight_table_are_ignored() {
        let html = "<table width=\"100%\"><tr bgcolor=\"#ffffaa\">\
                    <td>KU</td><td>1%</td><td>2%</td><td>3%</td></tr></table>";
        assert!(parse_weight_table(html).value.is_empty());
    }
}
