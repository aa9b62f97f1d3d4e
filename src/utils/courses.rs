use std::sync::LazyLock;

use log::{debug, warn};
use scraper::{Html, Selector};

use crate::error::RowError;
use crate::models::{Course, Extraction, MarkStatus, OverallMark, SkippedItem, Stage};

// Used when line 0 has no " : " separated name.
pub const PLACEHOLDER: &str = "Unknown";

static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.green_content table tr").expect("static selector"));
static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("static selector"));

// Fields recovered from one course-list row, before the mark text is interpreted.
#[derive(Debug, PartialEq)]
struct CourseRow<'a> {
    code: &'a str,
    name: &'a str,
    block: &'a str,
    room: &'a str,
    start_time: &'a str,
    end_time: &'a str,
    dropped_time: &'a str,
    mark_text: &'a str,
}

impl CourseRow<'_> {
    fn into_course(self, detail_link: Option<String>) -> Course {
        let status = parse_overall_mark(self.mark_text);
        Course {
            code: self.code.to_string(),
            name: self.name.to_string(),
            block: self.block.to_string(),
            room: self.room.to_string(),
            start_time: self.start_time.to_string(),
            end_time: self.end_time.to_string(),
            dropped_time: self.dropped_time.to_string(),
            overall_mark: status.mark,
            is_final: status.is_final,
            is_midterm: status.is_midterm,
            detail_link,
            ..Course::default()
        }
    }
}

// Parses the post-login landing page into course summaries. Rows that fail to
// parse are logged and reported as skipped; the rest are kept.
pub fn parse_course_list(html: &str) -> Extraction<Vec<Course>> {
    let document = Html::parse_document(html);
    let mut courses = Vec::new();
    let mut skipped = Vec::new();

    for row in document.select(&ROW_SELECTOR) {
        let text = row.text().collect::<String>();
        let raw_lines: Vec<&str> = text.split('\n').collect();

        // Column header row.
        if raw_lines.get(1).is_some_and(|line| line.contains("Course Name")) {
            continue;
        }

        let lines: Vec<&str> = raw_lines
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect();
        if lines.len() <= 3 {
            debug!("Skipping course row with {} lines", lines.len());
            continue;
        }

        let link = row
            .select(&LINK_SELECTOR)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string);

        match split_course_row(&lines) {
            Ok(fields) => courses.push(fields.into_course(link)),
            Err(e) => {
                warn!("Skipping course row {:?}: {}", lines.first().unwrap_or(&""), e);
                skipped.push(SkippedItem { stage: Stage::CourseRow, reason: e.to_string() });
            }
        }
    }

    Extraction { value: courses, skipped }
}

// Splits the compacted, non-empty lines of a course row into named fields.
fn split_course_row<'a>(lines: &[&'a str]) -> Result<CourseRow<'a>, RowError> {
    let title = *lines.first().ok_or(RowError::MissingSegment("course title"))?;
    let placement = *lines.get(1).ok_or(RowError::MissingSegment("block"))?;
    let start = *lines.get(2).ok_or(RowError::MissingSegment("start time"))?;
    let end = *lines.get(3).ok_or(RowError::MissingSegment("end time"))?;

    let (code, name) = match title.split_once(" : ") {
        Some((code, name)) => (code, name),
        None => (title, PLACEHOLDER),
    };
    let code = if code.is_empty() { PLACEHOLDER } else { code };

    let block_start = placement
        .find("Block: P")
        .map(|i| i + "Block: P".len())
        .unwrap_or(0);
    let block = placement[block_start..].split(' ').next().unwrap_or("");
    // An empty room loses its trailing space when the line is trimmed.
    let room = placement.split_once("rm. ").map(|(_, room)| room).unwrap_or("");

    let start_time = start.split(' ').next().unwrap_or("");

    let (end_time, dropped_time) = match end.find("Dropped on") {
        Some(at) => (end[..at].trim(), end[at + "Dropped on".len()..].trim()),
        None => (end.trim(), ""),
    };

    Ok(CourseRow {
        code,
        name,
        block,
        room,
        start_time,
        end_time,
        dropped_time,
        mark_text: lines.get(4).copied().unwrap_or(""),
    })
}

// Interprets the mark text of a course row. Banners are checked in priority
// order: final, then current, then midterm. Only the first matching banner is
// consulted; if its number can't be read the mark is N/A.
pub fn parse_overall_mark(text: &str) -> MarkStatus {
    let compact: String = text.chars().filter(|c| *c != ' ').collect();

    let (token, is_final, is_midterm) = if compact.contains("FINAL") {
        ("FINALMARK:", true, false)
    } else if compact.contains("currentmark") {
        ("currentmark=", false, false)
    } else if compact.contains("MIDTERM") {
        ("MIDTERMMARK:", false, true)
    } else {
        return MarkStatus::default();
    };

    match percent_after(&compact, token) {
        Some(value) => MarkStatus { mark: OverallMark::Percent(value), is_final, is_midterm },
        None => MarkStatus::default(),
    }
}

fn percent_after(text: &str, token: &str) -> Option<f64> {
    let (_, rest) = text.split_once(token)?;
    let (number, _) = rest.split_once('%')?;
    number.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn landing_page(rows: &str) -> String {
        format!(
            "<html><body><div class=\"green_content\"><table>\n{}\n</table></div></body></html>",
            rows
        )
    }

    const HEADER_ROW: &str = "<tr>\n<th>Course Name</th>\n<th>Mark</th>\n</tr>";

    const COURSE_ROW: &str = "<tr>\n<td>ENG4U1-01 : English\n<br>Block: P1 - rm. 203</td>\n\
        <td>2025-02-03 ~\n</td>\n<td>2025-06-26\n</td>\n\
        <td><a href=\"viewReport.php?subject_id=1&student_id=2\">current mark =  87.5%</a></td>\n</tr>";

    #[test]
    fn final_mark() {
        let status = parse_overall_mark("FINAL MARK: 87.5%");
        assert_eq!(status.mark, OverallMark::Percent(87.5));
        assert!(status.is_final);
        assert!(!status.is_midterm);
    }

    #[test]
    fn current_mark() {
        let status = parse_overall_mark("currentmark=72.3%");
        assert_eq!(status.mark, OverallMark::Percent(72.3));
        assert!(!status.is_final);
        assert!(!status.is_midterm);
    }

    #[test]
    fn midterm_mark() {
        let status = parse_overall_mark("MIDTERM MARK: 64%");
        assert_eq!(status.mark, OverallMark::Percent(64.0));
        assert!(status.is_midterm);
        assert!(!status.is_final);
    }

    #[test]
    fn empty_mark_is_not_available() {
        let status = parse_overall_mark("");
        assert_eq!(status.mark, OverallMark::NotAvailable);
        assert!(!status.is_final);
        assert!(!status.is_midterm);
    }

    #[test]
    fn final_banner_wins_over_current_mark() {
        let status = parse_overall_mark("current mark = 70.1% FINAL MARK: 91%");
        assert_eq!(status.mark, OverallMark::Percent(91.0));
        assert!(status.is_final);
    }

    #[test]
    fn unreadable_final_does_not_fall_back_to_current() {
        let status = parse_overall_mark("FINAL current mark = 70.1%");
        assert_eq!(status, MarkStatus::default());
    }

    #[test]
    fn please_see_teacher_is_not_available() {
        let status = parse_overall_mark("Please see teacher for current status");
        assert_eq!(status.mark, OverallMark::NotAvailable);
    }

    #[test]
    fn parses_course_row() {
        let html = landing_page(&format!("{}\n{}", HEADER_ROW, COURSE_ROW));
        let extraction = parse_course_list(&html);
        assert!(extraction.skipped.is_empty());
        assert_eq!(extraction.value.len(), 1);

        let course = &extraction.value[0];
        assert_eq!(course.code, "ENG4U1-01");
        assert_eq!(course.name, "English");
        assert_eq!(course.block, "1");
        assert_eq!(course.room, "203");
        assert_eq!(course.start_time, "2025-02-03");
        assert_eq!(course.end_time, "2025-06-26");
        assert_eq!(course.dropped_time, "");
        assert_eq!(course.overall_mark, OverallMark::Percent(87.5));
        assert_eq!(
            course.detail_link.as_deref(),
            Some("viewReport.php?subject_id=1&student_id=2")
        );
        assert!(course.assignments.is_empty());
        assert!(course.weight_table.is_empty());
    }

    #[test]
    fn short_rows_never_appear() {
        let short = "<tr>\n<td>ENG4U1-01 : English</td>\n<td>Block: P1 - rm. 203</td>\n<td>2025-02-03</td>\n</tr>";
        let html = landing_page(&format!("{}\n{}\n{}", HEADER_ROW, short, COURSE_ROW));
        let extraction = parse_course_list(&html);
        assert_eq!(extraction.value.len(), 1);
        assert_eq!(extraction.value[0].code, "ENG4U1-01");
        assert!(extraction.skipped.is_empty());
    }

    #[test]
    fn dropped_course() {
        let lines = [
            "SCH4U1-02 : Chemistry",
            "Block: P3 - rm. 118",
            "2025-02-03 ~",
            "Jun 20 Dropped on May 15",
        ];
        let row = split_course_row(&lines).unwrap();
        assert_eq!(row.end_time, "Jun 20");
        assert_eq!(row.dropped_time, "May 15");
        assert_eq!(row.mark_text, "");
    }

    #[test]
    fn missing_name_uses_placeholder() {
        let lines = ["LUNCH", "Block: P2 - rm.", "2025-02-03", "2025-06-26"];
        let row = split_course_row(&lines).unwrap();
        assert_eq!(row.code, "LUNCH");
        assert_eq!(row.name, PLACEHOLDER);
        assert_eq!(row.block, "2");
        assert_eq!(row.room, "");
    }

    #[test]
    fn empty_room_keeps_the_course() {
        let lunch = "<tr>\n<td>LUNCH : Lunch\n<br>Block: P3 - rm. </td>\n\
            <td>2025-02-03 ~\n</td>\n<td>2025-06-26\n</td>\n</tr>";
        let html = landing_page(&format!("{}\n{}\n{}", HEADER_ROW, lunch, COURSE_ROW));
        let extraction = parse_course_list(&html);
        assert!(extraction.skipped.is_empty());
        assert_eq!(extraction.value.len(), 2);

        let lunch = &extraction.value[0];
        assert_eq!(lunch.code, "LUNCH");
        assert_eq!(lunch.name, "Lunch");
        assert_eq!(lunch.block, "3");
        assert_eq!(lunch.room, "");
        assert_eq!(lunch.end_time, "2025-06-26");
        assert_eq!(lunch.overall_mark, OverallMark::NotAvailable);
    }

    #[test]
    fn line_without_room_marker() {
        let lines = ["GLC2O1-01 : Careers", "Block: P4", "2025-02-03", "2025-06-26"];
        let row = split_course_row(&lines).unwrap();
        assert_eq!(row.block, "4");
        assert_eq!(row.room, "");
    }
}
