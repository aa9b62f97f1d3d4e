use crate::models::{Course, OverallMark};

// Builds a short plain-text digest of the fetched courses, one line each.
pub fn render_summary(courses: &[Course]) -> String {
    let mut message = format!("Grade report: {} courses\n\n", courses.len());
    for course in courses {
        let mark = match course.overall_mark {
            OverallMark::Percent(value) => format!("{:.1}% ({})", value, mark_state(course)),
            OverallMark::NotAvailable => "N/A".to_string(),
        };
        message.push_str(&format!(
            "{} {} : {}, {} assignments",
            course.code,
            course.name,
            mark,
            course.assignments.len()
        ));
        if course.is_dropped() {
            message.push_str(&format!(" [dropped {}]", course.dropped_time));
        }
        message.push('\n');
    }
    message
}

fn mark_state(course: &Course) -> &'static str {
    if course.is_final {
        "final"
    } else if course.is_midterm {
        "midterm"
    } else {
        "current"
    }
}
