use crate::list::ListState;

pub const NO_RECORDS: &str = "No records found";
pub const LOADING: &str = "Loading...";
pub const LOAD_FAILED: &str = "Failed to load data";
pub const PLACEHOLDER: &str = "-";

const WIDTHS: [usize; 4] = [6, 12, 20, 10];

pub type Row = [String; 4];

/// Renders a list screen: either the explicit empty state, or the header,
/// any loading/error banners, and one line per record.
pub fn table<T, F>(title: &str, header: [&str; 4], state: &ListState<T>, row: F) -> Vec<String>
where
    F: Fn(&T) -> Row,
{
    let mut lines = vec![format!("== {} ==", title)];
    if state.is_blank() {
        lines.push(NO_RECORDS.to_string());
        return lines;
    }
    lines.push(columns(&header.map(str::to_string)));
    if state.is_loading() {
        lines.push(LOADING.to_string());
    }
    if state.error().is_some() {
        lines.push(LOAD_FAILED.to_string());
    }
    lines.extend(state.items().iter().map(|item| columns(&row(item))));
    lines
}

fn columns(cells: &Row) -> String {
    cells
        .iter()
        .zip(WIDTHS.iter())
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end()
        .to_string()
}

pub fn or_placeholder(text: Option<&str>) -> String {
    match text {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use reqwest::StatusCode;

    fn render(state: &ListState<u32>) -> Vec<String> {
        table("Numbers", ["ID", "A", "B", "C"], state, |n| {
            [n.to_string(), "a".into(), "b".into(), "c".into()]
        })
    }

    #[test]
    fn blank_list_shows_no_records() {
        let mut state = ListState::new();
        let g = state.begin_fetch();
        state.finish_fetch(g, Ok(vec![]));
        let lines = render(&state);
        assert_eq!(lines, vec!["== Numbers ==", NO_RECORDS]);
    }

    #[test]
    fn rows_replace_empty_state() {
        let mut state = ListState::new();
        let g = state.begin_fetch();
        state.finish_fetch(g, Ok(vec![1, 2, 3]));
        let lines = render(&state);
        assert!(!lines.iter().any(|l| l == NO_RECORDS));
        // title, header, three rows
        assert_eq!(lines.len(), 5);
        assert!(lines[2].starts_with("1 "));
    }

    #[test]
    fn banners_sit_above_rows() {
        let mut state: ListState<u32> = ListState::new();
        state.begin_fetch();
        assert_eq!(render(&state)[2], LOADING);

        let g = state.begin_fetch();
        state.finish_fetch(g, Err(ClientError::Status(StatusCode::BAD_GATEWAY)));
        let lines = render(&state);
        assert_eq!(lines[2], LOAD_FAILED);
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn placeholder_for_missing_text() {
        assert_eq!(or_placeholder(None), "-");
        assert_eq!(or_placeholder(Some("")), "-");
        assert_eq!(or_placeholder(Some("ABC1D23")), "ABC1D23");
    }
}
