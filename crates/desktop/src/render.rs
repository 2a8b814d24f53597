//! Plain-text table rendering for terminal output.

use stocktally_inventory::Row;

/// Render `rows` under `headers` as an aligned text table.
///
/// The first column is the removal token (`#`) to pass to `remove`.
pub fn table(headers: &[&str], rows: &[Row]) -> String {
    let mut widths: Vec<usize> = std::iter::once("#")
        .chain(headers.iter().copied())
        .map(|h| h.chars().count())
        .collect();

    let lines: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            std::iter::once(row.index.to_string())
                .chain(row.cells.iter().cloned())
                .collect()
        })
        .collect();

    for line in &lines {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = std::iter::once("#")
        .chain(headers.iter().copied())
        .map(str::to_string)
        .collect();
    push_line(&mut out, &header, &widths);

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, &rule, &widths);

    for line in &lines {
        push_line(&mut out, line, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    out.push_str(padded.join("  ").trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligns_columns_by_character_width() {
        let rows = vec![
            Row {
                index: 0,
                cells: vec!["A1".into(), "2".into()],
            },
            Row {
                index: 1,
                cells: vec!["LONGCODE".into(), "10".into()],
            },
        ];
        let text = table(&["Código", "Paletes"], &rows);

        assert_eq!(
            text,
            "#  Código    Paletes\n\
             -  --------  -------\n\
             0  A1        2\n\
             1  LONGCODE  10\n"
        );
    }

    #[test]
    fn empty_table_still_has_header() {
        let text = table(&["Código"], &[]);
        assert_eq!(text.lines().count(), 2);
    }
}
