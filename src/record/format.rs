use std::fmt::Write;

use crate::constants::format::MAX_TABLE_WIDTH;
use crate::record::Record;

/// Render a record as a reStructuredText document with two grid tables.
///
/// Structured items are sorted by name; unstructured items by `group_by`
/// (ungrouped first).
pub fn format_record(record: &Record) -> String {
    let mut structured: Vec<_> = record.structured_data().iter().collect();
    structured.sort_by(|a, b| a.name.cmp(&b.name));
    let structured_rows: Vec<Vec<String>> = structured
        .into_iter()
        .map(|item| {
            vec![
                item.name.clone(),
                item.data_type.to_string(),
                item.target.to_string(),
                item.value.to_string(),
            ]
        })
        .collect();

    let mut unstructured: Vec<_> = record.unstructured_data().iter().collect();
    unstructured.sort_by(|a, b| {
        a.group_by
            .as_deref()
            .unwrap_or("")
            .cmp(b.group_by.as_deref().unwrap_or(""))
    });
    let unstructured_rows: Vec<Vec<String>> = unstructured
        .into_iter()
        .map(|item| {
            vec![
                item.file_type.to_string(),
                item.group_by.clone().unwrap_or_default(),
                item.data_uri.clone(),
                item.accessible().to_string(),
            ]
        })
        .collect();

    let mut out = String::new();
    let banner = "=".repeat(record.name().chars().count());
    let _ = writeln!(out, "{banner}\n{}\n{banner}\n", record.name());
    let _ = writeln!(out, "Structured Data\n===============");
    write_table(
        &mut out,
        &[("name", 16), ("data_type", 8), ("target", 6), ("value", 32)],
        &structured_rows,
    );
    let _ = writeln!(out, "\nUnstructured Data\n=================");
    write_table(
        &mut out,
        &[("file_type", 8), ("group_by", 8), ("data_uri", 8), ("accessible", 16)],
        &unstructured_rows,
    );
    out
}

fn write_table(out: &mut String, columns: &[(&str, usize)], rows: &[Vec<String>]) {
    let widths = column_widths(columns, rows);
    write_rule(out, &widths, '-');
    let header: Vec<String> = columns.iter().map(|(name, _)| name.to_string()).collect();
    write_row(out, &widths, &header);
    write_rule(out, &widths, '=');
    for row in rows {
        write_row(out, &widths, row);
        write_rule(out, &widths, '-');
    }
}

fn column_widths(columns: &[(&str, usize)], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = columns
        .iter()
        .map(|(name, min)| (*min).max(name.len()))
        .collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    let total = widths.iter().sum::<usize>() + widths.len() * 3 + 1;
    if total > MAX_TABLE_WIDTH {
        let excess = total - MAX_TABLE_WIDTH;
        if let Some(widest) = widths.iter_mut().max() {
            *widest = widest.saturating_sub(excess).max(1);
        }
    }
    widths
}

fn write_rule(out: &mut String, widths: &[usize], fill: char) {
    for width in widths {
        out.push('+');
        out.extend(std::iter::repeat_n(fill, width + 2));
    }
    out.push_str("+\n");
}

/// Cells wider than their column wrap onto continuation lines.
fn write_row(out: &mut String, widths: &[usize], cells: &[String]) {
    let wrapped: Vec<Vec<String>> = widths
        .iter()
        .zip(cells)
        .map(|(width, cell)| wrap(cell, *width))
        .collect();
    let lines = wrapped.iter().map(Vec::len).max().unwrap_or(1);
    for line in 0..lines {
        for (width, cell_lines) in widths.iter().zip(&wrapped) {
            let text = cell_lines.get(line).map(String::as_str).unwrap_or("");
            let _ = write!(out, "| {text:<width$} ");
        }
        out.push_str("|\n");
    }
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars
        .chunks(width.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FileType, StructuredData, Target, UnstructuredData};

    #[test]
    fn report_lists_items_sorted() {
        let record = Record::assemble(
            "house_7",
            vec![
                StructuredData::continuous("price", 250000).with_target(Target::Yes),
                StructuredData::category("city", "Provo"),
            ],
            vec![
                UnstructuredData::new("file:///b.jpg", FileType::Image).with_group("rear"),
                UnstructuredData::new("file:///a.jpg", FileType::Image).with_group("front"),
            ],
        )
        .unwrap();

        let report = format_record(&record);
        assert!(report.starts_with("=======\nhouse_7\n=======\n"));
        let city = report.find("| city").unwrap();
        let price = report.find("| price").unwrap();
        assert!(city < price);
        let front = report.find("front").unwrap();
        let rear = report.find("rear").unwrap();
        assert!(front < rear);
        assert!(report.contains("| CONTINUOUS"));
        assert!(report.contains("| YES"));
    }

    #[test]
    fn every_table_line_has_same_width() {
        let long_uri = format!("file:///{}", "x".repeat(200));
        let record = Record::assemble(
            "wide",
            Vec::new(),
            vec![UnstructuredData::new(long_uri, FileType::Document)],
        )
        .unwrap();
        let report = format_record(&record);
        let table: Vec<&str> = report
            .lines()
            .skip_while(|line| !line.starts_with("Unstructured"))
            .filter(|line| line.starts_with('+') || line.starts_with('|'))
            .collect();
        assert!(table.len() > 4);
        let width = table[0].chars().count();
        assert!(width <= MAX_TABLE_WIDTH);
        assert!(table.iter().all(|line| line.chars().count() == width));
    }
}
