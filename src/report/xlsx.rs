//! Workbook writer: one worksheet per class (combined lecture+lab grid) plus
//! one per teacher, header row of day names, first column of slot labels.
//!
//! Grounded on `Lecture_Generator.py`'s `export_combined_timetable_to_excel` /
//! `export_teacher_timetables_to_excel` for the sheet/row/column shape and
//! cell-text contract, and on `shlwsh-AICourse/src-tauri/src/commands/import_export.rs`
//! for the `rust_xlsxwriter` call shape (`Format`, `write_string_with_format`,
//! `set_column_width`, `set_row_height`, `save`).

use crate::time::{Day, TimeModel};
use crate::view::{Cell, Grid};
use anyhow::{Context, Result};
use chrono::Utc;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};
use std::path::{Path, PathBuf};

fn cell_text(cell: &Cell) -> String {
    match cell {
        Cell::Break => "BREAK".to_string(),
        Cell::Empty => String::new(),
        Cell::Lecture { subject, teacher, room } => format!("{subject} ({teacher}) ({room})"),
        Cell::Lab {
            subject,
            teacher,
            batch,
            room,
            continued,
        } => {
            let base = format!("{subject} ({}) ({teacher}) {room}", batch.0);
            if *continued {
                format!("{base} (cont.)")
            } else {
                base
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::BatchId;

    #[test]
    fn lecture_cell_text_includes_subject_teacher_and_room() {
        let cell = Cell::Lecture {
            subject: "DBMS".to_string(),
            teacher: "T1".to_string(),
            room: "301".to_string(),
        };
        assert_eq!(cell_text(&cell), "DBMS (T1) (301)");
    }

    #[test]
    fn lab_cell_text_marks_the_continuation_slot() {
        let cell = Cell::Lab {
            subject: "DBMS".to_string(),
            teacher: "T1".to_string(),
            batch: BatchId("TE11".to_string()),
            room: "501".to_string(),
            continued: true,
        };
        assert_eq!(cell_text(&cell), "DBMS (TE11) (T1) 501 (cont.)");
    }

    #[test]
    fn break_and_empty_cells_render_distinctly() {
        assert_eq!(cell_text(&Cell::Break), "BREAK");
        assert_eq!(cell_text(&Cell::Empty), "");
    }
}

fn write_grid_sheet(
    workbook: &mut Workbook,
    sheet_name: &str,
    time_model: &TimeModel,
    grid: &Grid,
    header_format: &Format,
    cell_format: &Format,
) -> Result<()> {
    let worksheet = workbook
        .add_worksheet()
        .set_name(sheet_name)
        .with_context(|| format!("naming worksheet '{sheet_name}'"))?;

    worksheet
        .write_string_with_format(0, 0, "Slot", header_format)
        .context("writing slot header")?;
    for (i, &day) in Day::ALL.iter().enumerate() {
        worksheet
            .write_string_with_format(0, (i + 1) as u16, &day.to_string(), header_format)
            .context("writing day header")?;
    }

    for (row, slot) in time_model.all_slots().enumerate() {
        let row = (row + 1) as u32;
        worksheet
            .write_string_with_format(row, 0, time_model.label(slot), header_format)
            .context("writing slot label")?;
        for (col, &day) in Day::ALL.iter().enumerate() {
            let text = cell_text(grid.cell(day, slot));
            worksheet
                .write_string_with_format(row, (col + 1) as u16, &text, cell_format)
                .context("writing grid cell")?;
        }
    }

    worksheet.set_column_width(0, 14).context("sizing slot column")?;
    for col in 1..=5u16 {
        worksheet.set_column_width(col, 28).context("sizing day column")?;
    }

    Ok(())
}

/// Writes `combined_timetables_<UTC-timestamp>.xlsx` under `out_dir`: one
/// worksheet per class, then one per teacher. Returns the path written.
pub fn write_combined_workbook(
    out_dir: &Path,
    time_model: &TimeModel,
    class_grids: &std::collections::HashMap<crate::resources::ClassId, Grid>,
    teacher_grids: &std::collections::HashMap<String, Grid>,
) -> Result<PathBuf> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_background_color(Color::RGB(0x4472C4))
        .set_font_color(Color::White)
        .set_border(FormatBorder::Thin);

    let cell_format = Format::new()
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin);

    let mut classes: Vec<_> = class_grids.keys().collect();
    classes.sort();
    for class in classes {
        write_grid_sheet(
            &mut workbook,
            &class.0,
            time_model,
            &class_grids[class],
            &header_format,
            &cell_format,
        )?;
    }

    let mut teachers: Vec<_> = teacher_grids.keys().collect();
    teachers.sort();
    for teacher in teachers {
        write_grid_sheet(
            &mut workbook,
            teacher,
            time_model,
            &teacher_grids[teacher],
            &header_format,
            &cell_format,
        )?;
    }

    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let path = out_dir.join(format!("combined_timetables_{timestamp}.xlsx"));
    workbook.save(&path).context("saving workbook")?;
    Ok(path)
}
