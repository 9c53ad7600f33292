//! Layout of the monthly work report workbook

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use tt_core::dates::{is_weekend, month_label, weekday_name};
use tt_core::error::TtError;
use tt_core::result::TtResult;
use tt_core::traits::Id;
use tt_models::{DayMarker, DayMarkerType, TimeEntry};

use crate::reports::NO_PROJECT_LABEL;

pub const SHEET_NAME: &str = "Monthly report";

const HEADER_ROW: u32 = 8;
const FIRST_DAY_ROW: u32 = 10;

const COL_WEEKDAY: u16 = 1;
const COL_DATE: u16 = 2;
const COL_NOTES: u16 = 3;
const COL_DESCRIPTION: u16 = 4;
const COL_RANGE: u16 = 5;
const COL_STATS_PROJECT: u16 = 6;
const COL_PROJECT: u16 = 7;
const COL_ACTIVITIES: u16 = 8;
const COL_HOURS: u16 = 9;
const COL_DAY_HOURS: u16 = 10;

/// Everything the sheet shows for one employee and month
pub struct MonthlySheetData<'a> {
    pub employee_name: &'a str,
    pub year: i32,
    pub month: u32,
    /// Every day of the month mapped to its marker
    pub days: &'a BTreeMap<NaiveDate, Option<DayMarker>>,
    pub entries: &'a [TimeEntry],
    pub project_names: &'a HashMap<Id, String>,
}

impl MonthlySheetData<'_> {
    fn project_name(&self, project_id: Option<Id>) -> String {
        project_id
            .and_then(|id| self.project_names.get(&id).cloned())
            .unwrap_or_else(|| NO_PROJECT_LABEL.to_string())
    }
}

/// Worksheet addressed by 1-based row and column, as the layout is written
struct Grid<'a> {
    sheet: &'a mut Worksheet,
    bold: Format,
}

impl<'a> Grid<'a> {
    fn new(sheet: &'a mut Worksheet) -> Self {
        Self {
            sheet,
            bold: Format::new().set_bold(),
        }
    }

    fn text(&mut self, row: u32, col: u16, value: &str) -> Result<(), XlsxError> {
        self.sheet.write_string(row - 1, col - 1, value)?;
        Ok(())
    }

    fn bold_text(&mut self, row: u32, col: u16, value: &str) -> Result<(), XlsxError> {
        self.sheet
            .write_string_with_format(row - 1, col - 1, value, &self.bold)?;
        Ok(())
    }

    /// Non-finite values leave the cell empty
    fn number(&mut self, row: u32, col: u16, value: f64) -> Result<(), XlsxError> {
        if value.is_finite() {
            self.sheet.write_number(row - 1, col - 1, value)?;
        }
        Ok(())
    }

    fn bold_number(&mut self, row: u32, col: u16, value: f64) -> Result<(), XlsxError> {
        if value.is_finite() {
            self.sheet
                .write_number_with_format(row - 1, col - 1, value, &self.bold)?;
        }
        Ok(())
    }
}

/// Render the report as `.xlsx` bytes
pub fn build_monthly_workbook(data: &MonthlySheetData<'_>) -> TtResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME).map_err(xlsx_error)?;
    write_report(&mut Grid::new(sheet), data).map_err(xlsx_error)?;
    workbook.save_to_buffer().map_err(xlsx_error)
}

fn xlsx_error(err: XlsxError) -> TtError {
    TtError::Internal(format!("Failed to build workbook: {}", err))
}

fn write_report(grid: &mut Grid<'_>, data: &MonthlySheetData<'_>) -> Result<(), XlsxError> {
    grid.bold_text(1, COL_DESCRIPTION, data.employee_name)?;
    grid.text(
        2,
        COL_DESCRIPTION,
        &format!("MONTHLY WORK REPORT - {}", month_label(data.year, data.month)),
    )?;

    for (col, label) in [
        (COL_WEEKDAY, "Weekday"),
        (COL_DATE, "Date"),
        (COL_NOTES, "Notes"),
        (COL_DESCRIPTION, "Description"),
        (COL_RANGE, "Time range"),
        (COL_PROJECT, "Project"),
        (COL_ACTIVITIES, "Activities"),
        (COL_HOURS, "Hours"),
        (COL_DAY_HOURS, "Day hours"),
    ] {
        grid.bold_text(HEADER_ROW, col, label)?;
    }

    let mut by_day: BTreeMap<NaiveDate, Vec<&TimeEntry>> = BTreeMap::new();
    for entry in data.entries {
        by_day.entry(entry.entry_date).or_default().push(entry);
    }

    let mut row = FIRST_DAY_ROW;
    for (date, marker) in data.days {
        let label = marker.as_ref().map(|m| m.marker_type.label());
        let mut items = by_day.remove(date).unwrap_or_default();

        if items.is_empty() {
            if label.is_none() && is_weekend(*date) {
                continue;
            }
            write_day_heading(grid, row, *date, label)?;
            row += 1;
            continue;
        }

        items.sort_by_key(|e| e.start_time);
        write_day_heading(grid, row, *date, label)?;
        grid.number(row, COL_DAY_HOURS, items.iter().map(|e| e.total_hours()).sum())?;

        for entry in items {
            let description = entry.description.as_deref().unwrap_or_default();
            grid.text(row, COL_DESCRIPTION, description)?;
            grid.text(
                row,
                COL_RANGE,
                &format!(
                    "{} - {}",
                    entry.start_time.format("%H:%M"),
                    entry.end_time.format("%H:%M")
                ),
            )?;
            grid.text(row, COL_PROJECT, &data.project_name(entry.project_id))?;
            grid.text(row, COL_ACTIVITIES, description)?;
            grid.number(row, COL_HOURS, entry.total_hours())?;
            row += 1;
        }
    }

    let month_hours: f64 = data.entries.iter().map(TimeEntry::total_hours).sum();
    row += 1;
    grid.bold_text(row, COL_DESCRIPTION, "Total")?;
    grid.bold_number(row, COL_ACTIVITIES, month_hours)?;
    grid.bold_number(row, COL_HOURS, month_hours)?;

    row += 2;
    grid.bold_text(row, COL_NOTES, "Type")?;
    grid.bold_text(row, COL_DESCRIPTION, "Days")?;
    grid.bold_text(row, COL_STATS_PROJECT, "Project")?;
    grid.bold_text(row, COL_ACTIVITIES, "Hours")?;
    row += 1;

    let mut marker_row = row;
    for marker_type in DayMarkerType::ALL {
        let count = data
            .days
            .values()
            .flatten()
            .filter(|m| m.marker_type == marker_type)
            .count();
        if count > 0 {
            grid.text(marker_row, COL_NOTES, marker_type.label())?;
            grid.number(marker_row, COL_DESCRIPTION, count as f64)?;
            marker_row += 1;
        }
    }

    let mut project_hours: HashMap<String, f64> = HashMap::new();
    for entry in data.entries {
        *project_hours.entry(data.project_name(entry.project_id)).or_default() += entry.total_hours();
    }
    let mut project_hours: Vec<(String, f64)> = project_hours.into_iter().collect();
    project_hours.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    for (offset, (name, hours)) in project_hours.into_iter().enumerate() {
        let project_row = row + offset as u32;
        grid.text(project_row, COL_STATS_PROJECT, &name)?;
        grid.number(project_row, COL_ACTIVITIES, hours)?;
    }

    Ok(())
}

fn write_day_heading(
    grid: &mut Grid<'_>,
    row: u32,
    date: NaiveDate,
    label: Option<&str>,
) -> Result<(), XlsxError> {
    grid.text(row, COL_WEEKDAY, weekday_name(date))?;
    grid.text(row, COL_DATE, &date.format("%d.%m.%Y").to_string())?;
    if let Some(label) = label {
        grid.text(row, COL_NOTES, label)?;
    }
    Ok(())
}
