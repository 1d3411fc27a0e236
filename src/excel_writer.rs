use anyhow::Result;
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook};
use std::path::Path;

use crate::models::{CellValue, FundRecord, OutputLayout};

pub const DEFAULT_SHEET: &str = "funds_info";

pub struct ExcelExporter {
    workbook: Workbook,
}

fn column_width(header: &str) -> u16 {
    match header {
        "Provider and Fund" => 50,
        "Fund Link" => 60,
        "Fund Name" | "Fund" => 40,
        "Provider" => 30,
        "Fund Category" => 20,
        "Return % (last 5 years)" => 24,
        _ => 12,
    }
}

impl ExcelExporter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            workbook: Workbook::new(),
        })
    }

    /// Writes `funds` to a new worksheet: header at A1, records from row 2.
    pub fn write_funds(
        &mut self,
        sheet_name: &str,
        layout: OutputLayout,
        funds: &[FundRecord],
    ) -> Result<()> {
        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(sheet_name)?;

        // Navy header, bold white text
        let header_format = Format::new()
            .set_bold()
            .set_background_color(Color::RGB(0x000080))
            .set_font_color(Color::White)
            .set_border(FormatBorder::Thin);

        for (col, header) in layout.headers().iter().enumerate() {
            let col = col as u16;
            worksheet.write_with_format(0, col, *header, &header_format)?;
            worksheet.set_column_width(col, column_width(header))?;
        }

        worksheet.set_freeze_panes(1, 0)?;

        let cell_format = Format::new().set_border(FormatBorder::Thin);
        let percent_format = Format::new()
            .set_border(FormatBorder::Thin)
            .set_num_format("0.00");

        for (row_idx, fund) in funds.iter().enumerate() {
            let row = (row_idx + 1) as u32;

            for (col, cell) in fund.cells(layout).into_iter().enumerate() {
                let col = col as u16;
                match cell {
                    CellValue::Text(text) => {
                        worksheet.write_with_format(row, col, text.as_str(), &cell_format)?;
                    }
                    CellValue::Number(value) => {
                        worksheet.write_with_format(row, col, value, &percent_format)?;
                    }
                }
            }
        }

        Ok(())
    }

    pub fn save(mut self, path: &Path) -> Result<()> {
        self.workbook.save(path)?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod xlsx {
    use std::fs::File;
    use std::io::Read;
    use std::path::Path;

    /// Reads one XML part out of a saved workbook.
    pub fn part(path: &Path, name: &str) -> String {
        let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut xml = String::new();
        entry.read_to_string(&mut xml).unwrap();
        xml
    }

    /// The `<c>` element for cell `reference`, if the sheet has one.
    pub fn cell<'a>(sheet: &'a str, reference: &str) -> Option<&'a str> {
        let start = sheet.find(&format!(r#"<c r="{reference}""#))?;
        let len = sheet[start..].find("</c>")? + "</c>".len();
        Some(&sheet[start..start + len])
    }

    pub fn is_text(cell: &str) -> bool {
        cell.contains(r#"t="s""#)
    }
}

#[cfg(test)]
mod tests {
    use super::xlsx::{cell, is_text, part};
    use super::*;
    use crate::models::sample_fund;

    #[test]
    fn combined_sheet_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("funds.xlsx");

        let mut exporter = ExcelExporter::new().unwrap();
        exporter
            .write_funds(
                DEFAULT_SHEET,
                OutputLayout::Combined,
                &[sample_fund("ANZ", "Growth"), sample_fund("ASB", "Balanced")],
            )
            .unwrap();
        exporter.save(&path).unwrap();

        let workbook = part(&path, "xl/workbook.xml");
        assert!(workbook.contains(r#"name="funds_info""#));

        let strings = part(&path, "xl/sharedStrings.xml");
        assert!(strings.contains("<t>Provider and Fund</t>"));
        assert!(strings.contains("<t>ANZ Growth</t>"));

        let sheet = part(&path, "xl/worksheets/sheet1.xml");
        assert!(is_text(cell(&sheet, "A1").unwrap()));
        assert!(is_text(cell(&sheet, "G1").unwrap()));
        assert!(is_text(cell(&sheet, "A2").unwrap()));
        assert!(is_text(cell(&sheet, "A3").unwrap()));
        assert!(cell(&sheet, "A4").is_none());

        let ret = cell(&sheet, "B2").unwrap();
        assert!(!is_text(ret));
        assert!(ret.contains("<v>7.5</v>"));
        let fee = cell(&sheet, "E2").unwrap();
        assert!(!is_text(fee));
        assert!(fee.contains("<v>0.35</v>"));
    }

    #[test]
    fn standard_sheet_numbers_are_numeric() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("funds.xlsx");

        let mut exporter = ExcelExporter::new().unwrap();
        exporter
            .write_funds("kiwisaver", OutputLayout::Standard, &[sample_fund("Kernel", "Growth")])
            .unwrap();
        exporter.save(&path).unwrap();

        assert!(part(&path, "xl/workbook.xml").contains(r#"name="kiwisaver""#));
        let sheet = part(&path, "xl/worksheets/sheet1.xml");
        assert!(is_text(cell(&sheet, "D2").unwrap()));
        assert!(cell(&sheet, "E2").unwrap().contains("<v>0.35</v>"));
        assert!(!is_text(cell(&sheet, "E2").unwrap()));
        assert!(cell(&sheet, "F2").unwrap().contains("<v>7.5</v>"));
        assert!(!is_text(cell(&sheet, "F2").unwrap()));
    }

    #[test]
    fn rejects_invalid_sheet_name() {
        let mut exporter = ExcelExporter::new().unwrap();
        let result = exporter.write_funds("bad[name]", OutputLayout::Standard, &[]);
        assert!(result.is_err());
    }
}
