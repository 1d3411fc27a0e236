use anyhow::Result;
use chrono::NaiveDateTime;
use csv::{Writer, WriterBuilder};
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::models::{FundRecord, OutputLayout};

/// `kiwisaverfunds-<timestamp>.csv` inside `dir`.
pub fn timestamped_path(dir: &Path, now: NaiveDateTime) -> PathBuf {
    dir.join(format!("kiwisaverfunds-{}.csv", now.format("%Y-%m-%d-%H-%M-%S")))
}

pub struct CsvExporter {
    writer: Writer<File>,
    layout: OutputLayout,
}

impl CsvExporter {
    pub fn new(path: &Path, layout: OutputLayout) -> Result<Self> {
        // Header is written explicitly so an empty fund list still gets one.
        let writer = WriterBuilder::new().has_headers(false).from_path(path)?;
        Ok(Self { writer, layout })
    }

    pub fn write_header(&mut self) -> Result<()> {
        self.writer.write_record(self.layout.headers())?;
        Ok(())
    }

    pub fn write_fund(&mut self, fund: &FundRecord) -> Result<()> {
        match self.layout {
            OutputLayout::Standard => self.writer.serialize(fund)?,
            OutputLayout::Combined => self.writer.serialize(fund.combined_row())?,
        }
        Ok(())
    }

    pub fn finalize(mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{sample_fund, COMBINED_HEADERS, STANDARD_HEADERS};
    use chrono::NaiveDate;

    fn write_all(path: &Path, layout: OutputLayout, funds: &[FundRecord]) {
        let mut exporter = CsvExporter::new(path, layout).unwrap();
        exporter.write_header().unwrap();
        for fund in funds {
            exporter.write_fund(fund).unwrap();
        }
        exporter.finalize().unwrap();
    }

    #[test]
    fn file_name_uses_timestamp() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 7)
            .unwrap();
        let path = timestamped_path(Path::new("out"), now);
        assert_eq!(path, Path::new("out").join("kiwisaverfunds-2024-03-09-14-05-07.csv"));
    }

    #[test]
    fn standard_layout_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("funds.csv");
        let mut fund = sample_fund("Simplicity", "Growth Fund");
        fund.return_percent_5y = 5.0;
        write_all(&path, OutputLayout::Standard, &[fund]);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines[0], STANDARD_HEADERS.join(","));
        assert_eq!(lines[1], "Simplicity,Growth Fund,/funds/growth-fund,Growth,0.35,5.0");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn combined_layout_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("funds.csv");
        write_all(
            &path,
            OutputLayout::Combined,
            &[sample_fund("Milford", "Balanced"), sample_fund("Fisher, Funds", "Growth")],
        );

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), COMBINED_HEADERS);

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "Milford Balanced");
        assert_eq!(&rows[0][1], "7.5");
        assert_eq!(&rows[1][5], "Fisher, Funds");
    }

    #[test]
    fn empty_list_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("funds.csv");
        write_all(&path, OutputLayout::Standard, &[]);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim_end(), STANDARD_HEADERS.join(","));
    }
}
