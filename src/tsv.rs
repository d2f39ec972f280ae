//src/tsv.rs

use csv::{QuoteStyle, ReaderBuilder, StringRecord, WriterBuilder};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use crate::error::{Result, TaxaError};
use crate::types::{ClassificationRecord, ClassificationStatus, Rank, RankVector, SplitRecord, RANK_COUNT};

const DELIMITER: u8 = b'\t';
const RECORD_COLUMNS: usize = 3;

/// Header of the split table: the three input columns followed by one column per rank.
pub fn split_table_header() -> Vec<&'static str> {
    let mut header = vec!["Status", "ReadID", "Taxonomy"];
    header.extend(Rank::ALL.iter().map(|rank| rank.name()));
    header
}

/// Opens `path`, transparently decompressing it when it ends in `.gz`.
fn open_maybe_gz(path: &Path) -> Result<Box<dyn Read>> {
    let f = File::open(path)?;
    let is_gz = path
        .extension()
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    Ok(if is_gz {
        Box::new(BufReader::new(MultiGzDecoder::new(f)))
    } else {
        Box::new(BufReader::new(f))
    })
}

fn line_of(row: &StringRecord) -> u64 {
    row.position().map(|p| p.line()).unwrap_or(0)
}

fn record_from_row(row: &StringRecord) -> Result<ClassificationRecord> {
    if row.len() < RECORD_COLUMNS {
        return Err(TaxaError::MalformedRow {
            line: line_of(row),
            reason: format!("expected {RECORD_COLUMNS} columns, found {}", row.len()),
        });
    }
    let status = ClassificationStatus::from_code(&row[0]).map_err(|e| TaxaError::MalformedRow {
        line: line_of(row),
        reason: e.to_string(),
    })?;

    Ok(ClassificationRecord {
        status,
        read_id: row[1].to_string(),
        lineage: row[2].to_string(),
    })
}

/// Parses headerless `status \t read_id \t lineage` rows.
pub fn parse_classifications<R: Read>(reader: R) -> Result<Vec<ClassificationRecord>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in rdr.records() {
        records.push(record_from_row(&row?)?);
    }
    Ok(records)
}

/// Reads a classifier output table (optionally gzipped).
pub fn read_classifications<P: AsRef<Path>>(path: P) -> Result<Vec<ClassificationRecord>> {
    let path = path.as_ref();
    let records = parse_classifications(open_maybe_gz(path)?)?;
    log::info!("Read {} classification records from {}", records.len(), path.display());
    Ok(records)
}

/// Writes the split table: header row, then the original columns and seven rank columns.
pub fn write_split_records<W: Write>(writer: W, records: &[SplitRecord]) -> Result<()> {
    let mut wtr = WriterBuilder::new()
        .delimiter(DELIMITER)
        .quote_style(QuoteStyle::Never)
        .from_writer(writer);

    wtr.write_record(split_table_header())?;
    for split in records {
        let status = split.record.status.to_string();
        let mut row: Vec<&str> = vec![
            status.as_str(),
            split.record.read_id.as_str(),
            split.record.lineage.as_str(),
        ];
        row.extend(split.ranks.to_strings());
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_split_table<P: AsRef<Path>>(path: P, records: &[SplitRecord]) -> Result<()> {
    let path = path.as_ref();
    write_split_records(File::create(path)?, records)?;
    log::info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}

/// Parses a split table back into records, keeping the stored rank columns.
pub fn parse_split_records<R: Read>(reader: R) -> Result<Vec<SplitRecord>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        if row.len() < RECORD_COLUMNS + RANK_COUNT {
            return Err(TaxaError::MalformedRow {
                line: line_of(&row),
                reason: format!(
                    "expected {} columns, found {}",
                    RECORD_COLUMNS + RANK_COUNT,
                    row.len()
                ),
            });
        }
        let record = record_from_row(&row)?;
        let ranks = RankVector::from_segments(
            row.iter()
                .skip(RECORD_COLUMNS)
                .map(|cell| Some(cell.to_string())),
        );
        records.push(SplitRecord { record, ranks });
    }
    Ok(records)
}

pub fn read_split_table<P: AsRef<Path>>(path: P) -> Result<Vec<SplitRecord>> {
    let path = path.as_ref();
    let records = parse_split_records(open_maybe_gz(path)?)?;
    log::info!("Read {} split rows from {}", records.len(), path.display());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lineage::parse_lineage;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Cursor;

    const INPUT: &str = "C\tread1\troot;k__Bacteria;p__Firmicutes;c__Bacilli\n\
                         U\tread2\tunclassified\n\
                         C\tread3\tk__Bacteria;p__\"Quoted\";g__X\n";

    #[test]
    fn test_parse_classifications() {
        let records = parse_classifications(Cursor::new(INPUT)).expect("parses");
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].status, ClassificationStatus::Classified);
        assert_eq!(records[1].status, ClassificationStatus::Unclassified);
        assert_eq!(records[1].lineage, "unclassified");
        assert_eq!(records[2].lineage, "k__Bacteria;p__\"Quoted\";g__X");
    }

    #[test]
    fn test_short_row_is_malformed() {
        let err = parse_classifications(Cursor::new("C\tread1\tk__A\nC\tread2\n")).unwrap_err();
        assert!(matches!(err, TaxaError::MalformedRow { line: 2, .. }), "{err:?}");
    }

    #[test]
    fn test_bad_status_is_malformed() {
        let err = parse_classifications(Cursor::new("X\tread1\tk__A\n")).unwrap_err();
        assert!(matches!(err, TaxaError::MalformedRow { line: 1, .. }), "{err:?}");
    }

    #[test]
    fn test_split_table_layout() {
        let records: Vec<SplitRecord> = parse_classifications(Cursor::new(INPUT))
            .unwrap()
            .into_iter()
            .map(|record| {
                let ranks = parse_lineage(&record.lineage);
                SplitRecord { record, ranks }
            })
            .collect();

        let mut out = Vec::new();
        write_split_records(&mut out, &records).expect("writes");
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "Status\tReadID\tTaxonomy\tKingdom\tPhylum\tClass\tOrder\tFamily\tGenus\tSpecies"
        );
        assert_eq!(
            lines[1],
            "C\tread1\troot;k__Bacteria;p__Firmicutes;c__Bacilli\tBacteria\tFirmicutes\tBacilli\t\t\t\t"
        );
        assert_eq!(lines[2], "U\tread2\tunclassified\t\t\t\t\t\t\t");
        assert!(lines.iter().all(|l| l.split('\t').count() == 10));

        let back = parse_split_records(Cursor::new(text)).expect("reads back");
        assert_eq!(back, records);
    }

    #[test]
    fn test_gzipped_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classifications.tsv.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(INPUT.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let records = read_classifications(&path).expect("reads gz");
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].read_id, "read3");
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            read_classifications("/definitely/not/here.tsv"),
            Err(TaxaError::Io(_))
        ));
    }
}
