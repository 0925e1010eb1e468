use std::fs;
use std::io::{Cursor, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::*;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("bc_report_fastqc_test_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

const FASTQC_DATA: &str = "##FastQC\t0.11.9
>>Basic Statistics\tpass
#Measure\tValue
Filename\ts1_R1.fastq.gz
Total Sequences\t1000
>>END_MODULE
>>Per base sequence quality\twarn
#Base\tMean\tMedian
1\t32.5\t33.0
2\t31.0\t32.0
3-4\t29.25\t30.0
>>END_MODULE
>>Kmer Content\tfail
>>END_MODULE
";

fn parse(text: &str) -> Result<FastqcReport, StatParseError> {
    parse_fastqc_data(Cursor::new(text))
}

#[test]
fn test_statuses_keep_file_order() {
    let report = parse(FASTQC_DATA).unwrap();
    assert_eq!(
        report.statuses.iter().collect::<Vec<_>>(),
        vec![
            (&"Basic Statistics".to_string(), &ModuleStatus::Pass),
            (&"Per base sequence quality".to_string(), &ModuleStatus::Warn),
            (&"Kmer Content".to_string(), &ModuleStatus::Fail),
        ]
    );
}

#[test]
fn test_sections_hold_rows_with_header() {
    let report = parse(FASTQC_DATA).unwrap();
    let basic = &report.sections["Basic Statistics"];
    assert_eq!(basic.len(), 3);
    assert_eq!(basic[0], vec!["#Measure", "Value"]);
    assert_eq!(basic[2], vec!["Total Sequences", "1000"]);
    assert!(report.sections["Kmer Content"].is_empty());
}

#[test]
fn test_numeric_column() {
    let report = parse(FASTQC_DATA).unwrap();
    let series = report
        .numeric_column("Per base sequence quality", "Mean")
        .unwrap();
    assert_eq!(
        series,
        vec![
            ("1".to_string(), 32.5),
            ("2".to_string(), 31.0),
            ("3-4".to_string(), 29.25),
        ]
    );
    let base = report
        .numeric_column("Per base sequence quality", "Base")
        .unwrap_err();
    assert!(matches!(base, StatParseError::NotNumeric { .. }));
}

#[test]
fn test_numeric_column_missing_section_and_column() {
    let report = parse(FASTQC_DATA).unwrap();
    assert!(report.numeric_column("Kmer Content", "Count").unwrap().is_empty());
    assert!(report.numeric_column("Adapter Content", "Mean").unwrap().is_empty());
    let err = report
        .numeric_column("Per base sequence quality", "Lower Quartile")
        .unwrap_err();
    assert!(matches!(err, StatParseError::MissingColumn { .. }));
}

#[test]
fn test_unknown_status() {
    let text = FASTQC_DATA.replace("Kmer Content\tfail", "Kmer Content\tmaybe");
    let err = parse(&text).unwrap_err();
    assert!(
        matches!(err, StatParseError::UnknownStatus { line: 13, ref status } if status == "maybe")
    );
}

#[test]
fn test_header_without_status() {
    let text = FASTQC_DATA.replace("Kmer Content\tfail", "Kmer Content");
    assert!(matches!(
        parse(&text).unwrap_err(),
        StatParseError::Malformed { line: 13, .. }
    ));
}

#[test]
fn test_row_outside_module() {
    let text = format!("{FASTQC_DATA}stray\trow\n");
    assert!(matches!(
        parse(&text).unwrap_err(),
        StatParseError::Malformed { line: 15, .. }
    ));
}

#[test]
fn test_unbalanced_modules() {
    let dangling_end = "##FastQC\t0.11.9\n>>END_MODULE\n";
    assert!(matches!(
        parse(dangling_end).unwrap_err(),
        StatParseError::Malformed { line: 2, .. }
    ));

    let nested = "##FastQC\t0.11.9\n>>A\tpass\n>>B\tpass\n>>END_MODULE\n";
    assert!(matches!(
        parse(nested).unwrap_err(),
        StatParseError::Malformed { line: 3, .. }
    ));

    let unclosed = "##FastQC\t0.11.9\n>>A\tpass\nx\t1\n";
    assert!(matches!(
        parse(unclosed).unwrap_err(),
        StatParseError::Malformed { line: 0, .. }
    ));
}

#[test]
fn test_blank_lines_and_crlf() {
    let text = FASTQC_DATA.replace('\n', "\r\n").replace(">>END_MODULE\r\n>>Kmer", ">>END_MODULE\r\n\r\n>>Kmer");
    let report = parse(&text).unwrap();
    assert_eq!(report.statuses.len(), 3);
    assert_eq!(report.sections["Basic Statistics"][1], vec!["Filename", "s1_R1.fastq.gz"]);
}

#[test]
fn test_read_archive() {
    let dir = make_temp_dir();
    let zip_path = dir.join("s1_R1_fastqc.zip");
    let mut writer = ZipWriter::new(fs::File::create(&zip_path).unwrap());
    writer
        .start_file("s1_R1_fastqc/fastqc_data.txt", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(FASTQC_DATA.as_bytes()).unwrap();
    writer.finish().unwrap();

    let report = read_fastqc_archive(&zip_path).unwrap();
    assert_eq!(report.statuses["Kmer Content"], ModuleStatus::Fail);
}

#[test]
fn test_read_archive_without_data_member() {
    let dir = make_temp_dir();
    let zip_path = dir.join("s2_fastqc.zip");
    let mut writer = ZipWriter::new(fs::File::create(&zip_path).unwrap());
    writer
        .start_file("s2_fastqc/summary.txt", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"PASS\tBasic Statistics\n").unwrap();
    writer.finish().unwrap();

    assert!(matches!(
        read_fastqc_archive(&zip_path).unwrap_err(),
        ReportError::Archive { .. }
    ));
    assert!(matches!(
        read_fastqc_archive(&dir.join("absent_fastqc.zip")).unwrap_err(),
        ReportError::Filesystem { .. }
    ));
}
