//! Body record parsing for precipitation data files.
//!
//! Each body line carries a tag, a year, a month and 31 daily values.
//! Defective lines are recorded as [`LineDiagnostic`]s and skipped; they
//! never abort the rest of the file.

use crate::constants::{
    DAYS_PER_LINE, HEADER_LINE_COUNT, METADATA_TOKENS, MONTH_TOKEN, TOKENS_PER_LINE, YEAR_TOKEN,
};
use crate::error::LineIssue;
use crate::models::{DataLine, FileParseResult, Granularity, IncompleteYear, LineDiagnostic};
use std::collections::BTreeMap;
use std::io::{self, BufRead};
use tracing::{debug, warn};

/// Parser turning body lines into a per-file [`FileParseResult`]
#[derive(Debug, Clone)]
pub struct RecordParser {
    granularity: Granularity,
    expected_lines_per_year: usize,
}

impl RecordParser {
    pub fn new(granularity: Granularity, expected_lines_per_year: usize) -> Self {
        Self {
            granularity,
            expected_lines_per_year,
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Parse a single body line
    pub fn parse_line(raw: &str) -> Result<DataLine, LineIssue> {
        let tokens: Vec<&str> = raw.split_whitespace().collect();
        if tokens.len() != TOKENS_PER_LINE {
            return Err(LineIssue::MalformedLine {
                expected: TOKENS_PER_LINE,
                found: tokens.len(),
                raw: raw.trim().to_string(),
            });
        }

        let year = tokens[YEAR_TOKEN]
            .parse::<i32>()
            .map_err(|e| unparsable("year", tokens[YEAR_TOKEN], e))?;

        // Month is informational; a bad token does not drop the line
        let month = tokens[MONTH_TOKEN]
            .parse::<u32>()
            .ok()
            .filter(|m| (1..=12).contains(m));

        let daily_values = tokens[METADATA_TOKENS..]
            .iter()
            .map(|token| parse_value(token))
            .collect::<Result<Vec<f64>, LineIssue>>()?;

        if daily_values.len() != DAYS_PER_LINE {
            return Err(LineIssue::IncompleteValues {
                expected: DAYS_PER_LINE,
                found: daily_values.len(),
            });
        }

        Ok(DataLine {
            tag: tokens[0].to_string(),
            year,
            month,
            daily_values,
        })
    }

    /// Parse body lines already separated from the header
    ///
    /// `first_line_number` is the 1-based file line of the first item.
    pub fn parse_lines<I, S>(&self, lines: I, first_line_number: usize) -> FileParseResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut accumulator = FileAccumulator::new(self);
        for (offset, raw) in lines.into_iter().enumerate() {
            accumulator.feed(first_line_number + offset, raw.as_ref());
        }
        accumulator.finish()
    }

    /// Parse a whole file from a reader, skipping its header lines
    ///
    /// Read or decoding errors abort the file.
    pub fn parse_reader<R: BufRead>(&self, reader: R) -> io::Result<FileParseResult> {
        let mut accumulator = FileAccumulator::new(self);
        for (index, line) in reader.lines().enumerate().skip(HEADER_LINE_COUNT) {
            accumulator.feed(index + 1, &line?);
        }
        Ok(accumulator.finish())
    }
}

/// Running state while parsing one file
struct FileAccumulator<'a> {
    parser: &'a RecordParser,
    result: FileParseResult,
    lines_per_year: BTreeMap<i32, usize>,
}

impl<'a> FileAccumulator<'a> {
    fn new(parser: &'a RecordParser) -> Self {
        Self {
            parser,
            result: FileParseResult::default(),
            lines_per_year: BTreeMap::new(),
        }
    }

    fn feed(&mut self, line_number: usize, raw: &str) {
        match RecordParser::parse_line(raw) {
            Ok(line) => {
                if line.month.is_none() {
                    warn!("Line {} has no valid month, values kept", line_number);
                }
                self.result.total_values += line.daily_values.len();
                self.result.missing_values += line.missing_count();
                self.result.lines_accepted += 1;
                *self.lines_per_year.entry(line.year).or_default() += 1;
                self.result.year_map.record(&line, self.parser.granularity);
            }
            Err(issue) => {
                debug!("Skipped line {}: {}", line_number, issue);
                self.result
                    .diagnostics
                    .push(LineDiagnostic { line_number, issue });
            }
        }
    }

    fn finish(mut self) -> FileParseResult {
        let expected = self.parser.expected_lines_per_year;
        self.result.incomplete_years = self
            .lines_per_year
            .into_iter()
            .filter(|(_, lines)| *lines != expected)
            .map(|(year, lines)| IncompleteYear {
                year,
                lines,
                expected,
            })
            .collect();
        self.result
    }
}

/// Parse one daily value; non-finite numbers are rejected
fn parse_value(token: &str) -> Result<f64, LineIssue> {
    let value = token
        .parse::<f64>()
        .map_err(|e| unparsable("value", token, e))?;
    if !value.is_finite() {
        return Err(LineIssue::UnparsableLine {
            cause: format!("value '{}' is not a finite number", token),
        });
    }
    Ok(value)
}

fn unparsable(field: &str, token: &str, err: impl std::fmt::Display) -> LineIssue {
    LineIssue::UnparsableLine {
        cause: format!("invalid {} '{}': {}", field, token, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MISSING_SENTINEL;
    use std::io::Cursor;

    /// Body line with 30 zeros and one sentinel
    fn scenario_line() -> String {
        format!("P 2020 01 {}-999", "0 ".repeat(30))
    }

    fn body_line(year: i32, month: u32, value: f64) -> String {
        let values = vec![format!("{}", value); 31].join(" ");
        format!("P {} {:02} {}", year, month, values)
    }

    fn daily_parser() -> RecordParser {
        RecordParser::new(Granularity::Daily, 12)
    }

    #[test]
    fn test_parse_scenario_line() {
        let line = RecordParser::parse_line(&scenario_line()).unwrap();

        assert_eq!(line.tag, "P");
        assert_eq!(line.year, 2020);
        assert_eq!(line.month, Some(1));
        assert_eq!(line.daily_values.len(), 31);
        assert_eq!(line.missing_count(), 1);
        assert_eq!(line.daily_values[30], MISSING_SENTINEL);
    }

    #[test]
    fn test_scenario_file_counts() {
        let result = daily_parser().parse_lines([scenario_line()], 3);

        assert_eq!(result.total_values, 31);
        assert_eq!(result.missing_values, 1);
        assert_eq!(result.lines_accepted, 1);
        assert!(result.diagnostics.is_empty());

        let bucket = result.year_map.get(2020).unwrap();
        assert_eq!(bucket.count(), 30);
        assert!(bucket.values().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_33_tokens_malformed() {
        let short = format!("P 2020 01 {}", vec!["1.0"; 30].join(" "));
        let good = body_line(2020, 2, 1.0);
        let result = daily_parser().parse_lines([short.as_str(), good.as_str()], 3);

        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].line_number, 3);
        assert!(matches!(
            result.diagnostics[0].issue,
            LineIssue::MalformedLine {
                expected: 34,
                found: 33,
                ..
            }
        ));
        // Processing continued with the next line
        assert_eq!(result.lines_accepted, 1);
        assert_eq!(result.total_values, 31);
    }

    #[test]
    fn test_unparsable_value_skips_whole_line() {
        let mut tokens: Vec<String> = vec!["P".into(), "2020".into(), "03".into()];
        tokens.extend(std::iter::repeat_n("2.5".to_string(), 30));
        tokens.push("abc".to_string());
        let result = daily_parser().parse_lines([tokens.join(" ")], 10);

        assert_eq!(result.total_values, 0);
        assert!(result.year_map.is_empty());
        assert_eq!(result.diagnostics[0].line_number, 10);
        assert!(matches!(
            result.diagnostics[0].issue,
            LineIssue::UnparsableLine { .. }
        ));
    }

    #[test]
    fn test_unparsable_year() {
        let bad_year = body_line(2020, 1, 1.0).replacen("2020", "20x0", 1);
        assert!(matches!(
            RecordParser::parse_line(&bad_year),
            Err(LineIssue::UnparsableLine { .. })
        ));
    }

    #[test]
    fn test_out_of_range_month_keeps_values() {
        let line = RecordParser::parse_line(&body_line(2020, 13, 1.0)).unwrap();
        assert_eq!(line.month, None);
        assert_eq!(line.daily_values.len(), 31);

        let text_month = body_line(2020, 1, 1.0).replacen(" 01 ", " jan ", 1);
        assert_eq!(RecordParser::parse_line(&text_month).unwrap().month, None);

        let result = daily_parser().parse_lines([body_line(2020, 13, 1.0)], 3);
        assert_eq!(result.total_values, 31);
        assert!(result.diagnostics.is_empty());
        assert_eq!(result.year_map.get(2020).unwrap().sum(), 31.0);
    }

    #[test]
    fn test_non_finite_value_rejected() {
        let line = body_line(2020, 1, 1.0).replacen(" 1 ", " NaN ", 1);
        assert!(matches!(
            RecordParser::parse_line(&line),
            Err(LineIssue::UnparsableLine { .. })
        ));
    }

    #[test]
    fn test_blank_line_malformed() {
        let result = daily_parser().parse_lines([""], 3);
        assert!(matches!(
            result.diagnostics[0].issue,
            LineIssue::MalformedLine { found: 0, .. }
        ));
    }

    #[test]
    fn test_tabs_and_spaces_mixed() {
        let line = body_line(1999, 7, 0.5).replace(' ', "\t");
        let parsed = RecordParser::parse_line(&line).unwrap();
        assert_eq!(parsed.year, 1999);
        assert_eq!(parsed.month, Some(7));
    }

    #[test]
    fn test_total_is_31_per_good_line() {
        let lines: Vec<String> = (1..=12).map(|m| body_line(2001, m, 1.0)).collect();
        let result = daily_parser().parse_lines(&lines, 3);

        assert_eq!(result.lines_accepted, 12);
        assert_eq!(result.total_values, 31 * 12);
        assert!(result.missing_values <= result.total_values);
        assert!(result.incomplete_years.is_empty());
    }

    #[test]
    fn test_incomplete_year_reported() {
        let lines = [body_line(2001, 1, 1.0), body_line(2001, 2, 1.0)];
        let result = daily_parser().parse_lines(&lines, 3);

        assert_eq!(
            result.incomplete_years,
            vec![IncompleteYear {
                year: 2001,
                lines: 2,
                expected: 12
            }]
        );
    }

    #[test]
    fn test_monthly_granularity() {
        let parser = RecordParser::new(Granularity::MonthlySum, 12);
        let result = parser.parse_lines([body_line(2010, 1, 2.0), scenario_line()], 3);

        assert_eq!(result.year_map.get(2010).unwrap().values(), &[62.0]);
        assert_eq!(result.year_map.get(2020).unwrap().values(), &[0.0]);
    }

    #[test]
    fn test_parse_reader_skips_header() {
        let content = format!(
            "precip\tMIROC5\tRCP60\tREGRESION\tdecimas\t1\nPMIROC5\n{}\nbad line\n",
            scenario_line()
        );
        let result = daily_parser().parse_reader(Cursor::new(content)).unwrap();

        assert_eq!(result.lines_accepted, 1);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].line_number, 4);
    }

    #[test]
    fn test_parse_reader_invalid_utf8() {
        let mut content = b"h1\nh2\n".to_vec();
        content.extend_from_slice(&[0xff, 0xfe, b'\n']);
        assert!(daily_parser().parse_reader(Cursor::new(content)).is_err());
    }
}
