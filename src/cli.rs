//! Command-line interface definitions and argument parsing

use crate::record::{CustomerRecord, FieldValue};
use clap::Parser;
use std::path::PathBuf;

/// Assign customers to trained K-Means credit segments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory holding the trained artifact set
    #[arg(short, long, env = "CREDITWISE_ARTIFACTS", default_value = "models")]
    pub artifacts: PathBuf,

    /// Prediction mode: a single record as Field=value pairs or a JSON object
    /// Example: --predict "Age=25,Duration=10,Credit amount=1200,Sex=male,..."
    #[arg(short, long)]
    pub predict: Option<String>,

    /// Batch mode: CSV file with one customer per row
    #[arg(short, long, conflicts_with = "predict")]
    pub input: Option<PathBuf>,

    /// Output path for batch predictions (stdout when omitted)
    #[arg(short, long, requires = "input")]
    pub output: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Parse the record from the predict string
    pub fn parse_record(&self) -> crate::Result<Option<CustomerRecord>> {
        self.predict.as_deref().map(parse_record).transpose()
    }
}

/// Parses `Field=value,Field=value` or a JSON object into a record.
///
/// Values are typed as integer, then number, then text.
pub fn parse_record(input: &str) -> crate::Result<CustomerRecord> {
    let trimmed = input.trim();
    if trimmed.starts_with('{') {
        return serde_json::from_str(trimmed)
            .map_err(|e| crate::Error::MalformedRecord(e.to_string()));
    }

    let mut record = CustomerRecord::new();
    for pair in trimmed.split(',').filter(|p| !p.trim().is_empty()) {
        let (field, value) = pair.split_once('=').ok_or_else(|| {
            crate::Error::MalformedRecord(format!("expected Field=value, got '{}'", pair.trim()))
        })?;
        record.insert(field.trim(), FieldValue::parse(value.trim()));
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_args(predict: Option<&str>) -> Args {
        Args {
            artifacts: PathBuf::from("models"),
            predict: predict.map(str::to_string),
            input: None,
            output: None,
            verbose: false,
        }
    }

    #[test]
    fn test_parse_record_pairs() {
        let args = create_test_args(Some("Age=25, Credit amount=1200.5,Purpose=radio/TV"));
        let record = args.parse_record().unwrap().unwrap();

        assert_eq!(record.len(), 3);
        assert_eq!(record.get("Age"), Some(&FieldValue::Integer(25)));
        assert_eq!(record.get("Credit amount"), Some(&FieldValue::Number(1200.5)));
        assert_eq!(record.get("Purpose"), Some(&FieldValue::from("radio/TV")));
    }

    #[test]
    fn test_parse_record_json() {
        let record = parse_record(r#"{"Age": 25, "Saving accounts": "little"}"#).unwrap();
        assert_eq!(record.get("Saving accounts"), Some(&FieldValue::from("little")));
    }

    #[test]
    fn test_parse_record_errors() {
        assert!(parse_record("Age").is_err());
        assert!(parse_record("{ broken").is_err());
        assert!(create_test_args(None).parse_record().unwrap().is_none());
    }

    #[test]
    fn test_args_parse() {
        let args =
            Args::try_parse_from(["creditwise", "-a", "artifacts", "-i", "customers.csv", "-v"])
                .unwrap();
        assert_eq!(args.artifacts, PathBuf::from("artifacts"));
        assert_eq!(args.input, Some(PathBuf::from("customers.csv")));
        assert!(args.verbose);

        assert!(Args::try_parse_from(["creditwise", "-p", "Age=1", "-i", "x.csv"]).is_err());
        assert!(Args::try_parse_from(["creditwise", "-o", "out.csv"]).is_err());
    }
}
