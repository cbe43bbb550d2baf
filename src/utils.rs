//! Csv input and output helpers.
use crate::errors::HydError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Read records of type `T` from a csv file with a header row.
/// Columns that `T` does not name are ignored.
pub fn read_csv<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<Vec<T>, HydError> {
    let var = std::fs::File::open(path)?;
    let mut rdr = csv::Reader::from_reader(var);
    let mut dat = Vec::new();
    for result in rdr.deserialize() {
        let row: T = result?;
        dat.push(row);
    }
    Ok(dat)
}

/// Write records to csv file, one row per record.
pub fn record<T: Serialize, P: AsRef<Path>>(rec: &[T], path: P) -> Result<(), HydError> {
    let mut wtr = csv::Writer::from_path(path)?;
    for i in rec {
        wtr.serialize(i)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Strip `!` comments and blank lines from model file text.
pub fn strip_comments(text: &str) -> Vec<&str> {
    text.lines()
        .map(|line| match line.find('!') {
            Some(i) => &line[..i],
            None => line,
        })
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct Row {
        #[serde(rename = "Flow_Depth")]
        depth: f64,
    }

    #[test]
    fn comments_and_blanks_removed() {
        let text = "! header\nChannel Width == 10 ! metres\n\n   \nBlockage == None";
        assert_eq!(
            strip_comments(text),
            vec!["Channel Width == 10", "Blockage == None"]
        );
    }

    #[test]
    fn csv_round_trip_ignores_extra_columns() {
        let dir = std::env::temp_dir().join("forest_hydraulics_utils");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("depths.csv");
        std::fs::write(&path, ",Flow_Depth,Velocity\n0,0.5,\n1,1.5,\n").unwrap();
        let rows: Vec<Row> = read_csv(&path).unwrap();
        assert_eq!(rows, vec![Row { depth: 0.5 }, Row { depth: 1.5 }]);

        let out = dir.join("out.csv");
        record(&rows, &out).unwrap();
        let text = std::fs::read_to_string(&out).unwrap();
        assert_eq!(text, "Flow_Depth\n0.5\n1.5\n");
    }

    #[test]
    fn missing_file_is_io_error() {
        let res: Result<Vec<Row>, HydError> = read_csv("no/such/file.csv");
        assert!(matches!(res, Err(HydError::IoError(_))));
    }
}
