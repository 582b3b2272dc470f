#![allow(non_snake_case)]
use csv::Writer;
use log::LevelFilter;
use nalgebra::{DMatrix, DVector};
use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};
use std::fs::File;
use std::io::{self, Write};

/// Column headers for a trajectory dump: x0, y0, z0, x1, ... for N+1 nodes.
pub fn node_headers(n_segments: usize) -> Vec<String> {
    let mut headers = Vec::with_capacity(3 * (n_segments + 1));
    for i in 0..=n_segments {
        headers.push(format!("x{}", i));
        headers.push(format!("y{}", i));
        headers.push(format!("z{}", i));
    }
    headers
}

/// Writes a trajectory matrix (rows = time samples, columns = interleaved
/// node coordinates) as tab-separated text with a time column in front.
pub fn save_trajectory_to_file(
    trajectory: &DMatrix<f64>,
    headers: &Vec<String>,
    filename: &str,
    t_mesh: &DVector<f64>,
    arg: &String,
) -> io::Result<()> {
    let mut file = File::create(filename)?;
    let mut headers_with_t = Vec::new();
    headers_with_t.push(arg.clone());
    headers_with_t.extend(headers.iter().cloned());
    writeln!(file, "{}", headers_with_t.join("\t"))?;
    for (i, row) in trajectory.row_iter().enumerate() {
        let mut row_data = Vec::new();
        row_data.push(t_mesh[i].to_string());
        row_data.extend(row.iter().map(|&val| val.to_string()));
        writeln!(file, "{}", row_data.join("\t"))?;
    }

    Ok(())
}

/// Same data as `save_trajectory_to_file` but through the csv crate.
pub fn save_trajectory_to_csv(
    trajectory: &DMatrix<f64>,
    headers: &Vec<String>,
    filename: &str,
    t_mesh: &DVector<f64>,
    arg: &String,
) -> io::Result<()> {
    let file = File::create(filename)?;
    let mut writer = Writer::from_writer(file);

    let mut headers_with_t = Vec::new();
    headers_with_t.push(arg.clone());
    headers_with_t.extend(headers.iter().cloned());
    writer.write_record(&headers_with_t)?;

    for (i, row) in trajectory.row_iter().enumerate() {
        let mut row_data = Vec::new();
        row_data.push(t_mesh[i].to_string());
        row_data.extend(row.iter().map(|&val| val.to_string()));
        writer.write_record(&row_data)?;
    }

    writer.flush()?;
    Ok(())
}

/// Terminal logger setup keyed by a loglevel string; "off"/"none" disables
/// logging entirely. Safe to call more than once - a second init attempt is
/// ignored.
pub fn init_logger(loglevel: Option<&str>) {
    let is_logging_disabled = loglevel
        .map(|level| level == "off" || level == "none")
        .unwrap_or(false);
    if is_logging_disabled {
        return;
    }
    let log_option = if let Some(level) = loglevel {
        match level {
            "debug" => LevelFilter::Debug,
            "info" => LevelFilter::Info,
            "warn" => LevelFilter::Warn,
            "error" => LevelFilter::Error,
            _ => panic!("loglevel must be debug, info, warn or error"),
        }
    } else {
        LevelFilter::Info
    };
    let _ = CombinedLogger::init(vec![TermLogger::new(
        log_option,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn trajectory_written_and_readable_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trajectory.csv");
        let path_str = path.to_str().unwrap();

        let trajectory = DMatrix::from_row_slice(
            2,
            6,
            &[
                0.0, 0.0, 0.0, 0.5, 0.0, 0.0, //
                0.0, 0.1, 0.0, 0.5, -0.1, 0.0,
            ],
        );
        let t_mesh = DVector::from_vec(vec![0.0, 0.01]);
        let headers = node_headers(1);
        save_trajectory_to_csv(&trajectory, &headers, path_str, &t_mesh, &"t".to_string()).unwrap();

        let mut reader = csv::Reader::from_path(path_str).unwrap();
        let header_row = reader.headers().unwrap().clone();
        assert_eq!(header_row.len(), 7);
        assert_eq!(&header_row[0], "t");
        assert_eq!(&header_row[1], "x0");
        assert_eq!(&header_row[6], "z1");
        let rows: Vec<_> = reader.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][2], "0.1");
    }

    #[test]
    fn tsv_dump_has_one_line_per_sample_plus_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trajectory.txt");
        let path_str = path.to_str().unwrap();

        let trajectory = DMatrix::zeros(3, 6);
        let t_mesh = DVector::from_vec(vec![0.0, 0.1, 0.2]);
        let headers = node_headers(1);
        save_trajectory_to_file(&trajectory, &headers, path_str, &t_mesh, &"t".to_string())
            .unwrap();

        let contents = fs::read_to_string(path_str).unwrap();
        assert_eq!(contents.lines().count(), 4);
    }
}
