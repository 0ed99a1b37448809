use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::twb::{WorkbookAnalyzer, WorkbookModel};

const CHUNK_SIZE: usize = 65536;

// Reads the whole workbook from the reader and returns the extracted model.
pub fn extract_workbook_model_from_reader(file: &mut impl Read) -> anyhow::Result<WorkbookModel> {
    let mut analyzer = WorkbookAnalyzer::new();

    let mut chunk: Vec<u8> = vec![0; CHUNK_SIZE];

    loop {
        let n = file.read(&mut chunk[..])?;
        if n == 0 {
            break;
        }
        analyzer.process_chunk(&chunk[..n]);
    }

    analyzer.finalize()
}

// Reads the whole workbook from disk and prints the extracted model as
// pretty-printed JSON.
pub fn print_workbook_model(file_path: &Path) -> anyhow::Result<()> {
    let mut file = File::open(file_path)?;
    let model = extract_workbook_model_from_reader(&mut file)?;
    let json = serde_json::to_string_pretty(&model)?;
    println!("{json}");
    Ok(())
}
