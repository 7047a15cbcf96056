mod serializer;

use self::serializer::write_yaml;
use anyhow::Result;
use chusst_pgn::ParseReport;
use std::path::PathBuf;

pub fn write_report(report: &ParseReport, path: &PathBuf) -> Result<()> {
    write_yaml(path, report)?;
    Ok(())
}
