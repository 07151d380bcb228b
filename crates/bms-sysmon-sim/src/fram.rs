//! FRAM emulated by a JSON image file on the host.

use bms_sysmon::{FramBlockId, FramError, FramResult, FramStore, ViolationRecord};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// On-disk layout of the image: one optional entry per block.
#[derive(Debug, Default, Serialize, Deserialize)]
struct FramImage {
    #[serde(default)]
    sys_mon_record: Option<ViolationRecord>,
}

#[derive(Debug, Clone)]
pub struct JsonFileFram {
    path: PathBuf,
}

impl JsonFileFram {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self, block: FramBlockId) -> FramResult<FramImage> {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|err| FramError::read_failed(block, err.to_string())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(FramImage::default()),
            Err(err) => Err(FramError::read_failed(block, err.to_string())),
        }
    }
}

impl FramStore for JsonFileFram {
    fn write(&mut self, block: FramBlockId, record: &ViolationRecord) -> FramResult<()> {
        let mut image = self.load(block)?;
        match block {
            FramBlockId::SysMonRecord => image.sys_mon_record = Some(*record),
            _ => return Err(FramError::write_failed(block, "block not present in image")),
        }

        let bytes = serde_json::to_vec_pretty(&image)
            .map_err(|err| FramError::write_failed(block, err.to_string()))?;
        fs::write(&self.path, bytes).map_err(|err| FramError::write_failed(block, err.to_string()))
    }

    fn read(&mut self, block: FramBlockId) -> FramResult<ViolationRecord> {
        let image = self.load(block)?;
        match block {
            FramBlockId::SysMonRecord => image.sys_mon_record.ok_or(FramError::BlockEmpty(block)),
            _ => Err(FramError::read_failed(block, "block not present in image")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bms_sysmon::TaskId;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_missing_image_reads_as_empty_block() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut fram = JsonFileFram::new(dir.path().join("fram.json"));
        let result = fram.read(FramBlockId::SysMonRecord);
        assert!(matches!(result, Err(FramError::BlockEmpty(_))));
        Ok(())
    }

    #[test]
    fn test_record_persists_across_instances() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("fram.json");
        let mut record = ViolationRecord::new();
        record.record_violation(TaskId::Cyclic10ms, 1234, 56);

        JsonFileFram::new(&path).write(FramBlockId::SysMonRecord, &record)?;
        let restored = JsonFileFram::new(&path).read(FramBlockId::SysMonRecord)?;
        assert_eq!(restored, record);
        Ok(())
    }

    #[test]
    fn test_corrupt_image_is_read_failure() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("fram.json");
        fs::write(&path, b"not json")?;

        let result = JsonFileFram::new(&path).read(FramBlockId::SysMonRecord);
        assert!(matches!(result, Err(FramError::ReadFailed { .. })));
        Ok(())
    }
}
