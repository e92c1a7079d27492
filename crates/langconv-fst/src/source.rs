// Named byte-buffer loading for compiled machines.
//
// Machines are looked up by name so that the registry of compiled
// automatons can be injected: production code reads `<name>.pfst` files
// from a directory, tests supply synthetic images from memory.

use std::path::PathBuf;

use hashbrown::HashMap;

use crate::FstError;

/// Supplies compiled pFST images by machine name.
pub trait FstSource {
    /// Loads the raw bytes for the machine called `name`.
    ///
    /// A missing machine is a deployment defect
    /// ([`FstError::MachineNotFound`]), not a recoverable condition.
    fn load_bytes(&self, name: &str) -> Result<Vec<u8>, FstError>;
}

/// Loads `<dir>/<name>.pfst` from the filesystem.
#[derive(Debug, Clone)]
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl FstSource for DirSource {
    fn load_bytes(&self, name: &str) -> Result<Vec<u8>, FstError> {
        let path = self.dir.join(format!("{name}.pfst"));
        std::fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FstError::MachineNotFound {
                    name: name.to_owned(),
                }
            } else {
                FstError::Io {
                    name: name.to_owned(),
                    source: e,
                }
            }
        })
    }
}

/// In-memory machine registry.
#[derive(Debug, Default)]
pub struct MemorySource {
    machines: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.machines.insert(name.into(), bytes);
    }
}

impl FstSource for MemorySource {
    fn load_bytes(&self, name: &str) -> Result<Vec<u8>, FstError> {
        self.machines
            .get(name)
            .cloned()
            .ok_or_else(|| FstError::MachineNotFound {
                name: name.to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_roundtrip() {
        let mut source = MemorySource::new();
        source.insert("trans-xx", vec![1, 2, 3]);
        assert_eq!(source.load_bytes("trans-xx").unwrap(), [1, 2, 3]);
        assert!(matches!(
            source.load_bytes("trans-yy"),
            Err(FstError::MachineNotFound { .. })
        ));
    }

    #[test]
    fn dir_source_reports_missing_machines() {
        let source = DirSource::new(std::env::temp_dir().join("langconv-no-such-dir"));
        assert!(matches!(
            source.load_bytes("trans-xx"),
            Err(FstError::MachineNotFound { .. })
        ));
    }

    #[test]
    fn dir_source_reads_files() {
        let dir = std::env::temp_dir().join("langconv-source-test");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("trans-xx.pfst"), [9, 8, 7]).unwrap();
        let source = DirSource::new(&dir);
        assert_eq!(source.load_bytes("trans-xx").unwrap(), [9, 8, 7]);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
