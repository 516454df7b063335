use crate::model::ClinicData;
use anyhow::Context;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub trait Storage {
    /// Charge les données de la clinique depuis un support.
    fn load(&self) -> anyhow::Result<ClinicData>;
    /// Sauvegarde de manière atomique.
    fn save(&self, data: &ClinicData) -> anyhow::Result<()>;
}

pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Données vides si le fichier n'existe pas encore.
    pub fn load_or_default(&self) -> anyhow::Result<ClinicData> {
        if self.exists() {
            self.load()
        } else {
            Ok(ClinicData::default())
        }
    }
}

impl Storage for JsonStorage {
    fn load(&self) -> anyhow::Result<ClinicData> {
        let data =
            fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        let clinic: ClinicData = serde_json::from_slice(&data)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(clinic)
    }

    fn save(&self, data: &ClinicData) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(data)?;
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        Ok(())
    }
}
