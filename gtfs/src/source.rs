use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use zip::ZipArchive;

/// Where the raw feed files come from. GTFS is usually published as a zip, but an extracted
/// directory works too.
pub enum FeedSource {
    Dir(PathBuf),
    Zip(ZipArchive<fs_err::File>),
    Memory(BTreeMap<String, String>),
}

impl FeedSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            return Ok(Self::Dir(path.to_path_buf()));
        }
        let file = fs_err::File::open(path)?;
        let archive = ZipArchive::new(file)
            .with_context(|| format!("{} isn't a directory or a zip file", path.display()))?;
        Ok(Self::Zip(archive))
    }

    pub fn in_memory(files: Vec<(&str, &str)>) -> Self {
        Self::Memory(
            files
                .into_iter()
                .map(|(name, contents)| (name.to_string(), contents.to_string()))
                .collect(),
        )
    }

    /// A missing file is fatal
    pub fn required(&mut self, name: &str) -> Result<String> {
        match self.read(name)? {
            Some(x) => Ok(x),
            None => bail!("Missing file {name} in {}", self.describe()),
        }
    }

    pub fn optional(&mut self, name: &str) -> Result<Option<String>> {
        self.read(name)
    }

    fn read(&mut self, name: &str) -> Result<Option<String>> {
        match self {
            Self::Dir(dir) => {
                let path = dir.join(name);
                if !path.is_file() {
                    return Ok(None);
                }
                Ok(Some(fs_err::read_to_string(path)?))
            }
            Self::Zip(archive) => {
                // Some feeds put everything inside one folder
                let entry = match archive
                    .file_names()
                    .find(|x| *x == name || x.ends_with(&format!("/{name}")))
                {
                    Some(x) => x.to_string(),
                    None => return Ok(None),
                };
                let mut file = archive
                    .by_name(&entry)
                    .map_err(|err| anyhow!("{entry}: {err}"))?;
                let mut contents = String::new();
                file.read_to_string(&mut contents)
                    .with_context(|| format!("reading {entry}"))?;
                Ok(Some(contents))
            }
            Self::Memory(files) => Ok(files.get(name).cloned()),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Dir(dir) => dir.display().to_string(),
            Self::Zip(_) => "the zip archive".to_string(),
            Self::Memory(_) => "memory".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_and_optional() {
        let mut source = FeedSource::in_memory(vec![("stops.txt", "stop_id\n")]);
        assert_eq!(source.required("stops.txt").unwrap(), "stop_id\n");
        assert!(source.optional("calendar_dates.txt").unwrap().is_none());
        let err = source.required("trips.txt").unwrap_err();
        assert!(err.to_string().contains("Missing file trips.txt"));
    }

    #[test]
    fn directory() {
        let dir = std::env::temp_dir().join(format!("gtfs-source-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("routes.txt"), "route_id\nR1\n").unwrap();

        let mut source = FeedSource::open(&dir).unwrap();
        assert_eq!(source.required("routes.txt").unwrap(), "route_id\nR1\n");
        assert!(source.optional("calendar_dates.txt").unwrap().is_none());
        assert!(source.required("stops.txt").is_err());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
