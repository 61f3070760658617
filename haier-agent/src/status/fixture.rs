use super::*;
use std::path::Path;

/// Replays pre-recorded status snapshots for virtual devices.
///
/// Each device has a `<device id>.json` file in the fixture directory with
/// the snapshot under its `data` field.
#[derive(Debug, Clone)]
pub struct FixtureSource {
    dir: PathBuf,
}

impl FixtureSource {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, device_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", device_id))
    }

    fn read(&self, path: &Path) -> Result<StatusMap, FetchError> {
        let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FetchError::FixtureNotFound(path.to_path_buf()),
            _ => FetchError::MalformedFixture {
                path:   path.to_path_buf(),
                reason: e.to_string(),
            },
        })?;
        let doc: Value =
            serde_json::from_str(&contents).map_err(|e| FetchError::MalformedFixture {
                path:   path.to_path_buf(),
                reason: e.to_string(),
            })?;
        data_field(doc).ok_or_else(|| FetchError::MalformedFixture {
            path:   path.to_path_buf(),
            reason: "no 'data' object".into(),
        })
    }
}

#[async_trait]
impl StatusSource for FixtureSource {
    async fn fetch(&self, device_id: &str) -> Result<StatusMap, FetchError> {
        let path = self.path_for(device_id);
        trace!("Reading virtual device snapshot {}", path.display());
        self.read(&path)
    }
}
