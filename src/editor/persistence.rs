use std::path::Path;

use crate::element::PageTree;

use super::PageEditor;

pub const PAGE_SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug)]
pub enum PagePersistenceError {
    UnsupportedVersion { found: u32, expected: u32 },
    RonSerialize(ron::Error),
    RonDeserialize(ron::error::SpannedError),
    Io(std::io::Error),
}

impl std::fmt::Display for PagePersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedVersion { found, expected } => {
                write!(
                    f,
                    "unsupported page snapshot version: {found} (expected {expected})"
                )
            }
            Self::RonSerialize(err) => write!(f, "ron serialize error: {err}"),
            Self::RonDeserialize(err) => write!(f, "ron deserialize error: {err}"),
            Self::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for PagePersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UnsupportedVersion { .. } => None,
            Self::RonSerialize(err) => Some(err),
            Self::RonDeserialize(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for PagePersistenceError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ron::Error> for PagePersistenceError {
    fn from(err: ron::Error) -> Self {
        Self::RonSerialize(err)
    }
}

impl From<ron::error::SpannedError> for PagePersistenceError {
    fn from(err: ron::error::SpannedError) -> Self {
        Self::RonDeserialize(err)
    }
}

/// A versioned snapshot of one page: the element tree plus the id
/// allocator's serial, so restored editors keep minting fresh ids.
///
/// Snapshots serialize with plain serde, so any JSON-compatible transport
/// works; the file helpers below use RON.
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct PageSnapshot {
    pub version: u32,
    pub tree: PageTree,
    pub next_element_serial: u64,
}

impl PageSnapshot {
    pub fn new(tree: PageTree, next_element_serial: u64) -> Self {
        Self {
            version: PAGE_SNAPSHOT_VERSION,
            tree,
            next_element_serial,
        }
    }

    pub fn to_ron_string(&self) -> Result<String, PagePersistenceError> {
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        Ok(text)
    }

    pub fn from_ron_str(text: &str) -> Result<Self, PagePersistenceError> {
        let snapshot: Self = ron::from_str(text)?;
        if snapshot.version != PAGE_SNAPSHOT_VERSION {
            return Err(PagePersistenceError::UnsupportedVersion {
                found: snapshot.version,
                expected: PAGE_SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), PagePersistenceError> {
        let text = self.to_ron_string()?;
        std::fs::write(path, text)?;
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self, PagePersistenceError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron_str(&text)
    }
}

impl PageEditor {
    /// Capture the current page for persistence. Ephemeral state
    /// (selection, drag session, history) is intentionally not part of a
    /// snapshot.
    pub fn snapshot(&self) -> PageSnapshot {
        PageSnapshot::new(self.tree.clone(), self.ids.next_serial())
    }

    /// Restore a previously captured page. As with any page load,
    /// ephemeral state is reset.
    pub fn restore(&mut self, snapshot: PageSnapshot) {
        self.set_tree(snapshot.tree);
        self.ids = crate::element::ElementIdAllocator::from_serial(snapshot.next_element_serial);
    }
}
