//! Asset sources
//!
//! Where the loader reads the prebuilt site from.

use rust_embed::RustEmbed;
use std::borrow::Cow;
use std::io;

/// A read-only tree of files
pub trait AssetSource {
    /// Relative, `/`-separated paths of every regular file in the tree
    fn paths(&self) -> Vec<String>;

    /// Full content of one file
    fn read(&self, path: &str) -> io::Result<Cow<'static, [u8]>>;
}

/// The site compiled into the binary from `public/`
#[derive(RustEmbed)]
#[folder = "public/"]
pub struct EmbeddedAssets;

impl AssetSource for EmbeddedAssets {
    fn paths(&self) -> Vec<String> {
        Self::iter().map(Cow::into_owned).collect()
    }

    fn read(&self, path: &str) -> io::Result<Cow<'static, [u8]>> {
        Self::get(path).map(|file| file.data).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("embedded file disappeared: {path}"),
            )
        })
    }
}

/// In-memory tree, used by tests in place of the embedded site
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySource {
    files: std::collections::BTreeMap<String, Vec<u8>>,
}

#[cfg(test)]
impl MemorySource {
    pub fn with_file(mut self, path: &str, content: &[u8]) -> Self {
        self.files.insert(path.to_string(), content.to_vec());
        self
    }
}

#[cfg(test)]
impl AssetSource for MemorySource {
    fn paths(&self) -> Vec<String> {
        self.files.keys().cloned().collect()
    }

    fn read(&self, path: &str) -> io::Result<Cow<'static, [u8]>> {
        self.files
            .get(path)
            .map(|content| Cow::Owned(content.clone()))
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.to_string()))
    }
}
