//! Input acquisition: turning files into [`SourceBundle`]s.
//!
//! Adapters are registered per file extension. Files without an extension
//! are sniffed with [`crate::detect`].
//!
//! # Example
//!
//! ```no_run
//! use papertex::convert::{AdapterRegistry, TextAdapter};
//! use std::sync::Arc;
//! use std::path::Path;
//!
//! fn main() -> papertex::Result<()> {
//!     let mut registry = AdapterRegistry::new();
//!     registry.register(Arc::new(TextAdapter::new()));
//!
//!     let bundle = registry.load(Path::new("paper.txt"))?;
//!     println!("{} bytes of text", bundle.raw_text.len());
//!     Ok(())
//! }
//! ```

mod bundle;
mod html;
mod text;

pub use bundle::SourceBundle;
pub use html::HtmlAdapter;
pub use text::TextAdapter;

use crate::detect::{detect_format_from_bytes, InputFormat};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Trait for input adapters.
///
/// Implement this trait to feed a new document format into the pipeline.
pub trait InputAdapter: Send + Sync {
    /// Get the supported file extensions for this adapter.
    ///
    /// Extensions should be lowercase without the leading dot (e.g., `["txt"]`).
    fn supported_extensions(&self) -> &[&str];

    /// Get the name of this adapter.
    fn name(&self) -> &str;

    /// Load a file at the given path.
    fn load(&self, path: &Path) -> Result<SourceBundle> {
        let bytes = fs::read(path)?;
        self.load_bytes(&bytes)
    }

    /// Load from bytes.
    fn load_bytes(&self, bytes: &[u8]) -> Result<SourceBundle>;

    /// Check if this adapter supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Registry for input adapters.
///
/// The registry maps file extensions to adapters and dispatches loads.
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn InputAdapter>>,
    by_name: HashMap<String, Arc<dyn InputAdapter>>,
}

impl AdapterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the built-in adapters (text, HTML).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(TextAdapter::new()));
        registry.register(Arc::new(HtmlAdapter::new()));
        registry
    }

    /// Register an adapter for all its supported extensions.
    pub fn register(&mut self, adapter: Arc<dyn InputAdapter>) {
        for ext in adapter.supported_extensions() {
            self.adapters.insert(ext.to_lowercase(), adapter.clone());
        }
        self.by_name.insert(adapter.name().to_lowercase(), adapter);
    }

    /// Get an adapter by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn InputAdapter>> {
        self.adapters.get(&ext.to_lowercase()).cloned()
    }

    /// Get an adapter by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn InputAdapter>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.adapters.contains_key(&ext.to_lowercase())
    }

    /// Get all supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.adapters.keys().map(|s| s.as_str()).collect();
        exts.sort_unstable();
        exts
    }

    /// Load a file using the adapter for its extension.
    ///
    /// Files without an extension are sniffed.
    pub fn load(&self, path: &Path) -> Result<SourceBundle> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => {
                let adapter = self.get_by_extension(ext).ok_or_else(|| {
                    Error::UnsupportedFormat(format!("no input adapter for .{}", ext))
                })?;
                log::debug!("AdapterRegistry: {} via {}", path.display(), adapter.name());
                adapter.load(path)
            }
            None => {
                let bytes = fs::read(path)?;
                self.load_sniffed(&bytes)
            }
        }
    }

    /// Load bytes using the adapter registered for `ext`.
    pub fn load_bytes(&self, bytes: &[u8], ext: &str) -> Result<SourceBundle> {
        let adapter = self
            .get_by_extension(ext)
            .ok_or_else(|| Error::UnsupportedFormat(format!("no input adapter for .{}", ext)))?;
        adapter.load_bytes(bytes)
    }

    /// Load bytes after sniffing their format.
    pub fn load_sniffed(&self, bytes: &[u8]) -> Result<SourceBundle> {
        let name = match detect_format_from_bytes(bytes)? {
            InputFormat::PlainText => "text",
            InputFormat::Html => "html",
            InputFormat::MathXml => {
                return Err(Error::UnsupportedFormat(
                    "standalone math markup (pass fragments through a math directory)".into(),
                ))
            }
        };
        let adapter = self
            .get_by_name(name)
            .ok_or_else(|| Error::InputAcquisition(format!("no {} adapter registered", name)))?;
        adapter.load_bytes(bytes)
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Load a document and, optionally, a directory of math fragments.
pub fn load<P: AsRef<Path>>(path: P, math_dir: Option<&Path>) -> Result<SourceBundle> {
    let bundle = AdapterRegistry::with_defaults().load(path.as_ref())?;
    match math_dir {
        Some(dir) => bundle.with_math_dir(dir),
        None => Ok(bundle),
    }
}

/// Load a document and its math fragments concurrently.
///
/// Both reads are joined before the bundle is returned; analysis itself
/// stays synchronous.
#[cfg(feature = "async")]
pub async fn load_async<P: AsRef<Path>>(path: P, math_dir: Option<&Path>) -> Result<SourceBundle> {
    let path = path.as_ref().to_path_buf();
    let math_dir = math_dir.map(Path::to_path_buf);

    let document = async {
        let bytes = tokio::fs::read(&path).await?;
        let registry = AdapterRegistry::with_defaults();
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => registry.load_bytes(&bytes, ext),
            None => registry.load_sniffed(&bytes),
        }
    };

    let fragments = async {
        let Some(dir) = math_dir else {
            return Ok(Vec::new());
        };
        let mut paths = Vec::new();
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_xml = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("xml"));
            if is_xml && entry.file_type().await?.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut fragments = Vec::with_capacity(paths.len());
        for path in paths {
            let bytes = tokio::fs::read(&path).await?;
            fragments.push(String::from_utf8(bytes)?);
        }
        Ok::<_, Error>(fragments)
    };

    let (bundle, fragments) = tokio::try_join!(document, fragments)?;
    Ok(bundle.with_fragments(fragments))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_with_defaults() {
        let registry = AdapterRegistry::with_defaults();
        assert!(registry.supports("txt"));
        assert!(registry.supports("HTML"));
        assert!(!registry.supports("docx"));
        assert_eq!(
            registry.supported_extensions(),
            vec!["htm", "html", "md", "text", "txt", "xhtml"]
        );
    }

    #[test]
    fn test_registry_get_by_extension() {
        let registry = AdapterRegistry::with_defaults();
        let adapter = registry.get_by_extension("htm");
        assert!(adapter.is_some());
        assert_eq!(adapter.unwrap().name(), "html");
    }

    #[test]
    fn test_registry_get_by_name() {
        let registry = AdapterRegistry::with_defaults();
        assert!(registry.get_by_name("TEXT").is_some());
        assert!(registry.get_by_name("docx").is_none());
    }

    #[test]
    fn test_unknown_extension() {
        let registry = AdapterRegistry::with_defaults();
        let result = registry.load_bytes(b"data", "docx");
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn test_load_sniffed() {
        let registry = AdapterRegistry::with_defaults();
        let bundle = registry.load_sniffed(b"<html><p>Title</p></html>").unwrap();
        assert_eq!(bundle.raw_text, "Title");
        assert!(bundle.html.is_some());

        let result = registry.load_sniffed(b"<math><mi>x</mi></math>");
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
    }
}
