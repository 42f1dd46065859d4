use super::content_types::ContentTypeRegistry;
use super::parts::{normalize_name, rels_path_for, Part, CONTENT_TYPES_PART};
use super::relationships::RelationshipTable;
use crate::error::{DeckError, Result};
use crate::xml::{builder, parser, XmlDocument};
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use tracing::debug;
use zip::read::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

/// An opened presentation container.
///
/// Entries keep their archive order; new entries are appended. Once
/// [`Package::save`] succeeds the package is spent and every further
/// mutation or save fails with [`DeckError::InvalidState`].
#[derive(Debug, Clone, Default)]
pub struct Package {
    parts: Vec<Part>,
    index: HashMap<String, usize>,
    consumed: bool,
}

impl Package {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let package = Self::from_bytes(&bytes)?;
        debug!(path = %path.display(), parts = package.parts.len(), "opened package");
        Ok(package)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| DeckError::malformed(format!("not a readable ZIP archive: {}", e)))?;

        let mut package = Self::new();
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| DeckError::malformed(format!("unreadable archive entry {}: {}", i, e)))?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            // The declared size is untrusted; let the reader grow the buffer.
            let mut content = Vec::new();
            file.read_to_end(&mut content)
                .map_err(|e| DeckError::malformed(format!("truncated entry '{}': {}", name, e)))?;
            package.insert_part(Part::new(&name, content));
        }

        Ok(package)
    }

    fn ensure_live(&self) -> Result<()> {
        if self.consumed {
            return Err(DeckError::InvalidState {
                message: "package was already saved".to_string(),
            });
        }
        Ok(())
    }

    fn insert_part(&mut self, part: Part) {
        match self.index.get(&part.name) {
            Some(&pos) => self.parts[pos] = part,
            None => {
                self.index.insert(part.name.clone(), self.parts.len());
                self.parts.push(part);
            }
        }
    }

    fn reindex(&mut self) {
        self.index = self
            .parts
            .iter()
            .enumerate()
            .map(|(pos, part)| (part.name.clone(), pos))
            .collect();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(normalize_name(name))
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.index
            .get(normalize_name(name))
            .map(|&pos| self.parts[pos].data.as_slice())
    }

    pub fn read(&self, name: &str) -> Result<&[u8]> {
        self.get(name).ok_or_else(|| DeckError::MissingPart {
            part_path: normalize_name(name).to_string(),
        })
    }

    pub fn write(&mut self, name: &str, bytes: Vec<u8>) -> Result<()> {
        self.ensure_live()?;
        self.insert_part(Part::new(name, bytes));
        Ok(())
    }

    /// Returns whether the part existed.
    pub fn delete(&mut self, name: &str) -> Result<bool> {
        self.ensure_live()?;
        let Some(pos) = self.index.get(normalize_name(name)).copied() else {
            return Ok(false);
        };
        self.parts.remove(pos);
        self.reindex();
        Ok(true)
    }

    pub fn list(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn read_xml(&self, name: &str) -> Result<XmlDocument> {
        parser::parse_bytes(self.read(name)?)
    }

    pub fn write_xml(&mut self, name: &str, doc: &XmlDocument) -> Result<()> {
        let bytes = builder::serialize_bytes(doc)?;
        self.write(name, bytes)
    }

    /// Relationships owned by `part` (the empty name selects the package
    /// relationships). A part without a relationship part has none.
    pub fn relationships(&self, part: &str) -> Result<RelationshipTable> {
        match self.get(&rels_path_for(part)) {
            Some(bytes) => RelationshipTable::parse(bytes),
            None => Ok(RelationshipTable::new()),
        }
    }

    pub fn write_relationships(&mut self, part: &str, table: &RelationshipTable) -> Result<()> {
        let bytes = table.to_xml()?;
        self.write(&rels_path_for(part), bytes)
    }

    pub fn content_types(&self) -> Result<ContentTypeRegistry> {
        ContentTypeRegistry::parse(self.read(CONTENT_TYPES_PART)?)
    }

    pub fn write_content_types(&mut self, registry: &ContentTypeRegistry) -> Result<()> {
        let bytes = registry.to_xml()?;
        self.write(CONTENT_TYPES_PART, bytes)
    }

    pub fn content_type_of(&self, name: &str) -> Result<Option<String>> {
        Ok(self.content_types()?.resolve(name).map(str::to_string))
    }

    /// Serializes the archive with `[Content_Types].xml` as the first entry.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.ensure_live()?;

        let mut buffer = Cursor::new(Vec::new());
        let mut writer = ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let ordered = self
            .parts
            .iter()
            .filter(|p| p.name == CONTENT_TYPES_PART)
            .chain(self.parts.iter().filter(|p| p.name != CONTENT_TYPES_PART));

        for part in ordered {
            writer.start_file(part.name.as_str(), options)?;
            writer.write_all(&part.data)?;
        }

        writer.finish()?;
        Ok(buffer.into_inner())
    }

    /// Writes the archive to a temporary file next to `path` and renames it
    /// over the target.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        temp.write_all(&bytes)?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| DeckError::Io(e.error))?;

        self.consumed = true;
        debug!(path = %path.display(), bytes = bytes.len(), "saved package");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Package {
        let mut pkg = Package::new();
        pkg.write("ppt/presentation.xml", b"<p/>".to_vec()).unwrap();
        pkg.write(CONTENT_TYPES_PART, b"<Types/>".to_vec()).unwrap();
        pkg.write("ppt/media/image1.png", vec![1, 2, 3]).unwrap();
        pkg
    }

    #[test]
    fn round_trip_preserves_entries() {
        let pkg = sample();
        let loaded = Package::from_bytes(&pkg.to_bytes().unwrap()).unwrap();

        assert_eq!(loaded.read("ppt/media/image1.png").unwrap(), &[1, 2, 3]);
        assert_eq!(loaded.len(), 3);
    }

    #[test]
    fn content_types_entry_is_written_first() {
        let pkg = sample();
        let loaded = Package::from_bytes(&pkg.to_bytes().unwrap()).unwrap();

        let names: Vec<_> = loaded.list().collect();
        assert_eq!(
            names,
            vec![CONTENT_TYPES_PART, "ppt/presentation.xml", "ppt/media/image1.png"]
        );
    }

    #[test]
    fn delete_keeps_remaining_order() {
        let mut pkg = sample();
        assert!(pkg.delete("/ppt/presentation.xml").unwrap());
        assert!(!pkg.delete("ppt/presentation.xml").unwrap());
        pkg.write("ppt/slides/slide1.xml", Vec::new()).unwrap();

        let names: Vec<_> = pkg.list().collect();
        assert_eq!(
            names,
            vec![CONTENT_TYPES_PART, "ppt/media/image1.png", "ppt/slides/slide1.xml"]
        );
        assert!(pkg.contains("ppt/slides/slide1.xml"));
    }

    #[test]
    fn missing_part_is_reported() {
        let err = sample().read("ppt/slides/slide9.xml").unwrap_err();
        assert!(matches!(err, DeckError::MissingPart { .. }));
    }

    #[test]
    fn garbage_bytes_are_malformed() {
        let err = Package::from_bytes(b"definitely not a zip").unwrap_err();
        assert!(matches!(err, DeckError::MalformedPackage { .. }));
    }

    #[test]
    fn package_is_spent_after_save() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.pptx");
        let mut pkg = sample();

        pkg.save(&target).unwrap();

        assert!(target.exists());
        assert!(matches!(
            pkg.write("x.xml", Vec::new()).unwrap_err(),
            DeckError::InvalidState { .. }
        ));
        assert!(matches!(
            pkg.save(&target).unwrap_err(),
            DeckError::InvalidState { .. }
        ));
        assert_eq!(Package::open(&target).unwrap().len(), 3);
    }
}
