//! Part-name arithmetic for OPC packages.
//!
//! Part names are stored without the leading `/` used in `[Content_Types].xml`
//! (`ppt/slides/slide1.xml`, not `/ppt/slides/slide1.xml`).

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
pub const PACKAGE_RELS_PART: &str = "_rels/.rels";
pub const PRESENTATION_PART: &str = "ppt/presentation.xml";
pub const SLIDES_DIR: &str = "ppt/slides/";
pub const MEDIA_DIR: &str = "ppt/media/";

/// A named entry of the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub name: String,
    pub data: Vec<u8>,
}

impl Part {
    pub fn new(name: &str, data: Vec<u8>) -> Self {
        Self {
            name: normalize_name(name).to_string(),
            data,
        }
    }

    pub fn extension(&self) -> Option<&str> {
        extension(&self.name)
    }
}

pub fn normalize_name(name: &str) -> &str {
    name.trim_start_matches('/')
}

/// Relationship part that belongs to `part`. The empty name stands for the
/// package itself.
pub fn rels_path_for(part: &str) -> String {
    let part = normalize_name(part);
    if part.is_empty() {
        return PACKAGE_RELS_PART.to_string();
    }
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

fn directory_of(part: &str) -> &str {
    normalize_name(part)
        .rsplit_once('/')
        .map(|(dir, _)| dir)
        .unwrap_or("")
}

/// Resolves a relationship target written relative to `source_part` into an
/// absolute part name.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    let mut segments: Vec<&str> = if target.starts_with('/') {
        Vec::new()
    } else {
        directory_of(source_part)
            .split('/')
            .filter(|s| !s.is_empty())
            .collect()
    };

    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}

/// Inverse of [`resolve_target`]: the shortest relative reference from
/// `source_part` to `target_part`.
pub fn relative_target(source_part: &str, target_part: &str) -> String {
    let from: Vec<&str> = directory_of(source_part)
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    let to: Vec<&str> = normalize_name(target_part).split('/').collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = std::iter::repeat("..").take(from.len() - common).collect();
    parts.extend(&to[common..]);
    parts.join("/")
}

pub fn extension(name: &str) -> Option<&str> {
    let file = name.rsplit('/').next().unwrap_or(name);
    file.rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}

pub fn file_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// `ppt/slides/slide12.xml` gives 12.
pub fn slide_number(name: &str) -> Option<u32> {
    normalize_name(name)
        .strip_prefix(SLIDES_DIR)?
        .strip_prefix("slide")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

pub fn slide_part_name(number: u32) -> String {
    format!("{}slide{}.xml", SLIDES_DIR, number)
}

pub fn is_media_part(name: &str) -> bool {
    normalize_name(name).starts_with(MEDIA_DIR)
}
