//! Compilation of catalogs into the binary GNU MO format.
//!
//! The layout follows the gettext manual: a 28-byte header, two tables of
//! (length, offset) pairs sorted by original string, then NUL-terminated
//! string data. No hash table is emitted; readers fall back to binary
//! search over the sorted originals.

use std::path::Path;

use anyhow::Result;

use crate::catalog::{Catalog, Entry};
use crate::fs;

const MAGIC: u32 = 0x9504_12de;
const REVISION: u32 = 0;
const HEADER_LEN: u32 = 28;

/// Compiles a catalog into MO bytes.
///
/// The metadata entry and every entry carrying a translation are emitted;
/// untranslated entries are omitted.
pub fn compile(catalog: &Catalog) -> Vec<u8> {
    let mut pairs: Vec<(Vec<u8>, Vec<u8>)> = Vec::new();
    if let Some(header) = &catalog.header {
        pairs.push((encode_key(header), encode_value(header)));
    }
    for entry in catalog.entries.iter().filter(|e| e.is_translated()) {
        pairs.push((encode_key(entry), encode_value(entry)));
    }
    pairs.sort();

    let count = pairs.len() as u32;
    let originals_offset = HEADER_LEN;
    let translations_offset = originals_offset + 8 * count;
    let data_offset = translations_offset + 8 * count;

    let mut originals = Vec::with_capacity(pairs.len());
    let mut translations = Vec::with_capacity(pairs.len());
    let mut data: Vec<u8> = Vec::new();
    for (key, _) in &pairs {
        originals.push((key.len() as u32, data_offset + data.len() as u32));
        data.extend_from_slice(key);
        data.push(0);
    }
    for (_, value) in &pairs {
        translations.push((value.len() as u32, data_offset + data.len() as u32));
        data.extend_from_slice(value);
        data.push(0);
    }

    let mut out = Vec::with_capacity(data_offset as usize + data.len());
    for word in [
        MAGIC,
        REVISION,
        count,
        originals_offset,
        translations_offset,
        0, // hash table size
        data_offset,
    ] {
        out.extend_from_slice(&word.to_le_bytes());
    }
    for (len, offset) in originals.into_iter().chain(translations) {
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&offset.to_le_bytes());
    }
    out.extend_from_slice(&data);
    out
}

/// Compiles and atomically writes a catalog as an MO file.
pub fn write_file(catalog: &Catalog, path: &Path) -> Result<()> {
    fs::atomic_write(path, compile(catalog))
}

/// `context EOT msgid`, with ` NUL msgid_plural` appended for plural
/// entries.
fn encode_key(entry: &Entry) -> Vec<u8> {
    let mut key = Vec::new();
    if let Some(context) = &entry.context {
        key.extend_from_slice(context.as_bytes());
        key.push(0x04);
    }
    key.extend_from_slice(entry.original.as_bytes());
    if let Some(plural) = &entry.plural {
        key.push(0);
        key.extend_from_slice(plural.as_bytes());
    }
    key
}

/// The translation, with plural forms NUL-joined.
fn encode_value(entry: &Entry) -> Vec<u8> {
    let mut value = Vec::from(entry.translation.as_deref().unwrap_or("").as_bytes());
    for plural in &entry.plural_translations {
        value.push(0);
        value.extend_from_slice(plural.as_bytes());
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_u32(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    fn read_string(bytes: &[u8], table: usize, index: usize) -> Vec<u8> {
        let len = read_u32(bytes, table + 8 * index) as usize;
        let offset = read_u32(bytes, table + 8 * index + 4) as usize;
        assert_eq!(bytes[offset + len], 0, "strings must be NUL-terminated");
        bytes[offset..offset + len].to_vec()
    }

    fn decode(bytes: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)> {
        assert_eq!(read_u32(bytes, 0), 0x9504_12de);
        assert_eq!(read_u32(bytes, 4), 0);
        let count = read_u32(bytes, 8) as usize;
        let originals = read_u32(bytes, 12) as usize;
        let translations = read_u32(bytes, 16) as usize;
        (0..count)
            .map(|i| {
                (
                    read_string(bytes, originals, i),
                    read_string(bytes, translations, i),
                )
            })
            .collect()
    }

    fn translated(original: &str, translation: &str) -> Entry {
        let mut entry = Entry::new(original);
        entry.translation = Some(translation.to_string());
        entry
    }

    #[test]
    fn test_compile_emits_header_and_translated_entries() {
        let mut header = Entry::new("");
        header.translation = Some("Content-Type: text/plain; charset=UTF-8\n".to_string());
        let mut catalog = Catalog::from_entries(vec![
            translated("Hello", "Ahoj"),
            Entry::new("Untranslated"),
        ]);
        catalog.header = Some(header);

        let pairs = decode(&compile(&catalog));
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0, b"");
        assert_eq!(
            pairs[0].1,
            b"Content-Type: text/plain; charset=UTF-8\n".to_vec()
        );
        assert_eq!(pairs[1].0, b"Hello".to_vec());
        assert_eq!(pairs[1].1, b"Ahoj".to_vec());
    }

    #[test]
    fn test_compile_sorts_keys_bytewise() {
        let catalog = Catalog::from_entries(vec![
            translated("zebra", "zebra-cs"),
            translated("Apple", "jablko"),
        ]);

        let keys: Vec<_> = decode(&compile(&catalog)).into_iter().map(|p| p.0).collect();
        assert_eq!(keys, vec![b"Apple".to_vec(), b"zebra".to_vec()]);
    }

    #[test]
    fn test_compile_encodes_context_and_plurals() {
        let mut with_context = translated("Open", "Otevřít");
        with_context.context = Some("menu".to_string());

        let mut plural = translated("%d file", "%d soubor");
        plural.plural = Some("%d files".to_string());
        plural.plural_translations = vec!["%d soubory".to_string(), "%d souborů".to_string()];

        let pairs = decode(&compile(&Catalog::from_entries(vec![with_context, plural])));
        assert_eq!(pairs[0].0, b"%d file\x00%d files".to_vec());
        assert_eq!(
            pairs[0].1,
            "%d soubor\x00%d soubory\x00%d souborů".as_bytes().to_vec()
        );
        assert_eq!(pairs[1].0, b"menu\x04Open".to_vec());
        assert_eq!(pairs[1].1, "Otevřít".as_bytes().to_vec());
    }

    #[test]
    fn test_compile_empty_catalog() {
        let bytes = compile(&Catalog::default());
        assert_eq!(bytes.len(), 28);
        assert_eq!(decode(&bytes), vec![]);
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.mo");

        write_file(
            &Catalog::from_entries(vec![translated("Hello", "Ahoj")]),
            &path,
        )
        .unwrap();

        let pairs = decode(&std::fs::read(&path).unwrap());
        assert_eq!(pairs, vec![(b"Hello".to_vec(), b"Ahoj".to_vec())]);
    }
}
