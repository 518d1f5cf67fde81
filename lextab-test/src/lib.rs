//! Lookup tables generated by `build.rs` and compiled into a `no_std` crate without `alloc`.

#![no_std]

#[cfg(test)]
extern crate std;

/// HTML tag names, mapped to ids in the order of `data/tags.txt` starting with 1.
pub static TAGS: lextab::HashTable<'static, u16> = include!(concat!(env!("OUT_DIR"), "/tags.rs"));

/// Named character references without the leading `&`, mapped to their UTF-8 replacement.
pub static ENTITIES: lextab::Trie<'static, &'static [u8]> =
    include!(concat!(env!("OUT_DIR"), "/entities.rs"));

/// The same tag table, rendered as a C header.
pub const TAGS_HEADER: &str = include_str!(concat!(env!("OUT_DIR"), "/tags.h"));

/// Resolve a tag name, ignoring ASCII case.
#[inline]
#[must_use]
pub fn tag_id(name: &str) -> Option<u16> {
    TAGS.get(name).copied()
}

/// Decode the character reference at the start of `input`, which follows an `&`.
///
/// Returns the replacement and the number of bytes of `input` it consumes.
#[inline]
#[must_use]
pub fn character_reference(input: &[u8]) -> Option<(&'static [u8], usize)> {
    ENTITIES.longest_match(input).map(|m| (*m.value, m.len))
}

#[cfg(test)]
mod tests {
    use super::{character_reference, tag_id, ENTITIES, TAGS, TAGS_HEADER};
    use std::string::String;
    use std::vec::Vec;

    #[test]
    fn every_tag() {
        let names = include_str!("../data/tags.txt");
        let mut count = 0;
        for (name, id) in names.lines().zip(1u16..) {
            assert_eq!(tag_id(name), Some(id), "{name}");
            assert_eq!(tag_id(&name.to_ascii_uppercase()), Some(id), "{name}");
            count += 1;
        }
        assert_eq!(TAGS.len(), count);
        assert_eq!(tag_id("blink"), None);
        assert_eq!(tag_id(""), None);
        // `build.rs` only silences the search warning for chains of two
        assert_eq!(TAGS.max_depth(), 2);
    }

    #[test]
    fn every_entity() {
        let entities = include_str!("../data/entities.txt");
        for line in entities.lines() {
            let (name, code_points) = line.split_once(' ').unwrap();
            let expected: String = code_points
                .split(',')
                .map(|hex| char::from_u32(u32::from_str_radix(hex, 16).unwrap()).unwrap())
                .collect();
            let name = &name.as_bytes()[1..];
            assert_eq!(ENTITIES.get(name), Some(&expected.as_bytes()), "{line}");
        }
    }

    #[test]
    fn longest_reference() {
        assert_eq!(character_reference(b"amp;x"), Some((&b"&"[..], 4)));
        assert_eq!(character_reference(b"ampx"), Some((&b"&"[..], 3)));
        assert_eq!(character_reference(b"notin;"), Some(("\u{2209}".as_bytes(), 6)));
        assert_eq!(character_reference(b"notit;"), Some(("\u{ac}".as_bytes(), 3)));
        assert_eq!(character_reference(b"notinvz"), Some(("\u{ac}".as_bytes(), 3)));
        assert_eq!(character_reference(b"unknown;"), None);
    }

    #[test]
    fn header() {
        assert!(TAGS_HEADER.starts_with("typedef enum {\n    LXB_TAG_A "));
        assert!(TAGS_HEADER.contains("    LXB_TAG_FONT_FACE "));
        assert!(TAGS_HEADER.contains("#ifdef LXB_TAG_RES_SHS_DATA\n"));
        assert!(TAGS_HEADER.contains("static const lexbor_shs_entry_t lxb_tag_res_shs_data[] = \n{\n"));

        let cells: Vec<&str> = TAGS_HEADER.matches("{\"").collect();
        assert_eq!(cells.len(), TAGS.len());
    }
}
