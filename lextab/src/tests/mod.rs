use super::hash::{LegacyHasher, SeededHasher, SlotHasher};
use super::render::{self, ConstantBlock, Expr, StaticArray};
use super::search::{choose_table_size, survey};
use super::trie::{Step, ROOT};
use super::{Config, Error, HashTable, KeyValueSet, OverflowPlacement, Trie, Warning};
use alloc::string::ToString;
use alloc::vec::Vec;
use core::ops::Range;


fn tags() -> KeyValueSet<u16> {
    KeyValueSet::from_entries([("a", 1), ("b", 2), ("ab", 3)]).unwrap()
}

fn entities() -> KeyValueSet<u16> {
    KeyValueSet::from_entries([("amp", 1), ("ampersand", 2), ("and", 3)]).unwrap()
}

#[test]
fn legacy_hash() {
    // 97 * 97 * 97 + 1 = 912674
    assert_eq!(LegacyHasher.slot(b"a", 3, true), 912674 % 3 + 1);
    assert_eq!(LegacyHasher.slot(b"A", 3, true), LegacyHasher.slot(b"a", 3, true));
    assert_eq!(LegacyHasher.slot(b"A", 1000, false), 65 * 65 * 65 % 1000 + 2);
    assert_eq!(LegacyHasher.slot(b"", 7, true), 1);
}

#[test]
fn seeded_hash_folds_case() {
    let hasher = SeededHasher::default();
    let long = "Content-Security-Policy-Report-Only-With-A-Long-Tail";
    assert_eq!(
        hasher.slot(long.as_bytes(), 97, true),
        hasher.slot(long.to_ascii_lowercase().as_bytes(), 97, true),
    );
    for size in 1..50 {
        let slot = hasher.slot(b"div", size, false);
        assert!((1..=size).contains(&slot), "slot {slot} out of range");
    }
}

#[test]
fn small_window() {
    let set = tags();
    let config = Config::default().with_search_window(2..5);
    let compilation = HashTable::compile(&set, &config).unwrap();
    let table = &compilation.table;

    // Size 2 puts "a" and "ab" together, size 3 separates everything
    assert_eq!(table.table_size(), 3);
    assert_eq!(table.max_depth(), 1);
    assert_eq!(compilation.report.used, 3);
    assert!(compilation.warnings.is_empty(), "{:?}", compilation.warnings);

    assert_eq!(table.get("a"), Some(&1));
    assert_eq!(table.get("b"), Some(&2));
    assert_eq!(table.get("ab"), Some(&3));
    assert_eq!(table.get("c"), None);
    assert_eq!(table.len(), 3);
}

#[test]
fn duplicate_keys() {
    assert_eq!(
        KeyValueSet::from_entries([("x", 1), ("x", 2)]).unwrap_err(),
        Error::DuplicateKey { key: "x".into() },
    );

    let mut set = KeyValueSet::new();
    set.insert("x", 1).unwrap();
    assert!(set.insert("x", 2).is_err(), "duplicate accepted");
    assert_eq!(set.get("x"), Some(&1));
}

#[test]
fn folded_duplicates() {
    let set = KeyValueSet::from_entries([("Div", 1), ("div", 2)]).unwrap();
    assert_eq!(
        HashTable::compile(&set, &Config::default()).unwrap_err(),
        Error::DuplicateKey { key: "div".into() },
    );

    let config = Config::default().with_case_folding(false);
    let table = HashTable::compile(&set, &config).unwrap().table;
    assert_eq!(table.get("Div"), Some(&1));
    assert_eq!(table.get("div"), Some(&2));
    assert_eq!(table.get("DIV"), None);
}

#[test]
fn case_insensitive_lookup() {
    let set = tags();
    let table = HashTable::compile(&set, &Config::default()).unwrap().table;
    assert_eq!(table.get("AB"), Some(&3));
    assert_eq!(table.get_key_value("aB"), Some(("ab", &3)));
    assert!(table.contains_key("B"));
    assert!(!table.contains_key("abc"));
}

#[test]
fn empty_input() {
    let set = KeyValueSet::<u16>::new();
    let compilation = HashTable::compile(&set, &Config::default()).unwrap();
    assert_eq!(compilation.warnings, [Warning::EmptyInput]);
    assert_eq!(compilation.table.cells().len(), 1);
    assert!(compilation.table.is_empty());
    assert_eq!(compilation.table.get("a"), None);
    assert_eq!(compilation.table.probe_depth("a"), 0);
}

#[test]
fn empty_window() {
    let set = tags();
    for window in [0..5, 5..5, Range { start: 7, end: 3 }] {
        let config = Config::default().with_search_window(window.clone());
        assert_eq!(
            HashTable::compile(&set, &config).unwrap_err(),
            Error::EmptySearchWindow {
                start: window.start,
                end: window.end,
            },
        );
    }
}

#[test]
fn search_exhausted() {
    let set = tags();
    let config = Config::default().with_search_window(1..2);
    let compilation = HashTable::compile(&set, &config).unwrap();
    assert_eq!(
        compilation.warnings,
        [Warning::SearchExhausted {
            window: 1..2,
            table_size: 1,
            max_depth: 3,
        }],
    );

    // Still a valid table
    let table = &compilation.table;
    assert_eq!(table.get("a"), Some(&1));
    assert_eq!(table.get("b"), Some(&2));
    assert_eq!(table.get("ab"), Some(&3));
    assert_eq!(table.probe_depth("ab"), 3);
}

#[test]
fn chains_sorted_by_length() {
    // At size 1, everything shares a bucket
    let set = KeyValueSet::from_entries([("abc", 1), ("a", 2), ("ab", 3), ("b", 4)]).unwrap();
    let config = Config::default().with_search_window(1..2);
    let table = HashTable::compile(&set, &config).unwrap().table;

    let mut chain = Vec::new();
    let mut index = 1;
    while index != 0 {
        let cell = &table.cells()[index];
        chain.push(cell.key().unwrap());
        index = cell.next();
    }
    // Equal lengths keep insertion order
    assert_eq!(chain, ["a", "b", "ab", "abc"]);

    // Lookups stop at the first longer key
    assert_eq!(table.probe_depth("c"), 3);
}

#[test]
fn sentinel_stores_table_size() {
    let set = tags();
    let config = Config::default().with_search_window(2..5);
    let table = HashTable::compile(&set, &config).unwrap().table;
    let sentinel = &table.cells()[0];
    assert!(sentinel.is_empty());
    assert_eq!(sentinel.key_len(), table.table_size());
    assert_eq!(sentinel.next(), 0);
}

#[test]
fn overflow_placement() {
    // At size 4, "ab" and "aba" collide in slot 1 and slots 2 to 4 are unused
    let set = KeyValueSet::from_entries([("ab", 1), ("aba", 2)]).unwrap();
    let config = Config::default().with_search_window(4..5);

    let appended = HashTable::compile(&set, &config).unwrap().table;
    assert_eq!(appended.cells().len(), 6);
    assert_eq!(appended.cells()[1].next(), 5);
    assert_eq!(appended.cells()[5].key(), Some("aba"));

    let config = config.with_overflow(OverflowPlacement::ReuseVacant);
    let reused = HashTable::compile(&set, &config).unwrap().table;
    assert_eq!(reused.cells().len(), 5);
    assert_eq!(reused.cells()[1].next(), 2);
    assert_eq!(reused.cells()[2].key(), Some("aba"));

    for table in [&appended, &reused] {
        assert_eq!(table.get("ab"), Some(&1));
        assert_eq!(table.get("aba"), Some(&2));
        assert_eq!(table.get("abba"), None);
    }
}

#[test]
fn seeded_table() {
    let set = entities();
    let compilation =
        HashTable::compile_with(SeededHasher::default(), &set, &Config::default()).unwrap();
    for entry in &set {
        assert_eq!(compilation.table.get(entry.key()), Some(entry.value()));
    }
    assert_eq!(compilation.table.get("amps"), None);
}

#[test]
fn deterministic() {
    let set = entities();
    let config = Config::default();
    let a = HashTable::compile(&set, &config).unwrap().table;
    let b = HashTable::compile(&set, &config).unwrap().table;
    assert_eq!(a.cells(), b.cells());
    assert_eq!(
        a.iter().collect::<Vec<_>>(),
        b.iter().collect::<Vec<_>>(),
    );

    let a = Trie::compile(&set, &config).unwrap();
    let b = Trie::compile(&set, &config).unwrap();
    assert_eq!(a.nodes(), b.nodes());
}

#[test]
fn survey_order() {
    let set = tags();
    let keys = || set.keys().map(str::as_bytes);
    let reports = survey(&LegacyHasher, keys(), 2..5, true);
    let sizes: Vec<usize> = reports.iter().map(|report| report.table_size).collect();
    assert_eq!(sizes, [3, 4, 2]);
    assert_eq!(
        choose_table_size(&LegacyHasher, keys(), 2..5, true),
        reports.first().copied(),
    );
    assert_eq!(choose_table_size(&LegacyHasher, keys(), 5..5, true), None);
    assert_eq!(reports[2].to_string(), "max depth 2; used 2 of 2");
}

#[test]
fn trie_lookup() {
    let set = entities();
    let trie = Trie::compile(&set, &Config::default()).unwrap();

    assert_eq!(trie.get(b"amp"), Some(&1));
    assert_eq!(trie.get(b"ampersand"), Some(&2));
    assert_eq!(trie.get(b"and"), Some(&3));
    assert_eq!(trie.get(b"am"), None);
    assert_eq!(trie.get(b"ampe"), None);
    assert_eq!(trie.get(b""), None);

    let mut matcher = trie.matcher();
    assert_eq!(matcher.push(b'a'), Step::Partial);
    assert_eq!(matcher.push(b'm'), Step::Partial);
    assert!(matcher.can_continue());
    assert_eq!(matcher.best(), None);
    assert_eq!(matcher.push(b'p'), Step::Matched(&1));
    assert_eq!(matcher.consumed(), 3);

    matcher.reset();
    assert_eq!(matcher.push(b'x'), Step::Rejected);
    assert!(!matcher.can_continue());
    assert_eq!(matcher.push(b'a'), Step::Rejected);
}

#[test]
fn trie_layout() {
    let set = entities();
    let trie = Trie::compile(&set, &Config::default()).unwrap();
    let nodes = trie.nodes();

    let sentinel = &nodes[0];
    assert_eq!(
        (sentinel.byte(), sentinel.left(), sentinel.right(), sentinel.next()),
        (0, 0, 0, 0),
    );
    assert!(!sentinel.is_terminal());

    assert_eq!(nodes[ROOT].byte(), b'a');
    assert_eq!(nodes[ROOT].next(), 2);
    // The second layer is [m, n], bisected at n
    assert_eq!(nodes[2].byte(), b'n');
    assert_eq!(nodes[2].left(), 3);
    assert_eq!(nodes[2].right(), 0);
    assert_eq!(nodes[3].byte(), b'm');
    // "n" is reached first, so its layer comes first
    assert_eq!(nodes[2].next(), 4);
    assert_eq!(nodes[4].byte(), b'd');
    assert_eq!(nodes[3].next(), 5);
    assert_eq!(nodes[5].byte(), b'p');

    // One node per distinct prefix, plus the sentinel
    assert_eq!(nodes.len(), 1 + "ampersand".len() + "nd".len());
}

#[test]
fn trie_bisection() {
    let set = KeyValueSet::from_entries([("a", 1), ("b", 2), ("c", 3), ("d", 4), ("e", 5)]).unwrap();
    let trie = Trie::compile(&set, &Config::default()).unwrap();
    let layout: Vec<(u8, usize, usize)> = trie.nodes()[1..]
        .iter()
        .map(|node| (node.byte(), node.left(), node.right()))
        .collect();
    // Right children are reserved before left ones, left spines are laid out first
    assert_eq!(
        layout,
        [
            (b'c', 3, 2),
            (b'e', 5, 0),
            (b'b', 4, 0),
            (b'a', 0, 0),
            (b'd', 0, 0),
        ],
    );
    for (byte, value) in (b'a'..=b'e').zip(1..) {
        assert_eq!(trie.find(ROOT, byte).map(|(_, node)| node.value()), Some(Some(&value)));
    }
    assert!(trie.find(ROOT, b'f').is_none());
}

#[test]
fn longest_match() {
    let set = KeyValueSet::from_entries([("not", 1), ("notin", 2), ("notinva", 3)]).unwrap();
    let trie = Trie::compile(&set, &Config::default()).unwrap();
    let longest = |input: &[u8]| trie.longest_match(input).map(|m| (*m.value, m.len));

    assert_eq!(longest(b"notin;"), Some((2, 5)));
    assert_eq!(longest(b"notit"), Some((1, 3)));
    assert_eq!(longest(b"notinv"), Some((2, 5)));
    assert_eq!(longest(b"notinva"), Some((3, 7)));
    assert_eq!(longest(b"no"), None);
    assert_eq!(longest(b""), None);
}

#[test]
fn trie_skip() {
    let set = KeyValueSet::from_entries([("&amp;", 1), ("&amp", 2), ("&lt;", 3)]).unwrap();
    let config = Config::default().with_trie_skip(1);
    let trie = Trie::compile(&set, &config).unwrap();
    assert_eq!(trie.get(b"amp;"), Some(&1));
    assert_eq!(trie.get(b"amp"), Some(&2));
    assert_eq!(trie.get(b"&amp"), None);
    assert_eq!(trie.nodes()[ROOT].byte(), b'l');

    let set = KeyValueSet::from_entries([("&a", 1), ("&", 2)]).unwrap();
    assert_eq!(
        Trie::compile(&set, &config).unwrap_err(),
        Error::NameTooShort {
            name: "&".into(),
            skip: 1,
        },
    );

    let set = KeyValueSet::from_entries([("&a", 1), ("#a", 2)]).unwrap();
    assert_eq!(
        Trie::compile(&set, &config).unwrap_err(),
        Error::DuplicateKey { key: "#a".into() },
    );
}

#[test]
fn empty_trie() {
    let set = KeyValueSet::<u16>::new();
    let trie = Trie::compile(&set, &Config::default()).unwrap();
    assert!(trie.is_empty());
    assert_eq!(trie.nodes().len(), 1);
    assert_eq!(trie.get(b"a"), None);
    assert_eq!(trie.longest_match(b"a"), None);
}

#[test]
fn render_hash_table() {
    let set = tags();
    let config = Config::default().with_search_window(2..5);
    let table = HashTable::compile(&set, &config).unwrap().table;
    let text = render::hash_table(&table, "shs_t", "tags", &config).to_string();
    assert_eq!(
        text,
        "static const shs_t tags[] = \n{\n    \
         {NULL, 0, 3, 0}, {\"b\", 2, 1, 0},\n    \
         {\"ab\", 3, 2, 0}, {\"a\", 1, 1, 0}\n};",
    );
    assert_eq!(
        render::hash_table(&table, "shs_t", "tags", &config).to_string(),
        text,
    );
}

#[test]
fn render_unusual_keys() {
    let set = KeyValueSet::from_entries([("a\"b", Expr::new("QUOTE"))]).unwrap();
    let config = Config::default().with_search_window(1..2).with_line_rate(1);
    let table = HashTable::compile(&set, &config).unwrap().table;
    let text = render::hash_table(&table, "shs_t", "odd", &config).to_string();
    assert!(
        text.contains(r#"{"\x61\x22\x62", QUOTE, 3, 0}"#),
        "unexpected output: {text}"
    );
}

#[test]
fn render_trie() {
    let set = KeyValueSet::from_entries([("lt", "<")]).unwrap();
    let config = Config::default();
    let trie = Trie::compile(&set, &config).unwrap();
    let text = render::trie(&trie, "sbst_t", "ents", &config).to_string();
    assert_eq!(
        text,
        "static const sbst_t ents[] = \n{\n    \
         {0x00, NULL, 0, 0, 0, 0}, {0x6c, NULL, 0, 0, 0, 2},\n    \
         {0x74, \"\\x3c\", 1, 0, 0, 0}\n};",
    );
}

#[test]
fn static_array_guard() {
    let mut array = StaticArray::new("int", "data").with_guard(true).with_size("4");
    array.push(1);
    assert_eq!(
        array.to_string(),
        "#ifdef DATA\n#ifndef DATA_ENABLED\n#define DATA_ENABLED\n\
         static const int data[4] = \n{\n    1\n};\n\
         #endif /* DATA_ENABLED */\n#endif /* DATA */",
    );
}

#[test]
fn static_array_rate() {
    let mut array = StaticArray::new("int", "data").with_rate(3);
    for i in 0..7 {
        array.push(i);
    }
    assert_eq!(
        array.to_string(),
        "static const int data[] = \n{\n    0, 1, 2,\n    3, 4, 5,\n    6\n};",
    );
}

#[test]
fn constant_block() {
    let config = Config::default().with_name_prefix("LXB_TAG_");
    let mut block = ConstantBlock::with_config("lxb_tag_id_t", &config);
    assert!(block.is_empty());
    assert_eq!(block.to_string(), "");

    block.push(render::constant_name("a"), "0x0001");
    block.push_raw("    /* headings */");
    block.push(render::constant_name("font-face"), "0x0002");
    assert_eq!(
        block.to_string(),
        "typedef enum {\n    \
         LXB_TAG_A         = 0x0001,\n    \
         /* headings */\n    \
         LXB_TAG_FONT_FACE = 0x0002\n\
         }\n\
         lxb_tag_id_t;",
    );
}

#[test]
fn constant_names() {
    assert_eq!(render::constant_name("h1"), "H1");
    assert_eq!(render::constant_name("font-face"), "FONT_FACE");
    assert_eq!(render::constant_name("xml:lang"), "XML_LANG");
    assert_eq!(render::constant_name("_private"), "_PRIVATE");
}

#[cfg(feature = "codegen")]
#[test]
fn codegen_is_deterministic() {
    use super::codegen::CodeGenerator;

    let set = entities();
    let table = HashTable::compile(&set, &Config::default()).unwrap().table;
    let a = CodeGenerator::new().generate(&table).to_string();
    let b = CodeGenerator::new().generate(&table).to_string();
    assert_eq!(a, b);
    assert!(a.contains("__HashTable"), "{a}");
    assert!(a.contains("\"ampersand\""), "{a}");

    let trie = Trie::compile(&set, &Config::default()).unwrap();
    let code = CodeGenerator::new().generate(&trie).to_string();
    assert!(code.contains("__TrieNode"), "{code}");
}

#[test]
fn config_defaults() {
    let config = Config::default();
    assert_eq!(config.search_window(), 5..128);
    assert_eq!(config.name_prefix(), "");
    assert!(config.case_folding());
    assert_eq!(config.overflow(), OverflowPlacement::Append);
    assert_eq!(config.trie_skip(), 0);
    assert_eq!(config.with_line_rate(0).line_rate(), 1);
}
