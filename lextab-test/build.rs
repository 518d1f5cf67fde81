use lextab::codegen::CodeGenerator;
use lextab::render::{self, ConstantBlock};
use lextab::{Config, HashTable, KeyValueSet, Trie, Warning};
use std::path::{Path, PathBuf};

fn main() {
    println!("cargo::rerun-if-changed=build.rs");
    println!("cargo::rerun-if-changed=data");

    let manifest_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap());
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());

    tags(&manifest_dir.join("data/tags.txt"), &out_dir);
    entities(&manifest_dir.join("data/entities.txt"), &out_dir);
}

fn tags(source: &Path, out_dir: &Path) {
    let text = std::fs::read_to_string(source).expect("Failed to read tag names");
    let tags = KeyValueSet::from_entries(text.lines().zip(1u16..)).expect("Invalid tag names");

    let config = Config::default()
        .with_search_window(128..1024)
        .with_name_prefix("LXB_TAG_");
    let compilation = HashTable::compile(&tags, &config).expect("Failed to compile tag table");
    // No size separates every tag name under the legacy hash, so chains of two are expected
    for warning in &compilation.warnings {
        if !matches!(warning, Warning::SearchExhausted { max_depth: 2, .. }) {
            println!("cargo::warning={warning}");
        }
    }

    let code = CodeGenerator::new().generate(&compilation.table);
    std::fs::write(out_dir.join("tags.rs"), code.to_string()).unwrap();

    let mut ids = ConstantBlock::with_config("lxb_tag_id_t", &config);
    for entry in &tags {
        ids.push(render::constant_name(entry.key()), format_args!("0x{:04x}", entry.value()));
    }
    let cells = render::hash_table(
        &compilation.table,
        "lexbor_shs_entry_t",
        "lxb_tag_res_shs_data",
        &config,
    )
    .with_guard(true);
    std::fs::write(out_dir.join("tags.h"), format!("{ids}\n\n{cells}\n")).unwrap();
}

fn entities(source: &Path, out_dir: &Path) {
    let text = std::fs::read_to_string(source).expect("Failed to read entities");
    let replacements: Vec<(&str, String)> = text
        .lines()
        .map(|line| {
            let (name, code_points) = line.split_once(' ').expect("Missing replacement");
            let replacement = code_points
                .split(',')
                .map(|hex| {
                    let code_point = u32::from_str_radix(hex, 16).expect("Invalid code point");
                    char::from_u32(code_point).expect("Invalid code point")
                })
                .collect();
            (name, replacement)
        })
        .collect();
    let entities = KeyValueSet::from_entries(
        replacements
            .iter()
            .map(|(name, replacement)| (*name, replacement.as_bytes())),
    )
    .expect("Duplicate entity");

    // The tokenizer consumes `&` before consulting the trie
    let config = Config::default().with_trie_skip(1);
    let trie = Trie::compile(&entities, &config).expect("Failed to compile entity trie");

    let code = CodeGenerator::new().generate(&trie);
    std::fs::write(out_dir.join("entities.rs"), code.to_string()).unwrap();
}
