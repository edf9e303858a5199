//! Tests for the resource model, codec and validation

use super::*;
use egg_shared::EGG_ROM_FORMAT;

fn add(rom: &mut Rom, tid: u8, rid: u16, serial: &[u8]) {
    let p = rom.search(tid, rid).unwrap_err();
    rom.insert(p, tid, rid).unwrap().serial = serial.to_vec();
}

fn keys(rom: &Rom) -> Vec<(u8, u16)> {
    rom.iter().map(Resource::key).collect()
}

fn payloads(rom: &Rom) -> Vec<(u8, u16, Vec<u8>)> {
    rom.iter().map(|r| (r.tid, r.rid, r.serial.clone())).collect()
}

fn assert_sorted_unique(rom: &Rom) {
    let k = keys(rom);
    assert!(k.windows(2).all(|w| w[0] < w[1]), "not sorted: {:?}", k);
}

// ============================================================================
// Search / insert
// ============================================================================

#[test]
fn test_search_empty() {
    let rom = Rom::new();
    assert_eq!(rom.search(1, 1), Err(0));
}

#[test]
fn test_search_found_and_insertion_points() {
    let mut rom = Rom::new();
    add(&mut rom, 2, 1, b"a");
    add(&mut rom, 4, 7, b"b");
    assert_eq!(rom.search(2, 1), Ok(0));
    assert_eq!(rom.search(4, 7), Ok(1));
    assert_eq!(rom.search(1, 9), Err(0));
    assert_eq!(rom.search(3, 1), Err(1));
    assert_eq!(rom.search(4, 8), Err(2));
}

#[test]
fn test_insert_rejects_misplacement() {
    let mut rom = Rom::new();
    add(&mut rom, 3, 3, b"a");
    assert!(matches!(
        rom.insert(0, 4, 1),
        Err(RomError::MisplacedInsert { index: 0, .. })
    ));
    assert!(matches!(
        rom.insert(1, 2, 1),
        Err(RomError::MisplacedInsert { index: 1, .. })
    ));
    assert!(matches!(
        rom.insert(1, 3, 3),
        Err(RomError::MisplacedInsert { .. })
    ));
    assert!(matches!(
        rom.insert(5, 9, 9),
        Err(RomError::MisplacedInsert { .. })
    ));
}

#[test]
fn test_insert_rejects_zero_ids() {
    let mut rom = Rom::new();
    assert!(matches!(rom.insert(0, 0, 1), Err(RomError::InvalidTid(0))));
    assert!(matches!(rom.insert(0, 1, 0), Err(RomError::InvalidRid(0))));
}

#[test]
fn test_insert_orders_stay_sorted() {
    let forward: Vec<(u8, u16)> = (1..=6u8)
        .flat_map(|t| (1..=6u16).map(move |r| (t, r * 100)))
        .collect();
    let reverse: Vec<(u8, u16)> = forward.iter().rev().copied().collect();
    // Deterministic shuffle: stride through the list with a step coprime to its length.
    let shuffled: Vec<(u8, u16)> = (0..forward.len())
        .map(|i| forward[(i * 17 + 5) % forward.len()])
        .collect();

    for order in [forward.clone(), reverse, shuffled] {
        let mut rom = Rom::new();
        for (tid, rid) in order {
            match rom.search(tid, rid) {
                Ok(_) => panic!("unexpected duplicate {}:{}", tid, rid),
                Err(p) => {
                    rom.insert(p, tid, rid).unwrap();
                }
            }
        }
        assert_sorted_unique(&rom);
        assert_eq!(keys(&rom), forward);
    }
}

// ============================================================================
// Codec round trip and length boundaries
// ============================================================================

#[test]
fn test_round_trip() {
    let mut rom = Rom::new();
    add(&mut rom, 1, 1, b"\0EMD");
    add(&mut rom, 2, 1, b"wasm");
    add(&mut rom, 9, 1, &[0x61, 0, 5]);
    add(&mut rom, 9, 2, &[1]);
    add(&mut rom, 9, 40000, &[2, 3]);
    add(&mut rom, 20, 3, b"custom");
    add(&mut rom, 255, 65535, b"last");
    rom.iter_mut().next().unwrap().name = Some("ignored".into());

    let decoded = Rom::decode(&rom.encode().unwrap()).unwrap();
    assert_eq!(payloads(&decoded), payloads(&rom));
    assert_eq!(decoded.resources()[0].name, None);
}

#[test]
fn test_empty_resources_not_encoded() {
    let mut rom = Rom::new();
    add(&mut rom, 3, 1, b"");
    add(&mut rom, 3, 2, b"x");
    let decoded = Rom::decode(&rom.encode().unwrap()).unwrap();
    assert_eq!(keys(&decoded), vec![(3, 2)]);
}

#[test]
fn test_short_length_boundary() {
    let mut rom = Rom::new();
    add(&mut rom, 1, 1, &vec![7u8; 16384]);
    let bytes = rom.encode().unwrap();
    assert_eq!(&bytes[4..6], &[0xbf, 0xff]);
    assert_eq!(bytes.len(), 4 + 2 + 16384 + 1);
    assert_eq!(Rom::decode(&bytes).unwrap().resources()[0].serial.len(), 16384);
}

#[test]
fn test_long_length_boundary() {
    let mut rom = Rom::new();
    add(&mut rom, 1, 1, &vec![7u8; 16385]);
    let bytes = rom.encode().unwrap();
    assert_eq!(&bytes[4..7], &[0xc0, 0x00, 0x00]);
    assert_eq!(bytes.len(), 4 + 3 + 16385 + 1);
    assert_eq!(Rom::decode(&bytes).unwrap().resources()[0].serial.len(), 16385);
}

#[test]
fn test_max_length_accepted() {
    let mut rom = Rom::new();
    add(&mut rom, 1, 1, &vec![1u8; EGG_ROM_FORMAT.max_resource_len]);
    let bytes = rom.encode().unwrap();
    assert_eq!(&bytes[4..7], &[0xff, 0xff, 0xff]);
    let decoded = Rom::decode(&bytes).unwrap();
    assert_eq!(decoded.resources()[0].serial.len(), 4_210_688);
}

#[test]
fn test_over_max_length_rejected() {
    let mut rom = Rom::new();
    add(&mut rom, 1, 1, &vec![1u8; EGG_ROM_FORMAT.max_resource_len + 1]);
    assert!(matches!(
        rom.encode(),
        Err(RomError::ResourceTooLarge { len: 4_210_689, .. })
    ));
}

// ============================================================================
// Generations
// ============================================================================

#[test]
fn test_later_rom_overrides_earlier() {
    let mut first = Rom::new();
    add(&mut first, 4, 1, b"old");
    add(&mut first, 4, 2, b"keep");
    let mut second = Rom::new();
    add(&mut second, 4, 1, b"new");

    let mut rom = Rom::new();
    rom.add_rom_serial(&first.encode().unwrap()).unwrap();
    rom.get_mut(4, 1).unwrap().name = Some("hero".into());
    rom.add_rom_serial(&second.encode().unwrap()).unwrap();

    assert_eq!(
        payloads(&rom),
        vec![(4, 1, b"new".to_vec()), (4, 2, b"keep".to_vec())]
    );
    assert_eq!(rom.get(4, 1).unwrap().name, None);
}

#[test]
fn test_duplicate_within_generation() {
    let mut rom = Rom::new();
    rom.begin_generation();
    rom.claim(5, 1).unwrap().serial = b"a".to_vec();
    assert!(matches!(
        rom.claim(5, 1),
        Err(RomError::DuplicateResource { tid: 5, rid: 1 })
    ));
    rom.begin_generation();
    rom.claim(5, 1).unwrap().serial = b"b".to_vec();
    assert_eq!(rom.get(5, 1).unwrap().serial, b"b");
}

#[test]
fn test_replace_serial_hands_back_old() {
    let mut res = Resource {
        serial: b"old".to_vec(),
        ..Default::default()
    };
    assert_eq!(res.replace_serial(b"new".to_vec()), b"old");
    assert_eq!(res.serial, b"new");
}

#[test]
fn test_language_from_decoded_strings() {
    let fr: egg_shared::LangCode = "fr".parse().unwrap();
    let mut rom = Rom::new();
    add(&mut rom, 3, fr.rid(4).unwrap(), b"salut");
    add(&mut rom, 3, 2, b"plain");
    add(&mut rom, 4, fr.rid(4).unwrap(), b"img");

    let decoded = Rom::decode(&rom.encode().unwrap()).unwrap();
    let strings = decoded.get(3, fr.rid(4).unwrap()).unwrap();
    assert_eq!(strings.lang, None);
    assert_eq!(strings.language(), Some(fr));
    assert_eq!(decoded.get(3, 2).unwrap().language(), None);
    assert_eq!(decoded.get(4, fr.rid(4).unwrap()).unwrap().language(), None);
}

// ============================================================================
// Custom types
// ============================================================================

#[test]
fn test_name_type_assigns_sequentially() {
    let mut rom = Rom::new();
    assert_eq!(rom.name_type("zebra").unwrap(), 16);
    assert_eq!(rom.name_type("apple").unwrap(), 17);
    assert_eq!(rom.name_type("zebra").unwrap(), 16);
    assert_eq!(rom.name_type("map").unwrap(), 9);
    assert_eq!(rom.type_name(17), Some("apple"));
    assert_eq!(rom.tid_by_name("apple"), Some(17));
}

#[test]
fn test_name_type_exhaustion() {
    let mut rom = Rom::new();
    for i in 0..112 {
        rom.name_type(&format!("t{:03}", i)).unwrap();
    }
    assert!(matches!(
        rom.name_type("one_too_many"),
        Err(RomError::CustomTypesExhausted(_))
    ));
}

#[test]
fn test_finalize_sorts_alphabetically() {
    let mut rom = Rom::new();
    let zebra = rom.name_type("zebra").unwrap();
    let apple = rom.name_type("apple").unwrap();
    let mango = rom.name_type("mango").unwrap();
    add(&mut rom, zebra, 1, b"z");
    add(&mut rom, apple, 1, b"a");
    add(&mut rom, mango, 2, b"m");

    assert!(rom.finalize_custom_type_order());
    assert_eq!(rom.tid_by_name("apple"), Some(16));
    assert_eq!(rom.tid_by_name("mango"), Some(17));
    assert_eq!(rom.tid_by_name("zebra"), Some(18));
    assert_eq!(
        payloads(&rom),
        vec![
            (16, 1, b"a".to_vec()),
            (17, 2, b"m".to_vec()),
            (18, 1, b"z".to_vec()),
        ]
    );
    assert_sorted_unique(&rom);

    // Second pass is a no-op.
    assert!(!rom.finalize_custom_type_order());
}

#[test]
fn test_finalize_across_batches() {
    let mut rom = Rom::new();
    let beta = rom.name_type("beta").unwrap();
    add(&mut rom, beta, 1, b"b");
    assert!(!rom.finalize_custom_type_order());

    let alpha = rom.name_type("alpha").unwrap();
    add(&mut rom, alpha, 1, b"a");
    assert!(rom.finalize_custom_type_order());
    assert_eq!(rom.tid_by_name("alpha"), Some(16));
    assert_eq!(rom.get(17, 1).unwrap().serial, b"b");
}

#[test]
fn test_finalize_skips_unnamed_custom_ids() {
    let mut rom = Rom::new();
    add(&mut rom, 16, 1, b"from rom");
    let named = rom.name_type("zz").unwrap();
    assert_eq!(named, 17);
    let earlier = rom.name_type("aa").unwrap();
    add(&mut rom, named, 1, b"z");
    add(&mut rom, earlier, 1, b"a");

    assert!(rom.finalize_custom_type_order());
    assert_eq!(rom.get(16, 1).unwrap().serial, b"from rom");
    assert_eq!(rom.tid_by_name("aa"), Some(17));
    assert_eq!(rom.tid_by_name("zz"), Some(18));
    assert_sorted_unique(&rom);
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_validate_inserts_metadata() {
    let mut rom = Rom::new();
    add(&mut rom, 4, 1, b"img");
    rom.validate().unwrap();
    assert_eq!(keys(&rom), vec![(1, 1), (4, 1)]);
    assert_eq!(rom.resources()[0].serial, EGG_ROM_FORMAT.metadata_signature);
}

#[test]
fn test_validate_keeps_existing_metadata() {
    let mut rom = Rom::new();
    add(&mut rom, 1, 1, b"\0EMDtitle");
    rom.validate().unwrap();
    assert_eq!(rom.len(), 1);
    assert_eq!(rom.resources()[0].serial, b"\0EMDtitle");
}

#[test]
fn test_validate_drops_empty() {
    let mut rom = Rom::new();
    add(&mut rom, 1, 1, b"\0EMD");
    add(&mut rom, 4, 1, b"");
    add(&mut rom, 4, 2, b"x");
    rom.validate().unwrap();
    assert_eq!(keys(&rom), vec![(1, 1), (4, 2)]);
}

#[test]
fn test_validate_singletons() {
    let mut rom = Rom::new();
    add(&mut rom, 1, 1, b"\0EMD");
    add(&mut rom, 2, 2, b"wasm");
    assert!(matches!(
        rom.validate(),
        Err(RomError::SingletonRid { name: "code", rid: 2 })
    ));
}

#[test]
fn test_validate_oversize() {
    let mut rom = Rom::new();
    add(&mut rom, 1, 1, b"\0EMD");
    add(&mut rom, 7, 1, &vec![0u8; EGG_ROM_FORMAT.max_resource_len + 1]);
    assert!(matches!(
        rom.validate(),
        Err(RomError::ResourceTooLarge { tid: 7, .. })
    ));
}
