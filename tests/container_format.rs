use assetbin::assets::{
    checksum, decode_header, decode_table, encode, extract_payload, merge, verify, Container,
    DecodeOptions, EncodeOptions, Entry, EntrySet, FailureReason, VerifyOptions, HEADER_LEN,
    MAX_NAME_LEN, TABLE_ENTRY_LEN,
};

fn set_of(entries: Vec<Entry>) -> EntrySet {
    entries.into_iter().collect()
}

#[test]
fn two_clip_scenario_matches_layout() -> Result<(), Box<dyn std::error::Error>> {
    let set = set_of(vec![
        Entry::new("x/1.opus", vec![0x11; 10]),
        Entry::new("x/2.opus", vec![0x22; 20]),
    ]);
    let enc = encode(set.iter(), EncodeOptions::default())?;
    let header = decode_header(&enc.bytes)?;

    assert_eq!(header.entry_count, 2);
    let table_len = 2 * TABLE_ENTRY_LEN;
    let region = &enc.bytes[HEADER_LEN + table_len..];
    assert_eq!(region.len(), 10 + 2 + 20 + 2);

    let table_bytes = &enc.bytes[HEADER_LEN..HEADER_LEN + table_len];
    let expected = (table_bytes.iter().map(|&b| u64::from(b)).sum::<u64>()
        + region.iter().map(|&b| u64::from(b)).sum::<u64>())
        % 65536;
    assert_eq!(u64::from(header.checksum), expected);
    assert_eq!(header.body_length as usize, table_len + region.len());
    Ok(())
}

#[test]
fn round_trip_preserves_every_payload() -> Result<(), Box<dyn std::error::Error>> {
    let mut entries = Vec::new();
    for i in 0..40u32 {
        let ext = ["opus", "bin", "png", "json"][(i % 4) as usize];
        let payload: Vec<u8> = (0..(i * 7 + 1)).map(|b| (b * 31 + i) as u8).collect();
        entries.push(Entry::new(format!("dir{}/item_{i:02}.{ext}", i % 3), payload));
    }
    let set = set_of(entries);
    let enc = encode(set.iter(), EncodeOptions::default())?;
    assert!(enc.warnings.is_empty());

    let c = Container::parse(&enc.bytes)?;
    assert_eq!(c.entries().len(), set.len());
    for e in set.iter() {
        assert_eq!(c.payload_by_name(&e.name)?, Some(e.payload.as_slice()), "{}", e.name);
    }
    Ok(())
}

#[test]
fn name_of_exactly_47_bytes_round_trips() -> Result<(), Box<dyn std::error::Error>> {
    let exact = format!("{}.opus", "n".repeat(MAX_NAME_LEN - 5));
    assert_eq!(exact.len(), 47);
    let too_long = format!("{}.opus", "m".repeat(MAX_NAME_LEN - 4));
    assert_eq!(too_long.len(), 48);

    let set = set_of(vec![
        Entry::new(exact.clone(), b"fits".to_vec()),
        Entry::new(too_long.clone(), b"cut".to_vec()),
    ]);
    let enc = encode(set.iter(), EncodeOptions::default())?;
    assert_eq!(enc.warnings.len(), 1);
    assert_eq!(enc.warnings[0].original, too_long);

    let c = Container::parse(&enc.bytes)?;
    assert_eq!(c.payload_by_name(&exact)?, Some(&b"fits"[..]));
    assert_eq!(c.payload_by_name(&too_long)?, None);
    assert_eq!(c.payload_by_name(&too_long[..MAX_NAME_LEN])?, Some(&b"cut"[..]));
    Ok(())
}

#[test]
fn decoder_reads_foreign_table_order() -> Result<(), Box<dyn std::error::Error>> {
    // Hand-built container: entries in reverse name order, as an older tool might emit.
    let payloads: [(&str, &[u8]); 2] = [("z.opus", b"zz"), ("a.opus", b"aaa")];
    let mut table = Vec::new();
    let mut region = Vec::new();
    for (name, data) in payloads {
        let mut field = [0u8; 48];
        field[..name.len()].copy_from_slice(name.as_bytes());
        table.extend_from_slice(&field);
        table.extend_from_slice(&(data.len() as u32).to_le_bytes());
        table.extend_from_slice(&(region.len() as u32).to_le_bytes());
        table.extend_from_slice(&[0, 0, 0, 0]);
        region.extend_from_slice(&[0x5A, 0x5A]);
        region.extend_from_slice(data);
    }
    let mut body = table;
    body.extend_from_slice(&region);
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&2u32.to_le_bytes());
    bytes.extend_from_slice(&checksum(&body).to_le_bytes());
    bytes.extend_from_slice(&(body.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&body);

    let header = decode_header(&bytes)?;
    let table = decode_table(&bytes, &header)?;
    assert_eq!(table[0].name, "z.opus");
    assert_eq!(
        extract_payload(&bytes, &header, &table[1], DecodeOptions { check_marker: true })?,
        b"aaa"
    );
    assert!(verify(&bytes, VerifyOptions { check_marker: true }).ok);
    Ok(())
}

#[test]
fn merge_isolates_the_replaced_category() -> Result<(), Box<dyn std::error::Error>> {
    let old = set_of(vec![
        Entry::new("a.opus", b"a-old".to_vec()),
        Entry::new("b.font", b"b".to_vec()),
        Entry::new("c.opus", b"c-old".to_vec()),
    ]);
    let old_bytes = encode(old.iter(), EncodeOptions::default())?.bytes;
    let fresh = set_of(vec![
        Entry::new("a.opus", b"a-new".to_vec()),
        Entry::new("d.opus", b"d".to_vec()),
    ]);

    let merged = merge(
        Some(old_bytes.as_slice()),
        fresh,
        |n| n.ends_with(".opus"),
        EncodeOptions::default(),
    )?;
    let c = Container::parse(&merged.encoded.bytes)?;
    let mut names: Vec<String> = c.entries().iter().map(|e| e.name.clone()).collect();
    names.sort();
    assert_eq!(names, vec!["a.opus", "b.font", "d.opus"]);
    assert_eq!(c.payload_by_name("a.opus")?, Some(&b"a-new"[..]));
    assert!(verify(&merged.encoded.bytes, VerifyOptions::default()).ok);
    Ok(())
}

#[test]
fn verify_is_stable_across_calls() {
    let garbage: Vec<u8> = (0..500u32).map(|i| (i * 13) as u8).collect();
    let first = verify(&garbage, VerifyOptions::default());
    let second = verify(&garbage, VerifyOptions::default());
    assert_eq!(first, second);
    assert!(!first.ok);

    let short = verify(&garbage[..10], VerifyOptions::default());
    assert_eq!(short.reason, Some(FailureReason::Structural));
}
