//! End-to-end walks over synthetic class-descriptor dumps written to disk.

use mcdwalk::serialize::{render_table, write_json};
use mcdwalk::{enumerate_roots, BufferSource, DecodedValue, DumpFile, WalkConfig};

use std::fs;
use std::path::Path;

const WALK_YAML: &str = r#"
dump: classes.bin
base_address: 0x1000
next_offset: 168
output: out/classes.json
table: [description, size, flags, Members]
bitflags:
  - path: flags
    flags:
      - { mask: 0x01, name: Registered }
  - path: Members.flags
    flags:
      - { mask: 0x01, name: SerialiseDisable }
      - { mask: 0x02, name: BlockingDisable }
      - { mask: 0x10, name: BaseClass }
      - { mask: 0x40, name: EnumWrapper }
fields:
  - { name: description, kind: string, offset: 12 }
  - { name: typeinfo name, kind: string, offset: 16 }
  - { name: extension, kind: string, offset: 8 }
  - { name: size, kind: int, offset: 28 }
  - { name: flags, kind: int, offset: 4 }
  - name: SerialisedVersionInfo
    kind: array
    offset: 164
    next_offset: -1
    fields:
      - { name: VersionCRC, kind: int, offset: 56 }
      - { name: IsBlocked, kind: bool, offset: 64 }
  - name: Members
    kind: array
    offset: 160
    next_offset: 24
    fields:
      - { name: name, kind: string, offset: 4 }
      - { name: flags, kind: int, offset: 16 }
      - { name: member_offset, kind: int, offset: 12 }
      - name: membertype
        kind: array
        offset: 8
        next_offset: -1
        fields:
          - { name: type_name, kind: string, offset: 4 }
"#;

fn put_u32(dump: &mut BufferSource, at: usize, value: u32) {
    dump.write(at, &value.to_le_bytes()).unwrap();
}

fn put_str(dump: &mut BufferSource, at: usize, text: &str) {
    dump.write(at, text.as_bytes()).unwrap();
    dump.write(at + text.len(), &[0]).unwrap();
}

/// Two class descriptors; the first has two members and a version table
fn class_dump() -> BufferSource {
    let mut dump = BufferSource::zeroed(0x4000);

    // class Foo
    put_u32(&mut dump, 0x1000 + 4, 0x1);
    put_u32(&mut dump, 0x1000 + 12, 0x3000);
    put_u32(&mut dump, 0x1000 + 16, 0x3020);
    put_u32(&mut dump, 0x1000 + 28, 0x10);
    put_u32(&mut dump, 0x1000 + 160, 0x2000);
    put_u32(&mut dump, 0x1000 + 164, 0x2800);
    put_u32(&mut dump, 0x1000 + 168, 0x1100);

    // Bar: unknown flag bit, no members, no versions, end of list
    put_u32(&mut dump, 0x1100 + 4, 0x3);
    put_u32(&mut dump, 0x1100 + 12, 0x3040);
    put_u32(&mut dump, 0x1100 + 28, 0x4);

    // Members of Foo
    put_u32(&mut dump, 0x2000 + 4, 0x3060);
    put_u32(&mut dump, 0x2000 + 8, 0x2400);
    put_u32(&mut dump, 0x2000 + 12, 0x8);
    put_u32(&mut dump, 0x2000 + 16, 0x10);
    put_u32(&mut dump, 0x2000 + 24, 0x2040);

    put_u32(&mut dump, 0x2040 + 4, 0x3070);
    put_u32(&mut dump, 0x2040 + 12, 0xC);
    put_u32(&mut dump, 0x2040 + 16, 0x3);

    // Member type descriptor
    put_u32(&mut dump, 0x2400 + 4, 0x3080);

    // Version table
    put_u32(&mut dump, 0x2800 + 56, 0xDEADBEEF);
    dump.write(0x2800 + 64, &[1]).unwrap();

    put_str(&mut dump, 0x3000, "class Foo");
    put_str(&mut dump, 0x3020, ".?AVFoo@@");
    put_str(&mut dump, 0x3040, "Bar");
    put_str(&mut dump, 0x3060, "m_Size");
    put_str(&mut dump, 0x3070, "m_Name");
    put_str(&mut dump, 0x3080, "int");

    dump
}

fn setup(dir: &Path) -> WalkConfig {
    fs::write(dir.join("classes.bin"), class_dump().as_slice()).unwrap();
    fs::write(dir.join("walk.yaml"), WALK_YAML).unwrap();
    WalkConfig::load(dir.join("walk.yaml")).unwrap()
}

#[test]
fn walks_class_descriptors_from_dump_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());
    let dump = DumpFile::open(config.dump.as_ref().unwrap()).unwrap();

    let records = enumerate_roots(&dump, &config).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].address, 0x1000);
    assert_eq!(records[1].address, 0x1100);

    let foo = &records[0].record;
    assert_eq!(foo.get("description").unwrap().to_string(), "class Foo");
    assert_eq!(foo.get("typeinfo name").unwrap().to_string(), ".?AVFoo@@");
    assert_eq!(foo.get("extension"), Some(&DecodedValue::Null));
    assert_eq!(foo.get("size").unwrap().to_string(), "0x10");
    assert_eq!(foo.get("flags").unwrap().to_string(), "Registered");

    let versions = foo.get("SerialisedVersionInfo").unwrap().as_list().unwrap();
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0].get("VersionCRC").unwrap().to_string(), "0xDEADBEEF");
    assert_eq!(versions[0].get("IsBlocked").unwrap().to_string(), "true");

    let members = foo.get("Members").unwrap().as_list().unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members[0].get("flags").unwrap().to_string(), "BaseClass");
    assert_eq!(
        members[1].get("flags").unwrap().to_string(),
        "SerialiseDisable | BlockingDisable"
    );
    let membertype = members[0].get("membertype").unwrap().as_list().unwrap();
    assert_eq!(membertype[0].get("type_name").unwrap().to_string(), "int");
    assert!(members[1]
        .get("membertype")
        .unwrap()
        .as_list()
        .unwrap()
        .is_empty());

    let bar = &records[1].record;
    assert_eq!(bar.get("flags").unwrap().to_string(), "Registered | 0x2");
    assert!(bar.get("Members").unwrap().as_list().unwrap().is_empty());
}

#[test]
fn writes_document_and_table() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());
    let dump = DumpFile::open(config.dump.as_ref().unwrap()).unwrap();
    let records = enumerate_roots(&dump, &config).unwrap();

    let output = config.output.as_ref().unwrap();
    write_json(output, &records).unwrap();

    let document: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
    assert_eq!(document[0]["Index"], 0);
    assert_eq!(document[0]["Address"], "0x00001000");
    assert_eq!(document[1]["Index"], 1);
    assert_eq!(document[0]["Data"]["Members"][1]["name"], "m_Name");
    assert_eq!(
        document[0]["Data"]["Members"][0]["membertype"][0]["type_name"],
        "int"
    );

    let table = render_table(&records, &config.table).unwrap();
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("description | size | flags"));
    assert!(lines[2].contains(
        "name=m_Size | flags=BaseClass | member_offset=0x8 | membertype=[type_name=int]"
    ));
    assert!(lines[3].contains("<empty>"));

    // Every row is padded to the header width
    let width = lines[0].chars().count();
    assert!(lines.iter().all(|line| line.chars().count() == width));
}

#[test]
fn max_records_override_limits_walk() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path()).with_max_records(1);
    let dump = DumpFile::open(config.dump.as_ref().unwrap()).unwrap();

    let records = enumerate_roots(&dump, &config).unwrap();
    assert_eq!(records.len(), 1);
}
