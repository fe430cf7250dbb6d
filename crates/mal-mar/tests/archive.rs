use std::io::{Read, Seek, SeekFrom, Write};

use mal_langspec::{
    AssetBuilder, AssociationBuilder, AttackStepBuilder, AttackStepType, CategoryBuilder, Lang,
    LangBuilder, Multiplicity, Risk, StepExprBuilder, StepsBuilder, TtcDistribution,
    TtcExpression, VariableBuilder,
};
use mal_mar::{MarError, MarReader, MarWriter};

fn sample_builder() -> LangBuilder {
    LangBuilder::new()
        .define("id", "org.example.testlang")
        .define("version", "1.0.0")
        .category(CategoryBuilder::new("System").meta("en", "Computing things"))
        .asset(
            AssetBuilder::new("Machine", "System")
                .abstract_asset(true)
                .meta("en", "Anything that computes")
                .svg_icon(b"<svg>machine</svg>".to_vec())
                .attack_step(
                    AttackStepBuilder::new("compromise", AttackStepType::Or)
                        .tag("attacker")
                        .risk(Risk::new(true, true, false))
                        .ttc(
                            TtcExpression::function(TtcDistribution::Exponential, vec![0.1])
                                .unwrap(),
                        )
                        .requires(StepsBuilder::new(false).step(StepExprBuilder::field("network")))
                        .reaches(StepsBuilder::new(false).step(StepExprBuilder::collect(
                            StepExprBuilder::field("network"),
                            StepExprBuilder::field("hosts"),
                        ))),
                ),
        )
        .asset(
            AssetBuilder::new("Host", "System")
                .super_asset("Machine")
                .png_icon(vec![0x89, 0x50, 0x4e, 0x47])
                .variable(VariableBuilder::new(
                    "peers",
                    StepExprBuilder::collect(
                        StepExprBuilder::field("network"),
                        StepExprBuilder::field("hosts"),
                    ),
                )),
        )
        .asset(AssetBuilder::new("Network", "System"))
        .association(AssociationBuilder::new(
            "NetworkAccess",
            "Machine",
            "machines",
            Multiplicity::ZeroOrMore,
            "Network",
            "network",
            Multiplicity::ZeroOrMore,
        ))
        .association(AssociationBuilder::new(
            "HostAccess",
            "Host",
            "hosts",
            Multiplicity::ZeroOrMore,
            "Network",
            "net",
            Multiplicity::ZeroOrOne,
        ))
        .license("Apache-2.0")
        .notice("Example language for tests")
}

fn sample_lang() -> Lang {
    Lang::from_builder(&sample_builder()).unwrap()
}

fn write_to_bytes(lang: &Lang) -> Vec<u8> {
    let mut bytes = Vec::new();
    let mut writer = MarWriter::new(&mut bytes);
    writer.write(lang).unwrap();
    writer.close().unwrap();
    bytes
}

fn read_from_bytes(bytes: &[u8]) -> Result<Lang, MarError> {
    let mut reader = MarReader::new(bytes);
    let result = reader.read();
    reader.close().unwrap();
    result
}

#[test]
fn archives_round_trip_through_files() {
    let lang = sample_lang();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    let mut writer = MarWriter::new(&mut file);
    writer.write(&lang).unwrap();
    writer.close().unwrap();

    let mut reader = MarReader::new(file.reopen().unwrap());
    let reread = reader.read().unwrap();
    reader.close().unwrap();

    assert_eq!(reread.to_doc(), lang.to_doc());
    assert_eq!(reread.license(), Some("Apache-2.0"));
    assert_eq!(reread.notice(), Some("Example language for tests"));

    let machine = reread.asset(reread.asset_id("Machine").unwrap());
    let host = reread.asset(reread.asset_id("Host").unwrap());
    assert_eq!(machine.local_svg_icon(), Some(b"<svg>machine</svg>".as_slice()));
    assert_eq!(host.local_png_icon(), Some([0x89, 0x50, 0x4e, 0x47].as_slice()));
    // Host inherits Machine's SVG icon but keeps its own PNG.
    assert_eq!(host.svg_icon(&reread), Some(b"<svg>machine</svg>".as_slice()));
}

#[test]
fn rewriting_a_reread_specification_is_byte_identical() {
    let lang = sample_lang();
    let first = write_to_bytes(&lang);
    let reread = read_from_bytes(&first).unwrap();
    let second = write_to_bytes(&reread);
    assert_eq!(first, second);
}

#[test]
fn icons_and_license_can_be_skipped() {
    let bytes = write_to_bytes(&sample_lang());
    let mut reader = MarReader::new(bytes.as_slice());
    let lang = reader.read_with(false, false).unwrap();

    assert_eq!(lang.license(), None);
    assert_eq!(lang.notice(), None);
    let machine = lang.asset(lang.asset_id("Machine").unwrap());
    assert_eq!(machine.local_svg_icon(), None);
}

#[test]
fn archives_without_a_langspec_are_rejected() {
    // A structurally valid but empty zip: just an end-of-central-directory
    // record.
    let mut empty = vec![0x50, 0x4b, 0x05, 0x06];
    empty.extend_from_slice(&[0; 18]);
    let err = read_from_bytes(&empty).unwrap_err();
    assert_eq!(err.to_string(), "File \"langspec.json\" not found");
}

#[test]
fn garbage_input_is_reported_as_a_missing_langspec() {
    let err = read_from_bytes(b"this is not a zip archive").unwrap_err();
    assert_eq!(err.to_string(), "File \"langspec.json\" not found");
}

#[test]
fn unparseable_langspec_is_a_parse_error() {
    let mut bytes = write_to_bytes(&sample_lang());
    // Entries are stored uncompressed, so the JSON can be corrupted in
    // place. Breaking the first key's opening quote breaks the document.
    let needle = b"\"formatVersion\"";
    let pos = bytes
        .windows(needle.len())
        .position(|window| window == needle)
        .unwrap();
    bytes[pos] = b'x';
    let err = read_from_bytes(&bytes).unwrap_err();
    assert_eq!(err.to_string(), "Failed to parse \"langspec.json\"");
}

#[test]
fn wrong_format_version_is_a_validation_error() {
    let mut bytes = write_to_bytes(&sample_lang());
    let needle = b"\"formatVersion\": \"1.0.0\"";
    let pos = bytes
        .windows(needle.len())
        .position(|window| window == needle)
        .unwrap();
    // Same length, so the archive structure stays intact.
    bytes[pos + needle.len() - 6] = b'9';
    let err = read_from_bytes(&bytes).unwrap_err();
    assert_eq!(err.to_string(), "Failed to validate \"langspec.json\"");
}

#[test]
fn reading_twice_is_a_sequencing_error() {
    let bytes = write_to_bytes(&sample_lang());
    let mut reader = MarReader::new(bytes.as_slice());
    reader.read().unwrap();
    let err = reader.read().unwrap_err();
    assert_eq!(err.to_string(), "read method is already called");
}

#[test]
fn reading_after_close_is_a_sequencing_error() {
    let bytes = write_to_bytes(&sample_lang());
    let mut reader = MarReader::new(bytes.as_slice());
    reader.close().unwrap();
    let err = reader.read().unwrap_err();
    assert_eq!(err.to_string(), "close method is already called");
    let err = reader.close().unwrap_err();
    assert_eq!(err.to_string(), "close method is already called");
}

#[test]
fn writing_twice_is_a_sequencing_error() {
    let lang = sample_lang();
    let mut sink = Vec::new();
    let mut writer = MarWriter::new(&mut sink);
    writer.write(&lang).unwrap();
    let err = writer.write(&lang).unwrap_err();
    assert_eq!(err.to_string(), "write method is already called");

    writer.close().unwrap();
    let err = writer.close().unwrap_err();
    assert_eq!(err.to_string(), "close method is already called");
}

#[test]
fn a_failed_read_still_consumes_the_reader() {
    let mut reader = MarReader::new(b"garbage".as_slice());
    assert!(reader.read().is_err());
    let err = reader.read().unwrap_err();
    assert_eq!(err.to_string(), "read method is already called");
}

#[test]
fn archives_seek_independent_of_stream_position() {
    // Reading via a plain File after an explicit rewind, the way a caller
    // streaming from disk would.
    let lang = sample_lang();
    let mut file = tempfile::tempfile().unwrap();
    file.write_all(&write_to_bytes(&lang)).unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();

    let mut contents = Vec::new();
    file.read_to_end(&mut contents).unwrap();
    let reread = read_from_bytes(&contents).unwrap();
    assert_eq!(reread.to_doc(), lang.to_doc());
}
