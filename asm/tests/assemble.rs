use asm::assemble_source;
use asm::error::Error;

fn hex(source: &str) -> String {
    assemble_source("test.S", source).unwrap()
}

fn err(source: &str) -> Error {
    assemble_source("test.S", source).unwrap_err()
}

/// Collects the data bytes of every type-00 record into 16-bit words
/// (records are little-endian).
fn words(image: &str) -> Vec<u16> {
    let mut bytes = Vec::new();
    for line in image.lines() {
        if &line[7..9] != "00" {
            continue;
        }
        let len = usize::from_str_radix(&line[1..3], 16).unwrap();
        for i in 0..len {
            let off = 9 + i * 2;
            bytes.push(u8::from_str_radix(&line[off..off + 2], 16).unwrap());
        }
    }
    bytes
        .chunks(2)
        .map(|pair| u16::from(pair[0]) | (u16::from(pair[1]) << 8))
        .collect()
}

// ----------------------------------------------------------------------------
// Golden images

#[test]
fn nop_image() {
    assert_eq!(hex("nop"), ":020000000000FE\n:00000001FF");
}

#[test]
fn ldi_is_little_endian() {
    assert_eq!(hex("ldi r16, 0xFF"), ":020000000FEF00\n:00000001FF");
    // r30 puts 0xEF in both bytes
    assert_eq!(hex("ldi r30, 0xFF"), ":02000000EFEF20\n:00000001FF");
}

#[test]
fn rjmp_forward() {
    let image = hex("rjmp start\nnop\nstart: nop");
    assert_eq!(words(&image), vec![0xC001, 0x0000, 0x0000]);
}

#[test]
fn rjmp_backward() {
    let image = hex("start: nop\nrjmp start");
    assert_eq!(words(&image), vec![0x0000, 0xCFFE]);
}

#[test]
fn lpm_forms() {
    let image = hex("lpm\nelpm\nlpm r3, Z\nlpm r3, Z+\nelpm r3, Z+");
    assert_eq!(
        words(&image),
        vec![0x95C8, 0x95D8, 0x9034, 0x9035, 0x9037]
    );
}

#[test]
fn out_to_sreg() {
    assert_eq!(words(&hex("out 0x3F, r16")), vec![0xBF0F]);
}

#[test]
fn in_from_sreg() {
    assert_eq!(words(&hex("in r16, 0x3F")), vec![0xB70F]);
}

#[test]
fn named_branch_conditions() {
    let image = hex("loop: nop\nbreq loop\nbrne loop");
    // offsets -2 and -3 against the fixed s bits
    assert_eq!(words(&image), vec![0x0000, 0xF3F1, 0xF7E9]);
}

#[test]
fn brbs_takes_flag_and_label() {
    let image = hex("loop: nop\nbrbs 2, loop");
    assert_eq!(words(&image), vec![0x0000, 0xF3F2]);
}

// ----------------------------------------------------------------------------
// Two-word instructions

#[test]
fn lds_sts_emit_two_words() {
    let image = hex("lds r16, 0x0100\nsts 0x0100, r16");
    assert_eq!(words(&image), vec![0x9100, 0x0100, 0x9300, 0x0100]);
}

#[test]
fn lds_advances_pc_by_two() {
    let image = hex("lds r16, 0x0100\nhere: rjmp here");
    // `here` lands on word 2, the branch encodes offset -1
    assert_eq!(words(&image), vec![0x9100, 0x0100, 0xCFFF]);
}

// ----------------------------------------------------------------------------
// Directives

#[test]
fn org_moves_the_record_address() {
    let image = hex(".org 0x10\nnop");
    assert_eq!(image, ":020010000000EE\n:00000001FF");
}

#[test]
fn odd_org_warns_but_assembles() {
    let image = hex(".org 3\nnop");
    assert!(image.starts_with(":02000200"));
}

#[test]
fn db_string_blob() {
    let image = hex("nop\n.db \"hi\"\nnop");
    // nop at byte 0, blob at byte 2, second nop resumes at byte 4
    assert!(image.contains(":020000000000FE"));
    assert!(image.contains(":0200020068692B"));
    assert!(image.contains(":020004000000FA"));
}

#[test]
fn odd_blob_rounds_origin_up() {
    let image = hex(".db \"abc\"\nnop");
    // 3 bytes at 0 round up to word 2, nop lands on byte 4
    assert!(image.contains(":020004000000FA"));
}

#[test]
fn db_numeric_byte() {
    let image = hex(".db 0x41");
    assert!(image.contains(":0100000041BE"));
}

#[test]
fn label_high_low() {
    let image = hex(".org 0x200\ntable: ldi r16, table(HIGH)\nldi r17, table(LOW)");
    // `table` sits at word 0x100
    assert_eq!(words(&image), vec![0xE001, 0xE010]);
}

#[test]
fn macro_expansion_advances_pc() {
    let source = "\
.macro delay
nop
nop
.endmacro
start: delay
rjmp start";
    let image = hex(source);
    assert_eq!(words(&image), vec![0x0000, 0x0000, 0xCFFD]);
}

#[test]
fn assembly_is_deterministic() {
    let source = ".org 0x20\nstart: ldi r16, 0xAA\nout 0x3F, r16\nrjmp start";
    assert_eq!(hex(source), hex(source));
}

#[test]
fn every_record_sums_to_zero() {
    let source = "\
.org 0x10
start: ldi r16, 0xFF
ldi r17, 0x0F
adiw r24, 10
out 0x3F, r16
.db \"checksum\"
rjmp start";
    for line in hex(source).lines() {
        let sum = (1..line.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&line[i..i + 2], 16).unwrap())
            .fold(0u8, |acc, byte| acc.wrapping_add(byte));
        assert_eq!(sum, 0, "record `{line}` does not sum to zero");
    }
}

// ----------------------------------------------------------------------------
// Imports

#[test]
fn import_continues_the_address() {
    let dir = std::env::temp_dir().join("avrasm-import-test");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("main.S"),
        "nop\n.import sub.S\nrjmp over\nover: nop",
    )
    .unwrap();
    std::fs::write(dir.join("sub.S"), "nop\nnop").unwrap();

    let (ctx, image) = asm::assemble(&dir.join("main.S")).unwrap();
    // main's nop at 0, sub occupies 1..=2, rjmp resumes at 3
    assert_eq!(ctx.labels.get("over"), Some(4));
    assert_eq!(
        words(&image),
        vec![0x0000, 0x0000, 0x0000, 0xC000, 0x0000]
    );
}

#[test]
fn missing_import_is_an_open_error() {
    assert!(matches!(err(".import nowhere.S"), Error::FileOpen(..)));
}

// ----------------------------------------------------------------------------
// Error paths

#[test]
fn unknown_mnemonic() {
    assert!(matches!(err("hcf"), Error::UnknownMnemonic { .. }));
}

#[test]
fn unresolved_branch_target() {
    assert!(matches!(err("rjmp nowhere"), Error::UnresolvedLabel { .. }));
}

#[test]
fn branch_out_of_range() {
    let source = ".org 0x2000\nfar: nop\n.org 0\nrjmp far";
    assert!(matches!(err(source), Error::BranchOutOfRange { .. }));
}

#[test]
fn low_register_rejected_for_immediates() {
    assert!(matches!(err("ldi r15, 1"), Error::BadOperand { .. }));
}

#[test]
fn macro_misuse() {
    assert!(matches!(err(".endmacro"), Error::Directive { .. }));
    assert!(matches!(err(".macro m\nnop"), Error::Directive { .. }));
    assert!(matches!(
        err(".macro m\nlabel: nop\n.endmacro"),
        Error::Directive { .. }
    ));
    assert!(matches!(
        err(".macro m\n.endmacro\n.macro m\n.endmacro"),
        Error::Directive { .. }
    ));
    assert!(matches!(
        err(".macro m\n.org 0\n.endmacro"),
        Error::Directive { .. }
    ));
}

#[test]
fn org_requires_an_integer() {
    assert!(matches!(err(".org xyz"), Error::Directive { .. }));
}

#[test]
fn db_numeric_must_fit_a_byte() {
    assert!(matches!(err(".db 0x1234"), Error::Directive { .. }));
}
