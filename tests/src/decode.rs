use common::asm::{Ins, MemRefOpcode};
use common::display::DIns;

#[test]
fn opcode_gaps_do_not_decode() {
    for word in [0o000100, 0o014000, 0o040123] {
        assert!(Ins::decode(word).is_none(), "0o{word:06o}");
    }
}

#[test]
fn classes_win_over_memory_reference() {
    assert!(matches!(Ins::decode(0o100030), Some(Ins::Opr(_))));
    assert!(matches!(Ins::decode(0o003021), Some(Ins::Shift(_))));
    assert!(matches!(Ins::decode(0o102001), Some(Ins::Skip(_))));
    assert!(matches!(Ins::decode(0o001061), Some(Ins::Iot(_))));
    assert!(matches!(Ins::decode(0o061004), Some(Ins::MemRef(_))));
}

#[test]
fn law_with_defer_is_load_complement() {
    match Ins::decode(0o104012) {
        Some(Ins::MemRef(mr)) => {
            assert_eq!(mr.op, MemRefOpcode::Lwc);
            assert!(!mr.indirect);
            assert_eq!(mr.operand, 0o12);
        }
        other => panic!("decoded {other:?}"),
    }
}

#[test]
fn canonical_operate_names() {
    let cases = [
        (0o000000, "hlt"),
        (0o100000, "nop"),
        (0o100011, "cal"),
        (0o100030, "stl"),
        (0o100006, "cia"),
        (0o100041, "lda"),
    ];
    for (word, name) in cases {
        let ins = Ins::decode(word).unwrap();
        assert_eq!(ins.display_with_pc(0).to_string(), name, "0o{word:06o}");
    }
}

#[test]
fn composed_operate_words_spell_their_bits() {
    let ins = Ins::decode(0o100021).unwrap();
    assert_eq!(ins.display_with_pc(0).to_string(), "cla cml");

    let ins = Ins::decode(0o000024).unwrap();
    assert_eq!(ins.display_with_pc(0).to_string(), "cml iac hlt");
}

#[test]
fn shift_and_skip_names() {
    let cases = [
        (0o003001, "ral1"),
        (0o003021, "rar1"),
        (0o003062, "sar2"),
        (0o003100, "don"),
        (0o003102, "ral2 don"),
        (0o002001, "asz"),
        (0o102001, "asn"),
        (0o002005, "asz lsz"),
        (0o002000, "skp 0o002000"),
    ];
    for (word, name) in cases {
        let ins = Ins::decode(word).unwrap();
        assert_eq!(ins.display_with_pc(0).to_string(), name, "0o{word:06o}");
    }
}

#[test]
fn memory_reference_resolves_in_page() {
    let ins = Ins::decode(0o061004).unwrap();
    assert_eq!(ins.display_with_pc(0o14321).to_string(), "lac\t0o15004");
}

#[test]
fn iot_mnemonics() {
    let cases = [
        (0o001003, "dla"),
        (0o001072, "don"),
        (0o001023, "krc"),
        (0o001043, "tpc"),
        (0o001061, "hon"),
        (0o001777, "iot 0o777"),
    ];
    for (word, name) in cases {
        let ins = Ins::decode(word).unwrap();
        assert_eq!(ins.display_with_pc(0).to_string(), name, "0o{word:06o}");
    }
}

#[test]
fn display_decode_is_total() {
    // Every top octal digit classifies; only long vectors take three words.
    for word in 0..=0o177777u16 {
        let ins = DIns::decode(word);
        let expect = if (word >> 12) & 0o7 == 6 { 3 } else { 1 };
        assert_eq!(ins.size(), expect, "0o{word:06o}");
    }
}
