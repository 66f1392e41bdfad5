
use common::asm::Ins;
use common::display::{DIns, DisplayMode, DlvhWords, Half, fmt_inc_half};

use std::fmt;

use log::warn;

// One listing line: the words consumed and their reading, if any.
pub struct Disassembled {
    pub addr: u16,
    pub words: Vec<u16>,
    pub text: Option<String>,
}

impl fmt::Display for Disassembled {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:06o}:", self.addr)?;
        for word in &self.words {
            write!(f, " {:06o}", word)?;
        }
        match &self.text {
            Some(text) => write!(f, "\t{}", text),
            None => write!(f, "\t?"),
        }
    }
}

// Main processor listing. Every instruction is one word; the address is
// needed because memory-reference operands are page relative.
pub fn disassemble(words: &[u16], base: u16) -> Vec<Disassembled> {
    words
        .iter()
        .enumerate()
        .map(|(i, &word)| {
            let addr = base.wrapping_add(i as u16);
            Disassembled{
                addr,
                words: vec![word],
                text: Ins::decode(word).map(|ins| ins.display_with_pc(addr).to_string()),
            }
        })
        .collect()
}

// Display listing. Increment-mode context renders each word as its two
// halves; otherwise words decode as display-list instructions, with long
// vectors consuming their two data words.
pub fn disassemble_display(words: &[u16], base: u16, mode: DisplayMode) -> Vec<Disassembled> {
    if mode.is_increment() {
        return disassemble_increment(words, base);
    }

    let mut out = vec![];
    let mut idx = 0;
    while idx < words.len() {
        let addr = base.wrapping_add(idx as u16);
        let ins = DIns::decode(words[idx]);
        let size = ins.size() as usize;

        if size > 1 && idx + size > words.len() {
            warn!("long vector at 0o{:o} truncated by end of input", addr);
        }

        if size > 1 && idx + size <= words.len() {
            let dlvh = DlvhWords{w1: words[idx + 1], w2: words[idx + 2]};
            out.push(Disassembled{
                addr,
                words: words[idx..idx + size].to_vec(),
                text: Some(long_vector_text(&dlvh)),
            });
            idx += size;
        } else {
            out.push(Disassembled{
                addr,
                words: vec![words[idx]],
                text: Some(ins.to_string()),
            });
            idx += 1;
        }
    }

    out
}

fn disassemble_increment(words: &[u16], base: u16) -> Vec<Disassembled> {
    words
        .iter()
        .enumerate()
        .map(|(i, &word)| Disassembled{
            addr: base.wrapping_add(i as u16),
            words: vec![word],
            text: Some(format!(
                "inc {}; {}",
                fmt_inc_half(Half::First.of(word)),
                fmt_inc_half(Half::Second.of(word)),
            )),
        })
        .collect()
}

fn long_vector_text(words: &DlvhWords) -> String {
    let beam = if !words.beam_on() {
        "dark"
    } else if words.dotted() {
        "dot"
    } else {
        "beam"
    };
    format!(
        "dlvh {} m 0o{:o} n 0o{:o}{}{}{}",
        beam,
        words.m(),
        words.n(),
        if words.dy_greater() { " ymaj" } else { "" },
        if words.neg_x() { " -x" } else { "" },
        if words.neg_y() { " -y" } else { "" },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_main_instructions() {
        let out = disassemble(&[0o004777, 0o161004, 0o000100], 0o1000);
        assert_eq!(out[0].text.as_deref(), Some("law\t0o777"));
        assert_eq!(out[1].text.as_deref(), Some("lac\t@0o1004"));
        assert_eq!(out[2].text, None);
    }

    #[test]
    fn operands_resolve_against_their_own_page() {
        // The same word reads differently on different pages.
        let out = disassemble(&[0o061004], 0o5000);
        assert_eq!(out[0].text.as_deref(), Some("lac\t0o5004"));
    }

    #[test]
    fn listing_lines_are_octal() {
        let out = disassemble(&[0o004777], 0o100);
        assert_eq!(out[0].to_string(), "000100: 004777\tlaw\t0o777");
    }

    #[test]
    fn display_listing_consumes_long_vectors() {
        let out = disassemble_display(
            &[0o010100, 0o060000, 0o020030, 0o010010, 0o000000],
            0o2000,
            DisplayMode::Processor,
        );
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].text.as_deref(), Some("dlxa\t0o200"));
        assert_eq!(out[1].words, vec![0o060000, 0o020030, 0o010010]);
        assert_eq!(out[1].text.as_deref(), Some("dlvh beam m 0o30 n 0o10 -x"));
        assert_eq!(out[2].addr, 0o2004);
    }

    #[test]
    fn truncated_long_vector_lists_one_word() {
        let out = disassemble_display(&[0o060000], 0o2000, DisplayMode::Processor);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].words, vec![0o060000]);
        assert_eq!(out[0].text.as_deref(), Some("dlvh"));
    }

    #[test]
    fn increment_context_renders_halves() {
        let out = disassemble_display(&[0o144100], 0o3000, DisplayMode::Increment);
        assert_eq!(out[0].text.as_deref(), Some("inc b(+1,+0); esc"));
    }
}
