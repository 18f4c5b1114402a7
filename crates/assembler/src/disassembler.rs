//! Disassembler: bytecode → canonical assembly text.
//!
//! Output format: a `.version` line, then one instruction per line.
//! Function bodies are indented two spaces per nesting level. Names that
//! would not survive re-tokenizing as a bare word are quoted.

use std::fmt::Write as _;

use nvm_common::{DecodeError, Instruction, Program};

/// Disassemble a full buffer into canonical assembly text.
pub fn disassemble(bytes: &[u8]) -> Result<String, DecodeError> {
    let program = Program::decode(bytes)?;
    let version = program.version();
    let mut out = format!(
        ".version {} {} {}\n",
        version.major, version.minor, version.patch
    );
    let mut depth = 0usize;

    for item in program.instructions() {
        let (_, instr) = item?;
        if matches!(instr, Instruction::FnEnd) {
            depth = depth.saturating_sub(1);
        }
        for _ in 0..depth {
            out.push_str("  ");
        }
        write_instruction(&mut out, &instr);
        out.push('\n');
        if matches!(instr, Instruction::FnStart(_)) {
            depth += 1;
        }
    }

    Ok(out)
}

fn write_instruction(out: &mut String, instr: &Instruction<'_>) {
    out.push_str(instr.opcode().mnemonic());
    match instr {
        Instruction::LoadConst(n) => {
            let _ = write!(out, " {n}");
        }
        _ => {
            if let Some(name) = instr.name() {
                out.push(' ');
                write_name(out, name);
            }
        }
    }
}

/// Bare if the lexer would read it back as the same word, quoted otherwise.
fn write_name(out: &mut String, name: &str) {
    if is_bare(name) {
        out.push_str(name);
        return;
    }
    out.push('"');
    for c in name.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c if c.is_whitespace() || c.is_control() => {
                let _ = write!(out, "\\u{{{:x}}}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

fn is_bare(name: &str) -> bool {
    let Some(first) = name.chars().next() else {
        return false;
    };
    !(first.is_ascii_digit() || first == '-' || first == '.' || first == '"')
        && !name
            .chars()
            .any(|c| c == ';' || c == '"' || c == '\\' || c.is_whitespace() || c.is_control())
}
