//! Single-instruction vectors in the `SingleStepTests` JSON layout.
//!
//! Each case seeds registers and RAM, executes exactly one instruction and
//! compares every register, the touched RAM and the T-state count. The
//! `cycles` field is the expected T-state total rather than a bus trace.

use emu_core::{Cpu, SimpleBus};
use serde::Deserialize;
use zilog_z80::{RegisterPair, Z80};

/// JSON test case format.
#[derive(Deserialize)]
struct TestCase {
    name: String,
    initial: CpuState,
    #[serde(rename = "final")]
    final_state: CpuState,
    cycles: u32,
}

/// JSON CPU state format. Omitted fields are zero.
#[derive(Deserialize, Default)]
#[serde(default)]
struct CpuState {
    pc: u16,
    sp: u16,
    a: u8,
    b: u8,
    c: u8,
    d: u8,
    e: u8,
    f: u8,
    h: u8,
    l: u8,
    i: u8,
    r: u8,
    ix: u16,
    iy: u16,
    #[serde(rename = "af_")]
    af_alt: u16,
    #[serde(rename = "bc_")]
    bc_alt: u16,
    #[serde(rename = "de_")]
    de_alt: u16,
    #[serde(rename = "hl_")]
    hl_alt: u16,
    iff1: u8,
    iff2: u8,
    im: u8,
    ram: Vec<(u16, u8)>,
}

const VECTORS: &str = r#"[
    {
        "name": "00 refresh wraps",
        "initial": { "pc": 256, "r": 255 },
        "final": { "pc": 257, "r": 128 },
        "cycles": 4
    },
    {
        "name": "04 inc b overflow",
        "initial": { "pc": 0, "b": 127, "f": 1, "ram": [[0, 4]] },
        "final": { "pc": 1, "b": 128, "f": 149, "r": 1, "ram": [[0, 4]] },
        "cycles": 4
    },
    {
        "name": "05 dec b overflow",
        "initial": { "pc": 0, "b": 128, "ram": [[0, 5]] },
        "final": { "pc": 1, "b": 127, "f": 62, "r": 1, "ram": [[0, 5]] },
        "cycles": 4
    },
    {
        "name": "09 add hl,bc half carry",
        "initial": { "pc": 0, "h": 15, "l": 255, "c": 1, "f": 196, "ram": [[0, 9]] },
        "final": { "pc": 1, "h": 16, "l": 0, "c": 1, "f": 212, "r": 1, "ram": [[0, 9]] },
        "cycles": 11
    },
    {
        "name": "10 djnz taken backwards",
        "initial": { "pc": 512, "b": 2, "ram": [[512, 16], [513, 252]] },
        "final": { "pc": 510, "b": 1, "r": 1, "ram": [[512, 16], [513, 252]] },
        "cycles": 13
    },
    {
        "name": "10 djnz falls through",
        "initial": { "pc": 512, "b": 1, "ram": [[512, 16], [513, 252]] },
        "final": { "pc": 514, "b": 0, "r": 1 },
        "cycles": 8
    },
    {
        "name": "27 daa after bcd add",
        "initial": { "pc": 0, "a": 60, "ram": [[0, 39]] },
        "final": { "pc": 1, "a": 66, "f": 20, "r": 1 },
        "cycles": 4
    },
    {
        "name": "cb 7e bit 7,(hl)",
        "initial": { "pc": 0, "h": 40, "l": 16, "f": 1, "ram": [[0, 203], [1, 126], [10256, 128]] },
        "final": { "pc": 2, "h": 40, "l": 16, "f": 185, "r": 2, "ram": [[10256, 128]] },
        "cycles": 12
    },
    {
        "name": "dd 7e ld a,(ix+5)",
        "initial": { "pc": 0, "ix": 16384, "ram": [[0, 221], [1, 126], [2, 5], [16389, 153]] },
        "final": { "pc": 3, "ix": 16384, "a": 153, "r": 2 },
        "cycles": 19
    },
    {
        "name": "fd 35 dec (iy-1)",
        "initial": { "pc": 0, "iy": 16384, "f": 1, "ram": [[0, 253], [1, 53], [2, 255], [16383, 1]] },
        "final": { "pc": 3, "iy": 16384, "f": 67, "r": 2, "ram": [[16383, 0]] },
        "cycles": 23
    },
    {
        "name": "ed b0 ldir repeats",
        "initial": {
            "pc": 256, "h": 32, "d": 48, "c": 2,
            "ram": [[256, 237], [257, 176], [8192, 85]]
        },
        "final": {
            "pc": 256, "h": 32, "l": 1, "d": 48, "e": 1, "c": 1, "f": 4, "r": 2,
            "ram": [[12288, 85]]
        },
        "cycles": 21
    },
    {
        "name": "ed 44 neg",
        "initial": { "pc": 0, "a": 1, "ram": [[0, 237], [1, 68]] },
        "final": { "pc": 2, "a": 255, "f": 187, "r": 2 },
        "cycles": 8
    },
    {
        "name": "ed 57 ld a,i copies iff2",
        "initial": { "pc": 0, "i": 128, "iff1": 1, "iff2": 1, "ram": [[0, 237], [1, 87]] },
        "final": { "pc": 2, "i": 128, "a": 128, "f": 132, "r": 2, "iff1": 1, "iff2": 1 },
        "cycles": 9
    },
    {
        "name": "d9 exx",
        "initial": { "pc": 0, "b": 1, "c": 2, "h": 3, "bc_": 17476, "hl_": 21845, "ram": [[0, 217]] },
        "final": { "pc": 1, "b": 68, "c": 68, "h": 85, "l": 85, "bc_": 258, "hl_": 768, "r": 1 },
        "cycles": 4
    },
    {
        "name": "cd call",
        "initial": { "pc": 4096, "sp": 8192, "ram": [[4096, 205], [4097, 52], [4098, 18]] },
        "final": { "pc": 4660, "sp": 8190, "r": 1, "ram": [[8190, 3], [8191, 16]] },
        "cycles": 17
    }
]"#;

fn setup(cpu: &mut Z80, bus: &mut SimpleBus, state: &CpuState) {
    for &(address, value) in &state.ram {
        bus.load(address, &[value]);
    }

    let regs = cpu.registers_mut();
    regs.af = RegisterPair::new(u16::from_be_bytes([state.a, state.f]));
    regs.bc = RegisterPair::new(u16::from_be_bytes([state.b, state.c]));
    regs.de = RegisterPair::new(u16::from_be_bytes([state.d, state.e]));
    regs.hl = RegisterPair::new(u16::from_be_bytes([state.h, state.l]));
    regs.alt.af = RegisterPair::new(state.af_alt);
    regs.alt.bc = RegisterPair::new(state.bc_alt);
    regs.alt.de = RegisterPair::new(state.de_alt);
    regs.alt.hl = RegisterPair::new(state.hl_alt);
    regs.ix = RegisterPair::new(state.ix);
    regs.iy = RegisterPair::new(state.iy);
    regs.sp = state.sp;
    regs.pc = state.pc;
    regs.i = state.i;
    regs.r = state.r;
    regs.iff1 = state.iff1 != 0;
    regs.iff2 = state.iff2 != 0;
    regs.im = state.im;
}

/// Compare the CPU/bus state against expected, returning a list of mismatches.
fn compare(cpu: &Z80, bus: &SimpleBus, expected: &CpuState) -> Vec<String> {
    let mut errors = Vec::new();
    let regs = cpu.registers();

    check_u8(&mut errors, "A", regs.a(), expected.a);
    check_u8(&mut errors, "F", regs.f(), expected.f);
    check_u8(&mut errors, "B", regs.b(), expected.b);
    check_u8(&mut errors, "C", regs.c(), expected.c);
    check_u8(&mut errors, "D", regs.d(), expected.d);
    check_u8(&mut errors, "E", regs.e(), expected.e);
    check_u8(&mut errors, "H", regs.h(), expected.h);
    check_u8(&mut errors, "L", regs.l(), expected.l);

    check_u16(&mut errors, "AF'", regs.alt.af.get(), expected.af_alt);
    check_u16(&mut errors, "BC'", regs.alt.bc.get(), expected.bc_alt);
    check_u16(&mut errors, "DE'", regs.alt.de.get(), expected.de_alt);
    check_u16(&mut errors, "HL'", regs.alt.hl.get(), expected.hl_alt);

    check_u16(&mut errors, "IX", regs.ix.get(), expected.ix);
    check_u16(&mut errors, "IY", regs.iy.get(), expected.iy);
    check_u16(&mut errors, "SP", regs.sp, expected.sp);
    check_u16(&mut errors, "PC", regs.pc, expected.pc);
    check_u8(&mut errors, "I", regs.i, expected.i);
    check_u8(&mut errors, "R", regs.r, expected.r);

    check_u8(&mut errors, "IFF1", u8::from(regs.iff1), expected.iff1);
    check_u8(&mut errors, "IFF2", u8::from(regs.iff2), expected.iff2);
    check_u8(&mut errors, "IM", regs.im, expected.im);

    for &(address, expected_value) in &expected.ram {
        let actual = bus.peek(address);
        if actual != expected_value {
            errors.push(format!(
                "RAM[${address:04X}]: got ${actual:02X}, want ${expected_value:02X}"
            ));
        }
    }

    errors
}

fn check_u8(errors: &mut Vec<String>, name: &str, actual: u8, expected: u8) {
    if actual != expected {
        errors.push(format!("{name}: got ${actual:02X}, want ${expected:02X}"));
    }
}

fn check_u16(errors: &mut Vec<String>, name: &str, actual: u16, expected: u16) {
    if actual != expected {
        errors.push(format!("{name}: got ${actual:04X}, want ${expected:04X}"));
    }
}

#[test]
fn run_vectors() {
    let cases: Vec<TestCase> = serde_json::from_str(VECTORS).expect("vector JSON parses");
    let mut failures = Vec::new();

    for case in &cases {
        let mut bus = SimpleBus::new();
        let mut cpu = Z80::new();
        setup(&mut cpu, &mut bus, &case.initial);

        let cycles = cpu.execute(&mut bus).cycles();

        let mut errors = compare(&cpu, &bus, &case.final_state);
        if cycles != case.cycles {
            errors.push(format!("cycles: got {cycles}, want {}", case.cycles));
        }
        if !errors.is_empty() {
            failures.push(format!("{}: {}", case.name, errors.join(", ")));
        }
    }

    assert!(failures.is_empty(), "{} failures:\n{}", failures.len(), failures.join("\n"));
}
