//! Whole-machine tests: programs run from RAM and from banked cartridges.

use emu_core::{Cpu, Observable, Value};
use emu_sms::{Flag, Mapper, PAGE_SIZE, Sms, SmsConfig, StepOutcome};

fn machine() -> Sms {
    Sms::new(SmsConfig::default()).expect("default config is valid")
}

/// Load `program` into RAM at `origin` and point PC at it.
fn setup(origin: u16, program: &[u8]) -> Sms {
    let mut sms = machine();
    for (offset, &byte) in program.iter().enumerate() {
        sms.memory_mut().write(origin + offset as u16, byte);
    }
    sms.set_pc(origin);
    sms
}

/// Step until the CPU halts, with a cap on instructions.
fn run_until_halt(sms: &mut Sms, max_steps: usize) {
    for _ in 0..max_steps {
        if sms.cpu().is_halted() {
            return;
        }
        sms.step();
    }
    panic!("CPU did not halt within {max_steps} steps");
}

/// An image of `pages` pages where every byte holds its page number, with
/// `program` at the start of page 0.
fn banked_image(pages: usize, program: &[u8]) -> Vec<u8> {
    let mut image: Vec<u8> = (0..pages)
        .flat_map(|page| std::iter::repeat_n(page as u8, PAGE_SIZE))
        .collect();
    image[..program.len()].copy_from_slice(program);
    image
}

#[test]
fn ld_bc_immediate_from_ram() {
    let mut sms = setup(0xC000, &[0x01, 0x02, 0x03]);
    let outcome = sms.step();

    assert_eq!(outcome, StepOutcome::Executed { cycles: 10 });
    let regs = sms.get_registers();
    assert_eq!(regs.pc, 0xC003);
    assert_eq!(regs.bc.get(), 0x0302);
    assert_eq!(sms.get_cycles(), 10);
}

#[test]
fn ld_indirect_bc_stores_a() {
    let mut sms = setup(0xC000, &[0x01, 0x06, 0xC0, 0x02, 0xFF, 0xFF, 0xFF]);
    sms.step();
    sms.step();

    let regs = sms.get_registers();
    assert_eq!(regs.pc, 0xC004);
    assert_eq!(sms.get_cycles(), 7);
    assert_eq!(sms.memory().peek(0xC006), regs.a());
    // The mirror sees the same cell.
    assert_eq!(sms.memory().peek(0xE006), regs.a());
}

#[test]
fn nop_from_blank_cartridge() {
    let mut sms = machine();
    sms.load_cartridge(&[0x00; 0x100]);
    sms.step();

    assert_eq!(sms.get_registers().pc, 1);
    assert_eq!(sms.get_cycles(), 4);
}

#[test]
fn cartridge_dump_matches_load() {
    let data = [0x01, 0x02, 0x03, 0xFF, 0xFF, 0xFF, 0xFF];
    let mut sms = machine();
    sms.load_cartridge(&data);

    assert!(sms.cart_loaded());
    assert_eq!(sms.dump_cartridge_data(), &data);
    assert_eq!(sms.memory().mapper(), Mapper::Standard);
}

#[test]
fn copier_header_is_skipped() {
    // Header of HALTs, then a program that loads A and halts.
    let mut data = vec![0x76; 512];
    data.extend(banked_image(2, &[0x3E, 0x99, 0x76]));

    let mut sms = machine();
    sms.load_cartridge(&data);
    run_until_halt(&mut sms, 10);

    assert_eq!(sms.dump_cartridge_data().len(), 2 * PAGE_SIZE);
    assert_eq!(sms.get_registers().a(), 0x99);
}

#[test]
fn program_pages_slot_two() {
    // LD A,5 / LD ($FFFF),A / LD A,($8000) / HALT
    let program = [0x3E, 0x05, 0x32, 0xFF, 0xFF, 0x3A, 0x00, 0x80, 0x76];
    let mut sms = machine();
    sms.load_cartridge(&banked_image(8, &program));
    run_until_halt(&mut sms, 10);

    assert_eq!(sms.get_registers().a(), 5);
    assert_eq!(sms.memory().slot_page(2), Some(5));
    assert_eq!(sms.query("memory.slot2"), Some(Value::U8(5)));
}

#[test]
fn program_pages_codemasters_latch() {
    // LD A,6 / LD ($8000),A / LD A,($8000) / HALT
    let program = [0x3E, 0x06, 0x32, 0x00, 0x80, 0x3A, 0x00, 0x80, 0x76];
    let mut image = banked_image(8, &program);
    image[0x7FE6..0x7FEA].copy_from_slice(&[0x00, 0x80, 0x00, 0x80]);

    let mut sms = machine();
    sms.load_cartridge(&image);
    assert_eq!(sms.memory().mapper(), Mapper::Codemasters);
    run_until_halt(&mut sms, 10);

    assert_eq!(sms.get_registers().a(), 6);
}

#[test]
fn program_uses_cartridge_ram() {
    // LD A,$08 / LD ($FFFC),A / LD A,$77 / LD ($8000),A / XOR A / LD A,($8000) / HALT
    let program = [
        0x3E, 0x08, 0x32, 0xFC, 0xFF, 0x3E, 0x77, 0x32, 0x00, 0x80, 0xAF, 0x3A, 0x00, 0x80, 0x76,
    ];
    let mut sms = machine();
    sms.load_cartridge(&banked_image(4, &program));
    run_until_halt(&mut sms, 20);

    assert_eq!(sms.get_registers().a(), 0x77);
    assert!(sms.memory().slot2_is_ram());
}

#[test]
fn stack_lives_in_ram() {
    // CALL $C010 / HALT, with RET at $C010.
    let mut sms = setup(0xC000, &[0xCD, 0x10, 0xC0, 0x76]);
    sms.memory_mut().write(0xC010, 0xC9);
    run_until_halt(&mut sms, 10);

    let regs = sms.get_registers();
    assert_eq!(regs.pc, 0xC004);
    assert_eq!(regs.sp, 0xDFF0);
    // Return address sits just below the initial stack pointer.
    assert_eq!(sms.memory().peek(0xDFEE), 0x03);
    assert_eq!(sms.memory().peek(0xDFEF), 0xC0);
}

#[test]
fn flags_visible_through_machine() {
    // XOR A sets Z and P.
    let mut sms = setup(0xC000, &[0xAF]);
    sms.step();
    assert!(sms.is_flag_set(Flag::Zero));
    assert!(sms.is_flag_set(Flag::ParityOverflow));
    assert!(!sms.is_flag_set(Flag::Carry));
    assert_eq!(sms.query("cpu.flags.z"), Some(Value::Bool(true)));
}

#[test]
fn pal_frames_pace_to_the_budget() {
    let mut sms = Sms::new(SmsConfig::pal()).expect("PAL config is valid");
    // DEC HL (6) / JP $0000 (10): every frame ends on the loop boundary.
    sms.load_cartridge(&[0x2B, 0xC3, 0x00, 0x00]);

    for frame in 1..=3 {
        let report = sms.update();
        assert!(report.cycles >= 70_937);
        assert!(report.cycles < 70_937 + 10);
        assert_eq!(sms.frame_count(), frame);
    }
    assert_eq!(sms.cpu().total_ticks().get() % 16, 0);
}
