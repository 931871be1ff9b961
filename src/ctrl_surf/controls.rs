//! MIDI Mix control names and their MIDI codes.
//!
//! Codes are those of the factory preset: knobs & faders send
//! control changes, buttons send note on / note off.

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Control {
    pub name: &'static str,
    pub code: u8,
}

impl Control {
    pub const fn new(name: &'static str, code: u8) -> Self {
        Self { name, code }
    }
}

/// Knobs (`c<channel>`, `c<channel>a`, `c<channel>b`), faders and master.
pub const CONTINUOUS: &[Control] = &[
    Control::new("c1", 16),
    Control::new("c2", 20),
    Control::new("c3", 24),
    Control::new("c4", 28),
    Control::new("c5", 46),
    Control::new("c6", 50),
    Control::new("c7", 54),
    Control::new("c8", 58),
    Control::new("c1a", 17),
    Control::new("c2a", 21),
    Control::new("c3a", 25),
    Control::new("c4a", 29),
    Control::new("c5a", 47),
    Control::new("c6a", 51),
    Control::new("c7a", 55),
    Control::new("c8a", 59),
    Control::new("c1b", 18),
    Control::new("c2b", 22),
    Control::new("c3b", 26),
    Control::new("c4b", 30),
    // Factory preset codes, the device never sends 34 & 53 is `s6`.
    Control::new("c5b", 48),
    Control::new("c6b", 52),
    Control::new("c7b", 56),
    Control::new("c8b", 60),
    Control::new("s1", 19),
    Control::new("s2", 23),
    Control::new("s3", 27),
    Control::new("s4", 31),
    Control::new("s5", 49),
    Control::new("s6", 53),
    Control::new("s7", 57),
    Control::new("s8", 61),
    Control::new("master", 62),
];

/// Mute (`m<channel>`) & rec arm (`r<channel>`) buttons, bank & solo.
pub const DISCRETE: &[Control] = &[
    Control::new("m1", 1),
    Control::new("m2", 4),
    Control::new("m3", 7),
    Control::new("m4", 10),
    Control::new("m5", 13),
    Control::new("m6", 16),
    Control::new("m7", 19),
    Control::new("m8", 22),
    Control::new("r1", 3),
    Control::new("r2", 6),
    Control::new("r3", 9),
    Control::new("r4", 12),
    Control::new("r5", 15),
    Control::new("r6", 18),
    Control::new("r7", 21),
    Control::new("r8", 24),
    Control::new("bank_left", 25),
    Control::new("bank_right", 26),
    Control::new("solo", 27),
];

/// The only button without an LED.
pub const NO_LIGHT: &str = "solo";

static CC_BY_CODE: Lazy<BTreeMap<u8, &'static str>> = Lazy::new(|| by_code(CONTINUOUS));
static BUTTON_BY_CODE: Lazy<BTreeMap<u8, &'static str>> = Lazy::new(|| by_code(DISCRETE));

fn by_code(table: &'static [Control]) -> BTreeMap<u8, &'static str> {
    table.iter().map(|ctrl| (ctrl.code, ctrl.name)).collect()
}

fn find(table: &'static [Control], name: &str) -> Option<Control> {
    table.iter().find(|ctrl| ctrl.name == name).copied()
}

pub fn cc(name: &str) -> Option<Control> {
    find(CONTINUOUS, name)
}

pub fn cc_code(name: &str) -> Option<u8> {
    cc(name).map(|ctrl| ctrl.code)
}

pub fn cc_name(code: u8) -> Option<&'static str> {
    CC_BY_CODE.get(&code).copied()
}

pub fn button(name: &str) -> Option<Control> {
    find(DISCRETE, name)
}

pub fn button_code(name: &str) -> Option<u8> {
    button(name).map(|ctrl| ctrl.code)
}

pub fn button_name(code: u8) -> Option<&'static str> {
    BUTTON_BY_CODE.get(&code).copied()
}

pub fn is_lightable(name: &str) -> bool {
    name != NO_LIGHT && button(name).is_some()
}

/// Buttons with an LED, in table order.
pub fn lightable() -> impl Iterator<Item = Control> {
    DISCRETE.iter().copied().filter(|ctrl| ctrl.name != NO_LIGHT)
}

pub fn display_name(name: &'static str) -> &'static str {
    match name {
        "bank_left" => "BankLeft",
        "bank_right" => "BankRight",
        "solo" => "Solo",
        other => other,
    }
}
