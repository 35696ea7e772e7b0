//! Opcodes used by standard Kaspa scripts.
//!
//! Values match the consensus script engine. Push opcodes `0x01..=0x4b`
//! push that many following bytes; only the sizes used by standard scripts
//! get named constants.

pub const OP_0: u8 = 0x00;
pub const OP_FALSE: u8 = 0x00;
pub const OP_DATA_1: u8 = 0x01;
pub const OP_DATA_32: u8 = 0x20;
pub const OP_DATA_33: u8 = 0x21;
pub const OP_DATA_65: u8 = 0x41;
pub const OP_DATA_75: u8 = 0x4b;
pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_PUSHDATA2: u8 = 0x4d;
pub const OP_PUSHDATA4: u8 = 0x4e;
pub const OP_1: u8 = 0x51;
pub const OP_TRUE: u8 = 0x51;
pub const OP_EQUAL: u8 = 0x87;
pub const OP_BLAKE2B: u8 = 0xaa;
pub const OP_CHECKSIGECDSA: u8 = 0xab;
pub const OP_CHECKSIG: u8 = 0xac;
