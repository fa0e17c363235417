// [tests/mirror/libs/core/math_engine/jump_table_integrity.test.rs]
// Certificación de la tabla fija de 32 saltos: g_i = 2^i * G, d_i = 2^i.

use prospector_core_math::kangaroo::{JumpTable, JUMP_TABLE_SIZE};
use prospector_core_math::public_key::SafePublicKey;

#[test]
fn table_has_exactly_thirty_two_entries() {
    let table = JumpTable::build().unwrap();
    assert_eq!(table.entries().len(), JUMP_TABLE_SIZE);
    assert_eq!(JUMP_TABLE_SIZE, 32);
}

#[test]
fn first_entry_is_the_generator_itself() {
    let table = JumpTable::build().unwrap();
    let mut one = [0u8; 32];
    one[31] = 1;
    let generator = SafePublicKey::from_scalar_times_generator(&one).unwrap();
    assert_eq!(table.entries()[0].point.to_bytes(false), generator.to_bytes(false));
    assert_eq!(table.entries()[0].delta, 1);
}

#[test]
fn each_entry_is_double_the_previous() {
    let table = JumpTable::build().unwrap();
    for i in 1..JUMP_TABLE_SIZE {
        let doubled_previous = table.entries()[i - 1].point.combine(&table.entries()[i - 1].point).unwrap();
        assert_eq!(table.entries()[i].point.to_bytes(false), doubled_previous.to_bytes(false));
        assert_eq!(table.entries()[i].delta, table.entries()[i - 1].delta * 2);
    }
}

#[test]
fn selector_only_reads_the_low_five_bits_of_x() {
    let table = JumpTable::build().unwrap();
    let mut a = [0u8; 32];
    let mut b = [0u8; 32];
    a[31] = 0b0100_0011;
    b[31] = 0b1110_0011; // same low 5 bits (0b00011), differing high bits
    assert_eq!(table.select(&a).delta, table.select(&b).delta);
}
