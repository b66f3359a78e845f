//! Tests for the typed scalar accessors

mod common;

use common::{address_of, assert_outside_default_range, bridge_error, run_err, sandboxed_lua, sandboxed_over, trusted_lua};
use memlua_core::error::BridgeError;

#[test]
fn test_u8_write_truncates()
{
    let lua = trusted_lua();
    let mut buf = vec![0u8; 4];
    let addr = address_of(&mut buf).value();

    lua.load(format!("write_u8({addr}, 300)")).exec().unwrap();
    let value: i64 = lua.load(format!("return read_u8({addr})")).eval().unwrap();

    assert_eq!(value, 44);
    assert_eq!(buf, [44, 0, 0, 0]);
}

#[test]
fn test_signed_reads_sign_extend()
{
    let lua = trusted_lua();
    let mut buf = vec![0u8; 8];
    let addr = address_of(&mut buf).value();

    lua.load(format!("write_u8({addr}, 255)")).exec().unwrap();
    let signed: i64 = lua.load(format!("return read_i8({addr})")).eval().unwrap();
    let unsigned: i64 = lua.load(format!("return read_u8({addr})")).eval().unwrap();
    assert_eq!(signed, -1);
    assert_eq!(unsigned, 255);

    lua.load(format!("write_i32({addr}, -123456)")).exec().unwrap();
    let value: i64 = lua.load(format!("return read_i32({addr})")).eval().unwrap();
    assert_eq!(value, -123_456);
    assert_eq!(&buf[..4], &(-123_456i32).to_ne_bytes());
}

#[test]
fn test_u32_keeps_full_range()
{
    let lua = trusted_lua();
    let mut buf = vec![0u8; 4];
    let addr = address_of(&mut buf).value();

    lua.load(format!("write_u32({addr}, -1)")).exec().unwrap();
    let value: i64 = lua.load(format!("return read_u32({addr})")).eval().unwrap();
    assert_eq!(value, i64::from(u32::MAX));
}

#[test]
fn test_aliases_share_width()
{
    let lua = trusted_lua();
    let mut buf = vec![0u8; 8];
    let addr = address_of(&mut buf).value();

    let pairs = [
        ("u8", "byte", 0x1_ABi64, 0xABi64),
        ("u16", "word", 0x1_BEEF, 0xBEEF),
        ("u32", "dword", 0x1_DEAD_BEEF, 0xDEAD_BEEF),
    ];
    for (fixed, alias, written, expected) in pairs {
        lua.load(format!("write_{alias}({addr}, {written})")).exec().unwrap();
        let via_fixed: i64 = lua.load(format!("return read_{fixed}({addr})")).eval().unwrap();
        assert_eq!(via_fixed, expected, "write_{alias} / read_{fixed}");

        lua.load(format!("write_{fixed}({addr}, {written})")).exec().unwrap();
        let via_alias: i64 = lua.load(format!("return read_{alias}({addr})")).eval().unwrap();
        assert_eq!(via_alias, expected, "write_{fixed} / read_{alias}");
    }
}

#[test]
fn test_float_aliases_share_width()
{
    let lua = trusted_lua();
    let mut buf = vec![0u8; 8];
    let addr = address_of(&mut buf).value();

    lua.load(format!("write_float({addr}, 1.5)")).exec().unwrap();
    let value: f64 = lua.load(format!("return read_f32({addr})")).eval().unwrap();
    assert!((value - 1.5).abs() < f64::EPSILON);
    assert_eq!(&buf[..4], &1.5f32.to_ne_bytes());

    lua.load(format!("write_f64({addr}, -0.25)")).exec().unwrap();
    let value: f64 = lua.load(format!("return read_double({addr})")).eval().unwrap();
    assert!((value + 0.25).abs() < f64::EPSILON);
    assert_eq!(buf, (-0.25f64).to_ne_bytes());
}

#[test]
fn test_f32_write_rounds()
{
    let lua = trusted_lua();
    let mut buf = vec![0u8; 4];
    let addr = address_of(&mut buf).value();

    lua.load(format!("write_f32({addr}, 0.1)")).exec().unwrap();
    let value: f64 = lua.load(format!("return read_f32({addr})")).eval().unwrap();
    assert!((value - f64::from(0.1f32)).abs() < f64::EPSILON);
}

#[test]
fn test_result_types()
{
    let lua = trusted_lua();
    let mut buf = vec![0u8; 8];
    let addr = address_of(&mut buf).value();

    let int_type: String = lua.load(format!("return math.type(read_i16({addr}))")).eval().unwrap();
    let float_type: String = lua.load(format!("return math.type(read_f32({addr}))")).eval().unwrap();
    assert_eq!(int_type, "integer");
    assert_eq!(float_type, "float");
}

#[test]
fn test_write_returns_nothing()
{
    let lua = trusted_lua();
    let mut buf = vec![0u8; 4];
    let addr = address_of(&mut buf).value();

    let count: i64 = lua
        .load(format!("return select('#', write_u16({addr}, 1))"))
        .eval()
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn test_native_widths()
{
    let lua = trusted_lua();
    let mut buf = vec![0u8; 16];
    let addr = address_of(&mut buf).value();

    lua.load(format!("write_long({addr}, -2)")).exec().unwrap();
    let value: i64 = lua.load(format!("return read_long({addr})")).eval().unwrap();
    assert_eq!(value, -2);
    let width = std::mem::size_of::<libc::c_long>();
    assert!(buf[..width].iter().any(|&b| b != 0));
    assert!(buf[width..].iter().all(|&b| b == 0));

    buf.fill(0);
    lua.load(format!("write_short({addr}, 0x12345)")).exec().unwrap();
    let value: i64 = lua.load(format!("return read_short({addr})")).eval().unwrap();
    assert_eq!(value, i64::from(0x2345i16));

    lua.load(format!("write_int({addr}, 7)")).exec().unwrap();
    lua.load(format!("write_char({addr}, 65)")).exec().unwrap();
    let value: i64 = lua.load(format!("return read_char({addr})")).eval().unwrap();
    assert_eq!(value, 65);
}

#[test]
fn test_integral_float_and_numeric_string_are_accepted()
{
    let lua = trusted_lua();
    let mut buf = vec![0u8; 4];
    let addr = address_of(&mut buf).value();

    lua.load(format!("write_u8('{addr}', 3.0)")).exec().unwrap();
    assert_eq!(buf[0], 3);
}

#[test]
fn test_fractional_integer_value_is_rejected()
{
    let lua = trusted_lua();
    let mut buf = vec![9u8; 4];
    let addr = address_of(&mut buf).value();

    let err = run_err(&lua, &format!("write_i32({addr}, 3.5)"));
    match bridge_error(&err) {
        BridgeError::BadArgumentType { position, operation, .. } => {
            assert_eq!(*position, 2);
            assert_eq!(*operation, "write_i32");
        }
        other => panic!("Expected BadArgumentType, got {other:?}"),
    }
    assert_eq!(buf, [9, 9, 9, 9]);
}

#[test]
fn test_non_numeric_address_is_rejected()
{
    let lua = trusted_lua();
    let err = run_err(&lua, "read_u8({})");
    assert!(matches!(
        bridge_error(&err),
        BridgeError::BadArgumentType { position: 1, .. }
    ));
}

#[test]
fn test_wrong_argument_count()
{
    let lua = trusted_lua();
    let mut buf = vec![0u8; 4];
    let addr = address_of(&mut buf).value();

    for chunk in [
        "read_u8()".to_string(),
        format!("read_u8({addr}, 1)"),
        format!("write_u8({addr})"),
        format!("write_u8({addr}, 1, 2)"),
    ] {
        let err = run_err(&lua, &chunk);
        match bridge_error(&err) {
            BridgeError::WrongArgumentCount { operation, .. } => {
                assert!(chunk.starts_with(operation), "{chunk} reported {operation}");
            }
            other => panic!("Expected WrongArgumentCount for {chunk}, got {other:?}"),
        }
    }
    assert_eq!(buf, [0, 0, 0, 0]);
}

#[test]
fn test_sandboxed_write_outside_range_leaves_memory_unchanged()
{
    let lua = sandboxed_lua();
    let mut buf = vec![0x5Au8; 8];
    let address = address_of(&mut buf);
    assert_outside_default_range(address);
    let addr = address.value();

    for op in ["write_u8", "write_i16", "write_dword", "write_long", "write_f64"] {
        let err = run_err(&lua, &format!("{op}({addr}, 1)"));
        match bridge_error(&err) {
            BridgeError::SandboxViolation { operation, address: denied } => {
                assert_eq!(*operation, op);
                assert_eq!(*denied, address);
            }
            other => panic!("Expected SandboxViolation, got {other:?}"),
        }
    }
    assert_eq!(buf, [0x5A; 8]);
}

#[test]
fn test_identical_write_from_trusted_script_succeeds()
{
    let mut buf = vec![0x5Au8; 8];
    let address = address_of(&mut buf);
    assert_outside_default_range(address);

    trusted_lua()
        .load(format!("write_u8({}, 1)", address.value()))
        .exec()
        .unwrap();
    assert_eq!(buf[0], 1);
}

#[test]
fn test_sandboxed_write_inside_range_succeeds()
{
    let mut buf = vec![0u8; 8];
    let lua = sandboxed_over(&mut buf);
    let addr = address_of(&mut buf).value();

    lua.load(format!("write_u32({addr}, 0x01020304)")).exec().unwrap();
    assert_eq!(&buf[..4], &0x0102_0304u32.to_ne_bytes());
}

#[test]
fn test_sandbox_is_checked_before_value_type()
{
    let lua = sandboxed_lua();
    let mut buf = vec![0u8; 4];
    let addr = address_of(&mut buf).value();

    let err = run_err(&lua, &format!("write_u8({addr}, 'not a number')"));
    assert!(matches!(bridge_error(&err), BridgeError::SandboxViolation { .. }));
}

#[test]
fn test_sandboxed_read_is_not_gated()
{
    let lua = sandboxed_lua();
    let mut buf = vec![0u8; 4];
    buf[0] = 17;
    let address = address_of(&mut buf);
    assert_outside_default_range(address);

    let value: i64 = lua
        .load(format!("return read_u8({})", address.value()))
        .eval()
        .unwrap();
    assert_eq!(value, 17);
}
