//! Tests for the sandbox policy

use memlua_core::error::BridgeError;
use memlua_core::{Address, SandboxPolicy, SandboxRange};

#[test]
fn test_default_range_bounds_are_inclusive()
{
    let policy = SandboxPolicy::default();
    assert!(policy.is_write_allowed(Address::new(0x4000_0000), true));
    assert!(policy.is_write_allowed(Address::new(0x4100_0000), true));
    assert!(policy.is_write_allowed(Address::new(0x41B0_0000), true));
}

#[test]
fn test_sandboxed_write_outside_range_is_denied()
{
    let policy = SandboxPolicy::default();
    assert!(!policy.is_write_allowed(Address::new(0x3FFF_FFFF), true));
    assert!(!policy.is_write_allowed(Address::new(0x41B0_0001), true));
    assert!(!policy.is_write_allowed(Address::ZERO, true));
    assert!(!policy.is_write_allowed(Address::from_script(-1), true));
}

#[test]
fn test_trusted_write_is_always_allowed()
{
    let policy = SandboxPolicy::default();
    assert!(policy.is_write_allowed(Address::ZERO, false));
    assert!(policy.is_write_allowed(Address::new(0x41B0_0001), false));
    assert!(policy.is_write_allowed(Address::new(0x4000_0000), false));
}

#[test]
fn test_check_write_reports_operation_and_address()
{
    let policy = SandboxPolicy::default();
    let err = policy
        .check_write(Address::new(0x1234), true, "write_u8")
        .expect_err("write should be denied");

    match err {
        BridgeError::SandboxViolation { operation, address } => {
            assert_eq!(operation, "write_u8");
            assert_eq!(address, Address::new(0x1234));
        }
        other => panic!("Expected SandboxViolation, got {other:?}"),
    }

    assert!(policy.check_write(Address::new(0x1234), false, "write_u8").is_ok());
}

#[test]
fn test_custom_range()
{
    let range = SandboxRange::new(Address::new(0x1000), Address::new(0x1fff)).unwrap();
    let policy = SandboxPolicy::new(range);

    assert!(policy.is_write_allowed(Address::new(0x1000), true));
    assert!(policy.is_write_allowed(Address::new(0x1fff), true));
    assert!(!policy.is_write_allowed(Address::new(0x2000), true));
    assert!(!policy.is_write_allowed(Address::new(0x4000_0000), true));
}

#[test]
fn test_inverted_range_is_rejected()
{
    let err = SandboxRange::new(Address::new(0x2000), Address::new(0x1000)).unwrap_err();
    assert!(matches!(err, BridgeError::InvalidRange { .. }));
}

#[test]
fn test_single_address_range()
{
    let range = SandboxRange::new(Address::new(0x10), Address::new(0x10)).unwrap();
    assert!(range.contains(Address::new(0x10)));
    assert!(!range.contains(Address::new(0x11)));
}

#[test]
fn test_spanning_range()
{
    let range = SandboxRange::spanning(Address::new(0x1000), 16);
    assert_eq!(range.start(), Address::new(0x1000));
    assert_eq!(range.end(), Address::new(0x100f));

    let empty = SandboxRange::spanning(Address::new(0x1000), 0);
    assert_eq!(empty.end(), Address::new(0x1000));
}

#[test]
fn test_range_display()
{
    assert_eq!(
        SandboxRange::DEFAULT.to_string(),
        "0x0000000040000000..=0x0000000041b00000"
    );
}
