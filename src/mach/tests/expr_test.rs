use super::*;
use std::collections::BTreeSet;

#[test]
fn test_constant_then_stop() {
    let r = run("\n LDC I 42\n STP\n");
    assert!(r.result.is_ok());
    assert_eq!(r.context.sp, 0);
    assert_eq!(r.top(), &Cell::Int(42));
    assert_eq!(r.output, "");
}

#[test]
fn test_add() {
    let r = run("\n LDC I 3\n LDC I 4\n ADI\n STP\n");
    assert_eq!(r.top(), &Cell::Int(7));
}

#[test]
fn test_integer_arithmetic() {
    let r = run("\n LDC I -7\n LDC I 2\n DVI\n STP\n");
    assert_eq!(r.top(), &Cell::Int(-4));
    let r = run("\n LDC I -7\n LDC I 3\n MOD\n STP\n");
    assert_eq!(r.top(), &Cell::Int(2));
    let r = run("\n LDC I 9\n LDC I 4\n SBI\n SQI\n NGI\n ABI\n STP\n");
    assert_eq!(r.top(), &Cell::Int(25));
    let r = run("\n LDC I 6\n INC 4\n DEC 3\n STP\n");
    assert_eq!(r.top(), &Cell::Int(7));
    let r = run("\n LDC I 7\n ODD\n STP\n");
    assert_eq!(r.top(), &Cell::Bool(true));
}

#[test]
fn test_large_constants_come_from_the_pool() {
    let r = run("\n LDC I 9000000\n LDC I 9000000\n MPI\n STP\n");
    assert_eq!(r.top(), &Cell::Int(81_000_000_000_000));
}

#[test]
fn test_division_by_zero_is_fatal() {
    let r = run("\n LDC I 1\n LDC I 0\n DVI\n STP\n");
    assert_eq!(r.error(), ErrorCode::DivisionByZero);
    assert_eq!(r.result.unwrap_err().address(), Some(2));
}

#[test]
fn test_real_arithmetic() {
    let r = run("\n LDC R 1.5\n LDC I 2\n FLT\n MPR\n STP\n");
    assert_eq!(r.top(), &Cell::Real(3.0));
    let r = run("\n LDC I 2\n LDC R 0.5\n FLO\n ADR\n STP\n");
    assert_eq!(r.top(), &Cell::Real(2.5));
    let r = run("\n LDC R -2.75\n TRC\n STP\n");
    assert_eq!(r.top(), &Cell::Int(-2));
    let r = run("\n LDC R 16.0\n CSP SQT\n STP\n");
    assert_eq!(r.top(), &Cell::Real(4.0));
}

#[test]
fn test_booleans() {
    let r = run("\n LDC B 1\n LDC B 0\n IOR\n NOT\n STP\n");
    assert_eq!(r.top(), &Cell::Bool(false));
    let r = run("\n LDC B 1\n LDC B 1\n AND\n STP\n");
    assert_eq!(r.top(), &Cell::Bool(true));
}

#[test]
fn test_sets() {
    let r = run("\n LDC (1,2,3)\n LDC I 2\n SGS\n GEQ S\n STP\n");
    assert_eq!(r.top(), &Cell::Bool(true));
    let r = run("\n LDC I 2\n LDC (1,2,3)\n INN\n STP\n");
    assert_eq!(r.top(), &Cell::Bool(true));
    let r = run("\n LDC (1,2,3)\n LDC (3,4)\n UNI\n LDC (2,3)\n DIF\n STP\n");
    let expected: BTreeSet<i64> = [1, 4].iter().cloned().collect();
    assert_eq!(r.top(), &Cell::Set(expected));
}

#[test]
fn test_comparisons() {
    let r = run("\n LDC I 3\n LDC I 4\n LES I\n STP\n");
    assert_eq!(r.top(), &Cell::Bool(true));
    let r = run("\n LDC I 3\n LDC I 4\n GEQ I\n STP\n");
    assert_eq!(r.top(), &Cell::Bool(false));
    let r = run("\n LDC I 3\n LDC R 3.0\n EQU R\n STP\n");
    assert_eq!(r.error(), ErrorCode::TypeMismatch);
}

#[test]
fn test_block_comparison() {
    let r = run("\n LCA 'ABC'\n LCA 'ABD'\n LES M 3\n STP\n");
    assert_eq!(r.top(), &Cell::Bool(true));
    let r = run("\n LCA 'ABC'\n LCA 'ABD'\n EQU M 2\n STP\n");
    assert_eq!(r.top(), &Cell::Bool(true));
    let r = run("\n LCA 'ABC'\n LCA 'ABD'\n GRT M 3\n STP\n");
    assert_eq!(r.top(), &Cell::Bool(false));
}

#[test]
fn test_range_check() {
    for value in 1..=5 {
        let r = run(&format!("\n LDC I {}\n CHK I 1 5\n STP\n", value));
        assert!(r.result.is_ok());
        assert_eq!(r.top(), &Cell::Int(value));
    }
    for value in &[0, 6] {
        let r = run(&format!("\n LDC I {}\n CHK I 1 5\n STP\n", value));
        assert_eq!(r.error(), ErrorCode::ValueOutOfRange);
        assert_eq!(r.result.unwrap_err().address(), Some(1));
    }
}

#[test]
fn test_jumps() {
    let r = run("\n LDC B 0\n FJP L1\n LDC I 1\n STP\nL1\n LDC I 2\n STP\n");
    assert_eq!(r.top(), &Cell::Int(2));
    let text = "
 LDC I 1
 XJP L1
 STP
L1
 UJP L2
 UJP L3
L2
 LDC I 10
 STP
L3
 LDC I 20
 STP
";
    let r = run(text);
    assert_eq!(r.top(), &Cell::Int(20));
}

#[test]
fn test_undefined_value() {
    let r = run("\n LDO 20\n STP\n");
    assert_eq!(r.error(), ErrorCode::ValueUndefined);
    assert_eq!(r.result.unwrap_err().address(), Some(0));
}

#[test]
fn test_indirect_and_move() {
    let text = "
 LAO 8
 LDC I 5
 STO
 LAO 9
 LAO 8
 MOV 1
 LAO 8
 IND 1
 STP
";
    let r = run(text);
    assert_eq!(r.cell(9), &Cell::Int(5));
    assert_eq!(r.top(), &Cell::Int(5));
    assert_eq!(r.context.sp, 0);
}

#[test]
fn test_index_address() {
    let r = run("\n LAO 100\n LDC I 3\n IXA 4\n STP\n");
    assert_eq!(r.top(), &Cell::Address(112));
}

#[test]
fn test_nil() {
    let r = run("\n LDC N\n STP\n");
    assert_eq!(r.top(), &Cell::Address(r.program.store().nil()));
}
