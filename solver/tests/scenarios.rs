// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! End-to-end sessions through the facade and the word-level engine.

use ir::{Kind, PrimOp};
use solver::{Op, SmtSolver, SolverError, WordSolver};
use test_log::test;

#[test]
fn boolean_model_assigns_a_true_b_false() {
    let mut solver = WordSolver::new();
    let bool_sort = solver.construct_sort(Kind::Bool).unwrap();
    let a = solver.declare_const("a", &bool_sort).unwrap();
    let b = solver.declare_const("b", &bool_sort).unwrap();
    let not_b = solver.apply_op1(&Op::Prim(PrimOp::Not), &b).unwrap();
    let both = solver
        .apply_op2(&Op::Prim(PrimOp::And), &a, &not_b)
        .unwrap();
    solver.assert_formula(&both).unwrap();
    assert!(solver.check_sat().unwrap());
    assert_eq!(solver.get_value(&a).unwrap().as_literal(), Some(1));
    assert_eq!(solver.get_value(&b).unwrap().as_literal(), Some(0));
}

#[test]
fn extract_high_nibble_of_a_byte() {
    let mut solver = WordSolver::new();
    let bv8 = solver.construct_sort_width(Kind::BitVec, 8).unwrap();
    let x = solver.declare_const("x", &bv8).unwrap();
    let ext = solver.construct_op2(PrimOp::Extract, 7, 4).unwrap();
    let nibble = solver.apply_op1(&ext, &x).unwrap();
    assert_eq!(nibble.sort().kind(), Kind::BitVec);
    assert_eq!(nibble.sort().width(), Some(4));

    // pin x and check the model agrees on the extracted bits
    let c = solver.make_const(0xa5, &bv8).unwrap();
    let pinned = solver.apply_op2(&Op::Prim(PrimOp::Equal), &x, &c).unwrap();
    solver.assert_formula(&pinned).unwrap();
    assert!(solver.check_sat().unwrap());
    assert_eq!(solver.get_value(&nibble).unwrap().as_literal(), Some(0xa));
}

#[test]
fn select_returns_the_element_sort() {
    let mut solver = WordSolver::new();
    let bv8 = solver.construct_sort_width(Kind::BitVec, 8).unwrap();
    let arr_sort = solver.construct_sort_pair(Kind::Array, &bv8, &bv8).unwrap();
    let arr = solver.declare_const("A", &arr_sort).unwrap();
    let idx = solver.declare_const("i", &bv8).unwrap();
    let read = solver
        .apply_op2(&Op::Prim(PrimOp::Select), &arr, &idx)
        .unwrap();
    assert_eq!(read.sort().kind(), Kind::BitVec);
    assert_eq!(read.sort().width(), Some(8));
}

#[test]
fn store_then_select_round_trips_through_the_model() {
    let mut solver = WordSolver::new();
    let bv8 = solver.construct_sort_width(Kind::BitVec, 8).unwrap();
    let arr_sort = solver.construct_sort_pair(Kind::Array, &bv8, &bv8).unwrap();
    let arr = solver.declare_const("A", &arr_sort).unwrap();
    let idx = solver.make_const(3, &bv8).unwrap();
    let val = solver.make_const(42, &bv8).unwrap();
    let stored = solver
        .apply_op3(&Op::Prim(PrimOp::Store), &arr, &idx, &val)
        .unwrap();
    let read = solver
        .apply_op2(&Op::Prim(PrimOp::Select), &stored, &idx)
        .unwrap();
    let out = solver.declare_const("out", &bv8).unwrap();
    let tied = solver
        .apply_op2(&Op::Prim(PrimOp::Equal), &read, &out)
        .unwrap();
    solver.assert_formula(&tied).unwrap();
    assert!(solver.check_sat().unwrap());
    assert_eq!(solver.get_value(&out).unwrap().as_literal(), Some(42));
}

#[test]
fn word_arithmetic_finds_the_unique_solution() {
    let mut solver = WordSolver::new();
    let bv8 = solver.construct_sort_width(Kind::BitVec, 8).unwrap();
    let x = solver.declare_const("x", &bv8).unwrap();
    let three = solver.make_const(3, &bv8).unwrap();
    let twelve = solver.make_const(12, &bv8).unwrap();
    // x * 3 = 12 and x < 5 forces x = 4
    let prod = solver
        .apply_op2(&Op::Prim(PrimOp::BvMul), &x, &three)
        .unwrap();
    let eq = solver
        .apply_op2(&Op::Prim(PrimOp::Equal), &prod, &twelve)
        .unwrap();
    let five = solver.make_const(5, &bv8).unwrap();
    let small = solver
        .apply_op2(&Op::Prim(PrimOp::BvUlt), &x, &five)
        .unwrap();
    solver.assert_formula(&eq).unwrap();
    solver.assert_formula(&small).unwrap();
    assert!(solver.check_sat().unwrap());
    assert_eq!(solver.get_value(&x).unwrap().as_literal(), Some(4));
}

#[test]
fn contradiction_is_unsat_and_stays_unsat() {
    let mut solver = WordSolver::new();
    let bool_sort = solver.construct_sort(Kind::Bool).unwrap();
    let a = solver.declare_const("a", &bool_sort).unwrap();
    let not_a = solver.apply_op1(&Op::Prim(PrimOp::Not), &a).unwrap();
    solver.assert_formula(&a).unwrap();
    solver.assert_formula(&not_a).unwrap();
    assert!(!solver.check_sat().unwrap());
    assert!(!solver.check_sat().unwrap());
}

#[test]
fn assertion_after_check_reopens_the_session() {
    let mut solver = WordSolver::new();
    let bool_sort = solver.construct_sort(Kind::Bool).unwrap();
    let a = solver.declare_const("a", &bool_sort).unwrap();
    solver.assert_formula(&a).unwrap();
    assert!(solver.check_sat().unwrap());
    let not_a = solver.apply_op1(&Op::Prim(PrimOp::Not), &a).unwrap();
    solver.assert_formula(&not_a).unwrap();
    assert!(!solver.check_sat().unwrap());
}

#[test]
fn division_by_zero_follows_the_all_ones_rule() {
    let mut solver = WordSolver::new();
    let bv4 = solver.construct_sort_width(Kind::BitVec, 4).unwrap();
    let x = solver.declare_const("x", &bv4).unwrap();
    let seven = solver.make_const(7, &bv4).unwrap();
    let zero = solver.make_const(0, &bv4).unwrap();
    let pin = solver
        .apply_op2(&Op::Prim(PrimOp::Equal), &x, &seven)
        .unwrap();
    solver.assert_formula(&pin).unwrap();
    let quot = solver
        .apply_op2(&Op::Prim(PrimOp::BvUdiv), &x, &zero)
        .unwrap();
    let rem = solver
        .apply_op2(&Op::Prim(PrimOp::BvUrem), &x, &zero)
        .unwrap();
    assert!(solver.check_sat().unwrap());
    assert_eq!(solver.get_value(&quot).unwrap().as_literal(), Some(0xf));
    assert_eq!(solver.get_value(&rem).unwrap().as_literal(), Some(7));
}

#[test]
fn uninterpreted_function_respects_congruence() {
    let mut solver = WordSolver::new();
    let bv8 = solver.construct_sort_width(Kind::BitVec, 8).unwrap();
    let f = solver.declare_fun("f", &[bv8.clone()], &bv8).unwrap();
    let x = solver.declare_const("x", &bv8).unwrap();
    let y = solver.declare_const("y", &bv8).unwrap();
    let fx = solver.apply_op1(&Op::Func(f.clone()), &x).unwrap();
    let fy = solver.apply_op1(&Op::Func(f.clone()), &y).unwrap();
    // x = y but f(x) != f(y) violates congruence
    let same_args = solver.apply_op2(&Op::Prim(PrimOp::Equal), &x, &y).unwrap();
    let diff_vals = solver
        .apply_op2(&Op::Prim(PrimOp::Distinct), &fx, &fy)
        .unwrap();
    solver.assert_formula(&same_args).unwrap();
    solver.assert_formula(&diff_vals).unwrap();
    assert!(!solver.check_sat().unwrap());
}

#[test]
fn signed_comparison_differs_from_unsigned() {
    let mut solver = WordSolver::new();
    let bv4 = solver.construct_sort_width(Kind::BitVec, 4).unwrap();
    let x = solver.declare_const("x", &bv4).unwrap();
    let zero = solver.make_const(0, &bv4).unwrap();
    let eight = solver.make_const(8, &bv4).unwrap();
    let pin = solver
        .apply_op2(&Op::Prim(PrimOp::Equal), &x, &eight)
        .unwrap();
    // 8 is negative as a signed nibble but large unsigned
    let neg = solver
        .apply_op2(&Op::Prim(PrimOp::BvSlt), &x, &zero)
        .unwrap();
    let big = solver
        .apply_op2(&Op::Prim(PrimOp::BvUgt), &x, &zero)
        .unwrap();
    solver.assert_formula(&pin).unwrap();
    solver.assert_formula(&neg).unwrap();
    solver.assert_formula(&big).unwrap();
    assert!(solver.check_sat().unwrap());
}

#[test]
fn get_value_after_unsat_is_refused() {
    let mut solver = WordSolver::new();
    let bool_sort = solver.construct_sort(Kind::Bool).unwrap();
    let a = solver.declare_const("a", &bool_sort).unwrap();
    let not_a = solver.apply_op1(&Op::Prim(PrimOp::Not), &a).unwrap();
    solver.assert_formula(&a).unwrap();
    solver.assert_formula(&not_a).unwrap();
    assert!(!solver.check_sat().unwrap());
    assert!(matches!(
        solver.get_value(&a),
        Err(SolverError::IncorrectUsage(_))
    ));
}

#[test]
fn array_value_extraction_is_not_implemented() {
    let mut solver = WordSolver::new();
    let bv8 = solver.construct_sort_width(Kind::BitVec, 8).unwrap();
    let arr_sort = solver.construct_sort_pair(Kind::Array, &bv8, &bv8).unwrap();
    let arr = solver.declare_const("A", &arr_sort).unwrap();
    let idx = solver.declare_const("i", &bv8).unwrap();
    let read = solver
        .apply_op2(&Op::Prim(PrimOp::Select), &arr, &idx)
        .unwrap();
    let val = solver.declare_const("v", &bv8).unwrap();
    let tied = solver
        .apply_op2(&Op::Prim(PrimOp::Equal), &read, &val)
        .unwrap();
    solver.assert_formula(&tied).unwrap();
    assert!(solver.check_sat().unwrap());
    assert!(matches!(
        solver.get_value(&arr),
        Err(SolverError::NotImplemented(_))
    ));
}

#[test]
fn concat_and_shift_behave_as_words() {
    let mut solver = WordSolver::new();
    let bv4 = solver.construct_sort_width(Kind::BitVec, 4).unwrap();
    let hi = solver.make_const(0xa, &bv4).unwrap();
    let lo = solver.make_const(0x5, &bv4).unwrap();
    let word = solver
        .apply_op2(&Op::Prim(PrimOp::Concat), &hi, &lo)
        .unwrap();
    assert_eq!(word.sort().width(), Some(8));
    assert!(solver.check_sat().unwrap());
    assert_eq!(solver.get_value(&word).unwrap().as_literal(), Some(0xa5));

    let bv8 = word.sort().clone();
    let two = solver.make_const(2, &bv8).unwrap();
    let shifted = solver
        .apply_op2(&Op::Prim(PrimOp::BvShl), &word, &two)
        .unwrap();
    assert_eq!(solver.get_value(&shifted).unwrap().as_literal(), Some(0x94));
}
