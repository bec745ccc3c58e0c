//! Tests for built-in functions evaluated through the engine

use gridcalc::prelude::*;
use pretty_assertions::assert_eq;

fn engine_with(cells: &[(&str, &str)]) -> Engine {
    let mut engine = Engine::new();
    for (address, text) in cells {
        engine.set_cell(address, text).unwrap();
    }
    engine
}

fn value(engine: &mut Engine, address: &str) -> CellValue {
    engine.get_cell_value(address).unwrap()
}

fn number(engine: &mut Engine, address: &str) -> f64 {
    match value(engine, address) {
        CellValue::Number(n) => n,
        other => panic!("{address}: expected number, got {other:?}"),
    }
}

fn assert_approx(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} ± {tolerance}, got {actual}"
    );
}

#[test]
fn test_vlookup_table() {
    let mut engine = engine_with(&[
        ("A1", "1"),
        ("B1", "One"),
        ("A2", "2"),
        ("B2", "Two"),
        ("C1", "=VLOOKUP(2, A1:B2, 2, FALSE)"),
        ("C2", "=VLOOKUP(3, A1:B2, 2, FALSE)"),
    ]);

    assert_eq!(value(&mut engine, "C1"), CellValue::string("Two"));
    assert_eq!(value(&mut engine, "C2"), CellValue::Error(CellError::Na));

    // The lookup follows edits to the table
    engine.set_cell("B2", "Deux").unwrap();
    assert_eq!(value(&mut engine, "C1"), CellValue::string("Deux"));
}

#[test]
fn test_match_and_index() {
    let mut engine = engine_with(&[
        ("A1", "apple"),
        ("A2", "banana"),
        ("A3", "cherry"),
        ("B1", "0.5"),
        ("B2", "0.25"),
        ("B3", "3"),
        ("C1", "=MATCH(\"BANANA\", A1:A3, 0)"),
        ("C2", "=INDEX(B1:B3, C1)"),
        ("C3", "=INDEX(A1:B3, 3, 2)"),
        ("C4", "=INDEX(A1:B3, 4)"),
    ]);

    assert_eq!(value(&mut engine, "C1"), CellValue::Number(2.0));
    assert_eq!(value(&mut engine, "C2"), CellValue::Number(0.25));
    assert_eq!(value(&mut engine, "C3"), CellValue::Number(3.0));
    assert_eq!(value(&mut engine, "C4"), CellValue::Error(CellError::Ref));
}

#[test]
fn test_dates() {
    let mut engine = engine_with(&[
        ("A1", "=DATE(2023,1,1)"),
        ("B1", "=YEAR(A1)"),
        ("B2", "=MONTH(A1)"),
        ("B3", "=DAY(A1)"),
        ("C1", "=TIME(12,30,0)"),
        ("D1", "=TIME(14,45,30)"),
        ("D2", "=HOUR(D1)"),
        ("D3", "=MINUTE(D1)"),
        ("D4", "=SECOND(D1)"),
    ]);

    assert_eq!(value(&mut engine, "B1"), CellValue::Number(2023.0));
    assert_eq!(value(&mut engine, "B2"), CellValue::Number(1.0));
    assert_eq!(value(&mut engine, "B3"), CellValue::Number(1.0));
    assert_approx(number(&mut engine, "C1"), 0.520833, 1e-5);
    assert_eq!(value(&mut engine, "D2"), CellValue::Number(14.0));
    assert_eq!(value(&mut engine, "D3"), CellValue::Number(45.0));
    assert_eq!(value(&mut engine, "D4"), CellValue::Number(30.0));
}

#[test]
fn test_statistics_over_mixed_range() {
    let mut engine = engine_with(&[
        ("A1", "4"),
        ("A2", "label"),
        ("A3", "8"),
        ("A5", ""),
        ("B1", "=AVERAGE(A1:A6)"),
        ("B2", "=COUNT(A1:A6)"),
        ("B3", "=COUNTA(A1:A6)"),
        ("B4", "=COUNTBLANK(A1:A6)"),
        ("B5", "=MAX(A1:A6)"),
        ("B6", "=MIN(A1:A6)"),
        ("C1", "=AVERAGE(A2)"),
        ("C2", "=MAX(A2)"),
    ]);

    assert_eq!(value(&mut engine, "B1"), CellValue::Number(6.0));
    assert_eq!(value(&mut engine, "B2"), CellValue::Number(2.0));
    // A5 holds the empty string, which is a value but also blank
    assert_eq!(value(&mut engine, "B3"), CellValue::Number(4.0));
    assert_eq!(value(&mut engine, "B4"), CellValue::Number(3.0));
    assert_eq!(value(&mut engine, "B5"), CellValue::Number(8.0));
    assert_eq!(value(&mut engine, "B6"), CellValue::Number(4.0));
    assert_eq!(value(&mut engine, "C1"), CellValue::Error(CellError::Div0));
    assert_eq!(value(&mut engine, "C2"), CellValue::Number(0.0));
}

#[test]
fn test_sum_skips_text_cells() {
    let mut engine = engine_with(&[
        ("A1", "10"),
        ("A2", "n/a"),
        ("A3", "=1/0"),
        ("A4", "5"),
        ("B1", "=SUM(A1:A4)"),
        ("B2", "=SUM(A1, \"2\", A2)"),
    ]);

    assert_eq!(value(&mut engine, "B1"), CellValue::Number(15.0));
    assert_eq!(value(&mut engine, "B2"), CellValue::Number(12.0));
}

#[test]
fn test_loan_schedule() {
    let mut engine = engine_with(&[
        ("A1", "0.08"),
        ("A2", "10"),
        ("A3", "10000"),
        ("B1", "=PMT(A1/12, A2, A3)"),
        ("B2", "=PV(A1/12, A2, B1)"),
        ("B3", "=FV(0.06/12, 12, -100, 0, 0)"),
        ("B4", "=NPV(0.1, -100, 50, 60)"),
    ]);

    assert_approx(number(&mut engine, "B1"), -1037.03, 0.01);
    // Discounting the payments recovers the principal
    assert_approx(number(&mut engine, "B2"), 10000.0, 1e-6);
    assert_approx(number(&mut engine, "B3"), 1233.56, 0.01);
    assert_approx(number(&mut engine, "B4"), -4.51, 0.01);

    engine.set_cell("A1", "0").unwrap();
    assert_approx(number(&mut engine, "B1"), -1000.0, 1e-9);
}

#[test]
fn test_text_functions() {
    let mut engine = engine_with(&[
        ("A1", "  Hello World  "),
        ("B1", "=TRIM(A1)"),
        ("B2", "=UPPER(LEFT(B1, 5))"),
        ("B3", "=MID(B1, 7, 100)"),
        ("B4", "=LEN(B1)"),
        ("B5", "=CONCATENATE(RIGHT(B1, 5), \"-\", REPT(\"!\", 3))"),
        ("B6", "=SUBSTITUTE(B1, \"o\", \"0\")"),
        ("B7", "=SEARCH(\"world\", B1)"),
    ]);

    assert_eq!(value(&mut engine, "B1"), CellValue::string("Hello World"));
    assert_eq!(value(&mut engine, "B2"), CellValue::string("HELLO"));
    assert_eq!(value(&mut engine, "B3"), CellValue::string("World"));
    assert_eq!(value(&mut engine, "B4"), CellValue::Number(11.0));
    assert_eq!(value(&mut engine, "B5"), CellValue::string("World-!!!"));
    assert_eq!(value(&mut engine, "B6"), CellValue::string("Hell0 W0rld"));
    assert_eq!(value(&mut engine, "B7"), CellValue::Number(7.0));
}

#[test]
fn test_logic_and_information() {
    let mut engine = engine_with(&[
        ("A1", "5"),
        ("A2", "text"),
        ("B1", "=IF(AND(A1>0, A1<10), \"in range\", \"out\")"),
        ("B2", "=IF(OR(ISTEXT(A1), ISBLANK(A3)), 1, 2)"),
        ("B3", "=NOT(ISERROR(A1/0))"),
        ("B4", "=ISNUMBER(A1)"),
        ("B5", "=ISLOGICAL(B4)"),
        ("B6", "=IF(A1>10, 1)"),
    ]);

    assert_eq!(value(&mut engine, "B1"), CellValue::string("in range"));
    assert_eq!(value(&mut engine, "B2"), CellValue::Number(1.0));
    assert_eq!(value(&mut engine, "B3"), CellValue::Boolean(false));
    assert_eq!(value(&mut engine, "B4"), CellValue::Boolean(true));
    assert_eq!(value(&mut engine, "B5"), CellValue::Boolean(true));
    assert_eq!(value(&mut engine, "B6"), CellValue::Boolean(false));
}

#[test]
fn test_math_functions() {
    let mut engine = engine_with(&[
        ("A1", "-7.5"),
        ("B1", "=ABS(A1)"),
        ("B2", "=INT(A1)"),
        ("B3", "=ROUND(A1, 0)"),
        ("B4", "=MOD(A1, 2)"),
        ("B5", "=SQRT(A1)"),
        ("B6", "=POWER(2, 0.5)*SQRT(2)"),
        ("B7", "=ROUNDDOWN(PI(), 4)"),
    ]);

    assert_eq!(value(&mut engine, "B1"), CellValue::Number(7.5));
    assert_eq!(value(&mut engine, "B2"), CellValue::Number(-8.0));
    assert_eq!(value(&mut engine, "B3"), CellValue::Number(-8.0));
    assert_eq!(value(&mut engine, "B4"), CellValue::Number(-1.5));
    assert_eq!(value(&mut engine, "B5"), CellValue::Error(CellError::Num));
    assert_approx(number(&mut engine, "B6"), 2.0, 1e-12);
    assert_eq!(value(&mut engine, "B7"), CellValue::Number(3.1415));
}

#[test]
fn test_wrong_argument_counts() {
    let mut engine = engine_with(&[
        ("A1", "=ROUND(1.5)"),
        ("A2", "=MID(\"abc\", 1)"),
        ("A3", "=AND()"),
        ("A4", "=DATE(2023, 1)"),
    ]);

    for address in ["A1", "A2", "A3", "A4"] {
        assert_eq!(value(&mut engine, address), CellValue::Error(CellError::Value));
    }
}
