use intcode::{parse::*, vm::*};

#[test]
fn test_parse_program() {
    assert_eq!(parse_program("1,0,0,0,99"), Ok(vec![1, 0, 0, 0, 99]));
    assert_eq!(parse_program("109,-1,204,1,99\n"), Ok(vec![109, -1, 204, 1, 99]));
    assert_eq!(parse_program(" 1 , 2,\t3\r\n"), Ok(vec![1, 2, 3]));
    assert_eq!(parse_program("42"), Ok(vec![42]));
    assert_eq!(
        parse_program("-9223372036854775808,9223372036854775807"),
        Ok(vec![Word::MIN, Word::MAX])
    );
}

#[test]
fn test_format_program() {
    let text = "3,9,8,9,10,9,4,9,99,-1,8";
    let program = parse_program(text).unwrap();
    assert_eq!(format_program(&program), text);
    assert_eq!(format_program(&[]), "");
}

#[test]
fn test_invalid_programs() {
    for text in ["", "\n", "1,2,", "1,,2", ",1", "1;2", "1 2", "0x10", "1,2.5", "--1"] {
        assert!(parse_program(text).is_err(), "{text:?} should not parse");
    }
}

#[test]
fn test_error_kinds() {
    assert_eq!(parse_program("   ").unwrap_err().kind, ParseErrorKind::Empty);
    assert_eq!(parse_program("1,x").unwrap_err().kind, ParseErrorKind::InvalidToken);
    assert_eq!(
        parse_program("9223372036854775808").unwrap_err().kind,
        ParseErrorKind::OutOfRange
    );
}

#[test]
fn test_trailing_comma_location() {
    let err = parse_program("1,2,\n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::InvalidToken);
    assert_eq!(err.token, "");
    assert_eq!(err.line, 1);
    assert_eq!(err.column, 5);
    assert_eq!(err.offset, 4);
}

#[test]
fn test_load_rejects_whole_program() {
    let err = Machine::load("1,0,0,0,99,oops").unwrap_err();
    assert_eq!(err.token, "oops");
    assert_eq!(err.span(), 11..15);
    assert!("99,1,2,x".parse::<Machine>().is_err());
}
