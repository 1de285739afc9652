use asm::error::Error;
use asm::lexer::LineLexer;
use asm::token::TokenKind;

fn case(code: &str, expects: Vec<TokenKind>) {
    let tokens = LineLexer::new(code, "test.S", 1).lex().unwrap();

    println!(" {code}");
    for (idx, token) in tokens.iter().enumerate() {
        println!("{:>2}: {:?}", idx, token.kind);
    }

    assert_eq!(tokens.len(), expects.len());
    for (idx, expect) in expects.iter().enumerate() {
        assert_eq!(tokens[idx].kind, *expect);
    }
}

#[test]
fn tokens() {
    use TokenKind::*;
    case(
        "start: ldi r16, 0xFF ; comment",
        vec![
            Label(format!("start")),
            Operand(format!("ldi")),
            Operand(format!("r16")),
            Hexadecimal(format!("0xFF")),
        ],
    );
    case(
        ".org 0x0010",
        vec![MetaTag(format!(".org")), Hexadecimal(format!("0x0010"))],
    );
    case(
        ".db \"hello world\"",
        vec![
            MetaTag(format!(".db")),
            StringLiteral(format!("hello world")),
        ],
    );
    case(
        "ldi r17, 0b1010",
        vec![
            Operand(format!("ldi")),
            Operand(format!("r17")),
            Binary(format!("0b1010")),
        ],
    );
    case(
        "adiw r24, 42",
        vec![
            Operand(format!("adiw")),
            Operand(format!("r24")),
            Decimal(format!("42")),
        ],
    );
    case(
        "lpm r3, Z+",
        vec![
            Operand(format!("lpm")),
            Operand(format!("r3")),
            Operand(format!("Z+")),
        ],
    );
    case(
        "ldi r16, table(HIGH)",
        vec![
            Operand(format!("ldi")),
            Operand(format!("r16")),
            Operand(format!("table(HIGH)")),
        ],
    );
    case("", vec![]);
    case("   ; only a comment", vec![]);
    case("nop", vec![Operand(format!("nop"))]);
}

#[test]
fn lex_errors() {
    let err = |code: &str| LineLexer::new(code, "test.S", 1).lex().unwrap_err();

    assert!(matches!(err(".db \"unterminated"), Error::Lex { .. }));
    assert!(matches!(err("ldi r16, 0x1G"), Error::Lex { .. }));
    assert!(matches!(err("ldi r16, 0b12"), Error::Lex { .. }));
    assert!(matches!(err("ldi r16, 12ab"), Error::Lex { .. }));
    assert!(matches!(err("ldi r16, 0x"), Error::Lex { .. }));
    assert!(matches!(err("@foo"), Error::Lex { .. }));
}

#[test]
fn lex_error_cites_column() {
    let err = LineLexer::new("ldi r16, 0x1G", "test.S", 4).lex().unwrap_err();
    match err {
        Error::Lex { pos, .. } => {
            assert_eq!(pos.line, 4);
            assert_eq!(pos.col, 13); // the `G`
        }
        other => panic!("expected lex error, got {other:?}"),
    }
}
